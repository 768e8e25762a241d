//! # Catalog API contract
//!
//! [`IdeaSource`] is the narrow seam the listing controller depends on;
//! [`CatalogApi`] adds the rest of the REST catalog. Both the remote
//! [`crate::CatalogClient`] and the in-memory [`crate::mock::MockCatalog`]
//! implement them.
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`IdeaSource::list_ideas`] | `GET /api/ideas?<query>` |
//! | [`CatalogApi::get_idea`] | `GET /ideas/:id` |
//! | [`CatalogApi::create_idea`] | `POST /api/ideas` |
//! | [`CatalogApi::update_idea`] | `PUT /ideas/:id` |
//! | [`CatalogApi::delete_idea`] | `DELETE /ideas/:id` |
//! | [`CatalogApi::public_profile`] | `GET /api/ideas/user/:id` |
//! | [`CatalogApi::categories`] | `GET /api/categories` |
//! | [`CatalogApi::languages`] | `GET /api/languages` |
//! | [`CatalogApi::health`] | `GET /api/health` |
//!
//! `token` is the caller's ID token; when present it is sent as a bearer token.

use std::future::Future;

use store::PublicProfile;

use crate::models::{Category, Idea, IdeaDraft, IdeasResponse, Language};
use crate::ApiError;

/// Anything that can answer a listing query.
pub trait IdeaSource {
    /// `query` is the output of [`crate::query::build_query`].
    fn list_ideas(
        &self,
        query: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<IdeasResponse, ApiError>>;
}

/// Full REST catalog.
pub trait CatalogApi: IdeaSource {
    fn get_idea(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<Idea, ApiError>>;

    fn create_idea(
        &self,
        draft: &IdeaDraft,
        token: &str,
    ) -> impl Future<Output = Result<(), ApiError>>;

    fn update_idea(
        &self,
        id: &str,
        draft: &IdeaDraft,
        token: &str,
    ) -> impl Future<Output = Result<(), ApiError>>;

    fn delete_idea(&self, id: &str, token: &str) -> impl Future<Output = Result<(), ApiError>>;

    fn public_profile(&self, uid: &str) -> impl Future<Output = Result<PublicProfile, ApiError>>;

    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>>;

    fn languages(&self) -> impl Future<Output = Result<Vec<Language>, ApiError>>;

    /// Succeeds iff the API answered its health probe in time.
    fn health(&self) -> impl Future<Output = Result<(), ApiError>>;
}
