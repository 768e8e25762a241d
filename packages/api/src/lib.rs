//! # API crate: everything Ideady says to the outside world
//!
//! The UI never builds a request itself. It holds a [`Backend`] and calls the
//! services defined here, which talk either to the real services or to the
//! in-memory stand-ins in [`mock`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Identity provider client, Google sign-in, the [`auth::Session`] service |
//! | [`backend`] | Picks remote or in-memory implementations from configuration |
//! | [`catalog`] | [`IdeaSource`] / [`CatalogApi`] contracts for the ideas REST API |
//! | [`client`] | `reqwest` implementation of the catalog contracts |
//! | [`error`] | [`ApiError`], its categories and user-facing messages |
//! | [`firestore`] | Firestore REST adapter implementing [`store::ProfileStore`] |
//! | [`listing`] | Listing state machine: retries, stale-response tickets, creator scoping |
//! | [`mock`] | In-memory catalog, identity and blob storage |
//! | [`models`] | Wire types: ideas, pagination, categories, languages |
//! | [`query`] | Listing filters and the query string built from them |
//! | [`storage`] | Avatar and CV uploads |
//! | [`timer`] | `sleep` and timeouts for both wasm and native |
//! | [`validation`] | Form validation rules shared by the create, edit, signup and profile forms |

pub mod auth;
pub mod backend;
pub mod catalog;
pub mod client;
pub mod error;
pub mod firestore;
pub mod listing;
pub mod mock;
pub mod models;
pub mod query;
pub mod storage;
pub mod timer;
pub mod validation;

pub use backend::{AppSession, Backend};
pub use catalog::{CatalogApi, IdeaSource};
pub use client::CatalogClient;
pub use error::{ApiError, ErrorKind};
