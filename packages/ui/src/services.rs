//! Backend handle shared through context, plus reference-data hooks.

use api::models::{Category, Language};
use api::{ApiError, Backend, CatalogApi};
use dioxus::prelude::*;

/// The backend provided at the app root.
pub fn use_backend() -> Backend {
    use_context::<Backend>()
}

/// Category list for selects; loaded once per mount.
pub fn use_categories() -> Resource<Result<Vec<Category>, ApiError>> {
    let backend = use_backend();
    use_resource(move || {
        let backend = backend.clone();
        async move {
            let mut categories = backend.catalog.categories().await?;
            categories.retain(|c| c.is_active);
            categories.sort_by_key(|c| c.sort_order.unwrap_or(i32::MAX));
            Ok(categories)
        }
    })
}

/// Language list for profile preferences.
pub fn use_languages() -> Resource<Result<Vec<Language>, ApiError>> {
    let backend = use_backend();
    use_resource(move || {
        let backend = backend.clone();
        async move {
            let mut languages = backend.catalog.languages().await?;
            languages.retain(|l| l.is_active);
            languages.sort_by_key(|l| l.sort_order.unwrap_or(i32::MAX));
            Ok(languages)
        }
    })
}

/// Names of the loaded categories; empty while loading or on error.
pub fn category_names(resource: &Resource<Result<Vec<Category>, ApiError>>) -> Vec<String> {
    match &*resource.read() {
        Some(Ok(list)) => list.iter().map(|c| c.name.clone()).collect(),
        _ => Vec::new(),
    }
}
