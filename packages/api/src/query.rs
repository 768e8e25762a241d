//! # Catalog query builder
//!
//! Turns the listing page's filter panel, pagination and scope into the query
//! string of `GET /api/ideas`.
//!
//! Parameters are emitted in a fixed order:
//! `category, type, priceMin, priceMax, requireNDA, search, mine, page, limit`.
//! A filter holding its sentinel ("All Categories", "All Types", "All") or an
//! empty string contributes nothing. The search text is trimmed first.
//!
//! The creator scope has no server-side filter, so it asks for one large batch
//! (`page=1&limit=1000`) and the listing controller narrows it client-side.

use url::form_urlencoded;

pub const ALL_CATEGORIES: &str = "All Categories";
pub const ALL_TYPES: &str = "All Types";
pub const ALL: &str = "All";

/// Batch size requested when scoping to one creator.
pub const CREATOR_BATCH_LIMIT: u32 = 1000;

/// URL value of `filter` that selects "my ideas".
pub const MY_IDEAS_PARAM: &str = "my-ideas";

/// Filter panel state. Price bounds stay strings so partially typed input survives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filters {
    pub category: String,
    pub idea_type: String,
    pub price_min: String,
    pub price_max: String,
    pub require_nda: String,
    pub search: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            idea_type: ALL_TYPES.to_string(),
            price_min: String::new(),
            price_max: String::new(),
            require_nda: ALL.to_string(),
            search: String::new(),
        }
    }
}

impl Filters {
    /// All filters reset to their sentinels.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Whether no filter constrains the result.
    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Constraining filters as `(parameter, value)` pairs, in wire order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if constrains(&self.category, ALL_CATEGORIES) {
            pairs.push(("category", self.category.clone()));
        }
        if constrains(&self.idea_type, ALL_TYPES) {
            pairs.push(("type", self.idea_type.clone()));
        }
        if !self.price_min.is_empty() {
            pairs.push(("priceMin", self.price_min.clone()));
        }
        if !self.price_max.is_empty() {
            pairs.push(("priceMax", self.price_max.clone()));
        }
        if constrains(&self.require_nda, ALL) {
            pairs.push(("requireNDA", self.require_nda.clone()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

fn constrains(value: &str, sentinel: &str) -> bool {
    !value.is_empty() && value != sentinel
}

/// Which ideas the listing shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    All,
    /// The signed-in user's own ideas (`mine=true`, authenticated).
    Mine,
    /// One creator's ideas, filtered client-side.
    Creator(String),
}

impl Scope {
    /// Scope from the `filter` and `creator` URL parameters. A creator wins over `my-ideas`.
    pub fn from_params(filter: &str, creator: &str) -> Self {
        let creator = creator.trim();
        if !creator.is_empty() {
            Scope::Creator(creator.to_string())
        } else if filter == MY_IDEAS_PARAM {
            Scope::Mine
        } else {
            Scope::All
        }
    }

    /// `(filter, creator)` URL parameters for this scope; empty means absent.
    pub fn to_params(&self) -> (String, String) {
        match self {
            Scope::All => (String::new(), String::new()),
            Scope::Mine => (MY_IDEAS_PARAM.to_string(), String::new()),
            Scope::Creator(id) => (String::new(), id.clone()),
        }
    }

    pub fn is_mine(&self) -> bool {
        matches!(self, Scope::Mine)
    }

    pub fn creator(&self) -> Option<&str> {
        match self {
            Scope::Creator(id) => Some(id),
            _ => None,
        }
    }
}

/// Query string for `GET /api/ideas`.
pub fn build_query(filters: &Filters, page: u32, page_size: u32, scope: &Scope) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in filters.pairs() {
        query.append_pair(key, &value);
    }
    if scope.is_mine() {
        query.append_pair("mine", "true");
    }
    let (page, limit) = match scope {
        Scope::Creator(_) => (1, CREATOR_BATCH_LIMIT),
        _ => (page, page_size),
    };
    query.append_pair("page", &page.to_string());
    query.append_pair("limit", &limit.to_string());
    query.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_produce_no_filter_params() {
        let filters = Filters::default();
        assert!(filters.is_empty());
        assert_eq!(build_query(&filters, 1, 20, &Scope::All), "page=1&limit=20");
    }

    #[test]
    fn test_mixed_filters() {
        let filters = Filters {
            idea_type: "Product".to_string(),
            price_min: "100".to_string(),
            search: "  robot  ".to_string(),
            ..Filters::default()
        };
        assert_eq!(
            build_query(&filters, 1, 20, &Scope::All),
            "type=Product&priceMin=100&search=robot&page=1&limit=20"
        );
    }

    #[test]
    fn test_every_filter_appears_once_in_order() {
        let filters = Filters {
            category: "Health & Fitness".to_string(),
            idea_type: "Service".to_string(),
            price_min: "10".to_string(),
            price_max: "500".to_string(),
            require_nda: "Yes".to_string(),
            search: "smart home".to_string(),
        };
        let query = build_query(&filters, 3, 10, &Scope::Mine);
        assert_eq!(
            query,
            "category=Health+%26+Fitness&type=Service&priceMin=10&priceMax=500\
             &requireNDA=Yes&search=smart+home&mine=true&page=3&limit=10"
        );
        for key in ["category=", "type=", "priceMin=", "priceMax=", "requireNDA=", "search="] {
            assert_eq!(query.matches(key).count(), 1, "{}", key);
        }
    }

    #[test]
    fn test_price_bounds_sent_verbatim() {
        let filters = Filters {
            price_max: "1e3".to_string(),
            ..Filters::default()
        };
        assert_eq!(
            build_query(&filters, 2, 50, &Scope::All),
            "priceMax=1e3&page=2&limit=50"
        );
    }

    #[test]
    fn test_blank_search_is_omitted() {
        let filters = Filters {
            search: "   ".to_string(),
            ..Filters::default()
        };
        assert!(filters.is_empty());
    }

    #[test]
    fn test_creator_scope_overrides_pagination() {
        let scope = Scope::Creator("u42".to_string());
        assert_eq!(
            build_query(&Filters::default(), 7, 20, &scope),
            "page=1&limit=1000"
        );
    }

    #[test]
    fn test_scope_url_params() {
        assert_eq!(Scope::from_params("my-ideas", ""), Scope::Mine);
        assert_eq!(
            Scope::from_params("my-ideas", "u1"),
            Scope::Creator("u1".to_string())
        );
        assert_eq!(Scope::from_params("other", " "), Scope::All);
        assert_eq!(
            Scope::Mine.to_params(),
            ("my-ideas".to_string(), String::new())
        );
        let scope = Scope::Creator("u1".into());
        let (filter, creator) = scope.to_params();
        assert_eq!(Scope::from_params(&filter, &creator), scope);
    }
}
