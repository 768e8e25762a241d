//! Reference lists: categories and languages.

use serde::{Deserialize, Serialize};

use crate::ApiError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub native_name: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub flag: Option<String>,
}

fn active() -> bool {
    true
}

/// `{ success, categories }` envelope.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

/// `{ success, languages }` envelope.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Languages {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub languages: Option<Vec<Language>>,
}

impl Categories {
    pub fn into_result(self) -> Result<Vec<Category>, ApiError> {
        match (self.success, self.categories) {
            (true, Some(list)) => Ok(list),
            _ => Err(ApiError::Decode("Invalid response format".to_string())),
        }
    }
}

impl Languages {
    pub fn into_result(self) -> Result<Vec<Language>, ApiError> {
        match (self.success, self.languages) {
            (true, Some(list)) => Ok(list),
            _ => Err(ApiError::Decode("Invalid response format".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_requires_success_flag() {
        let ok: Categories = serde_json::from_str(
            r#"{"success": true, "categories": [{"id": "1", "name": "Energy"}]}"#,
        )
        .unwrap();
        let list = ok.into_result().unwrap();
        assert_eq!(list[0].name, "Energy");
        assert!(list[0].is_active);

        let failed: Languages = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(matches!(failed.into_result(), Err(ApiError::Decode(_))));
    }
}
