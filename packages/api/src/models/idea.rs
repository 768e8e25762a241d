//! # Idea listings as served by the catalog API
//!
//! - [`Idea`]: one marketplace listing. The id travels as `_id`.
//! - [`IdeaDraft`]: the body of `POST /api/ideas` and `PUT /ideas/:id`.
//! - [`IdeasResponse`] / [`Pagination`]: the `GET /api/ideas` envelope.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdeaType {
    #[default]
    Product,
    Service,
}

impl IdeaType {
    pub const ALL: [IdeaType; 2] = [IdeaType::Product, IdeaType::Service];

    pub fn as_str(self) -> &'static str {
        match self {
            IdeaType::Product => "Product",
            IdeaType::Service => "Service",
        }
    }
}

impl fmt::Display for IdeaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdeaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Product" => Ok(IdeaType::Product),
            "Service" => Ok(IdeaType::Service),
            other => Err(format!("unknown idea type: {}", other)),
        }
    }
}

/// Creator fields denormalized onto each idea.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorInfo {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// A marketplace listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub idea_type: IdeaType,
    #[serde(default)]
    pub problem_description: String,
    #[serde(default)]
    pub solution_description: String,
    #[serde(default)]
    pub desired_price: f64,
    #[serde(rename = "requireNDA", default)]
    pub require_nda: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub creator_info: CreatorInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
}

impl Idea {
    pub fn is_owned_by(&self, uid: &str) -> bool {
        !uid.is_empty() && self.creator == uid
    }

    /// Parsed creation time, if the server sent a valid RFC 3339 timestamp.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Creation date as `YYYY-MM-DD`, or the raw value when unparsable.
    pub fn created_date(&self) -> String {
        self.created()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| self.created_at.clone())
    }

    pub fn formatted_price(&self) -> String {
        format_price(self.desired_price)
    }

    pub fn creator_name(&self) -> &str {
        if self.creator_info.display_name.trim().is_empty() {
            store::models::ANONYMOUS
        } else {
            &self.creator_info.display_name
        }
    }
}

/// `12345.5` → `$12,345.50`; whole amounts drop the cents.
pub fn format_price(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (whole, frac) = (cents.abs() / 100, cents.abs() % 100);
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if cents < 0 { "-" } else { "" };
    if frac == 0 {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{:02}", sign, grouped, frac)
    }
}

/// Create/update payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaDraft {
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub idea_type: Option<IdeaType>,
    pub problem_description: String,
    pub solution_description: String,
    pub protection_status: String,
    #[serde(rename = "requireNDA")]
    pub require_nda: bool,
    pub desired_price: Option<f64>,
    pub contact_preference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
}

impl Default for IdeaDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            idea_type: None,
            problem_description: String::new(),
            solution_description: String::new(),
            protection_status: "None".to_string(),
            require_nda: false,
            desired_price: None,
            contact_preference: String::new(),
            additional_notes: None,
            photos: Vec::new(),
        }
    }
}

impl From<&Idea> for IdeaDraft {
    fn from(idea: &Idea) -> Self {
        Self {
            title: idea.title.clone(),
            category: idea.category.clone(),
            idea_type: Some(idea.idea_type),
            problem_description: idea.problem_description.clone(),
            solution_description: idea.solution_description.clone(),
            protection_status: idea
                .protection_status
                .clone()
                .unwrap_or_else(|| "None".to_string()),
            require_nda: idea.require_nda,
            desired_price: Some(idea.desired_price),
            contact_preference: idea.contact_preference.clone().unwrap_or_default(),
            additional_notes: idea.additional_notes.clone(),
            photos: idea.photos.clone(),
        }
    }
}

/// Pagination block of a listing response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_count: 0,
            has_next_page: false,
            has_prev_page: false,
        }
    }
}

impl Pagination {
    /// Pagination for `count` items shown `page_size` at a time.
    pub fn for_count(page: u32, page_size: u32, count: u32) -> Self {
        let total_pages = count.div_ceil(page_size.max(1));
        Self {
            current_page: page,
            total_pages,
            total_count: count,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }

    pub fn next_disabled(&self) -> bool {
        self.current_page >= self.total_pages
    }

    pub fn prev_disabled(&self) -> bool {
        self.current_page <= 1
    }
}

/// `GET /api/ideas` response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeasResponse {
    pub ideas: Vec<Idea>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idea_wire_names() {
        let idea: Idea = serde_json::from_str(
            r#"{
                "_id": "i1",
                "title": "Solar kettle",
                "category": "Energy",
                "type": "Service",
                "problemDescription": "Boiling water is slow",
                "solutionDescription": "Use the sun",
                "desiredPrice": 1500,
                "requireNDA": true,
                "createdAt": "2024-03-01T10:00:00.000Z",
                "creator": "u1",
                "creatorInfo": {"displayName": "Ada", "email": "ada@example.com", "photoURL": null}
            }"#,
        )
        .unwrap();

        assert_eq!(idea.id, "i1");
        assert_eq!(idea.idea_type, IdeaType::Service);
        assert!(idea.require_nda);
        assert_eq!(idea.created_date(), "2024-03-01");
        assert!(idea.is_owned_by("u1"));
        assert!(!idea.is_owned_by(""));
        assert_eq!(idea.creator_info.photo_url, None);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_price(999.0), "$999");
        assert_eq!(format_price(1000.0), "$1,000");
        assert_eq!(format_price(12345.5), "$12,345.50");
        assert_eq!(format_price(10_000_000.0), "$10,000,000");
    }

    #[test]
    fn test_pagination_bounds() {
        let first = Pagination::for_count(1, 20, 45);
        assert_eq!(first.total_pages, 3);
        assert!(first.prev_disabled());
        assert!(!first.next_disabled());

        let last = Pagination::for_count(3, 20, 45);
        assert!(last.next_disabled());
        assert!(!last.prev_disabled());

        let empty = Pagination::for_count(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.next_disabled());
        assert!(empty.prev_disabled());
    }

    #[test]
    fn test_draft_from_idea_keeps_optional_fields() {
        let idea = Idea {
            id: "i1".into(),
            title: "T".into(),
            desired_price: 42.0,
            contact_preference: Some("Email".into()),
            ..Idea::default()
        };
        let draft = IdeaDraft::from(&idea);
        assert_eq!(draft.desired_price, Some(42.0));
        assert_eq!(draft.protection_status, "None");
        assert_eq!(draft.contact_preference, "Email");
    }
}
