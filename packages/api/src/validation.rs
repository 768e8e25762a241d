//! Form validation for idea drafts, signup and profile edits.
//!
//! Validation runs before anything touches the network. Each validator returns
//! the per-field messages to render inline; an empty result means the input is
//! acceptable.

use std::collections::BTreeMap;

use crate::models::IdeaDraft;

pub const PROTECTIONS: [&str; 5] = ["None", "Patent", "Trademark", "Copyright", "Trade Secret"];
pub const CONTACT_PREFERENCES: [&str; 3] = ["Email", "Phone", "Messaging"];

pub const MIN_TITLE_LEN: usize = 3;
pub const MIN_DESCRIPTION_LEN: usize = 10;
pub const MIN_PRICE: f64 = 1.0;
pub const MAX_PRICE: f64 = 10_000_000.0;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field name → message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn add(&mut self, field: &'static str, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    /// First message, for forms that show a single banner.
    pub fn first(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }
}

/// Idea create/edit form.
pub fn validate_idea(draft: &IdeaDraft) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if draft.title.trim().chars().count() < MIN_TITLE_LEN {
        errors.add("title", "Title must be at least 3 characters");
    }
    if draft.category.trim().is_empty() {
        errors.add("category", "Please select a category");
    }
    if draft.idea_type.is_none() {
        errors.add("type", "Please select a type");
    }
    if draft.problem_description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        errors.add(
            "problemDescription",
            "Problem description must be at least 10 characters",
        );
    }
    if draft.solution_description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        errors.add(
            "solutionDescription",
            "Solution description must be at least 10 characters",
        );
    }
    if draft.protection_status.trim().is_empty() {
        errors.add("protectionStatus", "Please select protection status");
    }
    match draft.desired_price {
        None => errors.add("desiredPrice", "Price is required"),
        Some(p) if !p.is_finite() => errors.add("desiredPrice", "Price must be a valid number"),
        Some(p) if p < MIN_PRICE => errors.add("desiredPrice", "Price must be greater than zero"),
        Some(p) if p > MAX_PRICE => errors.add("desiredPrice", "Price cannot exceed $10,000,000"),
        Some(_) => {}
    }
    if draft.contact_preference.trim().is_empty() {
        errors.add("contactPreference", "Please select contact preference");
    }

    errors
}

/// Parse the price input; blank → `None`, garbage → `Some(NaN)` so validation reports it.
pub fn parse_price(input: &str) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() {
        None
    } else {
        Some(input.parse().unwrap_or(f64::NAN))
    }
}

/// Signup form.
pub fn validate_signup(
    display_name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if display_name.trim().is_empty() {
        errors.add("displayName", "Display name is required");
    }
    if !looks_like_email(email) {
        errors.add("email", "Please enter a valid email address");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 6 characters");
    }
    if password != confirm_password {
        errors.add("confirmPassword", "Passwords do not match");
    }

    errors
}

/// Login form: both fields present.
pub fn validate_login(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if !looks_like_email(email) {
        errors.add("email", "Please enter a valid email address");
    }
    if password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors
}

/// Profile edit form.
pub fn validate_profile(display_name: &str, website: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if display_name.trim().is_empty() {
        errors.add("displayName", "Display name is required");
    }
    let website = website.trim();
    if !website.is_empty() && url::Url::parse(website).is_err() {
        errors.add("website", "Please enter a valid URL (including https://)");
    }
    errors
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IdeaType;

    fn valid_draft() -> IdeaDraft {
        IdeaDraft {
            title: "Solar kettle".into(),
            category: "Energy".into(),
            idea_type: Some(IdeaType::Product),
            problem_description: "Boiling water wastes power".into(),
            solution_description: "Concentrate sunlight on the kettle".into(),
            protection_status: "None".into(),
            desired_price: Some(2500.0),
            contact_preference: "Email".into(),
            ..IdeaDraft::default()
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(validate_idea(&valid_draft()).is_empty());
    }

    #[test]
    fn test_each_rule_reports_its_field() {
        let draft = IdeaDraft {
            title: "ab".into(),
            problem_description: "short".into(),
            desired_price: Some(0.5),
            ..IdeaDraft::default()
        };
        let errors = validate_idea(&draft);
        assert_eq!(errors.get("title"), Some("Title must be at least 3 characters"));
        assert_eq!(errors.get("category"), Some("Please select a category"));
        assert_eq!(errors.get("type"), Some("Please select a type"));
        assert!(errors.get("problemDescription").is_some());
        assert!(errors.get("solutionDescription").is_some());
        assert_eq!(errors.get("desiredPrice"), Some("Price must be greater than zero"));
        assert_eq!(errors.get("contactPreference"), Some("Please select contact preference"));
        assert_eq!(errors.get("protectionStatus"), None);
    }

    #[test]
    fn test_price_bounds() {
        let mut draft = valid_draft();
        draft.desired_price = parse_price("10000001");
        assert_eq!(
            validate_idea(&draft).get("desiredPrice"),
            Some("Price cannot exceed $10,000,000")
        );
        draft.desired_price = parse_price("abc");
        assert_eq!(
            validate_idea(&draft).get("desiredPrice"),
            Some("Price must be a valid number")
        );
        draft.desired_price = parse_price(" ");
        assert_eq!(validate_idea(&draft).get("desiredPrice"), Some("Price is required"));
        draft.desired_price = parse_price("10000000");
        assert!(validate_idea(&draft).is_empty());
    }

    #[test]
    fn test_signup_rules() {
        assert!(validate_signup("Ada", "ada@example.com", "secret1", "secret1").is_empty());

        let errors = validate_signup("", "nope", "123", "1234");
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
    }

    #[test]
    fn test_profile_website_must_parse() {
        assert!(validate_profile("Ada", "").is_empty());
        assert!(validate_profile("Ada", "https://ada.dev").is_empty());
        assert!(validate_profile("Ada", "ada dot dev").get("website").is_some());
    }
}
