//! # In-memory backend
//!
//! Stand-ins for the catalog API, the identity provider and blob storage. The
//! app runs on them when no Firebase project is configured, and the tests use
//! them throughout.
//!
//! | Type | Replaces |
//! |------|----------|
//! | [`MockCatalog`] | REST catalog; understands the same query parameters |
//! | [`MockIdentity`] | Identity Toolkit; `mock-google:<email>` stands in for a Google ID token |
//! | [`MockBlobs`] | Firebase Storage; URLs are `mock://<path>` |
//!
//! Profiles are served by [`store::MemoryStore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use store::{MemoryStore, ProfileStore, PublicProfile};

use crate::auth::identity::{friendly_auth_message, AuthUser, IdentityProvider, SignInOutcome};
use crate::catalog::{CatalogApi, IdeaSource};
use crate::models::{
    Category, CreatorInfo, Idea, IdeaDraft, IdeaType, IdeasResponse, Language, Pagination,
};
use crate::storage::{BlobStorage, Upload};
use crate::validation::validate_idea;
use crate::ApiError;

const TOKEN_PREFIX: &str = "mock-token:";
/// Prefix of the fake Google ID tokens the mock identity accepts.
pub const GOOGLE_TOKEN_PREFIX: &str = "mock-google:";

/// User id encoded in a mock ID token.
pub fn uid_from_token(token: &str) -> Option<&str> {
    token
        .strip_prefix(TOKEN_PREFIX)?
        .split(':')
        .next()
        .filter(|uid| !uid.is_empty())
}

fn poisoned(what: &str) -> ApiError {
    ApiError::Network(format!("{} unavailable", what))
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Account {
    uid: String,
    email: String,
    password: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Debug, Default)]
struct IdentityState {
    accounts: HashMap<String, Account>,
    next_uid: u64,
    issued: u64,
}

impl IdentityState {
    fn issue(&mut self, account: &Account) -> AuthUser {
        self.issued += 1;
        AuthUser {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
            id_token: format!("{}{}:{}", TOKEN_PREFIX, account.uid, self.issued),
            refresh_token: format!("mock-refresh:{}", account.uid),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    fn create(&mut self, email: &str, password: Option<&str>, display_name: Option<&str>) -> Account {
        self.next_uid += 1;
        let account = Account {
            uid: format!("user-{}", self.next_uid),
            email: email.to_string(),
            password: password.map(str::to_string),
            display_name: display_name.map(str::to_string),
            photo_url: None,
        };
        self.accounts.insert(email.to_lowercase(), account.clone());
        account
    }

    fn by_uid(&mut self, uid: &str) -> Option<&mut Account> {
        self.accounts.values_mut().find(|a| a.uid == uid)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockIdentity {
    state: Arc<Mutex<IdentityState>>,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, IdentityState>, ApiError> {
        self.state.lock().map_err(|_| poisoned("mock identity"))
    }
}

impl IdentityProvider for MockIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let mut state = self.lock()?;
        if state.accounts.contains_key(&email.to_lowercase()) {
            return Err(ApiError::Auth(friendly_auth_message("EMAIL_EXISTS")));
        }
        if password.chars().count() < 6 {
            return Err(ApiError::Auth(friendly_auth_message("WEAK_PASSWORD")));
        }
        let account = state.create(email, Some(password), None);
        Ok(state.issue(&account))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let mut state = self.lock()?;
        let account = state
            .accounts
            .get(&email.to_lowercase())
            .filter(|a| a.password.as_deref() == Some(password))
            .cloned()
            .ok_or_else(|| ApiError::Auth(friendly_auth_message("INVALID_LOGIN_CREDENTIALS")))?;
        Ok(state.issue(&account))
    }

    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
        _request_uri: &str,
    ) -> Result<SignInOutcome, ApiError> {
        let email = google_id_token
            .strip_prefix(GOOGLE_TOKEN_PREFIX)
            .filter(|e| e.contains('@'))
            .ok_or_else(|| ApiError::Auth("Invalid Google credential".to_string()))?;

        let mut state = self.lock()?;
        let existing = state.accounts.get(&email.to_lowercase()).cloned();
        let (account, is_new_user) = match existing {
            Some(account) => (account, false),
            None => {
                let name = email.split('@').next().unwrap_or(email).to_string();
                (state.create(email, None, Some(&name)), true)
            }
        };
        Ok(SignInOutcome {
            user: state.issue(&account),
            is_new_user,
        })
    }

    async fn update_profile(
        &self,
        user: &AuthUser,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<AuthUser, ApiError> {
        if uid_from_token(&user.id_token) != Some(user.uid.as_str()) {
            return Err(ApiError::Auth(friendly_auth_message("INVALID_ID_TOKEN")));
        }
        let mut state = self.lock()?;
        let account = state
            .by_uid(&user.uid)
            .ok_or_else(|| ApiError::Auth(friendly_auth_message("USER_NOT_FOUND")))?;
        if let Some(name) = display_name {
            account.display_name = Some(name.to_string());
        }
        if let Some(url) = photo_url {
            account.photo_url = Some(url.to_string()).filter(|u| !u.is_empty());
        }
        Ok(AuthUser {
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
            ..user.clone()
        })
    }

    async fn refresh(&self, user: &AuthUser) -> Result<AuthUser, ApiError> {
        let mut state = self.lock()?;
        let account = state
            .by_uid(&user.uid)
            .cloned()
            .ok_or_else(|| ApiError::Auth(friendly_auth_message("USER_NOT_FOUND")))?;
        Ok(state.issue(&account))
    }
}

// ---------------------------------------------------------------------------
// Blobs
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct MockBlobs {
    files: Arc<Mutex<HashMap<String, Upload>>>,
    fail: Arc<AtomicBool>,
}

impl MockBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }
}

impl BlobStorage for MockBlobs {
    async fn upload(&self, path: &str, upload: &Upload, _id_token: &str) -> Result<String, ApiError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Network("upload failed".to_string()));
        }
        self.files
            .lock()
            .map_err(|_| poisoned("mock storage"))?
            .insert(path.to_string(), upload.clone());
        Ok(format!("mock://{}", path))
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct MockCatalog {
    ideas: Arc<Mutex<Vec<Idea>>>,
    profiles: MemoryStore,
    next_id: Arc<AtomicU64>,
    healthy: Arc<AtomicBool>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

fn parse_price(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

fn matches_query(idea: &Idea, params: &HashMap<String, String>, mine: Option<&str>) -> bool {
    if let Some(uid) = mine {
        if idea.creator != uid {
            return false;
        }
    }
    if let Some(category) = params.get("category") {
        if &idea.category != category {
            return false;
        }
    }
    if let Some(kind) = params.get("type") {
        if idea.idea_type.as_str() != kind {
            return false;
        }
    }
    if let Some(min) = params.get("priceMin").and_then(|v| parse_price(v)) {
        if idea.desired_price < min {
            return false;
        }
    }
    if let Some(max) = params.get("priceMax").and_then(|v| parse_price(v)) {
        if idea.desired_price > max {
            return false;
        }
    }
    match params.get("requireNDA").map(String::as_str) {
        Some("Yes") | Some("true") if !idea.require_nda => return false,
        Some("No") | Some("false") if idea.require_nda => return false,
        _ => {}
    }
    if let Some(search) = params.get("search") {
        let needle = search.to_lowercase();
        let haystack = format!(
            "{} {} {}",
            idea.title, idea.problem_description, idea.solution_description
        )
        .to_lowercase();
        if !haystack.contains(&needle) {
            return false;
        }
    }
    true
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn idea_from_draft(id: String, draft: &IdeaDraft, creator: &str, info: CreatorInfo) -> Idea {
    Idea {
        id,
        title: draft.title.trim().to_string(),
        category: draft.category.clone(),
        idea_type: draft.idea_type.unwrap_or_default(),
        problem_description: draft.problem_description.clone(),
        solution_description: draft.solution_description.clone(),
        desired_price: draft.desired_price.unwrap_or_default(),
        require_nda: draft.require_nda,
        created_at: timestamp(),
        creator: creator.to_string(),
        creator_info: info,
        protection_status: Some(draft.protection_status.clone()),
        contact_preference: Some(draft.contact_preference.clone()).filter(|c| !c.is_empty()),
        additional_notes: draft.additional_notes.clone(),
        photos: draft.photos.clone(),
    }
}

impl MockCatalog {
    /// Empty catalog whose creator details come from `profiles`.
    pub fn new(profiles: MemoryStore) -> Self {
        Self {
            ideas: Arc::default(),
            profiles,
            next_id: Arc::new(AtomicU64::new(1)),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Catalog preloaded with a handful of demo listings.
    pub fn seeded(profiles: MemoryStore) -> Self {
        let catalog = Self::new(profiles);
        let demo = [
            ("Solar kettle", "Energy", IdeaType::Product, 2_500.0, false, "demo-ada", "Ada"),
            ("Neighbourhood tool library", "Community", IdeaType::Service, 800.0, false, "demo-ada", "Ada"),
            ("Smart compost sensor", "Technology", IdeaType::Product, 12_000.0, true, "demo-linus", "Linus"),
            ("Remote pair-programming tutors", "Education", IdeaType::Service, 4_000.0, false, "demo-linus", "Linus"),
            ("Modular phone stand", "Design", IdeaType::Product, 150.0, false, "demo-grace", "Grace"),
            ("Clinic queue forecasting", "Health", IdeaType::Service, 30_000.0, true, "demo-grace", "Grace"),
        ];
        if let Ok(mut ideas) = catalog.ideas.lock() {
            for (i, (title, category, kind, price, nda, creator, name)) in demo.into_iter().enumerate() {
                let draft = IdeaDraft {
                    title: title.to_string(),
                    category: category.to_string(),
                    idea_type: Some(kind),
                    problem_description: format!("{} addresses a problem people hit every day.", title),
                    solution_description: format!("{} solves it with a simple, cheap approach.", title),
                    desired_price: Some(price),
                    require_nda: nda,
                    contact_preference: "Email".to_string(),
                    ..IdeaDraft::default()
                };
                let info = CreatorInfo {
                    display_name: name.to_string(),
                    email: format!("{}@ideady.dev", name.to_lowercase()),
                    photo_url: None,
                };
                ideas.push(idea_from_draft(format!("seed-{}", i + 1), &draft, creator, info));
            }
        }
        catalog
    }

    /// Toggle the health probe result.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Idea>>, ApiError> {
        self.ideas.lock().map_err(|_| poisoned("mock catalog"))
    }

    fn require_uid(token: &str) -> Result<String, ApiError> {
        uid_from_token(token)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Unauthorized("Please sign in to continue".to_string()))
    }

    fn check_owner(&self, id: &str, uid: &str) -> Result<(), ApiError> {
        let ideas = self.lock()?;
        let idea = ideas.iter().find(|i| i.id == id).ok_or(ApiError::NotFound)?;
        if idea.creator != uid {
            return Err(ApiError::Unauthorized(
                "You can only modify your own ideas".to_string(),
            ));
        }
        Ok(())
    }

    async fn creator_info(&self, uid: &str) -> CreatorInfo {
        match self.profiles.get_profile(uid).await {
            Ok(Some(profile)) => CreatorInfo {
                display_name: profile.display_name().to_string(),
                email: profile.email.clone(),
                photo_url: profile.photo_url.clone().filter(|u| !u.is_empty()),
            },
            _ => CreatorInfo::default(),
        }
    }
}

impl IdeaSource for MockCatalog {
    async fn list_ideas(&self, query: &str, token: Option<&str>) -> Result<IdeasResponse, ApiError> {
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let mine = match params.get("mine").map(String::as_str) {
            Some("true") => Some(
                token
                    .and_then(uid_from_token)
                    .ok_or_else(|| ApiError::Unauthorized("Please sign in to view your ideas".to_string()))?
                    .to_string(),
            ),
            _ => None,
        };
        let page = params
            .get("page")
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);
        let limit = params
            .get("limit")
            .and_then(|l| l.parse::<u32>().ok())
            .unwrap_or(20)
            .max(1);

        let mut matching: Vec<Idea> = self
            .lock()?
            .iter()
            .filter(|idea| matches_query(idea, &params, mine.as_deref()))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let pagination = Pagination::for_count(page, limit, matching.len() as u32);
        let ideas = matching
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .collect();
        Ok(IdeasResponse { ideas, pagination })
    }
}

impl CatalogApi for MockCatalog {
    async fn get_idea(&self, id: &str, _token: Option<&str>) -> Result<Idea, ApiError> {
        self.lock()?
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_idea(&self, draft: &IdeaDraft, token: &str) -> Result<(), ApiError> {
        let uid = Self::require_uid(token)?;
        let errors = validate_idea(draft);
        if let Some(message) = errors.first() {
            return Err(ApiError::Http {
                status: 400,
                message: message.to_string(),
            });
        }
        let info = self.creator_info(&uid).await;
        let id = format!("idea-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock()?.push(idea_from_draft(id, draft, &uid, info));
        Ok(())
    }

    async fn update_idea(&self, id: &str, draft: &IdeaDraft, token: &str) -> Result<(), ApiError> {
        let uid = Self::require_uid(token)?;
        self.check_owner(id, &uid)?;
        let mut ideas = self.lock()?;
        if let Some(idea) = ideas.iter_mut().find(|i| i.id == id) {
            let updated = idea_from_draft(id.to_string(), draft, &uid, idea.creator_info.clone());
            *idea = Idea {
                created_at: idea.created_at.clone(),
                ..updated
            };
        }
        Ok(())
    }

    async fn delete_idea(&self, id: &str, token: &str) -> Result<(), ApiError> {
        let uid = Self::require_uid(token)?;
        self.check_owner(id, &uid)?;
        self.lock()?.retain(|i| i.id != id);
        Ok(())
    }

    async fn public_profile(&self, uid: &str) -> Result<PublicProfile, ApiError> {
        if let Some(profile) = self.profiles.get_profile(uid).await? {
            return Ok(profile.to_public());
        }
        let ideas = self.lock()?;
        let info = ideas
            .iter()
            .find(|i| i.creator == uid)
            .map(|i| i.creator_info.clone())
            .ok_or(ApiError::NotFound)?;
        Ok(PublicProfile {
            display_name: info.display_name,
            photo_url: info.photo_url,
            ..PublicProfile::default()
        })
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let names = [
            "Technology",
            "Health",
            "Education",
            "Energy",
            "Community",
            "Design",
            "Finance",
        ];
        Ok(names
            .iter()
            .enumerate()
            .map(|(i, name)| Category {
                id: (i + 1).to_string(),
                name: name.to_string(),
                description: None,
                is_active: true,
                sort_order: Some(i as i32),
                icon: None,
                color: None,
            })
            .collect())
    }

    async fn languages(&self) -> Result<Vec<Language>, ApiError> {
        let languages = [
            ("en", "English", "English"),
            ("es", "Spanish", "Español"),
            ("fr", "French", "Français"),
            ("de", "German", "Deutsch"),
            ("pt", "Portuguese", "Português"),
        ];
        Ok(languages
            .iter()
            .enumerate()
            .map(|(i, (code, name, native))| Language {
                id: (i + 1).to_string(),
                name: name.to_string(),
                native_name: Some(native.to_string()),
                code: code.to_string(),
                is_active: true,
                sort_order: Some(i as i32),
                flag: None,
            })
            .collect())
    }

    async fn health(&self) -> Result<(), ApiError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ApiError::Network("mock API marked unhealthy".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_query, Filters, Scope};

    fn draft(title: &str, price: f64) -> IdeaDraft {
        IdeaDraft {
            title: title.into(),
            category: "Technology".into(),
            idea_type: Some(IdeaType::Product),
            problem_description: "A problem worth solving".into(),
            solution_description: "A solution worth paying for".into(),
            desired_price: Some(price),
            contact_preference: "Email".into(),
            ..IdeaDraft::default()
        }
    }

    #[tokio::test]
    async fn test_filters_apply_server_side() {
        let catalog = MockCatalog::seeded(MemoryStore::new());
        let filters = Filters {
            idea_type: "Service".into(),
            price_min: "1000".into(),
            ..Filters::default()
        };
        let response = catalog
            .list_ideas(&build_query(&filters, 1, 20, &Scope::All), None)
            .await
            .unwrap();

        assert_eq!(response.ideas.len(), 2);
        assert!(response
            .ideas
            .iter()
            .all(|i| i.idea_type == IdeaType::Service && i.desired_price >= 1000.0));
        assert_eq!(response.pagination.total_count, 2);
    }

    #[tokio::test]
    async fn test_mine_requires_token() {
        let catalog = MockCatalog::seeded(MemoryStore::new());
        let query = build_query(&Filters::default(), 1, 20, &Scope::Mine);
        assert!(matches!(
            catalog.list_ideas(&query, None).await,
            Err(ApiError::Unauthorized(_))
        ));

        let token = format!("{}demo-ada:1", TOKEN_PREFIX);
        let response = catalog.list_ideas(&query, Some(&token)).await.unwrap();
        assert_eq!(response.ideas.len(), 2);
    }

    #[tokio::test]
    async fn test_owner_only_mutations() {
        let catalog = MockCatalog::new(MemoryStore::new());
        let owner = format!("{}u1:1", TOKEN_PREFIX);
        let other = format!("{}u2:1", TOKEN_PREFIX);
        catalog.create_idea(&draft("Robot", 100.0), &owner).await.unwrap();
        let id = catalog.list_ideas("page=1&limit=20", None).await.unwrap().ideas[0].id.clone();

        assert!(matches!(
            catalog.delete_idea(&id, &other).await,
            Err(ApiError::Unauthorized(_))
        ));
        catalog.update_idea(&id, &draft("Robot v2", 200.0), &owner).await.unwrap();
        assert_eq!(catalog.get_idea(&id, None).await.unwrap().title, "Robot v2");

        catalog.delete_idea(&id, &owner).await.unwrap();
        assert_eq!(catalog.get_idea(&id, None).await, Err(ApiError::NotFound));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_rejected() {
        let catalog = MockCatalog::new(MemoryStore::new());
        let token = format!("{}u1:1", TOKEN_PREFIX);
        let err = catalog.create_idea(&draft("R", 100.0), &token).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Title must be at least 3 characters"
        );
    }

    #[tokio::test]
    async fn test_public_profile_falls_back_to_creator_info() {
        let catalog = MockCatalog::seeded(MemoryStore::new());
        assert_eq!(
            catalog.public_profile("demo-linus").await.unwrap().display_name,
            "Linus"
        );
        assert_eq!(catalog.public_profile("nobody").await, Err(ApiError::NotFound));
    }

    #[test]
    fn test_uid_from_token() {
        assert_eq!(uid_from_token("mock-token:user-3:9"), Some("user-3"));
        assert_eq!(uid_from_token("mock-token::9"), None);
        assert_eq!(uid_from_token("Bearer x"), None);
    }
}
