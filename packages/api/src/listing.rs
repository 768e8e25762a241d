//! # Listing controller
//!
//! Drives the ideas listing: which events trigger a fetch, how long a fetch
//! waits, how transient failures are retried and which response is allowed to
//! land.
//!
//! ## States
//!
//! ```text
//! Idle ──begin()──▶ Loading ──finish(ok)──▶ Success
//!                     ▲    └──finish(err)─▶ Error
//!                     └──── begin() from any state
//! ```
//!
//! Every [`ListingController::schedule`] hands out a [`Ticket`]. Only the
//! newest ticket may [`finish`](ListingController::finish); an older response
//! that arrives late is dropped, so a slow request can never overwrite a newer
//! one. The same check after a debounce wait means a superseded request is
//! never sent at all. A scheduled load only enters `Loading` once it is really
//! sent, so the previous page stays on screen while the debounce runs.
//!
//! [`run_trigger`] is the whole sequence for one trigger: wait, check the
//! ticket, skip a request identical to the one already shown, fetch, land.
//!
//! ## Triggers
//!
//! | Trigger | Delay |
//! |---------|-------|
//! | [`Trigger::Mount`], [`Trigger::PageChanged`], [`Trigger::ScopeChanged`], [`Trigger::Retry`] | none |
//! | [`Trigger::FiltersChanged`] (filters or page size) | debounce window, 1 s by default |

use std::cell::RefCell;
use std::future::Future;
use std::time::Duration;

use crate::catalog::IdeaSource;
use crate::models::{Idea, IdeasResponse, Pagination};
use crate::query::{build_query, Filters, Scope};
use crate::ApiError;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const PAGE_SIZES: [u32; 3] = [10, 20, 50];

/// What caused a (re)load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Mount,
    FiltersChanged,
    PageChanged,
    ScopeChanged,
    Retry,
}

impl Trigger {
    /// How long to wait before fetching; `None` fetches immediately.
    pub fn debounce(self, window: Duration) -> Option<Duration> {
        match self {
            Trigger::FiltersChanged => Some(window),
            _ => None,
        }
    }

    /// Whether this trigger sends the listing back to page 1.
    pub fn resets_page(self) -> bool {
        matches!(self, Trigger::FiltersChanged | Trigger::ScopeChanged)
    }
}

/// Retry schedule for transient failures: delay grows linearly with the attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Everything that determines one listing fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingRequest {
    pub filters: Filters,
    pub page: u32,
    pub page_size: u32,
    pub scope: Scope,
}

impl Default for ListingRequest {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            page: 1,
            page_size: 20,
            scope: Scope::All,
        }
    }
}

impl ListingRequest {
    pub fn query(&self) -> String {
        build_query(&self.filters, self.page, self.page_size, &self.scope)
    }
}

/// One rendered page of ideas.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdeasPage {
    pub ideas: Vec<Idea>,
    pub pagination: Pagination,
}

impl From<IdeasResponse> for IdeasPage {
    fn from(response: IdeasResponse) -> Self {
        Self {
            ideas: response.ideas,
            pagination: response.pagination,
        }
    }
}

/// Narrow a creator-scope batch to one creator and slice out `page`.
pub fn apply_creator_scope(
    response: IdeasResponse,
    creator: &str,
    page: u32,
    page_size: u32,
) -> IdeasPage {
    let page = page.max(1);
    let size = page_size.max(1) as usize;
    let owned: Vec<Idea> = response
        .ideas
        .into_iter()
        .filter(|idea| idea.creator == creator)
        .collect();
    let count = owned.len() as u32;
    let ideas = owned
        .into_iter()
        .skip((page as usize - 1) * size)
        .take(size)
        .collect();
    IdeasPage {
        ideas,
        pagination: Pagination::for_count(page, page_size, count),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ListingState {
    #[default]
    Idle,
    Loading,
    Success(IdeasPage),
    Error(ApiError),
}

/// Generation handed out by [`ListingController::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListingController {
    state: ListingState,
    generation: u64,
    last_page: IdeasPage,
    in_flight: Option<ListingRequest>,
    shown: Option<ListingRequest>,
}

impl ListingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    /// Reserve the next generation, superseding every earlier ticket.
    /// The visible state is left alone until [`start`](Self::start).
    pub fn schedule(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    /// Schedule and start in one step, for loads sent without a request record.
    pub fn begin(&mut self) -> Ticket {
        let ticket = self.schedule();
        self.state = ListingState::Loading;
        ticket
    }

    /// Move to `Loading` for `request`. Returns `false` for a stale ticket.
    pub fn start(&mut self, ticket: Ticket, request: &ListingRequest) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = ListingState::Loading;
        self.in_flight = Some(request.clone());
        true
    }

    /// Whether `request` is exactly what the current successful page shows.
    pub fn is_showing(&self, request: &ListingRequest) -> bool {
        matches!(self.state, ListingState::Success(_)) && self.shown.as_ref() == Some(request)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Land a result. Returns `false` (and changes nothing) for a stale ticket.
    pub fn finish(&mut self, ticket: Ticket, result: Result<IdeasPage, ApiError>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "dropping stale listing response"
            );
            return false;
        }
        let request = self.in_flight.take();
        self.state = match result {
            Ok(page) => {
                self.last_page = page.clone();
                self.shown = request;
                ListingState::Success(page)
            }
            Err(e) => {
                self.shown = None;
                ListingState::Error(e)
            }
        };
        true
    }

    /// `Idle` counts as loading: nothing has been fetched yet.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ListingState::Idle | ListingState::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.state {
            ListingState::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Ideas of the last successful load.
    pub fn ideas(&self) -> &[Idea] {
        &self.last_page.ideas
    }

    /// Pagination of the last successful load.
    pub fn pagination(&self) -> Pagination {
        self.last_page.pagination
    }
}

/// Fetch one page, retrying transient failures per `policy`.
///
/// `sleep` is the timer used between attempts.
pub async fn load_ideas<S, F, Fut>(
    source: &S,
    request: &ListingRequest,
    token: Option<&str>,
    policy: &RetryPolicy,
    sleep: F,
) -> Result<IdeasPage, ApiError>
where
    S: IdeaSource,
    F: Fn(Duration) -> Fut,
    Fut: Future<Output = ()>,
{
    let query = request.query();
    tracing::debug!(%query, "loading ideas");

    let mut attempt = 0;
    loop {
        match source.list_ideas(&query, token).await {
            Ok(response) => {
                return Ok(match request.scope.creator() {
                    Some(creator) => {
                        apply_creator_scope(response, creator, request.page, request.page_size)
                    }
                    None => response.into(),
                });
            }
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay(attempt);
                tracing::warn!(
                    "retrying ideas fetch (attempt {}/{}) in {:?}: {}",
                    attempt,
                    policy.max_retries,
                    delay,
                    e
                );
                sleep(delay).await;
            }
            Err(e) => {
                tracing::error!("ideas fetch failed: {}", e);
                return Err(e);
            }
        }
    }
}

/// Where [`run_trigger`] keeps its [`ListingController`].
pub trait ListingHost {
    /// Read without notifying anyone.
    fn peek<R>(&self, f: impl FnOnce(&ListingController) -> R) -> R;
    fn update<R>(&self, f: impl FnOnce(&mut ListingController) -> R) -> R;
}

impl ListingHost for RefCell<ListingController> {
    fn peek<R>(&self, f: impl FnOnce(&ListingController) -> R) -> R {
        f(&self.borrow())
    }

    fn update<R>(&self, f: impl FnOnce(&mut ListingController) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

/// How one [`run_trigger`] call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A newer trigger arrived during the debounce; nothing was sent.
    Superseded,
    /// The request matches the page already shown; nothing was sent.
    Unchanged,
    /// The result landed in the controller.
    Landed,
    /// The request was sent but a newer one finished first.
    Dropped,
}

/// Run one trigger end to end.
///
/// The ticket is taken before any wait, so a later trigger supersedes this
/// one. `token` is only called for the `Mine` scope. [`Trigger::Retry`]
/// always refetches; other triggers skip a request identical to the shown one.
#[allow(clippy::too_many_arguments)]
pub async fn run_trigger<H, S, T, TFut, F, Fut>(
    host: &H,
    source: &S,
    trigger: Trigger,
    request: ListingRequest,
    debounce_window: Duration,
    token: T,
    policy: &RetryPolicy,
    sleep: F,
) -> TriggerOutcome
where
    H: ListingHost,
    S: IdeaSource,
    T: FnOnce() -> TFut,
    TFut: Future<Output = Result<Option<String>, ApiError>>,
    F: Fn(Duration) -> Fut,
    Fut: Future<Output = ()>,
{
    let ticket = host.update(ListingController::schedule);
    tracing::debug!(?trigger, page = request.page, "listing load requested");

    if let Some(wait) = trigger.debounce(debounce_window) {
        sleep(wait).await;
        if !host.peek(|c| c.is_current(ticket)) {
            return TriggerOutcome::Superseded;
        }
    }
    if trigger != Trigger::Retry && host.peek(|c| c.is_showing(&request)) {
        tracing::debug!("listing request unchanged, not refetching");
        return TriggerOutcome::Unchanged;
    }
    if !host.update(|c| c.start(ticket, &request)) {
        return TriggerOutcome::Superseded;
    }

    let result = if request.scope.is_mine() {
        match token().await {
            Ok(token) => load_ideas(source, &request, token.as_deref(), policy, &sleep).await,
            Err(e) => Err(e),
        }
    } else {
        load_ideas(source, &request, None, policy, &sleep).await
    };

    if host.update(|c| c.finish(ticket, result)) {
        TriggerOutcome::Landed
    } else {
        TriggerOutcome::Dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::sleep;
    use std::cell::{Cell, RefCell};

    /// Fails with `error` for the first `failures` calls, then answers `response`.
    struct FlakySource {
        failures: u32,
        error: ApiError,
        response: IdeasResponse,
        calls: Cell<u32>,
        queries: RefCell<Vec<String>>,
    }

    impl FlakySource {
        fn new(failures: u32, error: ApiError, response: IdeasResponse) -> Self {
            Self {
                failures,
                error,
                response,
                calls: Cell::new(0),
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl IdeaSource for FlakySource {
        async fn list_ideas(
            &self,
            query: &str,
            _token: Option<&str>,
        ) -> Result<IdeasResponse, ApiError> {
            self.calls.set(self.calls.get() + 1);
            self.queries.borrow_mut().push(query.to_string());
            if self.calls.get() <= self.failures {
                Err(self.error.clone())
            } else {
                Ok(self.response.clone())
            }
        }
    }

    fn idea(id: &str, creator: &str) -> Idea {
        Idea {
            id: id.to_string(),
            title: format!("Idea {}", id),
            creator: creator.to_string(),
            ..Idea::default()
        }
    }

    fn response(ideas: Vec<Idea>) -> IdeasResponse {
        let count = ideas.len() as u32;
        IdeasResponse {
            ideas,
            pagination: Pagination::for_count(1, 20, count),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_network_failures_then_success() {
        let source = FlakySource::new(
            3,
            ApiError::Network("connection reset".into()),
            response(vec![idea("1", "a")]),
        );
        let mut controller = ListingController::new();
        let started = tokio::time::Instant::now();

        let ticket = controller.begin();
        assert!(controller.is_loading());
        let result = load_ideas(
            &source,
            &ListingRequest::default(),
            None,
            &RetryPolicy::default(),
            sleep,
        )
        .await;
        assert!(controller.finish(ticket, result));

        assert_eq!(source.calls.get(), 4);
        // 1s + 2s + 3s of backoff.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
        assert!(!controller.is_loading());
        assert!(matches!(controller.state(), ListingState::Success(p) if p.ideas.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_surface_error() {
        let source = FlakySource::new(10, ApiError::Timeout, response(vec![]));
        let result = load_ideas(
            &source,
            &ListingRequest::default(),
            None,
            &RetryPolicy::default(),
            sleep,
        )
        .await;
        assert_eq!(result, Err(ApiError::Timeout));
        assert_eq!(source.calls.get(), 4);
    }

    #[tokio::test]
    async fn test_http_errors_are_not_retried() {
        let source = FlakySource::new(
            1,
            ApiError::Http {
                status: 500,
                message: String::new(),
            },
            response(vec![]),
        );
        let result = load_ideas(
            &source,
            &ListingRequest::default(),
            None,
            &RetryPolicy::default(),
            sleep,
        )
        .await;
        assert!(matches!(result, Err(ApiError::Http { status: 500, .. })));
        assert_eq!(source.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_creator_scope_filters_and_slices() {
        let mut ideas = Vec::new();
        for i in 0..25 {
            ideas.push(idea(&format!("c{}", i), "creator"));
            ideas.push(idea(&format!("o{}", i), "other"));
        }
        let source = FlakySource::new(0, ApiError::Timeout, response(ideas));
        let request = ListingRequest {
            page: 2,
            page_size: 10,
            scope: Scope::Creator("creator".into()),
            ..ListingRequest::default()
        };

        let page = load_ideas(&source, &request, None, &RetryPolicy::default(), sleep)
            .await
            .unwrap();

        assert_eq!(source.queries.borrow()[0], "page=1&limit=1000");
        assert_eq!(page.ideas.len(), 10);
        assert_eq!(page.ideas[0].id, "c10");
        assert!(page.ideas.iter().all(|i| i.creator == "creator"));
        assert_eq!(page.pagination.total_count, 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.current_page, 2);
    }

    #[test]
    fn test_creator_scope_last_page_is_partial() {
        let ideas = (0..7).map(|i| idea(&i.to_string(), "c")).collect();
        let page = apply_creator_scope(response(ideas), "c", 2, 5);
        assert_eq!(page.ideas.len(), 2);
        assert!(page.pagination.next_disabled());
        assert!(!page.pagination.prev_disabled());
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let mut controller = ListingController::new();
        let older = controller.begin();
        let newer = controller.begin();

        let fresh = IdeasPage {
            ideas: vec![idea("new", "a")],
            pagination: Pagination::default(),
        };
        assert!(controller.finish(newer, Ok(fresh.clone())));
        assert!(!controller.finish(
            older,
            Ok(IdeasPage {
                ideas: vec![idea("old", "a")],
                pagination: Pagination::default(),
            })
        ));

        assert_eq!(controller.state(), &ListingState::Success(fresh));
        assert_eq!(controller.ideas()[0].id, "new");
    }

    #[test]
    fn test_error_keeps_last_pagination() {
        let mut controller = ListingController::new();
        let t = controller.begin();
        let page = IdeasPage {
            ideas: vec![idea("1", "a")],
            pagination: Pagination::for_count(2, 10, 30),
        };
        controller.finish(t, Ok(page));

        let t = controller.begin();
        controller.finish(t, Err(ApiError::NotFound));

        assert_eq!(controller.error(), Some(&ApiError::NotFound));
        assert_eq!(controller.pagination().current_page, 2);
    }

    fn no_token() -> std::future::Ready<Result<Option<String>, ApiError>> {
        std::future::ready(Ok(None))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_filter_edits_send_one_request() {
        let source = FlakySource::new(0, ApiError::Timeout, response(vec![idea("1", "a")]));
        let host = RefCell::new(ListingController::new());
        let policy = RetryPolicy::default();
        let typed = |search: &str| ListingRequest {
            filters: Filters {
                search: search.to_string(),
                ..Filters::default()
            },
            ..ListingRequest::default()
        };

        let first = run_trigger(
            &host,
            &source,
            Trigger::FiltersChanged,
            typed("ro"),
            DEFAULT_DEBOUNCE,
            no_token,
            &policy,
            sleep,
        );
        let second = async {
            sleep(Duration::from_millis(300)).await;
            run_trigger(
                &host,
                &source,
                Trigger::FiltersChanged,
                typed("robot"),
                DEFAULT_DEBOUNCE,
                no_token,
                &policy,
                sleep,
            )
            .await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, TriggerOutcome::Superseded);
        assert_eq!(second, TriggerOutcome::Landed);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(source.queries.borrow()[0], "search=robot&page=1&limit=20");
        assert!(matches!(host.borrow().state(), ListingState::Success(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_change_sends_without_waiting() {
        let source = FlakySource::new(0, ApiError::Timeout, response(vec![]));
        let host = RefCell::new(ListingController::new());
        let policy = RetryPolicy::default();
        let started = tokio::time::Instant::now();

        let outcome = run_trigger(
            &host,
            &source,
            Trigger::PageChanged,
            ListingRequest {
                page: 2,
                ..ListingRequest::default()
            },
            DEFAULT_DEBOUNCE,
            no_token,
            &policy,
            sleep,
        )
        .await;

        assert_eq!(outcome, TriggerOutcome::Landed);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_previous_page_stays_visible_during_debounce() {
        let source = FlakySource::new(0, ApiError::Timeout, response(vec![idea("1", "a")]));
        let host = RefCell::new(ListingController::new());
        let policy = RetryPolicy::default();
        run_trigger(
            &host,
            &source,
            Trigger::Mount,
            ListingRequest::default(),
            DEFAULT_DEBOUNCE,
            no_token,
            &policy,
            sleep,
        )
        .await;

        let edit = ListingRequest {
            page_size: 50,
            ..ListingRequest::default()
        };
        let pending = run_trigger(
            &host,
            &source,
            Trigger::FiltersChanged,
            edit,
            DEFAULT_DEBOUNCE,
            no_token,
            &policy,
            sleep,
        );
        let observe = async {
            sleep(Duration::from_millis(500)).await;
            host.borrow().is_loading()
        };
        let (outcome, loading_mid_debounce) = tokio::join!(pending, observe);

        assert!(!loading_mid_debounce);
        assert_eq!(outcome, TriggerOutcome::Landed);
        assert_eq!(source.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_identical_request_is_not_refetched_unless_retried() {
        let source = FlakySource::new(0, ApiError::Timeout, response(vec![]));
        let host = RefCell::new(ListingController::new());
        let policy = RetryPolicy::default();
        let request = ListingRequest::default();
        let (host, source, policy) = (&host, &source, &policy);
        let run = move |trigger| {
            run_trigger(
                host,
                source,
                trigger,
                request.clone(),
                Duration::ZERO,
                no_token,
                policy,
                sleep,
            )
        };

        assert_eq!(run(Trigger::Mount).await, TriggerOutcome::Landed);
        assert_eq!(run(Trigger::FiltersChanged).await, TriggerOutcome::Unchanged);
        assert_eq!(run(Trigger::Retry).await, TriggerOutcome::Landed);
        assert_eq!(source.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_token_failure_for_own_ideas_lands_as_error() {
        let source = FlakySource::new(0, ApiError::Timeout, response(vec![]));
        let host = RefCell::new(ListingController::new());
        let policy = RetryPolicy::default();
        let outcome = run_trigger(
            &host,
            &source,
            Trigger::ScopeChanged,
            ListingRequest {
                scope: Scope::Mine,
                ..ListingRequest::default()
            },
            DEFAULT_DEBOUNCE,
            || std::future::ready(Err(ApiError::Unauthorized("expired".into()))),
            &policy,
            sleep,
        )
        .await;

        assert_eq!(outcome, TriggerOutcome::Landed);
        assert_eq!(source.calls.get(), 0);
        assert!(matches!(host.borrow().error(), Some(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_idle_counts_as_loading() {
        let mut controller = ListingController::new();
        assert!(controller.is_loading());
        let ticket = controller.schedule();
        assert!(controller.is_loading());
        controller.start(ticket, &ListingRequest::default());
        controller.finish(ticket, Ok(IdeasPage::default()));
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_trigger_delays() {
        assert_eq!(
            Trigger::FiltersChanged.debounce(DEFAULT_DEBOUNCE),
            Some(Duration::from_secs(1))
        );
        for t in [
            Trigger::Mount,
            Trigger::PageChanged,
            Trigger::ScopeChanged,
            Trigger::Retry,
        ] {
            assert_eq!(t.debounce(DEFAULT_DEBOUNCE), None);
        }
        assert!(Trigger::ScopeChanged.resets_page());
        assert!(!Trigger::PageChanged.resets_page());
    }
}
