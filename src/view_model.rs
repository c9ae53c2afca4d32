//! The issues view-model.
//!
//! `IssuesViewModel` owns the editable query and the list of issues shown for it. A fetch
//! clears the list and hides the count before the request goes out, then repopulates both
//! when the response arrives. Every fetch is stamped with a generation number and only the
//! newest generation may write its result, so overlapping fetches never race.

use crate::error::IssuesError;
use crate::fetcher::IssueSource;
use crate::issue::{parse_issues, Issue};
use crate::observer::{Listener, Subscribers};
use crate::query::{local_today, parse_lookback_days, QueryParameters, QueryUpdate};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum FetchStatus {
    /// No fetch has been attempted yet.
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// What kind of change a listener is being told about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewChange {
    /// One of the query parameters was edited.
    Query,
    /// A fetch started; the list was cleared and the count hidden.
    Reset,
    /// A fetch completed and its issues are now shown.
    Loaded,
    /// A fetch or its validation failed. The count is hidden; the list is left as it was.
    Failed,
}

/// Everything the rendering layer binds to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssuesView {
    pub query: QueryParameters,
    /// Issues in API response order.
    pub issues: Vec<Issue>,
    /// Whether the issue count should be displayed.
    pub count_visible: bool,
    pub status: FetchStatus,
    /// Generation of the most recent fetch attempt, 0 before the first one.
    ///
    /// Notifications from different tasks may reach listeners out of order; a listener
    /// should ignore a view whose generation is lower than one it has already seen.
    pub generation: u64,
}

impl IssuesView {
    pub fn new(query: QueryParameters) -> Self {
        Self {
            query,
            issues: Vec::new(),
            count_visible: false,
            status: FetchStatus::Idle,
            generation: 0,
        }
    }
}

/// Result of a fetch that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was shown; carries the number of issues.
    Applied(usize),
    /// A newer fetch started before this one finished, so its result was dropped.
    Superseded,
}

pub struct IssuesViewModel {
    state: Mutex<IssuesView>,
    subscribers: Subscribers,
    source: Arc<dyn IssueSource>,
    api_base_url: String,
    today: fn() -> NaiveDate,
}

impl IssuesViewModel {
    pub fn new(
        source: Arc<dyn IssueSource>,
        api_base_url: impl Into<String>,
        query: QueryParameters,
    ) -> Self {
        Self {
            state: Mutex::new(IssuesView::new(query)),
            subscribers: Subscribers::default(),
            source,
            api_base_url: api_base_url.into(),
            today: local_today,
        }
    }

    /// Replaces the clock used to compute the `since` date.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn subscribe(&self, listener: Arc<dyn Listener>) {
        self.subscribers.subscribe(listener);
    }

    pub fn snapshot(&self) -> IssuesView {
        self.state().clone()
    }

    pub fn query(&self) -> QueryParameters {
        self.state().query.clone()
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.state().issues.clone()
    }

    pub fn set_repository(&self, repository: impl Into<String>) {
        let repository = repository.into();
        self.edit_query(|query| query.repository = repository);
    }

    pub fn set_owner(&self, owner: impl Into<String>) {
        let owner = owner.into();
        self.edit_query(|query| query.owner = owner);
    }

    pub fn set_lookback_days(&self, days: i64) {
        self.edit_query(|query| query.lookback_days = days);
    }

    /// Sets the lookback window from text input, leaving it unchanged if not an integer.
    pub fn set_lookback_days_input(&self, input: &str) -> Result<(), IssuesError> {
        let days = parse_lookback_days(input)?;
        self.set_lookback_days(days);
        Ok(())
    }

    /// Applies the fields present in `update` and returns the resulting parameters.
    pub fn update_query(&self, update: QueryUpdate) -> QueryParameters {
        self.edit_query(|query| {
            if let Some(repository) = update.repository {
                query.repository = repository;
            }
            if let Some(owner) = update.owner {
                query.owner = owner;
            }
            if let Some(days) = update.lookback_days {
                query.lookback_days = days;
            }
        })
    }

    /// Fetches issues for the current query and waits for the result.
    pub async fn fetch_issues(&self) -> Result<FetchOutcome, IssuesError> {
        let (generation, url) = self.begin_fetch()?;
        self.complete_fetch(generation, url).await
    }

    /// Starts a fetch in the background and returns its generation.
    ///
    /// Parameter validation and the list reset happen before this returns.
    pub fn trigger_fetch(self: &Arc<Self>) -> Result<u64, IssuesError> {
        let (generation, url) = self.begin_fetch()?;
        let view_model = Arc::clone(self);
        tokio::spawn(async move {
            // Failures are already recorded in the view state.
            let _ = view_model.complete_fetch(generation, url).await;
        });
        Ok(generation)
    }

    fn begin_fetch(&self) -> Result<(u64, String), IssuesError> {
        let today = (self.today)();
        let mut state = self.state();

        let url = match state.query.issues_url(&self.api_base_url, today) {
            Ok(url) => url,
            Err(e) => {
                // A rejected attempt still supersedes any fetch in flight.
                state.generation += 1;
                state.count_visible = false;
                state.status = FetchStatus::Failed(e.to_string());
                let view = state.clone();
                drop(state);
                self.subscribers.notify(ViewChange::Failed, &view);
                return Err(e);
            }
        };

        state.generation += 1;
        state.issues.clear();
        state.count_visible = false;
        state.status = FetchStatus::Loading;
        let generation = state.generation;
        let view = state.clone();
        drop(state);

        tracing::info!(generation, "Fetching issues from {}", url);
        self.subscribers.notify(ViewChange::Reset, &view);

        Ok((generation, url))
    }

    async fn complete_fetch(
        &self,
        generation: u64,
        url: String,
    ) -> Result<FetchOutcome, IssuesError> {
        let result = self
            .source
            .fetch_json(url)
            .await
            .and_then(|payload| parse_issues(&payload));

        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "Discarding result of superseded fetch"
            );
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(issues) => {
                let count = issues.len();
                state.issues = issues;
                state.count_visible = true;
                state.status = FetchStatus::Loaded;
                let view = state.clone();
                drop(state);
                self.subscribers.notify(ViewChange::Loaded, &view);
                Ok(FetchOutcome::Applied(count))
            }
            Err(e) => {
                state.status = FetchStatus::Failed(e.to_string());
                let view = state.clone();
                drop(state);
                self.subscribers.notify(ViewChange::Failed, &view);
                Err(e)
            }
        }
    }

    fn edit_query<F>(&self, edit: F) -> QueryParameters
    where
        F: FnOnce(&mut QueryParameters),
    {
        let mut state = self.state();
        edit(&mut state.query);
        let view = state.clone();
        drop(state);
        self.subscribers.notify(ViewChange::Query, &view);
        view.query
    }

    fn state(&self) -> MutexGuard<'_, IssuesView> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
