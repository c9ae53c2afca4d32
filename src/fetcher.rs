use crate::error::IssuesError;
use futures::future::BoxFuture;
use serde_json::Value;

/// Retrieves raw issue payloads over HTTP.
///
/// This separates the transport from the view-model so the view-model can be driven by
/// a scripted source in tests.
pub trait IssueSource: Send + Sync {
    /// Performs a single GET of `url` and returns the decoded JSON body.
    fn fetch_json(&self, url: String) -> BoxFuture<'_, Result<Value, IssuesError>>;
}
