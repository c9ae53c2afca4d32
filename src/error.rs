/// Failures that can surface while building or running an issues query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssuesError {
    /// Transport error or a non-success HTTP status from the issues API.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The payload was not a JSON array of issue objects.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The query could not be turned into a request URL.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}
