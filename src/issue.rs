use crate::error::IssuesError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A display-ready issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub body: String,
    /// Login of the author, empty when the payload has no user.
    pub user_login: String,
    /// Login of the assignee, empty when the issue is unassigned.
    pub assignee_login: String,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhIssue {
    title: Option<String>,
    body: Option<String>,
    user: Option<GhUser>,
    assignee: Option<GhUser>,
}

impl From<GhIssue> for Issue {
    fn from(raw: GhIssue) -> Self {
        let login = |user: Option<GhUser>| user.and_then(|u| u.login).unwrap_or_default();
        Issue {
            title: raw.title.unwrap_or_default(),
            body: raw.body.unwrap_or_default(),
            user_login: login(raw.user),
            assignee_login: login(raw.assignee),
        }
    }
}

/// Maps an issues API payload into issues, preserving response order.
///
/// The payload must be an array of objects. Missing or null fields default to an empty
/// string; a present field with the wrong type fails the whole parse.
pub fn parse_issues(payload: &Value) -> Result<Vec<Issue>, IssuesError> {
    let items = payload.as_array().ok_or_else(|| {
        IssuesError::MalformedResponse(format!(
            "expected a JSON array of issues, got {}",
            json_kind(payload)
        ))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            GhIssue::deserialize(item).map(Issue::from).map_err(|e| {
                IssuesError::MalformedResponse(format!("issue at index {index}: {e}"))
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
