use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// GitHub issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: String,
    pub labels: Vec<Label>,
    pub assignees: Vec<String>,
    pub milestone: Option<String>,
    pub comment_count: u32,
    pub reaction_count: u32,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            IssueState::Open => "OPEN",
            IssueState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "Open"),
            IssueState::Closed => write!(f, "Closed"),
        }
    }
}

/// Issue label; `color` is hex without the leading `#`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

/// Issue comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reactions: u32,
}

/// Cursor pagination state returned by every connection query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Empty when the server returned no cursor.
    pub end_cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueListResult {
    pub issues: Vec<Issue>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentListResult {
    pub comments: Vec<Comment>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Comments,
}

impl OrderField {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            OrderField::CreatedAt => "CREATED_AT",
            OrderField::UpdatedAt => "UPDATED_AT",
            OrderField::Comments => "COMMENTS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

impl OrderDirection {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IssueOrder {
    pub field: OrderField,
    pub direction: OrderDirection,
}

/// Filters and paging for an issue list query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueListOptions {
    pub states: Vec<IssueState>,
    pub labels: Vec<String>,
    pub order_by: IssueOrder,
    /// Page size; 0 means the client default.
    pub first: usize,
    pub after: Option<String>,
}
