mod comments;
mod issues;
mod pagination;
mod user;

use serde::Deserialize;

use crate::types::PageInfo;

pub use comments::CommentClient;
pub use issues::IssueClient;
pub use pagination::Paginator;
pub use user::UserClient;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlPageInfo {
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    end_cursor: Option<String>,
}

impl From<GraphqlPageInfo> for PageInfo {
    fn from(info: GraphqlPageInfo) -> Self {
        PageInfo {
            has_next_page: info.has_next_page,
            end_cursor: info.end_cursor.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Actor {
    login: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    #[serde(default)]
    total_count: u32,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}
