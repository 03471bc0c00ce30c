use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{Actor, GraphqlPageInfo, TotalCount};
use crate::error::Result;
use crate::querier::Querier;
use crate::types::{Comment, CommentListResult};

const DEFAULT_PAGE_SIZE: usize = 25;

const LIST_COMMENTS_QUERY: &str = r#"query ListComments($owner: String!, $name: String!, $number: Int!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      comments(first: $first, after: $after) {
        pageInfo { hasNextPage endCursor }
        nodes {
          author { login }
          body
          createdAt
          updatedAt
          reactions { totalCount }
        }
      }
    }
  }
}"#;

/// Fetches issue comments of one repository.
#[derive(Debug, Clone)]
pub struct CommentClient {
    querier: Arc<dyn Querier>,
    owner: String,
    repo: String,
}

impl CommentClient {
    pub fn new(querier: Arc<dyn Querier>, owner: &str, repo: &str) -> Self {
        Self {
            querier,
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// `first == 0` uses the default page of 25.
    pub async fn list(
        &self,
        issue_number: u64,
        first: usize,
        after: Option<&str>,
    ) -> Result<CommentListResult> {
        let first = if first == 0 { DEFAULT_PAGE_SIZE } else { first };

        let mut vars = json!({
            "owner": self.owner,
            "name": self.repo,
            "number": issue_number,
            "first": first,
        });
        if let Some(after) = after.filter(|a| !a.is_empty()) {
            vars["after"] = json!(after);
        }

        let data = self.querier.query(LIST_COMMENTS_QUERY, vars).await?;
        let resp: ListCommentsResponse = serde_json::from_value(data)?;
        let connection = resp.repository.issue.comments;

        Ok(CommentListResult {
            comments: connection.nodes.into_iter().map(Comment::from).collect(),
            page_info: connection.page_info.into(),
        })
    }
}

#[derive(Deserialize)]
struct ListCommentsResponse {
    repository: CommentsRepository,
}

#[derive(Deserialize)]
struct CommentsRepository {
    issue: CommentsIssue,
}

#[derive(Deserialize)]
struct CommentsIssue {
    comments: CommentConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentConnection {
    #[serde(default)]
    page_info: GraphqlPageInfo,
    #[serde(default)]
    nodes: Vec<CommentNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    #[serde(default)]
    author: Option<Actor>,
    #[serde(default)]
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    reactions: TotalCount,
}

impl From<CommentNode> for Comment {
    fn from(node: CommentNode) -> Self {
        Comment {
            author: node
                .author
                .map(|a| a.login)
                .filter(|login| !login.is_empty())
                .unwrap_or_else(|| "[deleted]".to_string()),
            body: node.body,
            created_at: node.created_at,
            updated_at: node.updated_at,
            reactions: node.reactions.total_count,
        }
    }
}
