use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{Actor, GraphqlPageInfo, Nodes, TotalCount};
use crate::error::Result;
use crate::querier::Querier;
use crate::types::{Issue, IssueListOptions, IssueListResult, IssueState, Label};

const DEFAULT_PAGE_SIZE: usize = 50;

const LIST_ISSUES_QUERY: &str = r#"query ListIssues($owner: String!, $name: String!, $first: Int!, $after: String, $states: [IssueState!], $labels: [String!], $orderBy: IssueOrder!) {
  repository(owner: $owner, name: $name) {
    issues(first: $first, after: $after, states: $states, labels: $labels, orderBy: $orderBy) {
      pageInfo { hasNextPage endCursor }
      nodes {
        number
        title
        state
        createdAt
        updatedAt
        author { login }
        labels(first: 10) { nodes { name color } }
        assignees(first: 5) { nodes { login } }
        milestone { title }
        comments { totalCount }
        reactions { totalCount }
      }
    }
  }
}"#;

const GET_ISSUE_QUERY: &str = r#"query GetIssue($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      number
      title
      state
      createdAt
      updatedAt
      author { login }
      labels(first: 10) { nodes { name color } }
      assignees(first: 5) { nodes { login } }
      milestone { title }
      comments { totalCount }
      reactions { totalCount }
      body
    }
  }
}"#;

/// Fetches issues of one repository.
#[derive(Debug, Clone)]
pub struct IssueClient {
    querier: Arc<dyn Querier>,
    owner: String,
    repo: String,
}

impl IssueClient {
    pub fn new(querier: Arc<dyn Querier>, owner: &str, repo: &str) -> Self {
        Self {
            querier,
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    pub async fn list(&self, opts: IssueListOptions) -> Result<IssueListResult> {
        let first = if opts.first == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            opts.first
        };

        let mut vars = json!({
            "owner": self.owner,
            "name": self.repo,
            "first": first,
            "orderBy": {
                "field": opts.order_by.field.as_api_str(),
                "direction": opts.order_by.direction.as_api_str(),
            },
        });
        if let Some(after) = opts.after.filter(|a| !a.is_empty()) {
            vars["after"] = json!(after);
        }
        if !opts.states.is_empty() {
            let states: Vec<&str> = opts.states.iter().map(IssueState::as_api_str).collect();
            vars["states"] = json!(states);
        }
        if !opts.labels.is_empty() {
            vars["labels"] = json!(opts.labels);
        }

        let data = self.querier.query(LIST_ISSUES_QUERY, vars).await?;
        let resp: ListIssuesResponse = serde_json::from_value(data)?;
        let connection = resp.repository.issues;

        Ok(IssueListResult {
            issues: connection.nodes.into_iter().map(Issue::from).collect(),
            page_info: connection.page_info.into(),
        })
    }

    pub async fn get(&self, number: u64) -> Result<Issue> {
        let vars = json!({
            "owner": self.owner,
            "name": self.repo,
            "number": number,
        });

        let data = self.querier.query(GET_ISSUE_QUERY, vars).await?;
        let resp: GetIssueResponse = serde_json::from_value(data)?;
        Ok(resp.repository.issue.into())
    }
}

// GraphQL response shapes

#[derive(Deserialize)]
struct ListIssuesResponse {
    repository: ListIssuesRepository,
}

#[derive(Deserialize)]
struct ListIssuesRepository {
    issues: IssueConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueConnection {
    #[serde(default)]
    page_info: GraphqlPageInfo,
    #[serde(default)]
    nodes: Vec<IssueNode>,
}

#[derive(Deserialize)]
struct GetIssueResponse {
    repository: GetIssueRepository,
}

#[derive(Deserialize)]
struct GetIssueRepository {
    issue: IssueNode,
}

#[derive(Deserialize)]
struct LabelNode {
    name: String,
    #[serde(default)]
    color: String,
}

#[derive(Deserialize)]
struct MilestoneNode {
    title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    number: u64,
    title: String,
    state: IssueState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    author: Option<Actor>,
    #[serde(default)]
    labels: Nodes<LabelNode>,
    #[serde(default)]
    assignees: Nodes<Actor>,
    #[serde(default)]
    milestone: Option<MilestoneNode>,
    #[serde(default)]
    comments: TotalCount,
    #[serde(default)]
    reactions: TotalCount,
    #[serde(default)]
    body: Option<String>,
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Self {
        Issue {
            number: node.number,
            title: node.title,
            state: node.state,
            created_at: node.created_at,
            updated_at: node.updated_at,
            author: node
                .author
                .map(|a| a.login)
                .unwrap_or_else(|| "ghost".to_string()),
            labels: node
                .labels
                .nodes
                .into_iter()
                .map(|l| Label {
                    name: l.name,
                    color: l.color,
                })
                .collect(),
            assignees: node.assignees.nodes.into_iter().map(|a| a.login).collect(),
            milestone: node.milestone.map(|m| m.title),
            comment_count: node.comments.total_count,
            reaction_count: node.reactions.total_count,
            body: node.body.filter(|b| !b.is_empty()),
        }
    }
}
