use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A GraphQL endpoint. Returns the `data` payload of a successful response.
///
/// Implementations hold no session state, so one instance is shared
/// read-only by every view through an `Arc<dyn Querier>`.
#[async_trait]
pub trait Querier: Send + Sync + std::fmt::Debug {
    async fn query(&self, query: &str, variables: Value) -> Result<Value>;
}
