use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::querier::Querier;

const VIEWER_QUERY: &str = "query { viewer { login } }";

/// Resolves the authenticated user.
#[derive(Debug, Clone)]
pub struct UserClient {
    querier: Arc<dyn Querier>,
}

#[derive(Deserialize)]
struct ViewerResponse {
    viewer: Viewer,
}

#[derive(Deserialize)]
struct Viewer {
    login: String,
}

impl UserClient {
    pub fn new(querier: Arc<dyn Querier>) -> Self {
        Self { querier }
    }

    pub async fn who_am_i(&self) -> Result<String> {
        let data = self.querier.query(VIEWER_QUERY, Value::Null).await?;
        let resp: ViewerResponse = serde_json::from_value(data)?;
        Ok(resp.viewer.login)
    }
}
