use std::sync::Arc;

use async_trait::async_trait;
use chain_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use reqwest::Client;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
const MAX_ORGANIC_RESULTS: usize = 10;
const NO_RESULT: &str = "No good Google Search Result was found";

/// Errors from a search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request never got a response.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The response body.
        message: String,
    },
}

/// Answers a web search query with text.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Runs `query` and returns a plain-text digest of the results.
    async fn search(&self, query: &str) -> Result<String, SearchError>;
}

/// Google search through the Serper API.
#[derive(Clone, Debug)]
pub struct SerperSearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl SerperSearch {
    /// Creates a backend with the given API key.
    #[inline]
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: SERPER_ENDPOINT.to_owned(),
        }
    }
}

#[async_trait]
impl SearchBackend for SerperSearch {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        debug!("searching: {query}");
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!("search failed with {status}: {message}");
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let results: Value = resp.json().await?;
        Ok(digest(&results))
    }
}

/// Picks the most direct answer out of a Serper response.
fn digest(results: &Value) -> String {
    let text = |value: &Value, key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    if let Some(answer_box) = results.get("answerBox") {
        if let Some(answer) = text(answer_box, "answer") {
            return answer;
        }
        if let Some(snippet) = text(answer_box, "snippet") {
            return snippet.replace('\n', " ");
        }
    }
    if let Some(description) = results
        .get("knowledgeGraph")
        .and_then(|kg| text(kg, "description"))
    {
        return description;
    }

    let snippets: Vec<_> = results
        .get("organic")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .take(MAX_ORGANIC_RESULTS)
        .filter_map(|result| text(result, "snippet"))
        .collect();
    if snippets.is_empty() {
        NO_RESULT.to_owned()
    } else {
        snippets.join(" ")
    }
}

/// The input of [`SearchTool`].
#[derive(Deserialize, JsonSchema)]
pub struct SearchInput {
    #[schemars(description = "The search query.")]
    query: String,
}

/// A tool that searches the internet.
pub struct SearchTool {
    backend: Arc<dyn SearchBackend>,
    parameter_schema: Value,
}

impl SearchTool {
    /// Creates a search tool over `backend`.
    #[inline]
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            parameter_schema: schema_for!(SearchInput).to_value(),
        }
    }
}

impl Tool for SearchTool {
    type Input = SearchInput;

    fn name(&self) -> &str {
        "Search"
    }

    fn description(&self) -> &str {
        "Search the internet for current information. Use this tool when you \
need to find information about current events, facts, or anything that \
requires up-to-date information."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: SearchInput,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let backend = Arc::clone(&self.backend);
        async move {
            backend.search(&input.query).await.map_err(|err| {
                ToolError::execution_error()
                    .with_reason(format!("search failed: {err}"))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use chain_agent_core::tool::DynTool;

    use super::*;
    use crate::testing::FakeSearch;

    #[test]
    fn test_digest_priority() {
        let results = json!({
            "answerBox": { "answer": "42" },
            "knowledgeGraph": { "description": "A number." },
            "organic": [{ "snippet": "forty-two" }]
        });
        assert_eq!(digest(&results), "42");

        let results = json!({
            "answerBox": { "snippet": "line one\nline two" },
            "organic": [{ "snippet": "ignored" }]
        });
        assert_eq!(digest(&results), "line one line two");

        let results = json!({
            "knowledgeGraph": { "title": "Base", "description": "An L2." },
            "organic": [{ "snippet": "ignored" }]
        });
        assert_eq!(digest(&results), "An L2.");
    }

    #[test]
    fn test_digest_organic() {
        let results = json!({
            "organic": [
                { "title": "a", "snippet": "First." },
                { "title": "b" },
                { "title": "c", "snippet": "Second." }
            ]
        });
        assert_eq!(digest(&results), "First. Second.");
        assert_eq!(digest(&json!({})), NO_RESULT);
        assert_eq!(digest(&json!({ "organic": [] })), NO_RESULT);
    }

    #[tokio::test]
    async fn test_search_tool() {
        let backend = Arc::new(FakeSearch::default());
        let tool = DynTool::new(SearchTool::new(backend.clone()));
        assert_eq!(tool.name(), "Search");
        assert!(tool.description().contains("current events"));

        let output = tool
            .execute(json!({ "query": "  ETH price today? " }))
            .await
            .unwrap();
        assert_eq!(output, "results for:   ETH price today? ");
        assert_eq!(backend.queries(), ["  ETH price today? "]);

        let err = tool
            .execute(json!({ "query": "fail" }))
            .await
            .unwrap_err();
        assert!(err.reason().starts_with("search failed: HTTP 500"));
    }
}
