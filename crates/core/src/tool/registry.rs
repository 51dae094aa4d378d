use chain_agent_model::{ModelTool, ToolCallRequest};
use thiserror::Error;
use tracing::Instrument;

use super::{DynTool, Error as ToolError, ToolResult};

/// Error returned when building a [`ToolRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two tools share a name, the model could not tell them apart.
    #[error("duplicate tool name `{0}`")]
    DuplicateName(String),
}

/// Keeps the tools from `tools` whose name is in `allow_list`.
///
/// The order of `tools` is preserved, the order of `allow_list` does not
/// matter. Allowed names that no tool carries are skipped with a warning.
pub fn select_tools<I>(tools: I, allow_list: &[&str]) -> Vec<DynTool>
where
    I: IntoIterator<Item = DynTool>,
{
    let selected: Vec<DynTool> = tools
        .into_iter()
        .filter(|tool| allow_list.contains(&tool.name()))
        .collect();
    for name in allow_list {
        if !selected.iter().any(|tool| tool.name() == *name) {
            warn!("allowed tool `{name}` is not provided upstream");
        }
    }
    selected
}

/// An ordered set of uniquely named tools.
///
/// The registry is assembled before the agent is built and is read-only
/// afterwards.
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<DynTool>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `tools`, keeping their order.
    pub fn from_tools<I>(tools: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = DynTool>,
    {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Appends a tool.
    pub fn register(&mut self, tool: DynTool) -> Result<(), RegistryError> {
        if self.get(tool.name()).is_some() {
            return Err(RegistryError::DuplicateName(tool.name().to_owned()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Returns the tool with the given name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&DynTool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Returns the tool names in registration order.
    #[inline]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(DynTool::name).collect()
    }

    /// Returns the number of tools.
    #[inline]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if there are no tools.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the definitions sent to the model, in registration order.
    #[inline]
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools.iter().map(DynTool::definition).collect()
    }

    /// Runs the tool requested by `req`.
    pub async fn call(&self, req: &ToolCallRequest) -> ToolResult {
        let Some(tool) = self.get(&req.name) else {
            warn!("tool not found: {}", req.name);
            return Err(ToolError::not_found()
                .with_reason(format!("`{}` is not a valid tool", req.name)));
        };
        trace!("calling tool ({}) with args: {:?}", req.id, req.arguments);
        let result = tool
            .execute(req.arguments.clone())
            .instrument(debug_span!("tool execute", name = %req.name))
            .await;
        if let Err(err) = &result {
            debug!("tool {} failed: {err}", req.name);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tool::ErrorKind;
    use crate::tool::tests::EchoTool;

    fn upstream() -> Vec<DynTool> {
        ["get_wallet_details", "get_balance", "request_faucet_funds", "transfer"]
            .into_iter()
            .map(|name| DynTool::new(EchoTool(name)))
            .collect()
    }

    #[test]
    fn test_select_keeps_upstream_order() {
        let selected =
            select_tools(upstream(), &["transfer", "get_balance", "get_wallet_details"]);
        let names: Vec<_> = selected.iter().map(DynTool::name).collect();
        assert_eq!(names, ["get_wallet_details", "get_balance", "transfer"]);
    }

    #[test]
    fn test_select_skips_missing_names() {
        let selected = select_tools(upstream(), &["get_balance", "deploy_nft"]);
        let names: Vec<_> = selected.iter().map(DynTool::name).collect();
        assert_eq!(names, ["get_balance"]);

        assert!(select_tools(upstream(), &[]).is_empty());
        assert!(select_tools(Vec::new(), &["get_balance"]).is_empty());
    }

    #[test]
    fn test_duplicate_names() {
        let mut registry = ToolRegistry::from_tools(upstream()).unwrap();
        assert_eq!(registry.len(), 4);

        let err = registry.register(DynTool::new(EchoTool("transfer")));
        assert_eq!(err, Err(RegistryError::DuplicateName("transfer".to_owned())));
        assert_eq!(registry.len(), 4);

        registry.register(DynTool::new(EchoTool("Search"))).unwrap();
        assert_eq!(registry.names().last(), Some(&"Search"));
        assert_eq!(registry.definitions().len(), 5);
    }

    #[tokio::test]
    async fn test_call() {
        let registry = ToolRegistry::from_tools(upstream()).unwrap();

        let req = ToolCallRequest {
            id: "tool:1".to_owned(),
            name: "get_balance".to_owned(),
            arguments: json!({ "text": "eth" }),
        };
        assert_eq!(registry.call(&req).await.unwrap(), "get_balance: eth");

        let req = ToolCallRequest {
            id: "tool:2".to_owned(),
            name: "read_file".to_owned(),
            arguments: json!({}),
        };
        let err = registry.call(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
