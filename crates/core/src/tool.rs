//! Tool call supports.

mod error;
mod registry;

use std::fmt::{self, Debug};
use std::pin::Pin;
use std::sync::Arc;

use chain_agent_model::ModelTool;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Error, ErrorKind};
pub use registry::{RegistryError, ToolRegistry, select_tools};

/// The result of a tool call.
pub type ToolResult = Result<String, Error>;

/// A boxed tool future.
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// A tool that can be called by the model.
///
/// Any context the tool needs (a client, a wallet handle) should be set when
/// the tool is created and cloned into the future returned by `execute`.
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// Returns the name of the tool, unique within a registry.
    fn name(&self) -> &str;

    /// Returns the description shown to the model.
    fn description(&self) -> &str;

    /// Returns the JSON schema of `Input`.
    fn parameter_schema(&self) -> &Value;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of `self`.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameter_schema(&self) -> &Value;

    fn execute(&self, arguments: Value) -> ToolFuture;
}

struct AnyTool<T: Tool>(T);

impl<T: Tool> ToolObject for AnyTool<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.0.description()
    }

    #[inline]
    fn parameter_schema(&self) -> &Value {
        self.0.parameter_schema()
    }

    fn execute(&self, arguments: Value) -> ToolFuture {
        let input: T::Input = match serde_json::from_value(arguments) {
            Ok(input) => input,
            Err(err) => {
                return Box::pin(std::future::ready(Err(
                    Error::invalid_input().with_reason(format!("{err}")),
                )));
            }
        };
        Box::pin(self.0.execute(input))
    }
}

/// A type-erased [`Tool`], so tools with different inputs can live in one
/// list. Cloning is cheap and shares the underlying tool.
#[derive(Clone)]
pub struct DynTool(Arc<dyn ToolObject>);

impl DynTool {
    /// Erases the type of `tool`.
    #[inline]
    pub fn new<T: Tool>(tool: T) -> Self {
        Self(Arc::new(AnyTool(tool)))
    }

    /// Returns the name of the tool.
    #[inline]
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Returns the description of the tool.
    #[inline]
    pub fn description(&self) -> &str {
        self.0.description()
    }

    /// Returns the parameter schema of the tool.
    #[inline]
    pub fn parameter_schema(&self) -> &Value {
        self.0.parameter_schema()
    }

    /// Returns the definition sent to the model.
    pub fn definition(&self) -> ModelTool {
        ModelTool {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            parameters: self.parameter_schema().clone(),
        }
    }

    /// Decodes `arguments` into the tool input and runs the tool.
    #[inline]
    pub fn execute(&self, arguments: Value) -> ToolFuture {
        self.0.execute(arguments)
    }
}

impl Debug for DynTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynTool")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

impl<T: Tool> From<T> for DynTool {
    #[inline]
    fn from(tool: T) -> Self {
        Self::new(tool)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::future::ready;
    use std::sync::LazyLock;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    static ECHO_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
        json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        })
    });

    #[derive(Deserialize)]
    pub struct EchoInput {
        text: String,
    }

    /// Returns its input prefixed with its name.
    pub struct EchoTool(pub &'static str);

    impl Tool for EchoTool {
        type Input = EchoInput;

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echoes the text back"
        }

        fn parameter_schema(&self) -> &Value {
            &ECHO_SCHEMA
        }

        fn execute(
            &self,
            input: EchoInput,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok(format!("{}: {}", self.0, input.text)))
        }
    }

    #[tokio::test]
    async fn test_dyn_tool() {
        let tool = DynTool::new(EchoTool("echo"));
        assert_eq!(tool.name(), "echo");
        assert_eq!(tool.definition().parameters, *ECHO_SCHEMA);

        let output = tool.execute(json!({ "text": "gm" })).await.unwrap();
        assert_eq!(output, "echo: gm");

        let err = tool.execute(json!({ "txt": "gm" })).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
