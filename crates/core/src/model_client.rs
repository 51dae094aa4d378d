use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use chain_agent_model::{
    ModelFinishReason, ModelProvider, ModelRequest, ModelResponse,
    ModelResponseEvent, ToolCallRequest,
};
use tracing::Instrument;

use crate::AgentError;

type SendRequestResult = Result<ModelClientResponse, AgentError>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A type-erased model provider that drains each response into a complete
/// [`ModelClientResponse`].
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // Erase `P` so the agent doesn't need a generic parameter.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!(
                        "sending {} messages, {} tools",
                        req.messages.len(),
                        req.tools.len()
                    );
                    let resp = fut
                        .await
                        .map_err(|err| AgentError::from_provider(&err))?;
                    drain_response(resp).await
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and waits for the complete response.
    #[inline]
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        (self.handler_fn)(req).await
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelClientResponse {
    /// All message deltas joined.
    pub transcript: String,
    /// Tool calls requested by the model, in order.
    pub tool_calls: Vec<ToolCallRequest>,
    /// The reason the model finished generating.
    pub finish_reason: Option<ModelFinishReason>,
}

async fn drain_response<R: ModelResponse>(resp: R) -> SendRequestResult {
    let mut output = ModelClientResponse::default();
    let mut resp = pin!(resp);
    loop {
        let event = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
            .await
            .map_err(|err| {
                error!("response stream failed: {err}");
                AgentError::from_provider(&err)
            })?;
        let Some(event) = event else {
            break;
        };
        trace!("got an event: {event:?}");

        match event {
            ModelResponseEvent::MessageDelta(delta) => {
                output.transcript.push_str(&delta);
            }
            ModelResponseEvent::ToolCall(req) => output.tool_calls.push(req),
            ModelResponseEvent::Completed(reason) => {
                output.finish_reason = Some(reason);
            }
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use chain_agent_model::{ErrorKind, ModelMessage};
    use chain_agent_test_model::{
        PresetEvent, PresetFailure, PresetResponse, TestModelProvider,
    };
    use serde_json::json;

    use super::*;

    fn request() -> ModelRequest {
        ModelRequest {
            messages: vec![ModelMessage::User("Hi".to_owned())],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let model_provider = TestModelProvider::default();
        model_provider.add_response(PresetResponse::with_events([
            PresetEvent::MessageDelta("Let me ".to_owned()),
            PresetEvent::MessageDelta("look.".to_owned()),
            PresetEvent::ToolCall(ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "get_wallet_details".to_owned(),
                arguments: json!({}),
            }),
        ]));
        let model_client = ModelClient::new(model_provider);

        let resp = model_client.send_request(request()).await.unwrap();
        assert_eq!(resp.transcript, "Let me look.");
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.finish_reason, Some(ModelFinishReason::ToolCalls));
    }

    #[tokio::test]
    async fn test_error_handling() {
        let model_provider = TestModelProvider::default();
        model_provider.add_response(
            PresetResponse::text("").with_failure(PresetFailure::Request),
        );
        model_provider.add_response(
            PresetResponse::text("half").with_failure(PresetFailure::Stream),
        );
        let model_client = ModelClient::new(model_provider);

        let err = model_client.send_request(request()).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Model {
                kind: ErrorKind::ServerError,
                ..
            }
        ));
        assert!(model_client.send_request(request()).await.is_err());
        // The script is exhausted now.
        assert!(model_client.send_request(request()).await.is_err());
    }
}
