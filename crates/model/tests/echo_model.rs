//! Checks that the traits are implementable by a minimal provider and that
//! the event protocol can be driven with `poll_fn`.

use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::{poll_fn, ready};
use std::pin::Pin;
use std::task::{self, Poll};

use chain_agent_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};
use serde_json::json;

#[derive(Debug)]
struct EchoError(ErrorKind);

impl Display for EchoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "echo failed: {}", self.0)
    }
}

impl Error for EchoError {}

impl ModelProviderError for EchoError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

struct EchoResponse {
    events: VecDeque<ModelResponseEvent>,
}

impl ModelResponse for EchoResponse {
    type Error = EchoError;

    fn poll_next_event(
        mut self: Pin<&mut Self>,
        _cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        Poll::Ready(Ok(self.events.pop_front()))
    }
}

/// Echoes the last user message word by word. A message starting with
/// `search ` is turned into a `Search` tool call instead.
struct EchoProvider;

impl ModelProvider for EchoProvider {
    type Error = EchoError;
    type Response = EchoResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let last_user = req.messages.iter().rev().find_map(|msg| match msg {
            ModelMessage::User(text) => Some(text.clone()),
            _ => None,
        });
        let Some(text) = last_user else {
            return ready(Err(EchoError(ErrorKind::InvalidResponse)));
        };

        let mut events = VecDeque::new();
        if let Some(query) = text.strip_prefix("search ") {
            events.push_back(ModelResponseEvent::ToolCall(ToolCallRequest {
                id: "call:0".to_owned(),
                name: "Search".to_owned(),
                arguments: json!({ "query": query }),
            }));
            events.push_back(ModelResponseEvent::Completed(
                ModelFinishReason::ToolCalls,
            ));
        } else {
            let words: Vec<_> = text.split(' ').collect();
            for (idx, word) in words.iter().enumerate() {
                let mut delta = (*word).to_owned();
                if idx + 1 < words.len() {
                    delta.push(' ');
                }
                events.push_back(ModelResponseEvent::MessageDelta(delta));
            }
            events.push_back(ModelResponseEvent::Completed(
                ModelFinishReason::Stop,
            ));
        }
        ready(Ok(EchoResponse { events }))
    }
}

async fn drain(mut resp: EchoResponse) -> Vec<ModelResponseEvent> {
    let mut events = vec![];
    while let Some(event) =
        poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx))
            .await
            .unwrap()
    {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_text_reply() {
    let req = ModelRequest {
        messages: vec![
            ModelMessage::System("Be brief.".to_owned()),
            ModelMessage::User("gm frens".to_owned()),
        ],
        tools: vec![],
    };
    let events = drain(EchoProvider.send_request(&req).await.unwrap()).await;

    let text: String = events
        .iter()
        .filter_map(|event| match event {
            ModelResponseEvent::MessageDelta(delta) => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "gm frens");
    assert_eq!(
        events.last(),
        Some(&ModelResponseEvent::Completed(ModelFinishReason::Stop))
    );
}

#[tokio::test]
async fn test_tool_call_reply() {
    let req = ModelRequest {
        messages: vec![ModelMessage::User("search eth price".to_owned())],
        tools: vec![],
    };
    let events = drain(EchoProvider.send_request(&req).await.unwrap()).await;

    let ModelResponseEvent::ToolCall(call) = &events[0] else {
        panic!("expected a tool call, got {events:?}");
    };
    assert_eq!(call.name, "Search");
    assert_eq!(call.arguments, json!({ "query": "eth price" }));
}

#[tokio::test]
async fn test_error() {
    let req = ModelRequest {
        messages: vec![],
        tools: vec![],
    };
    let err = EchoProvider.send_request(&req).await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}
