use std::collections::{BTreeMap, VecDeque};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use chain_agent_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};
use pin_project_lite::pin_project;
use serde_json::Value;

use crate::Error;
use crate::io::Sse;
use crate::proto::{ChatCompletionChunk, ToolCallDelta};

#[derive(Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn patch(&mut self, delta: ToolCallDelta) {
        if let Some(id) = delta.id {
            self.id.push_str(&id);
        }
        if let Some(function) = delta.function {
            if let Some(name) = function.name {
                self.name.push_str(&name);
            }
            if let Some(arguments) = function.arguments {
                self.arguments.push_str(&arguments);
            }
        }
    }

    fn finish(self) -> ToolCallRequest {
        // Models occasionally send an empty string for "no arguments".
        let arguments = if self.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&self.arguments)
                .unwrap_or(Value::String(self.arguments))
        };
        ToolCallRequest {
            id: self.id,
            name: self.name,
            arguments,
        }
    }
}

/// Decoding state of a streamed completion.
///
/// Text deltas are reported as they arrive. Tool calls stream their
/// arguments in fragments, so they are held back until the choice finishes
/// and then reported in index order, followed by the completion event.
struct StreamState {
    sse: Sse,
    id: Option<String>,
    tool_calls: BTreeMap<u32, PartialToolCall>,
    ready_events: VecDeque<ModelResponseEvent>,
    finished: bool,
}

impl StreamState {
    fn finish_choice(&mut self, finish_reason: Option<&str>) {
        let tool_calls = std::mem::take(&mut self.tool_calls);
        let has_tool_calls = !tool_calls.is_empty();
        for (_, call) in tool_calls {
            self.ready_events
                .push_back(ModelResponseEvent::ToolCall(call.finish()));
        }
        let reason = match finish_reason {
            Some("tool_calls") => ModelFinishReason::ToolCalls,
            Some(_) => ModelFinishReason::Stop,
            None if has_tool_calls => ModelFinishReason::ToolCalls,
            None => ModelFinishReason::Stop,
        };
        self.ready_events
            .push_back(ModelResponseEvent::Completed(reason));
        self.finished = true;
    }

    fn apply_chunk(&mut self, chunk: ChatCompletionChunk) -> Result<(), Error> {
        if self.id.get_or_insert_with(|| chunk.id.clone()) != &chunk.id {
            return Err(Error::new("chunk id mismatch", ErrorKind::InvalidResponse));
        }
        // Usage-only chunks have no choices.
        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(());
        };
        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            self.ready_events
                .push_back(ModelResponseEvent::MessageDelta(content));
        }
        for delta in choice.delta.tool_calls.unwrap_or_default() {
            self.tool_calls.entry(delta.index).or_default().patch(delta);
        }
        if let Some(reason) = choice.finish_reason {
            self.finish_choice(Some(&reason));
        }
        Ok(())
    }
}

async fn next_event(
    mut state: StreamState,
) -> Result<(Option<ModelResponseEvent>, StreamState), Error> {
    loop {
        if let Some(event) = state.ready_events.pop_front() {
            return Ok((Some(event), state));
        }
        if state.finished {
            return Ok((None, state));
        }

        let data = state.sse.next_event().await.map_err(|err| {
            Error::new(format!("broken stream: {err:?}"), ErrorKind::Other)
        })?;
        let Some(data) = data else {
            // The server hung up without a finish reason.
            state.finish_choice(None);
            continue;
        };
        trace!("got sse event: {data}");
        if data == "[DONE]" {
            state.finish_choice(None);
            continue;
        }

        let chunk = serde_json::from_str::<ChatCompletionChunk>(&data)
            .map_err(|err| {
                Error::new(format!("{err}"), ErrorKind::InvalidResponse)
            })?;
        state.apply_chunk(chunk)?;
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, StreamState), Error>;

pin_project! {
    /// A streamed chat completion.
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl OpenAIResponse {
    pub(crate) fn from_sse(sse: Sse) -> Self {
        let state = StreamState {
            sse,
            id: None,
            tool_calls: Default::default(),
            ready_events: Default::default(),
            finished: false,
        };
        Self {
            next_event_fut: Some(Box::pin(next_event(state))),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        match ready!(fut.as_mut().poll(cx)) {
            Ok((Some(event), state)) => {
                *this.next_event_fut = Some(Box::pin(next_event(state)));
                Poll::Ready(Ok(Some(event)))
            }
            Ok((None, _)) => {
                *this.next_event_fut = None;
                Poll::Ready(Ok(None))
            }
            Err(err) => {
                *this.next_event_fut = None;
                Poll::Ready(Err(err))
            }
        }
    }
}
