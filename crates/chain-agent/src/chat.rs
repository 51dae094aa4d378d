use std::io::{self, Write};
use std::pin::pin;

use chain_agent_core::{AgentError, AgentUpdate};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::select;

use crate::Session;

const PROMPT: &str = "\nPrompt: ";
const SEPARATOR: &str = "-------------------";

/// How the chat loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatExit {
    /// The user typed `exit`.
    Exit,
    /// The input stream ended.
    EndOfInput,
    /// The user interrupted while we were waiting for input.
    Interrupted,
}

impl ChatExit {
    /// Returns the status the process exits with.
    #[inline]
    pub fn exit_status(self) -> u8 {
        match self {
            Self::Exit | Self::EndOfInput | Self::Interrupted => 0,
        }
    }

    /// Returns `true` if the process must end without waiting for input
    /// reads still in flight.
    #[inline]
    pub fn is_immediate(self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Errors that end the chat loop.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A turn failed.
    #[error(transparent)]
    Agent(#[from] AgentError),
    /// Reading input or writing output failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Reads lines from `input` and runs each one as a turn, printing the updates
/// to `output`.
///
/// `interrupt` resolves when the user asks to quit; it is only observed while
/// waiting for input.
pub async fn run_chat_mode<R, W, I>(
    session: &Session,
    mut input: R,
    output: &mut W,
    interrupt: I,
) -> Result<ChatExit, ChatError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future<Output = ()>,
{
    let mut interrupt = pin!(interrupt);
    writeln!(output, "Starting chat mode... Type 'exit' to end.")?;

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        let read = select! {
            biased;
            _ = interrupt.as_mut() => {
                writeln!(output, "Goodbye Agent!")?;
                return Ok(ChatExit::Interrupted);
            }
            read = input.read_line(&mut line) => read?,
        };
        if read == 0 {
            debug!("input closed");
            return Ok(ChatExit::EndOfInput);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.eq_ignore_ascii_case("exit") {
            return Ok(ChatExit::Exit);
        }

        let mut turn = session.send_message(line);
        while let Some(update) = turn.next().await {
            match update? {
                AgentUpdate::Agent(msg) => writeln!(output, "{}", msg.content)?,
                AgentUpdate::Tools(results) => {
                    for result in results {
                        writeln!(output, "{}", result.content)?;
                    }
                }
            }
            writeln!(output, "{SEPARATOR}")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::{pending, ready};
    use std::time::Duration;

    use tokio::io::BufReader;

    use chain_agent_model::ToolCallRequest;
    use chain_agent_test_model::{
        PresetEvent, PresetResponse, TestModelProvider,
    };
    use serde_json::json;

    use super::*;
    use crate::SessionBuilder;
    use crate::testing::{FakeSearch, FakeWalletProvider};

    async fn session(model: &TestModelProvider) -> Session {
        SessionBuilder::with_model_provider(model.clone())
            .with_wallet_provider(FakeWalletProvider::default())
            .with_wallet_data(Some("abc123"))
            .with_search_backend(FakeSearch::default())
            .build()
            .await
            .unwrap()
    }

    async fn chat(
        model: &TestModelProvider,
        input: &str,
    ) -> (Result<ChatExit, ChatError>, String) {
        let session = session(model).await;
        let mut output = Vec::new();
        let result =
            run_chat_mode(&session, input.as_bytes(), &mut output, pending())
                .await;
        (result, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_exit_submits_nothing() {
        for input in ["exit\n", "Exit\n", "EXIT\r\n", "eXiT"] {
            let model = TestModelProvider::default();
            let (result, output) = chat(&model, input).await;
            assert_eq!(result.unwrap(), ChatExit::Exit);
            assert!(model.requests().is_empty());
            assert!(output.ends_with("\nPrompt: "));
        }
    }

    #[tokio::test]
    async fn test_padded_exit_is_a_turn() {
        let model = TestModelProvider::default();
        model.add_response(PresetResponse::text("ok"));
        let (result, _) = chat(&model, " exit\nexit\n").await;
        assert_eq!(result.unwrap(), ChatExit::Exit);

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].messages.last(),
            Some(&chain_agent_model::ModelMessage::User(" exit".to_owned()))
        );
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let model = TestModelProvider::default();
        let (result, _) = chat(&model, "").await;
        assert_eq!(result.unwrap(), ChatExit::EndOfInput);
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_interrupt_while_waiting() {
        let model = TestModelProvider::default();
        let session = session(&model).await;
        let mut output = Vec::new();
        let result =
            run_chat_mode(&session, &b"hello\n"[..], &mut output, ready(()))
                .await;

        assert_eq!(result.unwrap(), ChatExit::Interrupted);
        assert!(String::from_utf8(output).unwrap().ends_with("Goodbye Agent!\n"));
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_interrupt_with_open_input() {
        let model = TestModelProvider::default();
        let session = session(&model).await;
        // The writer stays alive, so reading never completes.
        let (_writer, reader) = tokio::io::duplex(64);
        let mut output = Vec::new();
        let interrupt = tokio::time::sleep(Duration::from_millis(20));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_chat_mode(&session, BufReader::new(reader), &mut output, interrupt),
        )
        .await
        .unwrap();

        let exit = result.unwrap();
        assert_eq!(exit, ChatExit::Interrupted);
        assert!(exit.is_immediate());
        assert_eq!(exit.exit_status(), 0);
        assert!(String::from_utf8(output).unwrap().ends_with("Goodbye Agent!\n"));
        assert!(model.requests().is_empty());
    }

    #[test]
    fn test_exit_statuses() {
        assert_eq!(ChatExit::Exit.exit_status(), 0);
        assert_eq!(ChatExit::EndOfInput.exit_status(), 0);
        assert!(!ChatExit::Exit.is_immediate());
        assert!(!ChatExit::EndOfInput.is_immediate());
    }

    #[tokio::test]
    async fn test_turn_output() {
        let model = TestModelProvider::default();
        model.add_response(PresetResponse::with_events([
            PresetEvent::ToolCall(ToolCallRequest {
                id: "call:1".to_owned(),
                name: "get_wallet_details".to_owned(),
                arguments: json!({}),
            }),
            PresetEvent::ToolCall(ToolCallRequest {
                id: "call:2".to_owned(),
                name: "get_balance".to_owned(),
                arguments: json!({ "asset_id": "eth" }),
            }),
        ]));
        model.add_response(PresetResponse::text("You have 0.5 ETH."));

        let (result, output) =
            chat(&model, "what is my balance\nexit\n").await;
        assert_eq!(result.unwrap(), ChatExit::Exit);
        assert_eq!(model.requests().len(), 2);

        let expected = concat!(
            "Starting chat mode... Type 'exit' to end.\n",
            "\nPrompt: \n",
            "-------------------\n",
            "Wallet: w-1 on network: base-sepolia with default address: 0xabc\n",
            "Balances for wallet w-1:\n",
            "  0xabc: 0.5 eth\n",
            "-------------------\n",
            "You have 0.5 ETH.\n",
            "-------------------\n",
            "\nPrompt: ",
        );
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn test_agent_error_propagates() {
        // No scripted responses: the first request fails.
        let model = TestModelProvider::default();
        let (result, _) = chat(&model, "gm\nexit\n").await;
        assert!(matches!(result, Err(ChatError::Agent(AgentError::Model { .. }))));
    }
}
