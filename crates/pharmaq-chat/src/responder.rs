//! Chat responder: forwards the whole transcript to the model and records
//! the reply as an assistant message.

use std::sync::Arc;

use pharmaq_core::types::ChatMessage;

use crate::error::ChatError;
use crate::llm::CompletionClient;

/// Answers chat messages using the full conversation history.
#[derive(Clone)]
pub struct ChatResponder {
    client: Arc<dyn CompletionClient>,
    max_message_length: usize,
}

impl ChatResponder {
    pub fn new(client: Arc<dyn CompletionClient>, max_message_length: usize) -> Self {
        Self {
            client,
            max_message_length,
        }
    }

    /// Check a user message before it is appended to a transcript.
    pub fn validate(&self, message: &str) -> Result<(), ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }
        Ok(())
    }

    /// Ask the model for the next assistant message given `history`.
    ///
    /// Failures become an assistant message describing the error.
    pub async fn reply(&self, history: &[ChatMessage]) -> ChatMessage {
        match self.client.complete(history).await {
            Ok(content) => ChatMessage::assistant(content),
            Err(e) => {
                tracing::warn!(error = %e, "Chat completion failed");
                ChatMessage::assistant(format!("Error retrieving response: {}", e))
            }
        }
    }

    /// Append `message` to `transcript`, then append the model's reply.
    ///
    /// Returns the reply. Only input validation can fail; a model failure is
    /// recorded in the transcript as an assistant message.
    pub async fn respond<'t>(
        &self,
        transcript: &'t mut Vec<ChatMessage>,
        message: &str,
    ) -> Result<&'t ChatMessage, ChatError> {
        self.validate(message)?;
        transcript.push(ChatMessage::user(message));
        let reply = self.reply(transcript).await;
        transcript.push(reply);
        Ok(&transcript[transcript.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::MockCompletionClient;
    use pharmaq_core::types::Role;

    fn responder(mock: &MockCompletionClient) -> ChatResponder {
        ChatResponder::new(Arc::new(mock.clone()), 2000)
    }

    #[tokio::test]
    async fn test_first_message_yields_two_entries() {
        let mock = MockCompletionClient::new();
        let mut transcript = Vec::new();
        let reply = responder(&mock)
            .respond(&mut transcript, "Hello")
            .await
            .unwrap()
            .clone();

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], ChatMessage::user("Hello"));
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "Mock reply to: Hello");
    }

    #[tokio::test]
    async fn test_second_message_sends_full_history() {
        let mock = MockCompletionClient::new();
        let r = responder(&mock);
        let mut transcript = Vec::new();
        r.respond(&mut transcript, "Hello").await.unwrap();
        r.respond(&mut transcript, "And ESMO?").await.unwrap();

        assert_eq!(transcript.len(), 4);
        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].len(), 3);
        assert_eq!(requests[1][0].content, "Hello");
        assert_eq!(requests[1][1].role, Role::Assistant);
        assert_eq!(requests[1][2].content, "And ESMO?");
    }

    #[tokio::test]
    async fn test_failure_becomes_assistant_message() {
        let mock = MockCompletionClient::failing(LlmError::Api {
            status: 401,
            message: "bad key".to_string(),
        });
        let mut transcript = Vec::new();
        responder(&mock)
            .respond(&mut transcript, "Hello")
            .await
            .unwrap();

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(
            transcript[1].content,
            "Error retrieving response: API error (401): bad key"
        );
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_without_call() {
        let mock = MockCompletionClient::new();
        let mut transcript = Vec::new();
        let err = responder(&mock)
            .respond(&mut transcript, "   ")
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::EmptyMessage);
        assert!(transcript.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_validate_length_boundary() {
        let r = ChatResponder::new(Arc::new(MockCompletionClient::new()), 10);
        assert!(r.validate(&"a".repeat(10)).is_ok());
        assert_eq!(
            r.validate(&"a".repeat(11)).unwrap_err(),
            ChatError::MessageTooLong(10)
        );
    }
}
