use crate::remote::{Role, WireMessage};
use crate::ui::line_input::LineInput;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Locally generated failure bubble; never sent back to the model.
    pub is_error: bool,
}

/// Conversational overlay with its own log and lifecycle. The first message
/// is a local greeting and is not part of the transcript sent upstream.
pub struct ChatSession {
    pub open: bool,
    pub input: LineInput,
    messages: Vec<ChatMessage>,
    pending: Option<u64>,
    next_seq: u64,
}

impl ChatSession {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            open: false,
            input: LineInput::new(""),
            messages: vec![ChatMessage {
                role: Role::Assistant,
                content: greeting.into(),
                is_error: false,
            }],
            pending: None,
            next_seq: 1,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Append the user's message and return the request sequence number and
    /// upstream transcript. `None` if the text is blank or a reply is pending.
    pub fn begin_send(&mut self, text: &str) -> Option<(u64, Vec<WireMessage>)> {
        let text = text.trim();
        if text.is_empty() || self.pending.is_some() {
            return None;
        }
        self.messages.push(ChatMessage {
            role: Role::User,
            content: text.to_string(),
            is_error: false,
        });
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending = Some(seq);
        Some((seq, self.transcript()))
    }

    fn transcript(&self) -> Vec<WireMessage> {
        self.messages
            .iter()
            .skip(1)
            .filter(|m| !m.is_error)
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    /// Apply a reply. Results for anything but the pending request are
    /// dropped and `false` is returned.
    pub fn finish(&mut self, seq: u64, reply: Result<String, String>) -> bool {
        if self.pending != Some(seq) {
            return false;
        }
        self.pending = None;
        let (content, is_error) = match reply {
            Ok(text) => (text, false),
            Err(text) => (text, true),
        };
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content,
            is_error,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_is_not_sent() {
        let mut chat = ChatSession::new("Привет!");
        let (seq, transcript) = chat.begin_send("Was heißt Brot?").unwrap();
        assert_eq!(seq, 1);
        assert_eq!(transcript, vec![WireMessage::user("Was heißt Brot?")]);
        assert_eq!(chat.messages().len(), 2);
    }

    #[test]
    fn one_request_at_a_time() {
        let mut chat = ChatSession::new("hi");
        assert!(chat.begin_send("a").is_some());
        assert!(chat.begin_send("b").is_none());
        assert!(chat.is_waiting());
        assert!(chat.begin_send("   ").is_none());
    }

    #[test]
    fn stale_reply_is_dropped() {
        let mut chat = ChatSession::new("hi");
        let (seq, _) = chat.begin_send("a").unwrap();
        assert!(!chat.finish(seq + 1, Ok("nope".to_string())));
        assert!(chat.finish(seq, Ok("хлеб".to_string())));
        assert!(!chat.finish(seq, Ok("again".to_string())));
        assert_eq!(chat.messages().last().unwrap().content, "хлеб");
    }

    #[test]
    fn error_bubbles_stay_local() {
        let mut chat = ChatSession::new("hi");
        let (seq, _) = chat.begin_send("a").unwrap();
        chat.finish(seq, Err("Ошибка".to_string()));
        assert!(chat.messages().last().unwrap().is_error);

        let (seq, transcript) = chat.begin_send("b").unwrap();
        assert_eq!(seq, 2);
        assert_eq!(
            transcript,
            vec![WireMessage::user("a"), WireMessage::user("b")]
        );
    }
}
