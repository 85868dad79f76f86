pub mod http;
pub mod prompt;
pub mod reply;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::default_client;
pub use reply::{GeneratedDeck, ReplyError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body shared by the proxy and the provider endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<WireMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
}

impl MessagesResponse {
    /// Concatenated text of every text block.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Detailed { message: String },
    Plain(String),
}

impl ApiErrorBody {
    fn into_message(self) -> String {
        match self {
            ApiErrorBody::Detailed { message } | ApiErrorBody::Plain(message) => message,
        }
    }
}

/// A 2xx body is either a normal reply or a structured error payload.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum ReplyBody {
    Failure { error: ApiErrorBody },
    Success(MessagesResponse),
}

/// Interpret a response body. Error-shaped payloads become `RemoteError::Api`.
pub fn decode_body(body: &str) -> Result<MessagesResponse, RemoteError> {
    match serde_json::from_str::<ReplyBody>(body) {
        Ok(ReplyBody::Success(response)) => Ok(response),
        Ok(ReplyBody::Failure { error }) => Err(RemoteError::Api(error.into_message())),
        Err(e) => Err(RemoteError::Malformed(e.to_string())),
    }
}

/// Best-effort message from a non-2xx body.
pub fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Wrapper {
        error: ApiErrorBody,
    }
    match serde_json::from_str::<Wrapper>(body) {
        Ok(w) => w.error.into_message(),
        Err(_) => body.chars().take(200).collect(),
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Transport {
    /// Trusted backend that holds the credential itself.
    Proxy { url: String },
    /// Direct call to the provider with a user-held key.
    Direct {
        base_url: String,
        api_key: String,
        api_version: String,
    },
}

impl Transport {
    pub fn endpoint(&self) -> String {
        match self {
            Transport::Proxy { url } => url.clone(),
            Transport::Direct { base_url, .. } => {
                format!("{}/v1/messages", base_url.trim_end_matches('/'))
            }
        }
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, Transport::Direct { .. })
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Proxy { url } => f.debug_struct("Proxy").field("url", url).finish(),
            Transport::Direct {
                base_url,
                api_version,
                ..
            } => f
                .debug_struct("Direct")
                .field("base_url", base_url)
                .field("api_key", &"<redacted>")
                .field("api_version", api_version)
                .finish(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelCall {
    pub transport: Transport,
    pub body: MessagesRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("API error: {0}")]
    Api(String),
    #[error("unreadable response: {0}")]
    Malformed(String),
    #[error("network support is disabled in this build")]
    Disabled,
}

impl RemoteError {
    /// True for failures that point at the credential rather than the link.
    pub fn is_auth(&self) -> bool {
        matches!(self, RemoteError::Http { status: 401 | 403, .. })
    }
}

pub trait ModelClient: Send + Sync {
    fn send(&self, call: &ModelCall) -> Result<MessagesResponse, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_blocks() {
        let response = decode_body(r#"{"content":[{"type":"text","text":"[{"},{"text":"}]"}]}"#)
            .unwrap();
        assert_eq!(response.text(), "[{}]");
    }

    #[test]
    fn error_shaped_body_is_api_error() {
        let err = decode_body(r#"{"error":{"type":"overloaded_error","message":"Overloaded"}}"#)
            .unwrap_err();
        assert_eq!(err, RemoteError::Api("Overloaded".to_string()));

        let err = decode_body(r#"{"error":"proxy misconfigured"}"#).unwrap_err();
        assert_eq!(err, RemoteError::Api("proxy misconfigured".to_string()));
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert!(matches!(decode_body("<html>"), Err(RemoteError::Malformed(_))));
    }

    #[test]
    fn error_message_extracts_or_truncates() {
        assert_eq!(
            error_message(r#"{"error":{"message":"invalid x-api-key"}}"#),
            "invalid x-api-key"
        );
        assert_eq!(error_message(&"x".repeat(500)).len(), 200);
    }

    #[test]
    fn direct_endpoint_appends_path() {
        let t = Transport::Direct {
            base_url: "https://api.example.com/".to_string(),
            api_key: "secret".to_string(),
            api_version: "2023-06-01".to_string(),
        };
        assert_eq!(t.endpoint(), "https://api.example.com/v1/messages");
        assert!(t.is_credential());
        assert!(!format!("{t:?}").contains("secret"));
    }

    #[test]
    fn request_serializes_wire_shape() {
        let body = MessagesRequest {
            model: "m".to_string(),
            max_tokens: 10,
            system: "s".to_string(),
            messages: vec![WireMessage::user("hi")],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 10);
    }

    #[test]
    fn auth_statuses() {
        let e = RemoteError::Http {
            status: 401,
            message: String::new(),
        };
        assert!(e.is_auth());
        assert!(!RemoteError::Network("x".to_string()).is_auth());
    }
}
