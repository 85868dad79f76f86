use std::time::Duration;

use crate::remote::{MessagesResponse, ModelCall, ModelClient, RemoteError};

#[cfg(feature = "network")]
pub struct HttpModelClient {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "network")]
impl HttpModelClient {
    pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "network")]
impl ModelClient for HttpModelClient {
    fn send(&self, call: &ModelCall) -> Result<MessagesResponse, RemoteError> {
        let mut request = self.client.post(call.transport.endpoint()).json(&call.body);
        if let crate::remote::Transport::Direct {
            api_key,
            api_version,
            ..
        } = &call.transport
        {
            request = request
                .header("x-api-key", api_key)
                .header("anthropic-version", api_version);
        }

        let response = request
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(RemoteError::Http {
                status: status.as_u16(),
                message: crate::remote::error_message(&body),
            });
        }
        crate::remote::decode_body(&body)
    }
}

/// Stand-in used when the crate is built without the `network` feature.
pub struct OfflineClient;

impl ModelClient for OfflineClient {
    fn send(&self, _call: &ModelCall) -> Result<MessagesResponse, RemoteError> {
        Err(RemoteError::Disabled)
    }
}

#[cfg(feature = "network")]
pub fn default_client(timeout: Duration) -> Box<dyn ModelClient> {
    match HttpModelClient::new(timeout) {
        Ok(client) => Box::new(client),
        Err(e) => {
            log::error!("{e}");
            Box::new(OfflineClient)
        }
    }
}

#[cfg(not(feature = "network"))]
pub fn default_client(_timeout: Duration) -> Box<dyn ModelClient> {
    Box::new(OfflineClient)
}
