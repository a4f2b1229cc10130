// src/client.rs
//
// Camada de acesso a dados para consumidores da API (apps, scripts, testes).

pub mod api_client;
pub mod data_source;
pub mod session;

pub use api_client::ApiClient;
pub use data_source::{DataSource, OfflineSnapshot};
pub use session::Session;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Servidor inalcançável, timeout, DNS...
    #[error("Network error: {0}")]
    Network(String),

    /// Resposta não-2xx, já com a mensagem do servidor.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ClientError {
    /// Normaliza uma resposta de erro: usa `message` do JSON quando existir.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.message,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => format!("Request failed with status {status}"),
        };
        ClientError::Api { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_preferred() {
        let err = ClientError::from_status(409, r#"{"message":"Department 'Stores' already exists."}"#);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "API error (409): Department 'Stores' already exists.");
    }

    #[test]
    fn plain_text_and_empty_bodies_still_give_a_message() {
        match ClientError::from_status(502, "Bad Gateway") {
            ClientError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected {other:?}"),
        }
        match ClientError::from_status(500, "  ") {
            ClientError::Api { message, .. } => assert_eq!(message, "Request failed with status 500"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn network_errors_have_no_status() {
        assert_eq!(ClientError::Network("connection refused".into()).status(), None);
    }
}
