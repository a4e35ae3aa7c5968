//! Seam to the chat-service client library.
//!
//! The root window only needs to construct a client, attach log hooks, log in
//! with a token, and tear the client down again. Everything past the
//! authentication handshake belongs to the client implementation.

use serde::Deserialize;
use thiserror::Error;

mod properties;
mod rest;

pub use properties::{ClientOptions, ConnectionProperties};
pub use rest::{RestClient, RestClientFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Error,
    Warn,
    Debug,
}

pub type LogHook = Box<dyn Fn(&str)>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    #[serde(default = "legacy_discriminator")]
    pub discriminator: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

fn legacy_discriminator() -> String {
    "0".to_string()
}

impl CurrentUser {
    /// `name#1234`, or just the name for accounts without a discriminator.
    pub fn tag(&self) -> String {
        if self.discriminator.is_empty() || self.discriminator == "0" {
            self.username.clone()
        } else {
            format!("{}#{}", self.username, self.discriminator)
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("token rejected by the service (HTTP {status})")]
    Rejected { status: u16 },
    #[error("rate limited; retry after {retry_after:.1}s")]
    RateLimited { retry_after: f64 },
    #[error("unexpected HTTP status {status}")]
    Http { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("login worker stopped before returning a result")]
    Worker,
    #[error("client was destroyed")]
    Destroyed,
}

/// A single session with the chat service.
///
/// Methods take `&self`; handles are shared through `Rc` on the UI thread.
#[allow(async_fn_in_trait)]
pub trait ChatClient {
    fn on_log(&self, level: LogLevel, hook: LogHook);

    async fn login(&self, token: &str) -> Result<CurrentUser, ClientError>;

    /// Ends the session. Completes once the client holds no live resources.
    async fn destroy(&self);

    fn current_user(&self) -> Option<CurrentUser>;
}

pub trait ClientFactory {
    type Client: ChatClient + 'static;

    fn create(&self, options: ClientOptions) -> Self::Client;
}
