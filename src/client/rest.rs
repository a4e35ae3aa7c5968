use std::cell::{Cell, RefCell};
use std::time::Duration;

use gtk4::gio;
use reqwest::header::{ACCEPT_ENCODING, AUTHORIZATION};
use serde::Deserialize;

use super::{ChatClient, ClientError, ClientFactory, ClientOptions, CurrentUser, LogHook, LogLevel};

const API_BASE_ENV: &str = "DISCORD_GTK_API_BASE";
const DEFAULT_API_BASE: &str = "https://discord.com/api/v9";
const CURRENT_USER_PATH: &str = "/users/@me";
const SUPER_PROPERTIES_HEADER: &str = "X-Super-Properties";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RestClientFactory {
    api_base: String,
}

impl RestClientFactory {
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

impl Default for RestClientFactory {
    fn default() -> Self {
        let api_base = std::env::var(API_BASE_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::with_api_base(api_base)
    }
}

impl ClientFactory for RestClientFactory {
    type Client = RestClient;

    fn create(&self, options: ClientOptions) -> RestClient {
        RestClient::new(options, self.api_base.clone())
    }
}

/// Authenticates a token against the service's REST API.
pub struct RestClient {
    options: ClientOptions,
    api_base: String,
    hooks: RefCell<Vec<(LogLevel, LogHook)>>,
    user: RefCell<Option<CurrentUser>>,
    destroyed: Cell<bool>,
}

impl RestClient {
    pub fn new(options: ClientOptions, api_base: impl Into<String>) -> Self {
        Self {
            options,
            api_base: api_base.into(),
            hooks: RefCell::new(Vec::new()),
            user: RefCell::new(None),
            destroyed: Cell::new(false),
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        for (hook_level, hook) in self.hooks.borrow().iter() {
            if *hook_level == level {
                hook(message);
            }
        }
    }

    fn current_user_url(&self) -> String {
        format!(
            "{}{CURRENT_USER_PATH}",
            self.api_base.trim_end_matches('/')
        )
    }
}

impl ChatClient for RestClient {
    fn on_log(&self, level: LogLevel, hook: LogHook) {
        self.hooks.borrow_mut().push((level, hook));
    }

    async fn login(&self, token: &str) -> Result<CurrentUser, ClientError> {
        if self.destroyed.get() {
            return Err(ClientError::Destroyed);
        }

        let request = LoginRequest {
            url: self.current_user_url(),
            token: token.to_string(),
            user_agent: self.options.user_agent.clone(),
            super_properties: self.options.properties.encode(),
            compress: self.options.compress,
        };
        self.log(
            LogLevel::Debug,
            &format!("authenticating against {}", request.url),
        );

        let result = gio::spawn_blocking(move || request.send())
            .await
            .map_err(|_| ClientError::Worker)
            .and_then(std::convert::identity);

        match result {
            Ok(_) if self.destroyed.get() => Err(ClientError::Destroyed),
            Ok(user) => {
                self.log(
                    LogLevel::Debug,
                    &format!("authenticated as {} ({})", user.tag(), user.id),
                );
                *self.user.borrow_mut() = Some(user.clone());
                Ok(user)
            }
            Err(err) => {
                let level = match err {
                    ClientError::RateLimited { .. } | ClientError::Network(_) => LogLevel::Warn,
                    _ => LogLevel::Error,
                };
                self.log(level, &err.to_string());
                Err(err)
            }
        }
    }

    async fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        let user = self.user.borrow_mut().take();
        self.log(
            LogLevel::Debug,
            &format!(
                "session closed for {}",
                user.as_ref().map_or_else(|| "<anonymous>".to_string(), CurrentUser::tag)
            ),
        );
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.user.borrow().clone()
    }
}

struct LoginRequest {
    url: String,
    token: String,
    user_agent: String,
    super_properties: String,
    compress: bool,
}

impl LoginRequest {
    fn send(self) -> Result<CurrentUser, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;

        let mut request = client
            .get(&self.url)
            .header(AUTHORIZATION, self.token)
            .header(SUPER_PROPERTIES_HEADER, self.super_properties);
        if !self.compress {
            request = request.header(ACCEPT_ENCODING, "identity");
        }

        let response = request
            .send()
            .map_err(|err| ClientError::Network(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| ClientError::Network(err.to_string()))?;

        parse_login_response(status, &body)
    }
}

#[derive(Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

fn parse_login_response(status: u16, body: &str) -> Result<CurrentUser, ClientError> {
    match status {
        200..=299 => {
            serde_json::from_str(body).map_err(|err| ClientError::Decode(err.to_string()))
        }
        401 | 403 => Err(ClientError::Rejected { status }),
        429 => {
            let retry_after = serde_json::from_str::<RateLimitBody>(body)
                .map(|limit| limit.retry_after)
                .unwrap_or(0.0);
            Err(ClientError::RateLimited { retry_after })
        }
        _ => Err(ClientError::Http { status }),
    }
}
