use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

pub(crate) const CLIENT_NAME: &str = "Discord-GTK";
const BROWSER: &str = "DiscordGtk";
const RELEASE_CHANNEL: &str = "stable";

/// Client identification sent with every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionProperties {
    pub os: String,
    pub browser: String,
    pub release_channel: String,
    pub client_version: String,
    pub os_arch: String,
    pub client_build_number: u64,
}

impl ConnectionProperties {
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: BROWSER.to_string(),
            release_channel: RELEASE_CHANNEL.to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            os_arch: std::env::consts::ARCH.to_string(),
            client_build_number: build_number(option_env!("DISCORD_GTK_BUILD_NUMBER")),
        }
    }

    /// Base64 JSON, as carried in the `X-Super-Properties` header.
    pub fn encode(&self) -> String {
        // Serializing a struct of strings and integers cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        STANDARD.encode(json)
    }
}

fn build_number(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub compress: bool,
    pub user_agent: String,
    pub properties: ConnectionProperties,
}

impl ClientOptions {
    /// The fixed options every login uses.
    pub fn standard() -> Self {
        let properties = ConnectionProperties::current();
        Self {
            compress: false,
            user_agent: format!(
                "{CLIENT_NAME}/{} ({}; {})",
                properties.client_version, properties.os, properties.os_arch
            ),
            properties,
        }
    }
}
