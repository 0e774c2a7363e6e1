use reqwest::Client;
use std::time::Duration;

use crate::error::Result;
use crate::response::OutputFormat;

pub const DEFAULT_BASE_URL: &str = "https://api.ultradns.com";

pub fn default_user_agent() -> String {
    format!("udnsrs/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings that shape every call a client makes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    user_agent: String,
    timeout: Option<Duration>,
    pub debug: bool,
    pub output: OutputFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: None,
            debug: false,
            output: OutputFormat::Structured,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trailing slashes are dropped so paths can be appended verbatim.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    pub fn with_pretty(self, pretty: bool) -> Self {
        self.with_output(if pretty {
            OutputFormat::Pretty
        } else {
            OutputFormat::Structured
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// The user agent is not a default header: it can change over the client's lifetime.
pub fn build_client(config: &ClientConfig) -> Result<Client> {
    let mut client_builder = Client::builder();

    if let Some(timeout) = config.timeout {
        client_builder = client_builder.timeout(timeout);
    }

    Ok(client_builder.build()?)
}
