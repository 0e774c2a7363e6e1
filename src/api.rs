//! The authenticated client: session bootstrap, dispatch and the single
//! refresh-and-replay on an expired token.

use log::{debug, info, warn};
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Instant;

use crate::auth::{apply_bearer, request_token, Credentials, Grant};
use crate::client::{build_client, ClientConfig};
use crate::error::{Result, UdnsError};
use crate::request::{ApiRequest, JSON_CONTENT_TYPE};
use crate::response::{classify, get_content_type, interpret, ApiResponse, OutputFormat, ResponseKind};
use crate::session::{Session, SessionState};

/// The first attempt plus one replay after a token refresh.
pub const MAX_ATTEMPTS: usize = 2;

/// Client for the UltraDNS REST API.
///
/// Calls take `&mut self` because a 401 may replace the session tokens
/// mid-call. Wrap the client in a mutex to share it between tasks.
#[derive(Debug)]
pub struct UltraApi {
    http: Client,
    config: ClientConfig,
    session: Session,
}

impl UltraApi {
    /// Authenticates with a password grant before returning.
    pub async fn connect(
        username: impl Into<String>,
        password: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        Self::from_credentials(Credentials::password(username, password), config).await
    }

    /// Wraps an already issued token pair. No network call is made.
    pub fn with_tokens(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let session = Session::new(access_token, refresh_token);
        if session.state() == SessionState::Unauthenticated {
            return Err(UdnsError::InvalidCredentials(
                "access token cannot be empty".to_string(),
            ));
        }
        if session.state() == SessionState::AuthenticatedNoRefresh {
            warn!(
                "No refresh token supplied: the session cannot be renewed once the access token expires"
            );
        }

        Ok(Self {
            http: build_client(&config)?,
            config,
            session,
        })
    }

    pub async fn from_credentials(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        credentials.validate()?;
        match credentials {
            Credentials::Password { username, password } => {
                let http = build_client(&config)?;
                let tokens = request_token(
                    &http,
                    &config,
                    Grant::Password {
                        username: &username,
                        password: &password,
                    },
                )
                .await?;
                debug!("Authenticated as {}", username);

                let mut session = Session::default();
                session.replace(tokens);
                Ok(Self {
                    http,
                    config,
                    session,
                })
            }
            Credentials::Token {
                access_token,
                refresh_token,
            } => Self::with_tokens(access_token, refresh_token, config),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Toggles
    // ------------------------------------------------------------------------

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
        info!("Debug mode {}", if debug { "enabled" } else { "disabled" });
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.set_debug(!self.config.debug);
        self.config.debug
    }

    pub fn set_output_format(&mut self, output: OutputFormat) {
        self.config.output = output;
        info!(
            "Pretty print {}",
            if output == OutputFormat::Pretty {
                "enabled"
            } else {
                "disabled"
            }
        );
    }

    pub fn toggle_pretty_print(&mut self) -> OutputFormat {
        self.set_output_format(self.config.output.toggled());
        self.config.output
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.config.set_user_agent(user_agent);
        info!("User agent set to {}", self.config.user_agent());
    }

    // ------------------------------------------------------------------------
    // Verbs
    // ------------------------------------------------------------------------

    pub async fn get(&mut self, path: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn get_with_params<K, V>(&mut self, path: &str, params: &[(K, V)]) -> Result<ApiResponse>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = ApiRequest::get(path).query_pairs(
            params
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
        );
        self.execute(request).await
    }

    pub async fn post<T: Serialize + ?Sized>(&mut self, path: &str, payload: &T) -> Result<ApiResponse> {
        self.execute(ApiRequest::post(path).json(payload)?).await
    }

    pub async fn put<T: Serialize + ?Sized>(&mut self, path: &str, payload: &T) -> Result<ApiResponse> {
        self.execute(ApiRequest::put(path).json(payload)?).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&mut self, path: &str, payload: &T) -> Result<ApiResponse> {
        self.execute(ApiRequest::patch(path).json(payload)?).await
    }

    pub async fn post_raw(&mut self, path: &str, payload: impl Into<String>) -> Result<ApiResponse> {
        self.execute(ApiRequest::post(path).raw(payload)).await
    }

    pub async fn put_raw(&mut self, path: &str, payload: impl Into<String>) -> Result<ApiResponse> {
        self.execute(ApiRequest::put(path).raw(payload)).await
    }

    pub async fn patch_raw(&mut self, path: &str, payload: impl Into<String>) -> Result<ApiResponse> {
        self.execute(ApiRequest::patch(path).raw(payload)).await
    }

    pub async fn delete(&mut self, path: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::delete(path)).await
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    pub async fn execute(&mut self, request: ApiRequest) -> Result<ApiResponse> {
        let format = self.config.output;
        self.execute_as(request, format).await
    }

    /// Sends `request`, refreshing the session and replaying it once if the
    /// first attempt comes back 401. The replay's outcome is returned as-is.
    pub async fn execute_as(&mut self, request: ApiRequest, format: OutputFormat) -> Result<ApiResponse> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let may_retry = attempt < MAX_ATTEMPTS;

            let resp = self.send(&request).await?;
            let kind = classify(resp.status(), get_content_type(&resp).as_ref(), may_retry);

            if kind == ResponseKind::Unauthorized {
                debug!("{} {} returned 401, refreshing session", request.method, request.path);
                self.refresh().await?;
                continue;
            }

            return interpret(resp, kind, format, self.config.debug).await;
        }
    }

    async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.config.url(&request.path);
        if self.config.debug {
            request.log(&url, self.session.access_token(), self.config.user_agent());
        }

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(header::ACCEPT, JSON_CONTENT_TYPE)
            .header(header::USER_AGENT, HeaderValue::from_str(self.config.user_agent())?);
        builder = apply_bearer(builder, self.session.access_token())?;

        if let Some(content_type) = &request.content_type {
            builder = builder.header(header::CONTENT_TYPE, HeaderValue::from_str(content_type)?);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.encode()?);
        }

        let started = Instant::now();
        let resp = builder.send().await?;
        if self.config.debug {
            debug!(
                "< {} in {:.2} ms",
                resp.status(),
                started.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(resp)
    }

    /// Exchanges the refresh token for a new token pair. The stored tokens are
    /// left untouched unless the exchange succeeds.
    pub async fn refresh(&mut self) -> Result<()> {
        let Some(refresh_token) = self.session.refresh_token().map(str::to_string) else {
            self.session.mark_unrecoverable();
            return Err(UdnsError::RefreshUnavailable);
        };

        match request_token(
            &self.http,
            &self.config,
            Grant::Refresh {
                refresh_token: &refresh_token,
            },
        )
        .await
        {
            Ok(tokens) => {
                self.session.replace(tokens);
                debug!("Session refreshed");
                Ok(())
            }
            Err(e) => {
                if matches!(e, UdnsError::AuthenticationFailed { .. }) {
                    self.session.mark_unrecoverable();
                }
                Err(e)
            }
        }
    }
}
