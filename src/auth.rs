use log::debug;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::str::FromStr;

use crate::client::ClientConfig;
use crate::error::{Result, UdnsError};

/// Path of the OAuth-style token endpoint, relative to the base URL.
pub const TOKEN_PATH: &str = "/authorization/token";

/// What a client is constructed from.
#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    Password {
        username: String,
        password: String,
    },
    Token {
        access_token: String,
        refresh_token: Option<String>,
    },
}

impl Credentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    /// An empty refresh token is treated as absent.
    pub fn token(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Credentials::Token {
            access_token: access_token.into(),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
        }
    }

    /// Rejects credential sets that could never authenticate, before any call is made.
    pub fn validate(&self) -> Result<()> {
        match self {
            Credentials::Password { username, password } => {
                if username.is_empty() {
                    return Err(UdnsError::InvalidCredentials(
                        "username cannot be empty".to_string(),
                    ));
                }
                if password.is_empty() {
                    return Err(UdnsError::InvalidCredentials(
                        "password is required when providing a username".to_string(),
                    ));
                }
                Ok(())
            }
            Credentials::Token { access_token, .. } => {
                if access_token.is_empty() {
                    return Err(UdnsError::InvalidCredentials(
                        "access token cannot be empty".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Accepts `username:password`, `bearer:ACCESS` or `bearer:ACCESS:REFRESH`.
impl FromStr for Credentials {
    type Err = UdnsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(rest) = s
            .strip_prefix("bearer:")
            .or_else(|| s.strip_prefix("Bearer:"))
        {
            let (access, refresh) = match rest.split_once(':') {
                Some((access, refresh)) => (access, Some(refresh.to_string())),
                None => (rest, None),
            };
            let creds = Credentials::token(access, refresh);
            creds.validate()?;
            return Ok(creds);
        }

        // Passwords may contain colons, usernames may not.
        let creds = match s.split_once(':') {
            Some((username, password)) => Credentials::password(username, password),
            None => Credentials::password(s, ""),
        };
        creds.validate()?;
        Ok(creds)
    }
}

/// A token grant sent to [`TOKEN_PATH`] as a form body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grant<'a> {
    Password { username: &'a str, password: &'a str },
    Refresh { refresh_token: &'a str },
}

impl<'a> Grant<'a> {
    pub fn form(&self) -> Vec<(&'static str, &'a str)> {
        match *self {
            Grant::Password { username, password } => vec![
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ],
            Grant::Refresh { refresh_token } => vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Grant::Password { .. } => "password",
            Grant::Refresh { .. } => "refresh_token",
        }
    }
}

/// Body returned by the token endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Exchanges a grant for a fresh token pair.
pub async fn request_token(
    http: &Client,
    config: &ClientConfig,
    grant: Grant<'_>,
) -> Result<TokenResponse> {
    let url = config.url(TOKEN_PATH);
    debug!("POST {} (grant_type={})", url, grant.name());

    let resp = http
        .post(&url)
        .header(header::USER_AGENT, HeaderValue::from_str(config.user_agent())?)
        .header(header::ACCEPT, "application/json")
        .form(&grant.form())
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_else(|e| {
            debug!("Could not read token error body: {}", e);
            String::new()
        });
        return Err(UdnsError::AuthenticationFailed { status, body });
    }

    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Fails with `InvalidHeader` when the token cannot be sent as a header value.
pub fn apply_bearer(builder: RequestBuilder, access_token: &str) -> Result<RequestBuilder> {
    let value = HeaderValue::from_str(&bearer_value(access_token))?;
    Ok(builder.header(header::AUTHORIZATION, value))
}

pub fn bearer_value(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

/// Keeps the head and tail of long secrets so they can be told apart in logs.
pub fn mask_secret(value: &str) -> String {
    if value.len() > 20 && value.is_char_boundary(10) && value.is_char_boundary(value.len() - 5) {
        format!("{}...{}", &value[..10], &value[value.len() - 5..])
    } else if value.is_empty() {
        String::new()
    } else {
        "****".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_password_credentials() {
        assert_eq!(
            "alice:secret123".parse::<Credentials>().unwrap(),
            Credentials::password("alice", "secret123")
        );

        // Password with colons
        assert_eq!(
            "user:pass:with:colons".parse::<Credentials>().unwrap(),
            Credentials::password("user", "pass:with:colons")
        );
    }

    #[test]
    fn parse_token_credentials() {
        assert_eq!(
            "bearer:A1".parse::<Credentials>().unwrap(),
            Credentials::Token {
                access_token: "A1".into(),
                refresh_token: None,
            }
        );

        assert_eq!(
            "Bearer:A1:R1".parse::<Credentials>().unwrap(),
            Credentials::Token {
                access_token: "A1".into(),
                refresh_token: Some("R1".into()),
            }
        );

        // Empty refresh token collapses to none
        assert_eq!(
            "bearer:A1:".parse::<Credentials>().unwrap(),
            Credentials::Token {
                access_token: "A1".into(),
                refresh_token: None,
            }
        );
    }

    #[test]
    fn parse_credentials_errors() {
        assert!(matches!(
            "alice".parse::<Credentials>(),
            Err(UdnsError::InvalidCredentials(_))
        ));
        assert!(matches!(
            "alice:".parse::<Credentials>(),
            Err(UdnsError::InvalidCredentials(_))
        ));
        assert!(":password".parse::<Credentials>().is_err());
        assert!("bearer:".parse::<Credentials>().is_err());
    }

    #[test]
    fn username_without_password_is_invalid() {
        let err = Credentials::password("alice", "").validate().unwrap_err();
        assert!(matches!(err, UdnsError::InvalidCredentials(_)));
    }

    #[test]
    fn grant_forms() {
        let form = Grant::Password {
            username: "alice",
            password: "pw",
        }
        .form();
        assert_eq!(
            form,
            vec![
                ("grant_type", "password"),
                ("username", "alice"),
                ("password", "pw"),
            ]
        );

        let form = Grant::Refresh { refresh_token: "R1" }.form();
        assert_eq!(
            form,
            vec![("grant_type", "refresh_token"), ("refresh_token", "R1")]
        );
    }

    #[test]
    fn token_response_uses_camel_case() {
        let tokens: TokenResponse =
            serde_json::from_str(r#"{"accessToken":"A1","refreshToken":"R1","expiresIn":"3600"}"#)
                .unwrap();
        assert_eq!(tokens.access_token, "A1");
        assert_eq!(tokens.refresh_token.as_deref(), Some("R1"));

        let tokens: TokenResponse = serde_json::from_str(r#"{"accessToken":"A2"}"#).unwrap();
        assert_eq!(tokens.refresh_token, None);
    }

    #[test]
    fn mask_secret_hides_short_values() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(
            mask_secret("Bearer abcdefghijklmnopqrstuvwxyz"),
            "Bearer abc...vwxyz"
        );
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(bearer_value("A1"), "Bearer A1");
    }

    #[test]
    fn apply_bearer_rejects_control_characters() {
        let http = Client::new();
        let builder = http.get("http://127.0.0.1:9/");
        let err = apply_bearer(builder, "A1\r\nX-Injected: 1").unwrap_err();
        assert!(matches!(err, UdnsError::InvalidHeader(_)));

        let request = apply_bearer(http.get("http://127.0.0.1:9/"), "A1")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer A1");
    }
}
