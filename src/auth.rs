// src/auth.rs
//! Login and the session value that every fetch borrows.
//!
//! A `Session` is created by [`Session::login`] (or from a pre-issued token),
//! read by fetches, and replaced wholesale on re-login. There is no refresh:
//! a 401 during fetching comes back as `FetchError::Unauthorized` and the
//! caller decides whether to log in again.

use std::fmt;
use std::time::Duration;

use log::{debug, info};
use serde_json::{json, Value};

use crate::config::consts::*;
use crate::core::extract::{first_named, text_at, Named};
use crate::core::net::{HttpRequest, Transport};
use crate::core::sanitize::snippet;
use crate::error::AuthError;

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token([REDACTED; {} chars])", self.0.len())
    }
}

/// Where a login response may carry its token, in priority order.
/// Generic key lookups come first; the status-sentinel convention is the fallback.
const TOKEN_STRATEGIES: &[Named<String>] = &[
    ("token", token_top),
    ("access_token", access_token_top),
    ("data.token", token_nested),
    ("status sentinel", token_by_sentinel),
];

fn token_top(v: &Value) -> Option<String> { text_at(v, &["token"]) }
fn access_token_top(v: &Value) -> Option<String> { text_at(v, &["access_token"]) }
fn token_nested(v: &Value) -> Option<String> { text_at(v, &["data", "token"]) }

fn token_by_sentinel(v: &Value) -> Option<String> {
    let ok = ["status", "code"].iter().any(|k| {
        v.get(*k).and_then(Value::as_str).is_some_and(|s| s.trim() == SUCCESS_SENTINEL)
    });
    if ok { text_at(v, &["token"]) } else { None }
}

/// Pull a token out of a decoded login body.
pub fn extract_token(body: &Value) -> Option<Token> {
    first_named(body, TOKEN_STRATEGIES).map(|(via, raw)| {
        debug!("token found via {via}");
        Token(raw)
    })
}

/// Exchange credentials for a bearer token.
pub fn authenticate<T: Transport + ?Sized>(
    transport: &T,
    creds: &Credentials,
    auth_url: &str,
) -> Result<Token, AuthError> {
    let req = HttpRequest::post(auth_url)
        .json(json!({ "username": creds.username, "password": creds.password }))
        .timeout(Duration::from_secs(AUTH_TIMEOUT_SECS));

    let resp = transport.send(&req).map_err(|e| AuthError::Transport {
        url: s!(auth_url),
        message: e.to_string(),
    })?;

    if resp.status != 200 {
        return Err(AuthError::Rejected {
            url: s!(auth_url),
            status: resp.status,
            body: snippet(&resp.body, BODY_SNIPPET_CHARS),
        });
    }

    let body: Value = serde_json::from_str(&resp.body).map_err(|_| AuthError::MalformedResponse {
        url: s!(auth_url),
        body: snippet(&resp.body, BODY_SNIPPET_CHARS),
    })?;

    extract_token(&body).ok_or_else(|| AuthError::MissingToken {
        url: s!(auth_url),
        body: snippet(&resp.body, BODY_SNIPPET_CHARS),
    })
}

#[derive(Clone, Debug)]
pub struct Session {
    token: Token,
    headers: Vec<(String, String)>,
}

impl Session {
    /// Log in and build a session whose default headers mimic the web client.
    pub fn login<T: Transport + ?Sized>(
        transport: &T,
        creds: &Credentials,
        base_url: &str,
        auth_url: &str,
    ) -> Result<Self, AuthError> {
        let token = authenticate(transport, creds, auth_url)?;
        info!("logged in as {}", creds.username);
        Ok(Self::from_token(token, base_url))
    }

    /// Wrap a token that was issued elsewhere.
    pub fn from_token(token: Token, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let headers = pairs![
            "Authorization" => format!("Bearer {}", token.as_str()),
            "User-Agent" => USER_AGENT,
            "Accept" => ACCEPT,
            "X-Requested-With" => "XMLHttpRequest",
            "Referer" => join!(base, REFERER_PATH),
        ];
        Self { token, headers }
    }

    pub fn token(&self) -> &Token { &self.token }

    /// Headers to attach to every post-login request, bearer included.
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
}
