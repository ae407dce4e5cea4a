// src/probe/http.rs
use super::{decode_config, Probe, ProbeError};
use crate::check::CheckDefinition;
use async_trait::async_trait;
use reqwest::{redirect, Client};
use serde::Deserialize;
use std::fmt;
use url::Url;

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// GET request against `scheme://hostname:port/path`, healthy when the
/// response status equals `expected_code`. Redirects are not followed.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct HttpProbe {
    pub hostname: String,
    pub port: u16,
    pub scheme: String,
    pub path: String,
    pub username: String,
    pub password: String,
    #[serde(alias = "expected_code")]
    pub expected_code: u16,
}

impl HttpProbe {
    pub fn from_check(check: &CheckDefinition) -> Result<Self, ProbeError> {
        decode_config(&check.config)
    }

    pub fn url(&self) -> Result<Url, ProbeError> {
        // bare IPv6 literals need brackets before a port can follow
        let host = if self.hostname.contains(':') && !self.hostname.starts_with('[') {
            format!("[{}]", self.hostname)
        } else {
            self.hostname.clone()
        };
        let raw = format!("{}://{}:{}{}", self.scheme, host, self.port, self.path);
        Ok(Url::parse(&raw)?)
    }
}

impl fmt::Debug for HttpProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpProbe")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("path", &self.path)
            .field("username", &self.username)
            .field("expected_code", &self.expected_code)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn apply_defaults(&mut self, check: &CheckDefinition) {
        if self.hostname.is_empty() {
            self.hostname = check.address.clone();
        }

        if self.scheme.is_empty() {
            self.scheme = "http".to_string();
        }

        if self.port == 0 {
            self.port = match self.scheme.as_str() {
                "http" => 80,
                "https" => 443,
                _ => 0,
            };
        }

        if self.path.is_empty() {
            self.path = "/".to_string();
        } else if !self.path.starts_with('/') {
            self.path.insert(0, '/');
        }

        if self.expected_code == 0 {
            self.expected_code = 200;
        }
    }

    fn validate(&self) -> Result<(), ProbeError> {
        if !(100..=599).contains(&self.expected_code) {
            return Err(ProbeError::ExpectedCodeOutOfRange(self.expected_code));
        }

        if !ALLOWED_SCHEMES.contains(&self.scheme.as_str()) {
            return Err(ProbeError::UnsupportedScheme(self.scheme.clone()));
        }

        Ok(())
    }

    async fn execute(&self) -> Result<(), ProbeError> {
        let url = self.url()?;
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;

        let mut request = client.get(url.as_str());
        if !self.username.is_empty() || !self.password.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request.send().await?;
        let actual = response.status().as_u16();

        if actual != self.expected_code {
            return Err(ProbeError::UnexpectedStatus {
                expected: self.expected_code,
                actual,
            });
        }

        tracing::debug!(%url, status = actual, "http probe succeeded");
        Ok(())
    }
}
