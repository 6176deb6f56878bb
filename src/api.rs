use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::header::COOKIE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::FetchError;
use crate::http_client::http_client;
use crate::model::{Bootstrap, Fetched, Fixture, History, MyTeam};

const X_API_AUTH_HEADER: &str = "X-Api-Authorization";

/// Whether a request carries the manager's session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Session,
}

pub struct FplApi {
    client: &'static Client,
    base: String,
    cookie: Option<String>,
    x_api_auth: Option<String>,
}

impl FplApi {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base: settings.api_base().to_string(),
            cookie: settings.cookie.clone(),
            x_api_auth: settings.x_api_auth.clone(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Single GET, no retries. Non-2xx and undecodable bodies are errors.
    pub fn get_json(
        &self,
        path: &str,
        access: Access,
        query: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        self.send(path, access, query).map(|(_, value)| value)
    }

    /// Strict fetch: the caller decides whether the failure is fatal.
    pub fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        access: Access,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let (url, value) = self.send(path, access, query)?;
        serde_json::from_value(value).map_err(|source| FetchError::Decode { url, source })
    }

    /// Tolerant fetch: any failure is captured in the returned value.
    pub fn try_get<T: DeserializeOwned>(
        &self,
        path: &str,
        access: Access,
        query: &[(&str, String)],
    ) -> Fetched<T> {
        let fetched = Fetched::from(self.get(path, access, query));
        if let Some(err) = fetched.error() {
            warn!(path, error = %err, "fetch failed, continuing without it");
        }
        fetched
    }

    // Errors after the request was sent carry the full URL, query included.
    fn send(
        &self,
        path: &str,
        access: Access,
        query: &[(&str, String)],
    ) -> Result<(String, Value), FetchError> {
        let url = self.url(path);
        let mut req = self.client.get(&url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if access == Access::Session {
            if let Some(cookie) = self.cookie.as_deref() {
                req = req.header(COOKIE, cookie);
            }
        }
        if let Some(token) = self.x_api_auth.as_deref() {
            req = req.header(X_API_AUTH_HEADER, token);
        }

        debug!(%url, ?access, "GET");
        let resp = req
            .send()
            .map_err(|source| FetchError::Transport { url, source })?;
        let url = resp.url().to_string();
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }
        let body = match resp.text() {
            Ok(body) => body,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };
        match serde_json::from_str(body.trim()) {
            Ok(value) => Ok((url, value)),
            Err(source) => Err(FetchError::Decode { url, source }),
        }
    }

    pub fn bootstrap(&self) -> Result<Bootstrap, FetchError> {
        self.get("bootstrap-static/", Access::Public, &[])
    }

    pub fn fixtures_for_event(&self, gameweek: u32) -> Fetched<Vec<Fixture>> {
        self.try_get("fixtures/", Access::Public, &[("event", gameweek.to_string())])
    }

    pub fn upcoming_fixtures(&self) -> Fetched<Vec<Fixture>> {
        self.try_get("fixtures/", Access::Public, &[("future", "1".to_string())])
    }

    pub fn live(&self, gameweek: u32) -> Fetched<Value> {
        self.try_get(&format!("event/{gameweek}/live/"), Access::Public, &[])
    }

    pub fn public_picks(&self, manager_id: u64, gameweek: u32) -> Fetched<Value> {
        self.try_get(
            &format!("entry/{manager_id}/event/{gameweek}/picks/"),
            Access::Public,
            &[],
        )
    }

    pub fn history(&self, manager_id: u64) -> Fetched<History> {
        self.try_get(&format!("entry/{manager_id}/history/"), Access::Public, &[])
    }

    pub fn my_team(&self, manager_id: u64) -> Fetched<MyTeam> {
        self.try_get(&format!("my-team/{manager_id}/"), Access::Session, &[])
    }
}
