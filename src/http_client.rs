use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};

pub const REQUEST_TIMEOUT_SECS: u64 = 20;

const SITE_ORIGIN: &str = "https://fantasy.premierleague.com";
const CLIENT_AGENT: &str = "FPL-Context/1.0 (+https://fantasy.premierleague.com)";

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(default_headers())
            .build()
            .context("failed to build http client")
    })
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_AGENT));
    headers.insert(ORIGIN, HeaderValue::from_static(SITE_ORIGIN));
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://fantasy.premierleague.com/"),
    );
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers
}
