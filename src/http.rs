use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

use anyhow::{anyhow, Result};

use crate::config::Config;

pub type Client = reqwest::Client;

/* Applies to every request, including the full body read on downloads. */
const TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

pub fn build_url(base: &Url, path: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("cannot be base"))?
        .pop_if_empty()
        .extend(path);
    Ok(url)
}

/* Some CTFd instances reject requests that do not look like they come from
the challenges page, so send the header set a browser would. */
fn default_headers(config: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("session={}", config.session_cookie))?,
    );
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::REFERER,
        HeaderValue::from_str(build_url(&config.base, &["challenges"])?.as_str())?,
    );
    if let Some(token) = &config.csrf_token {
        headers.insert("csrf-token", HeaderValue::from_str(token)?);
    }
    Ok(headers)
}

pub fn mk_client(config: &Config) -> Result<Client> {
    let client = reqwest::Client::builder()
        .default_headers(default_headers(config)?)
        .timeout(TIMEOUT)
        .build()?;
    Ok(client)
}
