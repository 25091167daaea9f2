use std::path::PathBuf;

use url::Url;

use anyhow::Result;

use crate::discovery::Strategy;

/// Everything one run needs. Built once from the command line and passed
/// down; nothing here is mutated after construction.
pub struct Config {
    pub base: Url,
    /// Domain as given on the command line, scheme stripped. Used for
    /// status text and the per-run output directory name.
    pub site: String,
    pub session_cookie: String,
    pub csrf_token: Option<String>,
    pub output: PathBuf,
    pub download: bool,
    pub strategy: Strategy,
}

impl Config {
    /// Per-run output root, keyed by the platform domain.
    pub fn ctf_dir(&self) -> PathBuf {
        self.output.join(self.site.replace('.', "_"))
    }
}

/// Accepts either a bare domain or a full URL; bare domains get https.
pub fn base_url(domain: &str) -> Result<Url> {
    let url = if domain.contains("://") {
        Url::parse(domain)?
    } else {
        Url::parse(&format!("https://{}", domain))?
    };
    Ok(url)
}

pub fn site_name(domain: &str) -> &str {
    let name = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    name.trim_end_matches('/')
}
