use std::fmt;

use log::{debug, warn};
use serde::Deserialize;
use url::Url;

use anyhow::{bail, Result};

use crate::http;

#[derive(Deserialize)]
struct ChallengeList {
    success: bool,
    #[serde(default)]
    data: Vec<ChallengeSummary>,
}

#[derive(Deserialize)]
struct ChallengeSummary {
    id: i64,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ChallengeEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Challenge>,
}

#[derive(Deserialize)]
pub struct Challenge {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub connection_info: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// What became of a single challenge fetch. Only `Success` carries a
/// record the caller can trust; everything else is failure bookkeeping
/// for the discovery strategy.
pub enum FetchOutcome {
    Success(Challenge),
    /// HTTP 200, but the payload's own success flag was false.
    LogicalFailure,
    NotFound,
    Transport(anyhow::Error),
    Decode(anyhow::Error),
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Success(_) => write!(f, "success"),
            FetchOutcome::LogicalFailure => write!(f, "API response indicates failure"),
            FetchOutcome::NotFound => write!(f, "not found"),
            FetchOutcome::Transport(e) => write!(f, "{}", e),
            FetchOutcome::Decode(e) => write!(f, "could not decode JSON response: {}", e),
        }
    }
}

/// Returns the ids of all visible challenges, ascending. An empty result
/// means discovery failed, not that the platform has zero challenges.
pub async fn list_challenges(client: &http::Client, base: &Url) -> Vec<i64> {
    match try_list_challenges(client, base).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Could not fetch challenge list: {}", e);
            Vec::new()
        }
    }
}

async fn try_list_challenges(client: &http::Client, base: &Url) -> Result<Vec<i64>> {
    let url = http::build_url(base, &["api", "v1", "challenges"])?;
    let response = client.get(url.as_str()).send().await?;
    response.error_for_status_ref()?;
    debug!("Response status code for challenge list: {}", response.status());
    let list: ChallengeList = response.json().await?;
    if !list.success {
        bail!("API response indicates failure or missing data");
    }
    let mut ids: Vec<i64> = list
        .data
        .iter()
        .filter(|challenge| challenge.kind != "hidden")
        .map(|challenge| challenge.id)
        .collect();
    ids.sort_unstable();
    Ok(ids)
}

pub async fn get_challenge(client: &http::Client, base: &Url, id: i64) -> FetchOutcome {
    let url = match http::build_url(base, &["api", "v1", "challenges", &id.to_string()]) {
        Ok(url) => url,
        Err(e) => return FetchOutcome::Transport(e),
    };
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => return FetchOutcome::Transport(e.into()),
    };
    debug!("Response status code for challenge {}: {}", id, response.status());
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return FetchOutcome::NotFound;
    }
    if let Err(e) = response.error_for_status_ref() {
        return FetchOutcome::Transport(e.into());
    }
    let envelope: ChallengeEnvelope = match response.json().await {
        Ok(envelope) => envelope,
        Err(e) => return FetchOutcome::Decode(e.into()),
    };
    match envelope {
        ChallengeEnvelope {
            success: true,
            data: Some(challenge),
        } => FetchOutcome::Success(challenge),
        _ => FetchOutcome::LogicalFailure,
    }
}
