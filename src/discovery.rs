use log::{info, warn};

use anyhow::{bail, Result};

use crate::api::{self, FetchOutcome};
use crate::config::Config;
use crate::http;
use crate::mirror;

/// How challenge ids are discovered: trust the platform's own listing, or
/// probe sequential ids until the failure budget runs out.
pub enum Strategy {
    Auto,
    Manual {
        start: i64,
        stop: Option<i64>,
        max_failures: u32,
    },
}

impl Strategy {
    /// A starting id selects manual mode; its absence selects auto mode.
    pub fn new(start: Option<i64>, stop: Option<i64>, max_failures: u32) -> Strategy {
        match start {
            Some(start) => Strategy::Manual {
                start,
                stop,
                max_failures,
            },
            None => Strategy::Auto,
        }
    }
}

/// Counts consecutive unsuccessful fetches in manual mode. Auto mode does
/// not use this: its id list is authoritative, so isolated fetch failures
/// are just skipped.
pub struct FailureBudget {
    limit: u32,
    consecutive: u32,
}

impl FailureBudget {
    pub fn new(limit: u32) -> FailureBudget {
        FailureBudget {
            limit,
            consecutive: 0,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// Returns true once the budget is exhausted.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive += 1;
        self.consecutive >= self.limit
    }
}

pub async fn run(config: &Config) -> Result<()> {
    let client = http::mk_client(config)?;
    let ctf_dir = config.ctf_dir();
    std::fs::create_dir_all(&ctf_dir)?;
    match &config.strategy {
        Strategy::Auto => run_auto(&client, config).await?,
        Strategy::Manual {
            start,
            stop,
            max_failures,
        } => run_manual(&client, config, *start, *stop, *max_failures).await?,
    }
    info!("Challenge markdown files saved in {}", ctf_dir.display());
    Ok(())
}

async fn run_auto(client: &http::Client, config: &Config) -> Result<()> {
    info!("Auto-fetching challenge ids from {}", config.site);
    let ids = api::list_challenges(client, &config.base).await;
    if ids.is_empty() {
        bail!("Could not fetch challenge ids; check the session cookie and domain");
    }
    info!("Found {} available challenges: {:?}", ids.len(), ids);
    for id in ids {
        info!("Processing challenge {}", id);
        match api::get_challenge(client, &config.base, id).await {
            FetchOutcome::Success(challenge) => {
                mirror::mirror_challenge(client, config, &challenge).await?
            }
            outcome => warn!("Skipping challenge {}: {}", id, outcome),
        }
    }
    Ok(())
}

async fn run_manual(
    client: &http::Client,
    config: &Config,
    start: i64,
    stop: Option<i64>,
    max_failures: u32,
) -> Result<()> {
    match stop {
        Some(stop) => info!("Manual mode: fetching challenges from {} to {}", start, stop),
        None => info!("Manual mode: fetching challenges from {} onwards", start),
    }
    let mut budget = FailureBudget::new(max_failures);
    let mut id = start;
    loop {
        if let Some(stop) = stop {
            if id > stop {
                info!("Stopping at challenge id {} as requested", stop);
                break;
            }
        }
        info!("Fetching challenge {} from {}", id, config.site);
        match api::get_challenge(client, &config.base, id).await {
            FetchOutcome::Success(challenge) => {
                mirror::mirror_challenge(client, config, &challenge).await?;
                budget.record_success();
            }
            outcome => {
                warn!("Challenge {} skipped: {}", id, outcome);
                if budget.record_failure() {
                    info!(
                        "Stopping after {} consecutive failures; no more challenges found",
                        max_failures
                    );
                    break;
                }
            }
        }
        id += 1;
    }
    Ok(())
}
