use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use regex::Regex;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use anyhow::Result;

use crate::api::Challenge;
use crate::config::Config;
use crate::http;
use crate::resolver;

/// Fixed name of the markdown document inside each challenge folder.
pub const MARKDOWN_FILENAME: &str = "readme.md";

/// What happened to one file reference, in listed order.
pub enum FileEntry {
    /// Platform-hosted file fetched into the challenge folder.
    Downloaded { filename: String },
    /// Platform-hosted file whose download failed; links back to the
    /// platform instead.
    Failed { filename: String, url: String },
    /// External file, or downloads disabled; linked without fetching.
    Remote { filename: String, url: String },
}

/// Maps any character outside [A-Za-z0-9_] to an underscore.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn challenge_dir(config: &Config, challenge: &Challenge) -> PathBuf {
    config
        .ctf_dir()
        .join(sanitize(&challenge.category))
        .join(format!("{}_{}", sanitize(&challenge.name), challenge.id))
}

fn mk_progress_bar() -> Result<ProgressBar> {
    Ok(ProgressBar::new(0)
        .with_style(ProgressStyle::default_bar().template("{wide_msg} {bytes}/{total_bytes}")?))
}

async fn download_1(
    client: &http::Client,
    url: &str,
    path: &Path,
    progress_bar: &ProgressBar,
) -> Result<()> {
    let mut response = client.get(url).send().await?;
    response.error_for_status_ref()?;
    if let Some(content_length) = response.content_length() {
        progress_bar.set_length(content_length);
    }
    let mut file = File::create(path).await?;
    loop {
        let chunk = response.chunk().await?;
        if let Some(chunk) = chunk {
            file.write_all(&chunk).await?;
            progress_bar.inc(chunk.len() as u64);
        } else {
            break;
        }
    }
    file.flush().await?;
    Ok(())
}

async fn download(client: &http::Client, url: &str, path: &Path) -> Result<()> {
    let progress_bar = mk_progress_bar()?;
    progress_bar.set_message(format!("DOWNLOAD {}", url));
    let result = download_1(client, url, path, &progress_bar).await;
    if let Err(e) = &result {
        progress_bar.finish_with_message(format!("ERROR DOWNLOAD {}: {}", url, e));
    } else {
        progress_bar.finish_and_clear();
    }
    result
}

/// Materializes one fetched challenge: creates its folder, downloads
/// platform-hosted attachments one at a time, then writes readme.md.
/// A single file's download failure never aborts the challenge.
pub async fn mirror_challenge(
    client: &http::Client,
    config: &Config,
    challenge: &Challenge,
) -> Result<()> {
    let dir = challenge_dir(config, challenge);
    std::fs::create_dir_all(&dir)?;
    let mut entries = Vec::new();
    for file_ref in &challenge.files {
        let resolved = resolver::resolve_file(&config.base, file_ref);
        if resolved.local && config.download {
            let path = dir.join(&resolved.filename);
            info!("Downloading file: {} to {}", resolved.url, path.display());
            match download(client, &resolved.url, &path).await {
                Ok(()) => entries.push(FileEntry::Downloaded {
                    filename: resolved.filename,
                }),
                Err(e) => {
                    warn!("Download error for {}: {}", resolved.url, e);
                    entries.push(FileEntry::Failed {
                        filename: resolved.filename,
                        url: resolved.url,
                    });
                }
            }
        } else {
            entries.push(FileEntry::Remote {
                filename: resolved.filename,
                url: resolved.url,
            });
        }
    }
    let markdown = render_markdown(challenge, &entries, &config.site)?;
    let path = dir.join(MARKDOWN_FILENAME);
    std::fs::write(&path, markdown)?;
    info!(
        "Markdown file created for challenge {}: {}",
        challenge.id,
        path.display()
    );
    Ok(())
}

/// Renders the complete markdown document for a challenge. `files` must
/// have one entry per file reference, in the original order.
pub fn render_markdown(challenge: &Challenge, files: &[FileEntry], site: &str) -> Result<String> {
    let mut markdown = format!("# {}\n\n", challenge.name);
    markdown += &format!("**ID:** {}\n", challenge.id);
    markdown += &format!("**Value:** {} points\n", challenge.value);
    markdown += &format!("**Category:** {}\n", challenge.category);
    if challenge.tags.is_empty() {
        markdown += "**Tags:** None\n";
    } else {
        markdown += &format!("**Tags:** {}\n", challenge.tags.join(", "));
    }
    markdown += "\n";
    let tag_regex = Regex::new(r"<[^>]*>")?;
    markdown += &format!(
        "## Description\n{}\n\n",
        tag_regex.replace_all(&challenge.description, "")
    );
    if let Some(connection_info) = &challenge.connection_info {
        if !connection_info.is_empty() {
            markdown += &format!("## Connection\n```\n{}\n```\n\n", connection_info);
        }
    }
    if files.is_empty() {
        markdown += "## Files\nNo files provided.\n";
    } else {
        markdown += "## Files\n";
        let mut local_links = Vec::new();
        for entry in files {
            match entry {
                FileEntry::Downloaded { filename } => {
                    local_links.push(format!("- [{}](./{})", filename, filename));
                }
                FileEntry::Failed { filename, url } => {
                    markdown += &format!(
                        "- [Download {} from the CTF platform]({}) (download failed)\n",
                        filename, url
                    );
                }
                FileEntry::Remote { filename, url } => {
                    markdown += &format!("- [{}]({})\n", filename, url);
                }
            }
        }
        if local_links.is_empty() {
            markdown += "\nNo files downloaded.\n";
        } else {
            markdown += &format!("\n**Local Files:**\n{}\n", local_links.join("\n"));
        }
    }
    markdown += &format!("\n---\n*Extracted from [{} CTF](https://{})*\n", site, site);
    Ok(markdown)
}
