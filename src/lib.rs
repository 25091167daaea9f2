use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Once;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

pub mod api;
pub mod config;
pub mod discovery;
pub mod http;
pub mod mirror;
pub mod resolver;

/// Mirrors a CTFd challenge set into a local tree of markdown files and
/// downloaded attachments
#[derive(Parser)]
struct Opts {
    /// Session cookie from the browser
    #[clap(short = 'S', long)]
    session_cookie: String,

    /// Domain of the CTFd platform (example: dh.securinets.tn)
    #[clap(short = 'D', long)]
    domain: String,

    /// Parent output directory for CTF challenge folders
    #[clap(short = 'O', long, default_value = "output")]
    output: PathBuf,

    /// Starting challenge ID (enables manual mode instead of auto-discovery)
    #[clap(long)]
    start_id: Option<i64>,

    /// Stopping challenge ID (only used with --start-id in manual mode)
    #[clap(long)]
    stop_id: Option<i64>,

    /// Disable file downloading
    #[clap(long)]
    no_download: bool,

    /// Maximum consecutive failures before stopping (manual mode only)
    #[clap(long, default_value_t = 10)]
    max_failures: u32,

    /// CSRF token for API requests
    #[clap(long)]
    csrf_token: Option<String>,

    /// Verbosity level (0: quiet, 1: normal, 2: verbose)
    #[clap(short, long, default_value_t = 1)]
    verbosity: u8,
}

pub async fn main<I, T>(args: I, current_dir: PathBuf) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let opts: Opts = Opts::try_parse_from(args)?;
    init_logging(opts.verbosity);
    let output = if opts.output.is_absolute() {
        opts.output
    } else {
        current_dir.join(opts.output)
    };
    let config = config::Config {
        base: config::base_url(&opts.domain)?,
        site: config::site_name(&opts.domain).to_owned(),
        session_cookie: opts.session_cookie,
        csrf_token: opts.csrf_token,
        output,
        download: !opts.no_download,
        strategy: discovery::Strategy::new(opts.start_id, opts.stop_id, opts.max_failures),
    };
    discovery::run(&config).await
}

#[tokio::main]
pub async fn main_sync<I, T>(args: I, current_dir: PathBuf) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    main(args, current_dir).await
}

static INIT_LOGGING: Once = Once::new();

pub fn init_logging(verbosity: u8) {
    INIT_LOGGING.call_once(|| {
        let level = match verbosity {
            0 => LevelFilter::Error,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();
    });
}
