use clap::Parser;
use console::{Term, style};
use std::process;
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ntpwatch::services::scheduler;
use ntpwatch::{AlertSink, HealthMonitor, HealthState, MonitorConfig, NtpProbe, SystemDiagnostics};

#[derive(Parser, Debug)]
#[command(name = "ntpwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Watch an NTP server and alert on reachability and offset changes")]
struct Args {
    /// NTP server to watch (host, host:port or [v6]:port)
    #[arg(short, long, env = "NTP_SERVER", default_value = "pool.ntp.org")]
    server: String,

    /// Largest acceptable absolute clock offset, in seconds
    #[arg(short, long, env = "OFFSET_THRESHOLD", default_value_t = 0.5)]
    threshold: f64,

    /// Seconds between two checks
    #[arg(short, long, env = "CHECK_INTERVAL", default_value_t = 60.0)]
    interval: f64,

    /// Attempts per check before the server is declared unreachable
    #[arg(short, long, env = "RETRY_COUNT", default_value_t = 1)]
    retries: u32,

    /// Seconds to wait between two attempts
    #[arg(long, env = "RETRY_DELAY", default_value_t = 5.0)]
    retry_delay: f64,

    /// Timeout in seconds for each NTP, DNS, ping and alert call
    #[arg(long, env = "PROBE_TIMEOUT", default_value_t = 5.0)]
    timeout: f64,

    /// Tag prefixed to every alert, e.g. a site name
    #[arg(short, long, env = "LOCATION")]
    location: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_token: Option<String>,

    /// Telegram chat receiving the alerts
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    telegram_chat_id: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_URL")]
    telegram_api: Option<String>,

    /// Use IPv6 resolution only
    #[arg(short = '6', long)]
    ipv6: bool,

    /// Stop after this many checks (runs forever when absent)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn fail(term: &Term, msg: &str) -> ! {
    term.write_line(&style(format!("Error: {msg}")).red().bold().to_string())
        .ok();
    process::exit(2);
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let term = Term::stderr();

    let default_level = if args.verbose { "ntpwatch=debug" } else { "ntpwatch=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let config = match MonitorConfig::from_raw(
        &args.server,
        args.threshold,
        args.interval,
        args.retries,
        args.retry_delay,
        args.timeout,
        args.location,
        args.ipv6,
        args.telegram_token,
        args.telegram_chat_id,
        args.telegram_api,
    ) {
        Ok(cfg) => cfg,
        Err(e) => fail(&term, &e.to_string()),
    };

    let notifier = match AlertSink::from_config(&config) {
        Ok(n) => n,
        Err(e) => fail(&term, &e.to_string()),
    };

    let monitor = HealthMonitor::new(
        &config,
        NtpProbe::new(config.timeout, config.ipv6_only),
        SystemDiagnostics::new(config.timeout, config.ipv6_only),
        notifier,
    );

    let (stop_tx, stop_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        stop_tx.send(()).ok();
    });

    let mut state = HealthState::default();
    scheduler::run(&monitor, &mut state, config.interval, args.count, stop_rx).await;
}
