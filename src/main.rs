/***********************************************************
 *
 *      ipwake - ping, wake and redirect for LAN hosts.
 *          /verify  probe or redirect to the waiting page
 *          /ping    liveness polling
 *          /wake    Wake-on-LAN magic packet
 *
 ***********************************************************/

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use ipwake::core::sockparse::{parse_broadcast, parse_listen_addr};
use ipwake::{AppConfig, AppState, ConfigError, VerifyMode, WakeMode};

#[derive(Parser, Debug)]
#[command(name = "ipwake", version, about = "Ping, wake and redirect for LAN hosts")]
struct Cli {
    /// TCP address to listen on (":8080" means all interfaces).
    #[arg(long, env = "IPWAKE_ADDR", default_value = ":8080")]
    addr: String,

    /// Seconds a successful probe is trusted before re-probing.
    #[arg(long, env = "IPWAKE_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Directory to serve static files from.
    #[arg(long, env = "IPWAKE_DIR", default_value = "frontend/build/")]
    dir: PathBuf,

    /// External base URL for absolute redirects.
    #[arg(long, env = "IPWAKE_REDIRECT_BASE")]
    redirect_base: Option<String>,

    /// Parameter shape for /verify.
    #[arg(long, env = "IPWAKE_VERIFY_MODE", value_enum, default_value_t = VerifyMode::Port)]
    verify_mode: VerifyMode,

    /// Destination for /wake.
    #[arg(long, env = "IPWAKE_WAKE_MODE", value_enum, default_value_t = WakeMode::Host)]
    wake_mode: WakeMode,

    /// Broadcast IP, or a CIDR block whose broadcast address is used.
    #[arg(long, env = "IPWAKE_BROADCAST", default_value = "255.255.255.255")]
    broadcast: String,

    /// Wake-on-LAN UDP port used in broadcast mode.
    #[arg(long, env = "IPWAKE_WOL_PORT", default_value_t = 9)]
    wol_port: u16,

    /// Probe timeout for /ping, in milliseconds.
    #[arg(long, env = "IPWAKE_PING_TIMEOUT_MS", default_value_t = 200)]
    ping_timeout_ms: u64,

    /// Probe timeout for /verify, in milliseconds.
    #[arg(long, env = "IPWAKE_VERIFY_TIMEOUT_MS", default_value_t = 1000)]
    verify_timeout_ms: u64,

    /// Log every request.
    #[arg(short, long, env = "IPWAKE_VERBOSE")]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig, ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(AppConfig {
            listen_addr: parse_listen_addr(&self.addr)?,
            checking_interval: Duration::from_secs(self.timeout),
            static_dir: self.dir,
            redirect_base: self.redirect_base.filter(|base| !base.is_empty()),
            verify_mode: self.verify_mode,
            wake_mode: self.wake_mode,
            broadcast: parse_broadcast(&self.broadcast)?,
            wol_port: self.wol_port,
            ping_timeout: Duration::from_millis(self.ping_timeout_ms),
            verify_timeout: Duration::from_millis(self.verify_timeout_ms),
            verbose: self.verbose,
        })
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "info,ipwake=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config().context("invalid configuration")?;
    info!(
        addr = %config.listen_addr,
        checking_interval_secs = config.checking_interval.as_secs(),
        dir = %config.static_dir.display(),
        verify_mode = ?config.verify_mode,
        wake_mode = ?config.wake_mode,
        "ipwake starting"
    );

    let state = AppState::new(config);
    ipwake::run_web_server(state)
        .await
        .context("Error in ListenAndServe")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        let cause = format!("{e:#}");
        error!(error = %cause, "ipwake stopped");
        return Err(e);
    }
    Ok(())
}
