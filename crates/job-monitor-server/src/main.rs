use clap::Parser;

use job_monitor_server::config::{utc_offset_from_minutes, ServerConfig};
use job_monitor_server::logging::init_logging;
use job_monitor_server::run_server;

#[derive(Parser, Debug, Clone)]
#[command(name = "job-monitor-server")]
#[command(about = "Quantum job dashboard HTTP server")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value = "9002")]
    port: u16,

    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Base URL of the upstream job tracker
    #[arg(long, env = "BACKEND_API_URL")]
    upstream_url: Option<String>,

    /// Maximum number of jobs requested from the upstream tracker
    #[arg(long, env = "JOB_LIMIT", default_value = "5000")]
    job_limit: u32,

    /// Seconds a demo snapshot stays cached
    #[arg(long, env = "CACHE_TTL_SECS", default_value = "60")]
    cache_ttl_secs: u64,

    /// Number of jobs in a demo batch
    #[arg(long, env = "SYNTHETIC_JOBS", default_value = "200")]
    synthetic_jobs: usize,

    /// Observer calendar offset from UTC in minutes
    #[arg(
        long,
        env = "UTC_OFFSET_MINUTES",
        default_value = "0",
        allow_hyphen_values = true
    )]
    utc_offset_minutes: i32,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("failed to load .env: {err}");
        }
    }

    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        upstream_url: cli.upstream_url,
        job_limit: cli.job_limit,
        synthetic_jobs: cli.synthetic_jobs,
        utc_offset: utc_offset_from_minutes(cli.utc_offset_minutes)?,
        ..ServerConfig::default()
    }
    .with_cache_ttl_secs(cli.cache_ttl_secs);

    log::info!("Starting job monitor server on port {}", config.port);
    if cli.debug {
        log::debug!("Server configuration: {:?}", config);
    }

    run_server(config).await
}
