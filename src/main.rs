/// Version injected at compile time via OSMCP_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("OSMCP_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use osmcp::config::OpenStackConfig;
use osmcp::openstack::session::Session;
use osmcp::server;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// MCP server publishing OpenStack resources
#[derive(Parser, Debug)]
#[command(name = "osmcp", version = VERSION, about, long_about = None)]
struct Args {
    /// Keystone authentication URL (required)
    #[arg(long, env = "OS_AUTH_URL", default_value = "")]
    auth_url: String,

    /// OpenStack username (required)
    #[arg(long, env = "OS_USERNAME", default_value = "")]
    username: String,

    /// OpenStack password (required)
    #[arg(long, env = "OS_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Project to scope the session to (required)
    #[arg(long, env = "OS_PROJECT_NAME", default_value = "")]
    project: String,

    /// Region whose endpoints are used (required)
    #[arg(long, env = "OS_REGION_NAME", default_value = "")]
    region: String,

    /// Domain the user belongs to
    #[arg(long, env = "OS_USER_DOMAIN_NAME", default_value = "")]
    user_domain_name: String,

    /// Domain the project belongs to
    #[arg(long, env = "OS_PROJECT_DOMAIN_NAME", default_value = "")]
    project_domain_name: String,

    /// Address to serve the provider interface on
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) {
    let Some(tracing_level) = level.to_tracing_level() else {
        return;
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(tracing_level).into())
        .from_env_lossy();

    // Logs go to stderr so stdout stays free for tooling
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.log_level);

    let config = OpenStackConfig {
        auth_url: args.auth_url,
        username: args.username,
        password: args.password,
        project_name: args.project,
        region: args.region,
        user_domain_name: args.user_domain_name,
        project_domain_name: args.project_domain_name,
    };
    config.validate()?;

    tracing::info!(
        version = VERSION,
        region = %config.region,
        project = %config.project_name,
        "starting OpenStack MCP server"
    );

    let session = Session::connect(&config).await?;

    server::serve(args.listen, Arc::new(session)).await
}
