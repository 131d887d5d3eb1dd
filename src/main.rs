//! MCP Tool Gateway Entry Point
//!
//! Initializes logging, loads configuration (environment, then command-line
//! flags) and starts the server on the configured transport.

use anyhow::Result;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use mcp_tool_gateway::core::{Config, McpServer, TransportConfig, TransportService};

/// Command-line overrides for the environment configuration.
#[derive(Debug, Parser)]
#[command(name = "mcp-tool-gateway", version, about)]
struct Cli {
    /// Host to bind the SSE server to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on for the SSE server
    #[arg(long)]
    port: Option<u16>,

    /// Serve over stdin/stdout instead of SSE
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let mut config = Config::from_env();
    apply_cli(&mut config, &cli)?;

    init_logging(&config.logging.level, config.logging.with_timestamps);

    info!("Starting {} v{}", config.server.name, config.server.version);

    let server = McpServer::new(config.clone());

    info!(
        "Server initialized with tools: {}",
        server.registry().tool_names().join(", ")
    );

    let transport = TransportService::new(config.transport);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Apply command-line flags on top of the environment configuration.
fn apply_cli(config: &mut Config, cli: &Cli) -> Result<()> {
    if cli.stdio {
        #[cfg(feature = "stdio")]
        {
            config.transport = TransportConfig::stdio();
            return Ok(());
        }
        #[cfg(not(feature = "stdio"))]
        anyhow::bail!("--stdio requires the `stdio` feature");
    }

    if cli.host.is_none() && cli.port.is_none() {
        return Ok(());
    }

    #[cfg(feature = "sse")]
    {
        let mut sse = match &config.transport {
            TransportConfig::Sse(sse) => sse.clone(),
            #[allow(unreachable_patterns)]
            _ => Default::default(),
        };
        if let Some(host) = &cli.host {
            sse.host = host.clone();
        }
        if let Some(port) = cli.port {
            sse.port = port;
        }
        config.transport = TransportConfig::Sse(sse);
        Ok(())
    }

    #[cfg(not(feature = "sse"))]
    anyhow::bail!("--host and --port require the `sse` feature")
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout carries the STDIO transport.
fn init_logging(level: &str, with_timestamps: bool) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
