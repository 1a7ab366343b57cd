// src/mcp_server.rs

use anyhow::{Context, Result};
use rmcp::{
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool,
    transport::stdio,
    Error as McpError, ServerHandler, ServiceExt,
};
use smp_air::{format_flight_results, FlightSearchService, SearchArguments, SmpConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Flight search MCP server
#[derive(Clone)]
pub struct FlightServer {
    service: Arc<FlightSearchService>,
}

impl FlightServer {
    pub fn new(service: FlightSearchService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Initialize logging to a daily rolling file; stdout belongs to the protocol.
    fn init_logging(log_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "smp-air-mcp.log");
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("info").add_directive("smp_air=debug".parse()?),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            )
            .try_init()?;

        info!(log_dir = %log_dir.display(), "Logging initialized");
        Ok(())
    }
}

#[tool(tool_box)]
impl FlightServer {
    #[tool(description = "Search for flights using SMP Air API. Supports one-way and round-trip searches with various cabin classes and passenger counts.")]
    async fn search_flights(
        &self,
        #[tool(aggr)] arguments: SearchArguments,
    ) -> Result<CallToolResult, McpError> {
        info!(arguments = ?arguments.0, "Flight search request received");

        let response = self.service.search_arguments(&arguments).await;
        let text = format_flight_results(&response);

        if response.has_errors() {
            error!(errors = ?response.errors, "Flight search returned errors");
            return Ok(CallToolResult::error(vec![Content::text(text)]));
        }

        info!(
            flights_found = response.flights.len(),
            warnings = response.warnings.len(),
            "Flight search completed"
        );
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool(tool_box)]
impl ServerHandler for FlightServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Flight search over the SMP Air itinerary API. Call search_flights with 3-letter IATA codes and YYYY-MM-DD dates; add returnDate for a round trip.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Unconfigured is not a state we start in
    let config = SmpConfig::load().context("Invalid configuration. Please check your SMP_* environment variables.")?;

    if let Err(e) = FlightServer::init_logging(&config.log_dir) {
        eprintln!("Failed to initialize logging: {}", e);
        // Continue without logging rather than failing
    }

    info!(
        mode = %config.mode,
        company_id = %config.company_id,
        base_url = %config.api_base_url,
        "Starting SMP Air MCP server"
    );

    let service = FlightSearchService::new(Arc::new(config)).context("Failed to build SMP Air client")?;
    let server = FlightServer::new(service);
    let transport = stdio();

    debug!("About to start MCP service");

    // SDK handles initialization, tool discovery, and message routing
    let service = server.serve(transport).await?;

    info!("MCP service started, waiting for requests");

    // Runs until the client disconnects or the process is signalled
    tokio::select! {
        quit = service.waiting() => {
            quit?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received interrupt, shutting down");
        }
    }

    info!("MCP service shutting down");
    Ok(())
}
