//! `shuttlechat serve`: Start the HTTP API server.

use shuttlechat_config::AppConfig;
use tracing::info;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        info!(port, "Port overridden from the command line");
        config.gateway.port = port;
    }

    println!("shuttlechat gateway");
    println!("   Listening:  {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "   Client key: {}",
        if config.gateway.api_key.is_some() { "required" } else { "not required" }
    );
    println!("   Session TTL: {}s", config.session.ttl_secs);

    shuttlechat_gateway::start(config).await?;

    Ok(())
}
