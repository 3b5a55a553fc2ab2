//! `portcall serve` — start the HTTP gateway.

use portcall_config::AppConfig;

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;
    if let Some(port) = port {
        config.gateway.port = port;
    }

    portcall_gateway::start(config).await
}
