//! `portcall doctor` — connectivity diagnostics for the configured
//! provider and the booking backend.

use portcall_backend::ApiClient;
use portcall_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    println!("Configuration: {config:?}");
    println!();

    match portcall_providers::from_config(&config) {
        Ok(handle) => {
            print!(
                "Provider '{}' (model {}): ",
                handle.provider.name(),
                handle.model
            );
            match handle.provider.health_check().await {
                Ok(true) => println!("reachable"),
                Ok(false) => println!("responded with an error status"),
                Err(e) => println!("unreachable ({e})"),
            }
        }
        Err(e) => println!("Provider: not configured ({e})"),
    }

    let backend = ApiClient::from_config(&config.backend);
    print!("Backend {}: ", config.backend.api_base_url);
    match backend.ping().await {
        Ok(true) => println!("reachable"),
        Ok(false) => println!("responded with an error status"),
        Err(e) => println!("unreachable ({e})"),
    }

    Ok(())
}
