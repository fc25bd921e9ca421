//! Example: Reading and changing TV state
//!
//! Run with: AQUOS_HOST=192.168.1.40 RUST_LOG=aquos_rc=debug cargo run --example remote
//!
//! This example demonstrates:
//! - Querying state with the `get_*` methods
//! - Changing state with the `set_*` methods
//! - Handling a command the TV refuses
//! - Seeing the protocol exchange through `tracing`

use aquos_rc::{AquosError, Client, ClientConfig, DEFAULT_PORT};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> aquos_rc::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // =========================================================================
    // Connect settings
    // =========================================================================

    let host = std::env::var("AQUOS_HOST").unwrap_or_else(|_| "192.168.1.40".to_string());
    let username = std::env::var("AQUOS_USER").unwrap_or_default();
    let password = std::env::var("AQUOS_PASSWORD").unwrap_or_default();

    let config = ClientConfig::new(host, DEFAULT_PORT, username, password)
        .with_timeout(Duration::from_secs(3));
    let client = Client::new(config)?;

    // =========================================================================
    // Device information
    // =========================================================================

    println!("=== Device ===\n");

    let info = client.info()?;
    println!("Name:    {}", info.name);
    println!("Model:   {}", info.model);
    println!("Version: {}", info.version);

    // =========================================================================
    // Reading state
    // =========================================================================

    println!("\n=== State ===\n");

    let power = client.get_power()?;
    println!("Power:  {}", if power == 1 { "on" } else { "standby" });

    if power == 0 {
        println!("TV is in standby, turning it on");
        client.set_power(1)?;
    }

    println!("Input:  {}", client.get_input()?);
    println!("Volume: {}", client.get_volume()?);

    // =========================================================================
    // Changing state
    // =========================================================================

    println!("\n=== Changes ===\n");

    client.set_input(1)?;
    println!("Switched to HDMI 1");

    let volume = client.get_volume()?;
    client.set_volume((volume + 2).min(100))?;
    println!("Volume {} -> {}", volume, (volume + 2).min(100));

    // Not every model supports every AV mode
    match client.set_av_mode(17) {
        Ok(()) => println!("AV mode: movie THX"),
        Err(AquosError::DeviceRejected { token }) => {
            println!("AV mode THX not supported ({})", token)
        }
        Err(e) => return Err(e),
    }

    // Validation happens before any connection is made
    if let Err(e) = client.set_volume(150) {
        println!("Rejected locally: {}", e);
    }

    Ok(())
}
