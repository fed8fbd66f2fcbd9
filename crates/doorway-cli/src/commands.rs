//! Subcommand implementations.

use crate::wiring;
use anyhow::{Context, Result};
use doorway_core::Config;
use doorway_gate::{ConsoleFeedback, Supervisor};
use doorway_network::{VerificationClient, VerificationClientConfig};
use tracing::{info, warn};

/// `doorway run`: resolve the authority, open the devices, run the gate
/// until a shutdown signal.
pub async fn run(config: &Config) -> Result<()> {
    let authority = wiring::authority_url(config).await?;
    let client = VerificationClient::new(VerificationClientConfig {
        base_url: authority.to_string(),
        timeout: config.authority.timeout(),
    })
    .context("Failed to create verification client")?;

    let wiring::Wired { peripherals, mocks } = wiring::peripherals(config).await?;
    if mocks.in_use() {
        warn!("Mock devices idle until the process is stopped");
    }

    info!(
        version = doorway_core::VERSION,
        %authority,
        lock_pin = config.lock.pin,
        buzzer_pin = config.buzzer.pin,
        "Doorway starting"
    );

    Supervisor::new(peripherals, client, ConsoleFeedback, config)
        .run()
        .await
        .context("Gate stopped with an error")?;

    drop(mocks);
    info!("Doorway stopped");
    Ok(())
}

/// `doorway read-one`: print the next tag's identifier and text block.
pub async fn read_one(config: &Config) -> Result<()> {
    let (mut reader, _mock) = wiring::tag_reader(config).await?;
    info!("Waiting for a tag");

    let read = tokio::select! {
        read = doorway_gate::read_one(&mut reader) => read.context("Tag read failed")?,
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted");
            return Ok(());
        }
    };

    if let Some(id) = read.id {
        println!("{id}");
    }
    if !read.text.is_empty() {
        println!("{}", read.text);
    }
    Ok(())
}
