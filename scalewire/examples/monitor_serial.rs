//! Background monitoring example
//!
//! Loads connection settings from a TOML file:
//!
//! ```toml
//! protocol = "filizola"
//! monitoring = true
//! monitor_delay_ms = 250
//!
//! [transport]
//! kind = "serial"
//! port = "/dev/ttyUSB0"
//! baud_rate = 9600
//! ```

use std::time::Duration;

use scalewire::{ConnectionConfig, Scale};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("scalewire=debug")
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "scale.toml".to_string());
    let config = ConnectionConfig::load(&path)?;

    let mut scale = Scale::from_config(config);
    let mut readings = scale.subscribe();

    scale.connect().await?;
    scale.set_monitoring(true);

    println!("Monitoring {} for 10 seconds...", path);

    let run = async {
        loop {
            match readings.recv().await {
                Ok(reading) => println!("{}", reading),
                Err(RecvError::Lagged(missed)) => println!("Missed {} readings", missed),
                Err(RecvError::Closed) => break,
            }
        }
    };
    let _ = timeout(Duration::from_secs(10), run).await;

    scale.disconnect().await?;

    Ok(())
}
