//! Manual read over TCP example

use scalewire::{Protocol, Scale, TransportConfig};

#[tokio::main]
async fn main() -> scalewire::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let host = std::env::var("SCALE_HOST").unwrap_or_else(|_| "192.168.1.40".to_string());
    let protocol = match std::env::var("SCALE_PROTOCOL") {
        Ok(name) => name.parse::<Protocol>()?,
        Err(_) => Protocol::Toledo,
    };

    let mut scale = Scale::new(TransportConfig::tcp(host, 9100)).with_protocol(protocol);
    scale.connect().await?;

    println!("Scale connected!");

    for _ in 0..3 {
        let weight = match scale.read_once().await {
            Ok(weight) => weight,
            Err(e) if e.is_lifecycle() => {
                println!("Scale unavailable: {}", e);
                break;
            }
            Err(e) => return Err(e),
        };

        match weight.sentinel() {
            Some(condition) => println!("Scale reports {}", condition),
            None => println!("Weight: {:.3} kg ({} g)", weight.kilograms(), weight.grams()),
        }
    }

    scale.disconnect().await?;

    Ok(())
}
