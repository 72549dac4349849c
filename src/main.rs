use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unicare_relay::RelayConfig;

/// Main entry point for the UniCare relay
///
/// Serves the notification relay: push payloads come in on `POST /notifications` and fan
/// out to open sessions on `GET /notifications/stream`.
///
/// # Environment Variables
/// - `UNICARE_RELAY_ADDR`: listen address (default: "0.0.0.0:3000")
/// - `UNICARE_RELAY_API_KEY`: key publishers must send in `x-api-key` (required)
/// - `UNICARE_CHANNEL`: broadcast channel name (default: "fcm-channel")
///
/// # Errors
/// Returns an error if logging cannot be initialised, the API key is missing, the
/// configuration is invalid, the address cannot be bound, or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("unicare_relay=info".parse()?)
                .add_directive("unicare_messaging=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::from_env()?;
    unicare_relay::serve(config).await?;

    Ok(())
}
