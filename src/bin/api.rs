use finance_dialogue_router::api::{start_server, ApiState, BackendConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        eprintln!("⚠️  GEMINI_API_KEY not set in .env");
        eprintln!("📌 Falling back to the mock backend");
        String::new()
    });

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("🚀 Finance Dialogue Router - API Server");
    info!("📍 Port: {}", api_port);

    let backend_config = if gemini_api_key.is_empty() {
        BackendConfig::Mock
    } else {
        BackendConfig::Gemini {
            api_key: gemini_api_key,
        }
    };

    let state = ApiState::new(backend_config);

    info!("✅ Session store initialized");
    info!("📡 Starting API server...");

    start_server(state, api_port).await?;

    Ok(())
}
