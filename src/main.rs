use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use stock_analyzer_backend::external::yahoo::YahooProvider;
use stock_analyzer_backend::logging::{self, LoggingConfig};
use stock_analyzer_backend::state::AppState;
use stock_analyzer_backend::{app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(&LoggingConfig::from_env());

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://stock_data.db".to_string());

    let pool = db::connect(&database_url).await?;
    db::init_schema(&pool).await?;

    let state = AppState {
        pool,
        price_provider: Arc::new(YahooProvider::new()),
    };
    let app = app::create_app(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Stock analyzer backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
