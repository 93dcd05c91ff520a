use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;

use crate::{config::Settings, handlers::create_app};

pub async fn start_server(settings: Settings) -> Result<()> {
    let app = create_app(&settings).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!("MSLU ICal server starting on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
