use std::path::PathBuf;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let addr = std::env::var("STOREFRONT_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let report_path = std::env::var("STOREFRONT_REPORT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/report.csv"));

    let app = storefront_api::app::build_app(report_path);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
