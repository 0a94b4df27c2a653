//! Liveness endpoint proving the process is up.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::FeedbotResult;
use crate::shutdown::ShutdownSignal;

/// Create the liveness router.
pub fn create_health_router() -> Router {
    Router::new()
        .route("/", get(alive))
        .route("/health", get(health_check))
}

async fn alive() -> &'static str {
    "Bot is alive!"
}

async fn health_check() -> &'static str {
    "OK"
}

/// Serve the liveness router on `0.0.0.0:port` until shutdown.
pub async fn serve(port: u16, mut shutdown: ShutdownSignal) -> FeedbotResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Liveness endpoint listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_health_router())
        .with_graceful_shutdown(async move { shutdown.triggered().await })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    async fn get_body(uri: &str) -> (StatusCode, String) {
        let response = create_health_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_root_reports_alive() {
        let (status, body) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Bot is alive!");
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (status, _) = get_body("/admin").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
