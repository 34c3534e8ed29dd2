//! HTTP listener — binds, serves the API, and shuts down gracefully.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::api::{self, AppState, VERSION};
use crate::config::Config;

/// Start the todod server and run until a shutdown signal drains it.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    config.validate()?;

    let state = AppState::new(config.strict_payloads);
    let app = api::router(state);

    let addr = format!("{}:{}", config.listen_host, config.listen_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(
        addr = %listener.local_addr()?,
        version = VERSION,
        strict = config.strict_payloads,
        "listening"
    );

    let grace = Duration::from_secs(config.shutdown_grace_secs);
    serve(listener, app, grace, shutdown_signal()).await
}

/// Serve until `shutdown` resolves, then stop accepting and give in-flight
/// requests up to `grace` to finish.
async fn serve(
    listener: TcpListener,
    app: axum::Router,
    grace: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let stop = Arc::new(Notify::new());
    let server = {
        let stop = Arc::clone(&stop);
        axum::serve(listener, app).with_graceful_shutdown(async move { stop.notified().await })
    };
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        res = &mut server => {
            // Listener failed before any signal arrived
            res??;
            return Ok(());
        }
        () = shutdown => {}
    }

    stop.notify_one();
    match tokio::time::timeout(grace, &mut server).await {
        Ok(res) => {
            res??;
            info!("shutdown complete");
        }
        Err(_) => {
            warn!(grace_secs = grace.as_secs(), "grace period elapsed, dropping in-flight requests");
            server.abort();
        }
    }
    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn roundtrip(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = api::router(AppState::new(false));
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, app, Duration::from_secs(5), async move {
            let _ = rx.await;
        }));

        let resp = roundtrip(
            addr,
            "POST /todos HTTP/1.1\r\nHost: test\r\nContent-Type: application/json\r\n\
             Content-Length: 16\r\nConnection: close\r\n\r\n{\"title\":\"demo\"}",
        )
        .await;
        assert!(resp.starts_with("HTTP/1.1 201"), "{resp}");
        assert!(resp.contains(r#""title":"demo""#), "{resp}");

        let resp = roundtrip(
            addr,
            "GET /healthz HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(resp.starts_with("HTTP/1.1 200"), "{resp}");
        assert!(resp.ends_with("ok"), "{resp}");

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
