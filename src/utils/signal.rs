use tokio::signal;

/// Resolves on Ctrl+C or SIGTERM, letting axum drain in-flight requests.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            #[cfg(not(windows))]
            println!();
            tracing::info!("Ctrl+C received. Please wait, this could take a while.");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, shutting down.");
        }
    }
}
