// utils.rs
use super::models::AppState;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::info;

/// Cancellation scope for one request. The token fires when the server shuts
/// down or when the returned guard is dropped along with the request future.
pub fn request_scope(state: &AppState) -> (CancellationToken, DropGuard) {
    let token = state.shutdown.child_token();
    let guard = token.clone().drop_guard();
    (token, guard)
}

pub async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }

    info!("shutting down, cancelling in-flight requests");
    shutdown.cancel();
}
