// Server loop module
// Accepts connections until the process is terminated

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::ServerSettings;
use crate::app::App;
use crate::logger;

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Accept loop; one spawned task per connection.
///
/// Never returns: accept failures are logged and the loop keeps going.
pub async fn serve(listener: TcpListener, app: Arc<App>, settings: Arc<ServerSettings>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &app, &settings, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}
