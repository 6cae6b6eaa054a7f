// Connection handling module
// Serves one accepted TCP connection: read a JSON body, run the app, write the reply

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Method};
use hyper_util::rt::{TokioIo, TokioTimer};

use super::ServerSettings;
use crate::app::App;
use crate::http::{Payload, Request};
use crate::logger::{self, AccessLogEntry};
use crate::middleware::json_body::is_json_type;

/// Accept a connection, checking the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `app` - Shared application (middleware and routes)
/// * `settings` - Connection settings derived from the config
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    app: &Arc<App>,
    settings: &Arc<ServerSettings>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = settings.max_connections {
        if prev_count >= max_conn {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_debug(&format!("Accepted connection from {peer_addr}"));

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(app),
        Arc::clone(settings),
        Arc::clone(conn_counter),
    );
}

/// Serve a single connection in a spawned task.
///
/// Parse errors (e.g. a malformed request line) are answered by hyper and
/// end only this connection. A connection that delivers no request head
/// within `header_read_timeout` of going idle is closed. The counter is
/// decremented when the task ends.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    app: Arc<App>,
    settings: Arc<ServerSettings>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(settings.keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(settings.header_read_timeout);

        let svc_settings = Arc::clone(&settings);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let app = Arc::clone(&app);
                let settings = Arc::clone(&svc_settings);
                async move { Ok::<_, Infallible>(respond(req, peer_addr, &app, &settings).await) }
            }),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// One request/response cycle
async fn respond(
    req: hyper::Request<Incoming>,
    peer_addr: SocketAddr,
    app: &App,
    settings: &ServerSettings,
) -> hyper::Response<Full<Bytes>> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let payload = read_body(&parts.headers, body, settings).await;
    let is_head = parts.method == Method::HEAD;

    let mut request = Request::new(parts, payload, Some(peer_addr));
    let response = app.handle(&mut request);

    if let Some(format) = &settings.access_log_format {
        let entry = AccessLogEntry::from_exchange(&request, &response, started.elapsed());
        logger::log_access(&entry, format);
    }

    response.into_hyper(is_head)
}

/// Buffer a JSON request body up to `max_body_size` bytes
///
/// A declared Content-Length over the cap is rejected without reading.
/// Bodies of other media types are never read, so a client that declares
/// one and sends nothing still gets its reply. The read itself is bounded
/// by `body_read_timeout`.
async fn read_body(headers: &HeaderMap, body: Incoming, settings: &ServerSettings) -> Payload {
    let limit = settings.max_body_size;
    if declared_length(headers).is_some_and(|len| len > limit) {
        return Payload::TooLarge { limit };
    }

    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if !is_json_type(content_type, &settings.json_types) {
        return Payload::Skipped;
    }

    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    let read = Limited::new(body, max).collect();
    match tokio::time::timeout(settings.body_read_timeout, read).await {
        Ok(Ok(collected)) => Payload::from_bytes(collected.to_bytes()),
        Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Payload::TooLarge { limit }
        }
        Ok(Err(e)) => Payload::Aborted(e.to_string()),
        Err(_) => Payload::TimedOut {
            secs: settings.body_read_timeout.as_secs(),
        },
    }
}

/// Parse the Content-Length header, ignoring values that are not numbers
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(hyper::header::CONTENT_LENGTH)?;
    match value.to_str().ok().and_then(|v| v.trim().parse::<u64>().ok()) {
        Some(len) => Some(len),
        None => {
            logger::log_warning(&format!(
                "Invalid Content-Length value {value:?}, skipping size check"
            ));
            None
        }
    }
}
