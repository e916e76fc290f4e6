//! HTTP front for the circulation endpoints.
//!
//! `tiny_http` accepts on a blocking thread; each request is handed to the
//! tokio runtime and answered from there.

pub mod routes;

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use shelf_db::service::CirculationService;
use tokio::runtime::Handle;

use routes::{ApiResponse, handle_request};
use shelf_core::api::INVALID_DATA;

/// Largest request body accepted, in bytes.
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Serve until the listener fails.
pub async fn serve(service: Arc<CirculationService>, bind: &str) -> anyhow::Result<()> {
    let server = tiny_http::Server::http(bind)
        .map_err(|error| anyhow::anyhow!("failed to bind {bind}: {error}"))?;
    tracing::info!(addr = ?server.server_addr(), "serving circulation requests");
    eprintln!("shelf listening on http://{bind}");

    let runtime = Handle::current();
    tokio::task::spawn_blocking(move || accept_loop(&server, &service, &runtime))
        .await
        .context("request listener stopped unexpectedly")?
}

fn accept_loop(
    server: &tiny_http::Server,
    service: &Arc<CirculationService>,
    runtime: &Handle,
) -> anyhow::Result<()> {
    loop {
        let mut request = server.recv().context("failed to receive request")?;
        let method = request.method().to_string();
        let path = request
            .url()
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        let body = read_body(request.as_reader());

        let service = Arc::clone(service);
        runtime.spawn(async move {
            let response = match body {
                Ok(body) => handle_request(&service, &method, &path, &body).await,
                Err(rejected) => rejected,
            };
            tracing::debug!(%method, %path, status = response.status, "request handled");
            if let Err(error) = request.respond(to_http(&response)) {
                tracing::warn!(%error, "failed to write response");
            }
        });
    }
}

/// Read at most [`MAX_BODY_BYTES`] of UTF-8 request body.
fn read_body(reader: impl Read) -> Result<String, ApiResponse> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|error| {
            tracing::debug!(%error, "unreadable request body");
            ApiResponse::error(400, INVALID_DATA)
        })?;
    if bytes.len() as u64 > MAX_BODY_BYTES {
        return Err(ApiResponse::error(413, "Request body too large"));
    }
    String::from_utf8(bytes).map_err(|_| ApiResponse::error(400, INVALID_DATA))
}

fn to_http(response: &ApiResponse) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let http = tiny_http::Response::from_string(response.body.to_string())
        .with_status_code(response.status);
    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => http.with_header(header),
        Err(()) => http,
    }
}
