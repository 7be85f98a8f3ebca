//! Standalone contacts backend for local development.
//!
//! `PORT` (default 4000) and `HOST` (default 127.0.0.1) pick the bind address.

use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 4000;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = match std::env::var("PORT") {
        Ok(raw) => raw.parse().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("PORT must be a port number, got {raw:?}"),
            )
        })?,
        Err(_) => DEFAULT_PORT,
    };

    let listener = TcpListener::bind((host.as_str(), port)).await?;
    println!("contacts backend listening on http://{}", listener.local_addr()?);
    mock_server::run(listener).await
}
