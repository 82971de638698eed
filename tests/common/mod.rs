//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use recipes_api::{HttpServer, RecipeStore, ServiceConfig, Shutdown};
use tokio::net::TcpListener;

/// Serve `store` on an ephemeral port until the returned [`Shutdown`] fires.
pub async fn spawn_server(store: Arc<dyn RecipeStore>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(ServiceConfig::default(), store);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

#[allow(dead_code)]
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}
