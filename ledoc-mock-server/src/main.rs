use std::net::SocketAddr;

use anyhow::Context;
use ledoc_mock_server::MockServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("LEDOC_MOCK_ADDR").unwrap_or_else(|_| String::from("127.0.0.1:8000"));
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("parsing LEDOC_MOCK_ADDR {addr:?}"))?;

    let mut server = MockServer::new();
    for name in ["client", "lawyer"] {
        let tok = server
            .admin_create_user(name)
            .with_context(|| format!("creating demo user {name}"))?;
        println!("token for {name}: {}", tok.as_str());
    }
    server
        .admin_add_chat("client", "lawyer", Some("Hello, how can I help?"))
        .context("seeding demo chat")?;

    let (addr, _state) = ledoc_mock_server::spawn(addr, server).await?;
    tracing::info!("serving on http://{addr}, sockets on ws://{addr}/ws/document/<id>/");
    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;
    Ok(())
}
