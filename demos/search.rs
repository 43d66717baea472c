//! Search - run one query against searchd and print the result as JSON.
//!
//! ```text
//! cargo run --example search -- "hello world" 127.0.0.1:9312 articles
//! RUST_LOG=sphinx_client=debug cargo run --example search -- "hello"
//! ```
//!
//! Arguments: query text, optional `host:port`, optional index list.

use std::time::Duration;

use sphinx_client::{Client, ClientConfig, Query};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(text) = args.next() else {
        eprintln!("usage: search <query> [host:port] [index]");
        std::process::exit(2);
    };

    let mut config = ClientConfig {
        connect_timeout: Some(Duration::from_secs(2)),
        query_timeout: Some(Duration::from_secs(10)),
        ..ClientConfig::default()
    };
    if let Some(addr) = args.next() {
        match addr.rsplit_once(':') {
            Some((host, port)) => {
                config.host = host.to_string();
                config.port = port.parse()?;
            }
            None => config.host = addr,
        }
    }

    let mut query = Query::new(text);
    if let Some(index) = args.next() {
        query = query.index(index);
    }

    let mut client = Client::connect(config).await?;
    let response = client.query(&query).await?;
    client.disconnect().await?;

    for warning in &response.warnings {
        eprintln!("warning: {}", warning);
    }
    println!("{}", serde_json::to_string_pretty(&response.result)?);
    Ok(())
}
