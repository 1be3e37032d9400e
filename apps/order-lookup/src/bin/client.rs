//! Order Lookup Client Binary
//!
//! Interactive client exercising both streaming RPCs against a running
//! server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-lookup-client
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_SERVER_ADDR`: Server endpoint (default: <http://localhost:50051>)

use std::io::{BufRead, Write};

use anyhow::Context;
use order_lookup::proto::OrderRequest;
use order_lookup::proto::order_management_client::OrderManagementClient;
use tonic::transport::Channel;

const DEFAULT_SERVER_ADDR: &str = "http://localhost:50051";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = std::env::var("ORDER_SERVER_ADDR")
        .unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());

    println!("Connecting to {addr}");
    let mut client = OrderManagementClient::connect(addr)
        .await
        .context("failed to connect to order lookup server")?;

    run_server_streaming(&mut client).await?;
    run_bidirectional(&mut client).await?;

    Ok(())
}

/// One prompted query, responses streamed back until completion.
async fn run_server_streaming(client: &mut OrderManagementClient<Channel>) -> anyhow::Result<()> {
    println!("\n--- Server streaming ---");
    let query = prompt("Item to look up: ")?;

    let request = OrderRequest { items: query };
    let mut stream = client
        .get_order_server_streaming(request)
        .await
        .context("server streaming call failed")?
        .into_inner();

    let mut count = 0u32;
    while let Some(response) = stream.message().await? {
        count += 1;
        println!("  {} (at {})", response.item_name, response.time_stamp);
    }
    println!("{count} match(es), stream complete");

    Ok(())
}

/// Queries read until a blank line, all sent over one session; each
/// query's matches come back in order before the next query's.
async fn run_bidirectional(client: &mut OrderManagementClient<Channel>) -> anyhow::Result<()> {
    println!("\n--- Bidirectional streaming ---");
    println!("Enter one item per line, blank line to finish:");

    let mut queries = Vec::new();
    loop {
        let line = prompt("> ")?;
        if line.is_empty() {
            break;
        }
        queries.push(line);
    }

    let outbound = tokio_stream::iter(
        queries
            .into_iter()
            .map(|items| OrderRequest { items }),
    );

    let mut stream = client
        .get_order_bidirectional(outbound)
        .await
        .context("bidirectional streaming call failed")?
        .into_inner();

    let mut count = 0u32;
    while let Some(response) = stream.message().await? {
        count += 1;
        println!("  {} (at {})", response.item_name, response.time_stamp);
    }
    println!("{count} match(es), session complete");

    Ok(())
}

/// Print a prompt and read one trimmed line from stdin.
fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;

    Ok(line.trim().to_string())
}
