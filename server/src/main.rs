//! deckify HTTP service.
//!
//! Accepts a multipart upload (raw text plus a .pptx/.potx template) and
//! streams back the rendered deck. Outline planning goes through a
//! language-model provider when the request carries an API key and falls
//! back to the local heuristic on any remote failure.
//!
//! # Usage
//! ```bash
//! deckify-server [--port 8080] [--host 127.0.0.1] [--verbose]
//! ```

mod routes;

use clap::Parser;

/// deckify server - text and markdown to PowerPoint decks over HTTP
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_target(false)
            .init();
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("deckify server listening on http://{}", addr);

    axum::serve(listener, routes::router()).await?;
    Ok(())
}
