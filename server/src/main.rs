use anyhow::Result;
use axum::Router;
use clap::Parser;
use docsearch_server::build_from_corpus;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus root; every .docx below it is indexed at startup
    #[arg(long, default_value = ".")]
    data: String,
    /// Directory served at / for the search front end
    #[arg(long)]
    static_dir: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 9000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let data = args.data.clone();
    let static_dir = args.static_dir.clone();
    // index construction is blocking file I/O
    let app: Router = tokio::task::spawn_blocking(move || build_from_corpus(&data, static_dir)).await??;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
