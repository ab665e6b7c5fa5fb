//! TCP front end: one [`Session`] per connection, newline-delimited JSON
//! frames in both directions.

use clap::Parser;
use log::{debug, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::{signal, task};

use u_optsession::session::{Session, SessionConfig};
use u_optsession::sink::{ChannelSink, Event};

#[derive(Parser, Debug)]
#[command(name = "u-optsession")]
#[command(about = "Serve pausable GA/PSO optimization sessions over TCP", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 8181)]
    port: u16,

    /// Emit a progress event every N generations
    #[arg(long, default_value_t = 1)]
    progress_interval: usize,

    /// Emit a generation log line every N generations
    #[arg(long, default_value_t = 10)]
    log_interval: usize,

    /// Largest accepted Steps value
    #[arg(long, default_value_t = 100_000)]
    max_steps: usize,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = SessionConfig::default()
        .with_progress_interval(cli.progress_interval)
        .with_log_interval(cli.log_interval)
        .with_max_steps(cli.max_steps);
    config
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    tokio::select! {
        ret = accept_loop(listener, config) => ret?,
        _ = signal::ctrl_c() => info!("received SIGINT, shutting down"),
    }
    Ok(())
}

async fn accept_loop(listener: TcpListener, config: SessionConfig) -> io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("client connected from {peer}");
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = serve(stream, peer, config).await {
                warn!("connection {peer} ended with error: {e}");
            }
        });
    }
}

/// Runs one session until the peer disconnects.
async fn serve(stream: TcpStream, peer: SocketAddr, config: SessionConfig) -> io::Result<()> {
    let (rx, mut tx) = stream.into_split();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<Event>();

    let writer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let mut frame = event.to_frame();
            frame.push('\n');
            tx.write_all(frame.as_bytes()).await?;
        }
        tx.shutdown().await
    });

    let sink = Arc::new(ChannelSink::new(events_tx));
    let mut session = Session::new(sink).with_config(config);
    let mut reader = BufReader::new(rx);
    let mut buf = Vec::new();

    let read = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }
        let frame = buf.trim_ascii().to_vec();
        if frame.is_empty() {
            continue;
        }
        debug!("{peer} -> {}", String::from_utf8_lossy(&frame));
        // Stop joins the worker thread, so frames are applied off the
        // async runtime. Undecodable bytes are rejected by the session.
        session = task::spawn_blocking(move || {
            session.handle_bytes(&frame);
            session
        })
        .await
        .map_err(io::Error::other)?;
    };

    match &read {
        Ok(()) => info!("client {peer} disconnected"),
        Err(e) => warn!("reading from {peer} failed: {e}"),
    }
    // Dropping the session joins a live worker.
    task::spawn_blocking(move || drop(session))
        .await
        .map_err(io::Error::other)?;

    writer.await.map_err(io::Error::other)??;
    read
}
