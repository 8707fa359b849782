//! ais-feeder: Feed NMEA AIS sentences into ais-core and print the results.
//!
//! Supports:
//! - Decoding a log file or stdin (`-`), one sentence per line
//! - Listening on a UDP port for live receiver output

use std::cell::RefCell;
use std::future::Future;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::net::UdpSocket;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ais_core::config::{self, Config};
use ais_core::{AisStream, ChecksumMode, Message, Metadata, StreamStats};

mod capture;
mod summary;

use capture::LineReader;
use summary::FeedSummary;

#[derive(Parser)]
#[command(name = "ais-feeder", version, about = "AIS NMEA sentence decoder")]
struct Cli {
    /// Config file (defaults to ~/.ais-decode/config.yaml)
    #[arg(long, global = true, env = "AIS_DECODE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode sentences from a file, or stdin with `-`
    Decode {
        file: PathBuf,

        /// Print one JSON object per message
        #[arg(long)]
        json: bool,

        /// Print a per-MMSI table instead of each message
        #[arg(long, conflicts_with = "json")]
        summary: bool,

        /// Reject sentences with a bad checksum
        #[arg(long)]
        strict: bool,

        /// Source id attached to every message
        #[arg(long)]
        source: Option<String>,
    },
    /// Receive sentences over UDP
    Listen {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        json: bool,

        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    init_logging(&config);

    match cli.command {
        Commands::Decode {
            file,
            json,
            summary,
            strict,
            source,
        } => {
            let mode = checksum_mode(&config, strict);
            let source = source.unwrap_or_else(|| config.decoder.source.clone());
            cmd_decode(file, json, summary, mode, source)
        }
        Commands::Listen {
            host,
            port,
            json,
            strict,
        } => {
            let host = host.unwrap_or_else(|| config.listen.host.clone());
            let port = port.unwrap_or(config.listen.port);
            let mode = checksum_mode(&config, strict);
            cmd_listen(&host, port, json, mode, config.decoder.source.clone())
        }
    }
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so stdout
/// stays clean for piping.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn checksum_mode(config: &Config, strict: bool) -> ChecksumMode {
    if strict {
        ChecksumMode::Strict
    } else {
        config.decoder.checksum
    }
}

/// One line of `--json` output.
#[derive(Serialize)]
struct JsonRecord<'a> {
    metadata: &'a Metadata,
    message: &'a Message,
}

fn print_message(meta: &Metadata, msg: &Message, json: bool) {
    if json {
        let record = JsonRecord {
            metadata: meta,
            message: msg,
        };
        match serde_json::to_string(&record) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "could not serialize message"),
        }
    } else {
        println!("{msg:?}");
    }
}

fn cmd_decode(file: PathBuf, json: bool, summary: bool, mode: ChecksumMode, source: String) {
    let reader = LineReader::new(file);
    let lines = reader.lines().unwrap_or_else(|e| {
        eprintln!("Error opening {}: {e}", reader.path().display());
        std::process::exit(1);
    });

    let mut stream = AisStream::new(source, mode);
    let table = Rc::new(RefCell::new(FeedSummary::default()));
    if summary {
        let table = Rc::clone(&table);
        stream.add_receiver(move |_, msg| table.borrow_mut().update(msg));
    } else {
        stream.add_receiver(move |meta, msg| print_message(meta, msg, json));
    }

    for line in lines {
        // Errors are already counted and logged by the stream.
        let _ = stream.accept(&line);
    }
    let abandoned = stream.flush();
    if !abandoned.is_empty() {
        info!(fragments = abandoned.len(), "input ended mid-message");
    }

    let stats = stream.stats();
    if summary {
        table.borrow().print(&stats);
    } else {
        eprintln!(
            "{} lines, {} decoded, {} rejected, {} failed",
            stats.lines, stats.decoded, stats.rejected, stats.failures
        );
    }
}

fn cmd_listen(host: &str, port: u16, json: bool, mode: ChecksumMode, source: String) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        });

    if let Err(e) = runtime.block_on(listen(host, port, json, mode, source)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn listen(
    host: &str,
    port: u16,
    json: bool,
    mode: ChecksumMode,
    source: String,
) -> std::io::Result<()> {
    let socket = UdpSocket::bind((host, port)).await?;
    info!(addr = %socket.local_addr()?, "listening for AIS datagrams");

    let mut stream = AisStream::new(source, mode);
    stream.add_receiver(move |meta, msg| print_message(meta, msg, json));

    let stats = receive_until(&socket, &mut stream, tokio::signal::ctrl_c()).await?;
    info!(
        lines = stats.lines,
        decoded = stats.decoded,
        rejected = stats.rejected,
        failures = stats.failures,
        "shutting down"
    );
    Ok(())
}

/// Feed every datagram line into `stream` until `shutdown` completes.
/// Datagrams already queued win over shutdown.
async fn receive_until<F>(
    socket: &UdpSocket,
    stream: &mut AisStream,
    shutdown: F,
) -> std::io::Result<StreamStats>
where
    F: Future,
{
    tokio::pin!(shutdown);

    let mut buf = vec![0u8; 65_536];
    loop {
        tokio::select! {
            biased;
            received = socket.recv_from(&mut buf) => {
                let (len, peer) = received?;
                for line in capture::datagram_lines(&buf[..len]) {
                    if let Err(e) = stream.accept(&line) {
                        tracing::debug!(%peer, error = %e, "line dropped");
                    }
                }
            }
            _ = &mut shutdown => return Ok(stream.stats()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
