// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Receive statsd datagrams on a UDP socket, print and decode them, and
//! answer each datagram with `OK` or the reason it couldn't be decoded.
//!
//! Useful for checking what an application actually sends. Lines are decoded
//! leniently so that extensions sent by other statsd clients don't show up
//! as errors.

use anyhow::Context;
use clap::Parser;
use metronome::{codec, Metric, MetricError, DEFAULT_HOST, DEFAULT_PORT};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};

// How long a receive may block before checking for shutdown.
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

const MAX_DATAGRAM_SIZE: usize = 65536;

#[derive(Debug, Parser)]
#[command(name = "statsd-listen", about = "Print and check statsd metrics sent over UDP")]
struct Args {
    /// Host to listen on
    #[arg(short = 'H', long, default_value = DEFAULT_HOST, env = "STATSD_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "STATSD_PORT")]
    port: u16,

    /// Append decoded metrics to this file
    #[arg(short, long, env = "OUTPUT_FILE")]
    file: Option<String>,

    /// Don't print metrics to the console
    #[arg(short, long)]
    quiet: bool,

    /// The same as quiet but as an env var
    #[arg(long, env = "NO_STDOUT")]
    no_console: bool,
}

impl Args {
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn has_console(&self) -> bool {
        !self.quiet && !self.no_console
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let socket = UdpSocket::bind(args.address()).with_context(|| format!("unable to bind {}", args.address()))?;
    socket
        .set_read_timeout(Some(SHUTDOWN_POLL))
        .context("unable to set socket read timeout")?;

    let output = match args.file {
        Some(ref path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("unable to open {}", path))?,
        ),
        None => None,
    };

    info!("listening on {}", args.address());
    if let Some(ref path) = args.file {
        info!("writing metrics to {}", path);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("unable to create runtime")?;

    runtime.block_on(serve(socket, args, output))
}

/// Receive datagrams until interrupted with Ctrl-C or the receive loop fails.
async fn serve(socket: UdpSocket, args: Args, output: Option<File>) -> anyhow::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut worker = {
        let shutdown = Arc::clone(&shutdown);
        tokio::task::spawn_blocking(move || run(&socket, &args, output, &shutdown))
    };

    tokio::select! {
        res = tokio::signal::ctrl_c() => res.context("unable to listen for ctrl-c")?,
        res = &mut worker => return res.context("receive loop panicked")?,
    }

    info!("shutting down");
    shutdown.store(true, Ordering::Release);
    worker.await.context("receive loop panicked")?
}

fn run(socket: &UdpSocket, args: &Args, mut output: Option<File>, shutdown: &AtomicBool) -> anyhow::Result<()> {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let stdout = io::stdout();

    while !shutdown.load(Ordering::Acquire) {
        let (n, peer) = match socket.recv_from(&mut buf) {
            Ok(res) => res,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => continue,
            // the previous reply bounced, nothing to do about it
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
            Err(e) => {
                error!("unable to receive: {}", e);
                continue;
            }
        };

        let text = String::from_utf8_lossy(&buf[..n]);
        let reply = handle_datagram(&text, args, &mut stdout.lock(), output.as_mut())
            .context("unable to write metrics")?;

        if let Err(e) = socket.send_to(reply.as_bytes(), peer) {
            if e.kind() != io::ErrorKind::ConnectionReset {
                warn!("unable to reply to {}: {}", peer, e);
            }
        }
    }

    Ok(())
}

/// Decode every line of a datagram, echoing it and any errors to `console`
/// unless quieted and appending decoded metrics to `output`.
///
/// Returns the reply for the sender: `OK`, or the first decoding error.
fn handle_datagram<C, F>(text: &str, args: &Args, console: &mut C, output: Option<&mut F>) -> io::Result<String>
where
    C: Write,
    F: Write,
{
    let (metrics, errors): (Vec<_>, Vec<_>) = codec::decode_packet_lenient(text)
        .into_iter()
        .partition(Result::is_ok);
    let metrics: Vec<Metric> = metrics.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<MetricError> = errors.into_iter().filter_map(Result::err).collect();

    if args.has_console() {
        writeln!(console, "{}", text)?;
        for e in errors.iter() {
            writeln!(console, "ERROR: {}", e)?;
        }
        console.flush()?;
    }

    if let Some(out) = output {
        write_metrics(out, &metrics)?;
    }

    Ok(match errors.first() {
        Some(e) => e.to_string(),
        None => "OK".to_string(),
    })
}

fn write_metrics<W: Write>(out: &mut W, metrics: &[Metric]) -> io::Result<()> {
    for metric in metrics {
        writeln!(out, "{:?}", metric)?;
    }

    out.flush()
}
