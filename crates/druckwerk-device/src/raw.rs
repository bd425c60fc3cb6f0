// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP transport (JetDirect, port 9100).
//
// The simplest possible print path: open a TCP socket and dump bytes.
// No settings, no job tracking, no feedback — the device must interpret
// the document format natively, and a fully flushed write is the only
// completion signal we get.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Default raw TCP port (HP JetDirect).
pub const RAW_PORT: u16 = 9100;

const CHUNK_SIZE: usize = 8192;

/// Send document bytes directly to the device via raw TCP.
///
/// Errors are raw text for the classifier; the connect timeout text
/// contains "timed out" so it classifies as transient.
pub async fn send_raw(
    host: &str,
    port: u16,
    document_bytes: &[u8],
    timeout: Duration,
) -> Result<(), String> {
    let addr = format!("{host}:{port}");
    info!(addr = %addr, total = document_bytes.len(), "connecting via raw TCP");

    let mut stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| {
            format!(
                "raw TCP connection to {addr} timed out after {}s",
                timeout.as_secs()
            )
        })?
        .map_err(|e| format!("raw TCP connect to {addr}: {e}"))?;

    let mut sent = 0usize;
    for chunk in document_bytes.chunks(CHUNK_SIZE) {
        stream
            .write_all(chunk)
            .await
            .map_err(|e| format!("raw TCP send failed at byte {sent}: {e}"))?;
        sent += chunk.len();
        debug!(sent, total = document_bytes.len(), "raw TCP progress");
    }

    stream
        .flush()
        .await
        .map_err(|e| format!("raw TCP flush: {e}"))?;
    stream
        .shutdown()
        .await
        .map_err(|e| format!("raw TCP shutdown: {e}"))?;

    info!(total = document_bytes.len(), "raw TCP job sent");
    Ok(())
}
