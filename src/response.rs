//! Raw HTTP reply serialization.
//!
//! The handshake reply is hand-written rather than produced by an HTTP
//! stack: it must hit the wire before the frame codec takes over the same
//! socket, and the legacy dialects require exact header names and status
//! reasons.

use crate::error::UpgradeError;
use std::io::{self, Write};

/// Ordered response header pair. Order is preserved on the wire.
pub type Header = (String, String);

/// Serialize a status line plus headers into one buffer.
fn render(status: u16, reason: &str, headers: &[Header]) -> Vec<u8> {
    let mut reply = format!("HTTP/1.1 {status} {reason}\r\n");
    for (name, value) in headers {
        reply.push_str(name);
        reply.push_str(": ");
        reply.push_str(value);
        reply.push_str("\r\n");
    }
    reply.push_str("\r\n");
    reply.into_bytes()
}

/// Send the status line and headers as a single write, then flush.
pub fn send_reply<W: Write>(
    socket: &mut W,
    status: u16,
    reason: &str,
    headers: &[Header],
) -> io::Result<()> {
    socket.write_all(&render(status, reason, headers))?;
    socket.flush()
}

/// Send a rejection reply, then close the connection.
///
/// Closing is the drop of the socket. A broken pipe while notifying the
/// peer is suppressed (the notification is best-effort); any other
/// transport fault propagates.
pub fn reject_and_close<S: Write>(
    mut socket: S,
    status: u16,
    reason: &str,
    headers: &[Header],
) -> Result<(), UpgradeError> {
    match send_reply(&mut socket, status, reason, headers) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Err(e) => return Err(UpgradeError::Io(e)),
    }
    drop(socket);
    Ok(())
}
