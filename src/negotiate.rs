//! Dialect classification and handshake dispatch.
//!
//! The dialect is decided once, up front, from header presence, then
//! matched exhaustively: there is no request shape without an explicit
//! outcome. Every path ends in exactly one socket-ownership transition,
//! into the frame codec on upgrade or closed on rejection.

use crate::error::UpgradeError;
use crate::frame::FrameHandle;
use crate::hixie;
use crate::hybi;
use crate::request::{Headers, Request};
use crate::response::{self, Header};
use std::io::{Read, Write};
use tracing::error;

/// Negotiated wire dialect and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebSocketVersion {
    /// RFC 6455 (`Sec-WebSocket-Version: 13`).
    Hybi13,
    /// hybi draft 10 family (`Sec-WebSocket-Version: 8`).
    Hybi8,
    /// hybi draft 07 (`Sec-WebSocket-Version: 7`).
    Hybi7,
    /// Legacy challenge-response draft.
    Hixie76,
    /// Legacy challenge-free draft.
    Hixie75,
    /// A version this server does not speak.
    Unsupported,
}

impl WebSocketVersion {
    /// Identifier the host can record alongside the connection.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Hybi13 => "hybi-13",
            Self::Hybi8 => "hybi-8",
            Self::Hybi7 => "hybi-7",
            Self::Hixie76 => "hixie-76",
            Self::Hixie75 => "hixie-75",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Wire dialect, decided once from header presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    /// `Sec-WebSocket-Version` present; the hybi module vets the value.
    Hybi,
    /// No version header; `Origin` and `Sec-WebSocket-Key1` present.
    Hixie76,
    /// No version header; `Origin` present, no key1 header.
    Hixie75,
    /// Neither a version header nor an origin header.
    Unrecognized,
}

impl Dialect {
    fn classify(headers: &Headers) -> Self {
        if headers.contains("sec-websocket-version") {
            Self::Hybi
        } else if headers.contains("origin") {
            if headers.contains("sec-websocket-key1") {
                Self::Hixie76
            } else {
                Self::Hixie75
            }
        } else {
            Self::Unrecognized
        }
    }
}

/// Successful upgrade: the reply is on the wire, the codec owns the socket.
#[derive(Debug)]
pub struct Upgrade<S> {
    /// Dialect and version the connection speaks.
    pub version: WebSocketVersion,
    /// Status code of the reply that was sent (always 101).
    pub status: u16,
    /// Reason phrase of the reply.
    pub reason: &'static str,
    /// Headers as they went out, in wire order.
    pub headers: Vec<Header>,
    /// The 16-byte hixie-76 challenge digest, when one was written.
    pub challenge: Option<[u8; 16]>,
    /// Frame codec seam now owning the socket.
    pub frame: FrameHandle<S>,
}

/// Rejected upgrade: the reply is on the wire and the socket is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Status code sent.
    pub status: u16,
    /// Reason phrase sent.
    pub reason: &'static str,
    /// Headers sent with the rejection.
    pub headers: Vec<Header>,
}

/// Outcome of a negotiation: exactly one socket-ownership transition.
#[derive(Debug)]
pub enum Negotiation<S> {
    /// Socket handed to the frame codec.
    Upgraded(Upgrade<S>),
    /// Socket closed after the rejection reply.
    Rejected(Rejection),
}

/// Negotiate a WebSocket upgrade on a parsed request.
///
/// Validation failures resolve into [`Negotiation::Rejected`]: the reply
/// has been written and the socket closed. Only transport faults surface
/// as `Err`, after which the socket must be treated as unusable.
pub fn negotiate<S, B>(request: Request<S, B>) -> Result<Negotiation<S>, UpgradeError>
where
    S: Write,
    B: Read,
{
    let upgrade_ok = request
        .header("upgrade")
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"));
    let connection_ok = request
        .header("connection")
        .is_some_and(|v| v.to_ascii_lowercase().contains("upgrade"));
    if !(upgrade_ok && connection_ok) {
        error!("not a websocket upgrade request");
        let (_head, socket, _body) = request.into_parts();
        return reject(
            socket,
            400,
            "Bad Request",
            vec![(String::from("Connection"), String::from("close"))],
        );
    }

    match Dialect::classify(request.head().headers()) {
        Dialect::Hybi => hybi::negotiate(request),
        Dialect::Hixie76 => hixie::negotiate_challenge(request),
        Dialect::Hixie75 => hixie::negotiate_legacy(request),
        Dialect::Unrecognized => {
            error!("unrecognized upgrade request: no version or origin header");
            let (_head, socket, _body) = request.into_parts();
            reject(socket, 400, "Bad Request", Vec::new())
        }
    }
}

/// Write a rejection reply, close the socket, and report the outcome.
pub(crate) fn reject<S: Write>(
    socket: S,
    status: u16,
    reason: &'static str,
    headers: Vec<Header>,
) -> Result<Negotiation<S>, UpgradeError> {
    response::reject_and_close(socket, status, reason, &headers)?;
    Ok(Negotiation::Rejected(Rejection {
        status,
        reason,
        headers,
    }))
}

/// Plain 400 rejection with no extra headers.
pub(crate) fn reject_bad_request<S: Write>(socket: S) -> Result<Negotiation<S>, UpgradeError> {
    reject(socket, 400, "Bad Request", Vec::new())
}
