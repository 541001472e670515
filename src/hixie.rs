//! Legacy (hixie) handshakes: draft 76 challenge-response and draft 75.
//!
//! Draft 76 hides an integer in each `Sec-WebSocket-Key1`/`Key2` header:
//! the decimal digits scattered through the value, divided by the number of
//! space characters. The server proves it understood by hashing both
//! integers big-endian together with 8 raw body bytes into a 16-byte MD5
//! digest and writing that digest straight to the socket. No header
//! announces its length; the client reads exactly 16 bytes by convention.
//!
//! Draft 75 predates the challenge entirely and uses response header names
//! without the `Sec-` prefix.

use crate::error::UpgradeError;
use crate::frame::{self, FrameHandle};
use crate::location;
use crate::negotiate::{self, Negotiation, Upgrade, WebSocketVersion};
use crate::request::{Request, RequestHead};
use crate::response::{self, Header};
use md5::{Digest, Md5};
use std::fmt;
use std::io::{Read, Write};
use tracing::error;

/// Why a legacy key header failed to yield a challenge integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// No decimal digits anywhere in the value.
    NoDigits,
    /// No space characters, leaving the division undefined.
    NoSpaces,
    /// The digit value is not an integral multiple of the space count.
    NonIntegral,
    /// The digit value does not fit the 32-bit challenge space.
    Overflow,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDigits => write!(f, "no digits in key"),
            Self::NoSpaces => write!(f, "no spaces in key"),
            Self::NonIntegral => {
                write!(f, "digit value is not an integral multiple of the space count")
            }
            Self::Overflow => write!(f, "digit value overflows the challenge integer"),
        }
    }
}

impl std::error::Error for KeyError {}

/// Challenge integer derived from a legacy key header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hixie76Key(u32);

impl Hixie76Key {
    /// Derive the key value: all decimal digits of the raw header value,
    /// read in order as one unsigned integer, divided by the count of
    /// space characters. The division must be exact.
    pub fn derive(raw: &str) -> Result<Self, KeyError> {
        let mut digits: u64 = 0;
        let mut seen_digit = false;
        for c in raw.chars() {
            if let Some(d) = c.to_digit(10) {
                seen_digit = true;
                digits = digits
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(u64::from(d)))
                    .ok_or(KeyError::Overflow)?;
            }
        }
        if !seen_digit {
            return Err(KeyError::NoDigits);
        }

        let spaces = raw.chars().filter(|&c| c == ' ').count() as u64;
        if spaces == 0 {
            return Err(KeyError::NoSpaces);
        }
        if digits % spaces != 0 {
            return Err(KeyError::NonIntegral);
        }

        u32::try_from(digits / spaces)
            .map(Self)
            .map_err(|_| KeyError::Overflow)
    }

    /// The derived 32-bit challenge integer.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

/// Compute the 16-byte draft-76 challenge digest.
///
/// The digest covers exactly 16 bytes: both key values big-endian,
/// followed by the 8 raw body bytes.
#[must_use]
pub fn challenge_digest(part1: u32, part2: u32, key3: &[u8; 8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(part1.to_be_bytes());
    hasher.update(part2.to_be_bytes());
    hasher.update(key3);
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Read the 8 raw challenge bytes that trail the draft-76 request headers.
///
/// EOF before all 8 bytes is a transport fault, never a partial success.
fn read_key3<B: Read>(body: &mut B) -> Result<[u8; 8], UpgradeError> {
    let mut key3 = [0u8; 8];
    let mut filled = 0;
    while filled < key3.len() {
        let n = body.read(&mut key3[filled..])?;
        if n == 0 {
            return Err(UpgradeError::ChallengeShortRead { got: filled });
        }
        filled += n;
    }
    Ok(key3)
}

/// Run the draft-76 challenge-response handshake.
///
/// Caller invariant: the upgrade preconditions hold, no version header is
/// present, and `Origin` and `Sec-WebSocket-Key1` are present.
pub(crate) fn negotiate_challenge<S: Write, B: Read>(
    request: Request<S, B>,
) -> Result<Negotiation<S>, UpgradeError> {
    let (head, socket, mut body) = request.into_parts();
    debug_assert_upgrade(&head);

    let key1 = match head.header("sec-websocket-key1") {
        Some(value) if !value.is_empty() => value,
        Some(_) => {
            error!("sec-websocket-key1 header is empty");
            return negotiate::reject_bad_request(socket);
        }
        None => {
            error!("sec-websocket-key1 header is missing");
            return negotiate::reject_bad_request(socket);
        }
    };
    let key2 = match head.header("sec-websocket-key2") {
        Some(value) if !value.is_empty() => value,
        _ => {
            error!("sec-websocket-key2 header is missing or empty");
            return negotiate::reject_bad_request(socket);
        }
    };

    let (part1, part2) = match (Hixie76Key::derive(key1), Hixie76Key::derive(key2)) {
        (Ok(k1), Ok(k2)) => (k1.value(), k2.value()),
        (Err(err), _) => {
            error!(key = key1, error = %err, "sec-websocket-key1 does not derive a challenge key");
            return negotiate::reject_bad_request(socket);
        }
        (_, Err(err)) => {
            error!(key = key2, error = %err, "sec-websocket-key2 does not derive a challenge key");
            return negotiate::reject_bad_request(socket);
        }
    };

    let mut headers: Vec<Header> = vec![
        (String::from("Upgrade"), String::from("WebSocket")),
        (String::from("Connection"), String::from("Upgrade")),
        (
            String::from("Sec-WebSocket-Location"),
            location::reconstruct_url(&head),
        ),
    ];
    if let Some(protocol) = frame::negotiated_protocol(head.headers()) {
        headers.push((String::from("Sec-WebSocket-Protocol"), protocol.to_string()));
    }
    if let Some(origin) = frame::negotiated_origin(head.headers()) {
        headers.push((String::from("Sec-WebSocket-Origin"), origin.to_string()));
    }

    let mut socket = socket;
    response::send_reply(&mut socket, 101, "WebSocket Protocol Handshake", &headers)?;

    // The 8 key bytes trail the headers as the request body.
    let key3 = read_key3(&mut body)?;
    let digest = challenge_digest(part1, part2, &key3);
    socket.write_all(&digest)?;
    socket.flush()?;

    let frame = FrameHandle::bind(socket, &head);
    Ok(Negotiation::Upgraded(Upgrade {
        version: WebSocketVersion::Hixie76,
        status: 101,
        reason: "WebSocket Protocol Handshake",
        headers,
        challenge: Some(digest),
        frame,
    }))
}

/// Run the draft-75 challenge-free handshake.
///
/// Caller invariant: the upgrade preconditions hold, no version header is
/// present, `Origin` is present and `Sec-WebSocket-Key1` is not.
pub(crate) fn negotiate_legacy<S: Write, B>(
    request: Request<S, B>,
) -> Result<Negotiation<S>, UpgradeError> {
    let (head, socket, _body) = request.into_parts();
    debug_assert_upgrade(&head);

    let mut headers: Vec<Header> = vec![
        (String::from("Upgrade"), String::from("WebSocket")),
        (String::from("Connection"), String::from("Upgrade")),
        (
            String::from("WebSocket-Location"),
            location::reconstruct_url(&head),
        ),
    ];
    if let Some(protocol) = frame::negotiated_protocol(head.headers()) {
        headers.push((String::from("WebSocket-Protocol"), protocol.to_string()));
    }
    if let Some(origin) = frame::negotiated_origin(head.headers()) {
        headers.push((String::from("WebSocket-Origin"), origin.to_string()));
    }

    let mut socket = socket;
    response::send_reply(&mut socket, 101, "Web Socket Protocol Handshake", &headers)?;

    let frame = FrameHandle::bind(socket, &head);
    Ok(Negotiation::Upgraded(Upgrade {
        version: WebSocketVersion::Hixie75,
        status: 101,
        reason: "Web Socket Protocol Handshake",
        headers,
        challenge: None,
        frame,
    }))
}

/// Caller invariant from the negotiator: preconditions already verified.
fn debug_assert_upgrade(head: &RequestHead) {
    debug_assert!(head
        .header("connection")
        .is_some_and(|v| v.to_ascii_lowercase().contains("upgrade")));
}
