//! Modern (hybi) handshake: `Sec-WebSocket-Version` 13, 8, and 7.
//!
//! The reply proves key possession: the accept token is the SHA-1 of the
//! client's base64 key string (as received, not decoded) concatenated
//! with a fixed GUID, re-encoded as base64 (RFC 6455 Section 4.2.2).
//!
//! ```http
//! GET /chat HTTP/1.1
//! Upgrade: websocket
//! Connection: Upgrade
//! Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==
//! Sec-WebSocket-Version: 13
//! ```
//!
//! ```http
//! HTTP/1.1 101 Switching Protocols
//! Upgrade: websocket
//! Connection: Upgrade
//! Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=
//! ```

use crate::error::UpgradeError;
use crate::frame::FrameHandle;
use crate::negotiate::{self, Negotiation, Upgrade, WebSocketVersion};
use crate::request::Request;
use crate::response::{self, Header};
use base64::Engine;
use sha1::{Digest, Sha1};
use std::io::Write;
use tracing::error;

/// Fixed GUID appended to the client key before hashing.
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Version list advertised back to clients that offer anything else.
pub const SUPPORTED_VERSIONS: &str = "13, 8, 7";

/// Compute the `Sec-WebSocket-Accept` token for a client key.
///
/// The hash covers the raw base64 key string, not its decoded bytes.
///
/// # Example
///
/// ```
/// use ws_upgrade::compute_accept_key;
///
/// let accept = compute_accept_key("dGhlIHNhbXBsZSBub25jZQ==");
/// assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
/// ```
#[must_use]
pub fn compute_accept_key(client_key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(client_key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
}

/// Run the modern handshake.
///
/// Caller invariant: the upgrade preconditions hold and
/// `Sec-WebSocket-Version` is present.
pub(crate) fn negotiate<S: Write, B>(
    request: Request<S, B>,
) -> Result<Negotiation<S>, UpgradeError> {
    let (head, socket, _body) = request.into_parts();

    let version = match head.header("sec-websocket-version") {
        Some("13") => WebSocketVersion::Hybi13,
        Some("8") => WebSocketVersion::Hybi8,
        Some("7") => WebSocketVersion::Hybi7,
        offered => {
            error!(version = offered.unwrap_or("<missing>"), "unsupported websocket version");
            return negotiate::reject(
                socket,
                400,
                "Unsupported Version",
                vec![(
                    String::from("Sec-WebSocket-Version"),
                    String::from(SUPPORTED_VERSIONS),
                )],
            );
        }
    };

    if head.method != "GET" {
        error!(method = %head.method, "upgrade request method must be GET");
        return negotiate::reject_bad_request(socket);
    }
    if head.protocol != "HTTP" {
        error!(protocol = %head.protocol, "upgrade request protocol must be HTTP");
        return negotiate::reject_bad_request(socket);
    }
    if !head.http_version.parse::<f32>().is_ok_and(|v| v >= 1.1) {
        error!(http_version = %head.http_version, "upgrade requires HTTP/1.1 or newer");
        return negotiate::reject_bad_request(socket);
    }

    let Some(key) = head.header("sec-websocket-key") else {
        error!("sec-websocket-key header is missing");
        return negotiate::reject_bad_request(socket);
    };
    match base64::engine::general_purpose::STANDARD.decode(key) {
        Ok(decoded) if decoded.len() == 16 => {}
        _ => {
            error!(key, "sec-websocket-key must decode to exactly 16 bytes");
            return negotiate::reject_bad_request(socket);
        }
    }

    let headers: Vec<Header> = vec![
        (String::from("Upgrade"), String::from("websocket")),
        (String::from("Connection"), String::from("Upgrade")),
        (String::from("Sec-WebSocket-Accept"), compute_accept_key(key)),
    ];

    let mut socket = socket;
    response::send_reply(&mut socket, 101, "Switching Protocols", &headers)?;

    let frame = FrameHandle::bind(socket, &head);
    Ok(Negotiation::Upgraded(Upgrade {
        version,
        status: 101,
        reason: "Switching Protocols",
        headers,
        challenge: None,
        frame,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiate::negotiate;
    use crate::request::RequestBuilder;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// Capturing socket whose bytes outlive a rejection's close.
    #[derive(Clone, Default)]
    struct SharedSocket(Rc<RefCell<Vec<u8>>>);

    impl SharedSocket {
        fn written(&self) -> Vec<u8> {
            self.0.borrow().clone()
        }
    }

    impl io::Write for SharedSocket {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn hybi_request() -> RequestBuilder {
        Request::builder()
            .header("Upgrade", "websocket")
            .header("Connection", "Upgrade")
            .header("Sec-WebSocket-Version", "13")
            .header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==")
    }

    #[test]
    fn test_compute_accept_key() {
        // RFC 6455 sample key.
        let accept = compute_accept_key("dGhlIHNhbXBsZSBub25jZQ==");
        assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
    }

    #[test]
    fn accept_key_hashes_the_raw_key_string() {
        // base64 of the bytes 0x00..0x0F; digest verified independently.
        let accept = compute_accept_key("AAECAwQFBgcICQoLDA0ODw==");
        assert_eq!(accept, "Bz3qJYTGdOe8gUSpLosEdiLKDrk=");
    }

    #[test]
    fn upgrade_sends_the_accept_header() {
        let socket = SharedSocket::default();
        let request = hybi_request().build(socket.clone(), io::empty());

        let outcome = negotiate(request).unwrap();
        let Negotiation::Upgraded(upgrade) = outcome else {
            panic!("expected upgrade");
        };
        assert_eq!(upgrade.version, WebSocketVersion::Hybi13);
        assert_eq!(upgrade.status, 101);
        assert!(upgrade.challenge.is_none());

        let reply = String::from_utf8(socket.written()).unwrap();
        assert!(reply.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
        assert!(reply.contains("Upgrade: websocket\r\n"));
        assert!(reply.contains("Connection: Upgrade\r\n"));
        assert!(reply.contains("Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n"));
        assert!(reply.ends_with("\r\n\r\n"));
    }

    #[test]
    fn accept_is_independent_of_subprotocol() {
        let socket = SharedSocket::default();
        let request = hybi_request()
            .header("Sec-WebSocket-Protocol", "chat")
            .build(socket.clone(), io::empty());

        let Negotiation::Upgraded(upgrade) = negotiate(request).unwrap() else {
            panic!("expected upgrade");
        };
        let accept = upgrade
            .headers
            .iter()
            .find(|(name, _)| name == "Sec-WebSocket-Accept")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
        assert_eq!(upgrade.frame.protocol(), Some("chat"));
    }

    #[test]
    fn versions_eight_and_seven_are_accepted() {
        for (offered, expected) in [("8", WebSocketVersion::Hybi8), ("7", WebSocketVersion::Hybi7)] {
            let socket = SharedSocket::default();
            let request = hybi_request()
                .header("Sec-WebSocket-Version", offered)
                .build(socket, io::empty());
            let Negotiation::Upgraded(upgrade) = negotiate(request).unwrap() else {
                panic!("expected upgrade for version {offered}");
            };
            assert_eq!(upgrade.version, expected);
        }
    }

    #[test]
    fn unknown_version_advertises_the_supported_set() {
        let socket = SharedSocket::default();
        let request = hybi_request()
            .header("Sec-WebSocket-Version", "14")
            .build(socket.clone(), io::empty());

        let Negotiation::Rejected(rejection) = negotiate(request).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status, 400);
        assert!(rejection
            .headers
            .contains(&(String::from("Sec-WebSocket-Version"), String::from("13, 8, 7"))));

        let reply = String::from_utf8(socket.written()).unwrap();
        assert!(reply.starts_with("HTTP/1.1 400 Unsupported Version\r\n"));
        assert!(reply.contains("Sec-WebSocket-Version: 13, 8, 7\r\n"));
    }

    #[test]
    fn rejects_non_get_method() {
        let socket = SharedSocket::default();
        let request = hybi_request().method("POST").build(socket.clone(), io::empty());
        let Negotiation::Rejected(rejection) = negotiate(request).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status, 400);
        assert!(String::from_utf8(socket.written())
            .unwrap()
            .starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn rejects_non_http_protocol_token() {
        let socket = SharedSocket::default();
        let request = hybi_request()
            .protocol("HTTPS", "1.1")
            .build(socket, io::empty());
        let Negotiation::Rejected(rejection) = negotiate(request).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status, 400);
    }

    #[test]
    fn rejects_http_one_dot_zero() {
        let socket = SharedSocket::default();
        let request = hybi_request()
            .protocol("HTTP", "1.0")
            .build(socket, io::empty());
        let Negotiation::Rejected(rejection) = negotiate(request).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status, 400);
    }

    #[test]
    fn rejects_missing_key() {
        let socket = SharedSocket::default();
        let request = Request::builder()
            .header("Upgrade", "websocket")
            .header("Connection", "Upgrade")
            .header("Sec-WebSocket-Version", "13")
            .build(socket, io::empty());
        let Negotiation::Rejected(rejection) = negotiate(request).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status, 400);
    }

    #[test]
    fn rejects_key_that_is_not_sixteen_bytes() {
        // base64 of 8 bytes, well-formed but the wrong length.
        let socket = SharedSocket::default();
        let request = hybi_request()
            .header("Sec-WebSocket-Key", "AAAAAAAAAAA=")
            .build(socket, io::empty());
        let Negotiation::Rejected(rejection) = negotiate(request).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status, 400);
    }

    #[test]
    fn rejects_key_that_is_not_base64() {
        let socket = SharedSocket::default();
        let request = hybi_request()
            .header("Sec-WebSocket-Key", "not base64!!")
            .build(socket, io::empty());
        let Negotiation::Rejected(rejection) = negotiate(request).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status, 400);
    }
}
