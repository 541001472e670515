//! Reconstruction of the `ws://` / `wss://` URL a request addressed.
//!
//! Only the legacy dialects need this: their 101 replies echo the location
//! back in `Sec-WebSocket-Location` (hixie-76) or `WebSocket-Location`
//! (hixie-75).

use crate::request::RequestHead;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes the path quoting leaves bare: unreserved plus the path separator.
fn is_path_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-' | b'/')
}

/// Percent-encode a path, leaving `/` intact.
fn percent_encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for &byte in path.as_bytes() {
        if is_path_safe(byte) {
            out.push(char::from(byte));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(byte >> 4)]));
            out.push(char::from(HEX[usize::from(byte & 0x0F)]));
        }
    }
    out
}

/// Rebuild the canonical URL for a request.
///
/// The `Host` header is used verbatim when present, with no port
/// adjustment. Otherwise the configured server name is used and the port
/// appended only when non-default for the scheme (443 secure, 80 plain).
#[must_use]
pub fn reconstruct_url(head: &RequestHead) -> String {
    let target = &head.target;
    let mut url = String::from(if target.secure { "wss://" } else { "ws://" });

    if let Some(host) = head.header("host") {
        url.push_str(host);
    } else {
        url.push_str(&target.server_name);
        let default_port = if target.secure { 443 } else { 80 };
        if target.server_port != default_port {
            url.push(':');
            url.push_str(&target.server_port.to_string());
        }
    }

    url.push_str(&percent_encode_path(&target.script_name));
    url.push_str(&percent_encode_path(&target.path_info));

    if !target.query.is_empty() {
        url.push('?');
        url.push_str(&target.query);
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    #[test]
    fn test_default_port_is_omitted() {
        let request = Request::builder()
            .header("Host", "example.com")
            .server("example.com", 80)
            .path_info("/chat")
            .query("id=1")
            .build(Vec::<u8>::new(), std::io::empty());
        assert_eq!(reconstruct_url(request.head()), "ws://example.com/chat?id=1");
    }

    #[test]
    fn non_default_port_is_appended_without_host_header() {
        let request = Request::builder()
            .secure(true)
            .server("example.com", 8443)
            .path_info("/chat")
            .query("id=1")
            .build(Vec::<u8>::new(), std::io::empty());
        assert_eq!(
            reconstruct_url(request.head()),
            "wss://example.com:8443/chat?id=1"
        );
    }

    #[test]
    fn secure_default_port_is_omitted() {
        let request = Request::builder()
            .secure(true)
            .server("example.com", 443)
            .path_info("/chat")
            .build(Vec::<u8>::new(), std::io::empty());
        assert_eq!(reconstruct_url(request.head()), "wss://example.com/chat");
    }

    #[test]
    fn host_header_is_used_verbatim() {
        // No port adjustment even when the Host port is redundant or odd.
        let request = Request::builder()
            .header("Host", "example.com:9000")
            .server("ignored.example", 80)
            .path_info("/ws")
            .build(Vec::<u8>::new(), std::io::empty());
        assert_eq!(reconstruct_url(request.head()), "ws://example.com:9000/ws");
    }

    #[test]
    fn script_name_prefixes_path_info() {
        let request = Request::builder()
            .server("example.com", 80)
            .script_name("/app")
            .path_info("/chat")
            .build(Vec::<u8>::new(), std::io::empty());
        assert_eq!(reconstruct_url(request.head()), "ws://example.com/app/chat");
    }

    #[test]
    fn path_is_percent_encoded() {
        let request = Request::builder()
            .server("example.com", 80)
            .path_info("/chat room/~u")
            .build(Vec::<u8>::new(), std::io::empty());
        assert_eq!(
            reconstruct_url(request.head()),
            "ws://example.com/chat%20room/%7Eu"
        );
    }

    #[test]
    fn empty_query_is_omitted() {
        let request = Request::builder()
            .server("example.com", 80)
            .path_info("/chat")
            .build(Vec::<u8>::new(), std::io::empty());
        assert_eq!(reconstruct_url(request.head()), "ws://example.com/chat");
    }
}
