//! Seam to the frame codec collaborator.
//!
//! Negotiation ends with exactly one socket-ownership transition. On
//! success the socket moves into a [`FrameHandle`], the anchor the frame
//! codec builds on; frame encoding, masking, fragmentation, ping/pong, and
//! close semantics all live on the codec side of this seam.

use crate::request::{Headers, RequestHead};

/// Subprotocol the client asked for, modern header name first.
///
/// An empty value is treated as absent.
pub(crate) fn negotiated_protocol(headers: &Headers) -> Option<&str> {
    headers
        .get("sec-websocket-protocol")
        .or_else(|| headers.get("websocket-protocol"))
        .filter(|v| !v.is_empty())
}

/// Origin the client reported, standard header name first.
pub(crate) fn negotiated_origin(headers: &Headers) -> Option<&str> {
    headers
        .get("origin")
        .or_else(|| headers.get("websocket-origin"))
        .filter(|v| !v.is_empty())
}

/// An upgraded socket plus the application-level values negotiation
/// surfaced for it.
#[derive(Debug)]
pub struct FrameHandle<S> {
    socket: S,
    protocol: Option<String>,
    origin: Option<String>,
}

impl<S> FrameHandle<S> {
    /// Bind the codec seam to an upgraded socket.
    #[must_use]
    pub fn bind(socket: S, head: &RequestHead) -> Self {
        Self {
            socket,
            protocol: negotiated_protocol(head.headers()).map(str::to_owned),
            origin: negotiated_origin(head.headers()).map(str::to_owned),
        }
    }

    /// Negotiated subprotocol, if the client requested one.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    /// Origin the client reported, if any.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Borrow the underlying socket.
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.socket
    }

    /// Mutably borrow the underlying socket.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.socket
    }

    /// Consume the handle, yielding the socket to the frame transport.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.socket
    }
}
