//! WebSocket upgrade negotiation for HTTP servers.
//!
//! Negotiates the HTTP upgrade handshake across the three wire dialects
//! found in real clients:
//!
//! - **Hybi** (`Sec-WebSocket-Version: 13`, `8`, or `7`): the standardized
//!   handshake (RFC 6455) with the SHA-1 / base64 accept token.
//! - **Hixie-76**: the pre-standard challenge-response draft with two
//!   space/digit keys, an 8-byte body key, and a 16-byte MD5 challenge.
//! - **Hixie-75**: the earliest challenge-free draft with non-`Sec-`
//!   response header names.
//!
//! Each dialect has strict, easily-miscomputed wire rules; getting any one
//! wrong silently breaks interoperability with real clients. This crate owns
//! exactly that negotiation: header validation, dialect dispatch, and the
//! cryptographic response computations. Connection accept/timeout policy and
//! frame-level transport belong to the host and the frame codec.
//!
//! # Architecture
//!
//! - [`request`]: parsed request model handed in by the host dispatcher
//! - [`negotiate`]: dialect classification, dispatch, and outcome types
//! - [`hybi`] / [`hixie`]: per-dialect validation and response computation
//! - [`response`]: raw HTTP reply serialization (precedes codec takeover)
//! - [`location`]: `ws://` / `wss://` URL reconstruction for legacy dialects
//! - [`frame`]: the frame-codec seam that takes socket ownership on success
//! - [`error`]: transport faults that abort a negotiation
//!
//! # Example
//!
//! ```ignore
//! use ws_upgrade::{negotiate, Negotiation, Request};
//!
//! let request = Request::builder()
//!     .header("Upgrade", "websocket")
//!     .header("Connection", "Upgrade")
//!     .header("Sec-WebSocket-Version", "13")
//!     .header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==")
//!     .build(socket, body);
//!
//! match negotiate(request)? {
//!     Negotiation::Upgraded(upgrade) => {
//!         // The 101 reply is on the wire; `upgrade.frame` owns the socket.
//!     }
//!     Negotiation::Rejected(rejection) => {
//!         // The 400 reply is on the wire and the socket is closed.
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod frame;
pub mod hixie;
pub mod hybi;
pub mod location;
pub mod negotiate;
pub mod request;
pub mod response;

pub use error::UpgradeError;
pub use frame::FrameHandle;
pub use hixie::{challenge_digest, Hixie76Key, KeyError};
pub use hybi::{compute_accept_key, SUPPORTED_VERSIONS, WS_GUID};
pub use negotiate::{negotiate, Negotiation, Rejection, Upgrade, WebSocketVersion};
pub use request::{Headers, Request, RequestBuilder, RequestHead, RequestTarget};
pub use response::Header;
