//! neurolit-common — Shared error type, cancellation token, and the
//! sandboxed HTTP client used by every crate that talks to the network.

pub mod cancel;
pub mod error;
pub mod sandbox;

pub use cancel::CancelToken;
pub use error::{NeurolitError, Result};
