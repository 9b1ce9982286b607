//! Coordination core for interactive hint-selection ("follow") mode.
//!
//! A top-level rendering context and its directly embedded children agree
//! on a disjoint partition of a shared hint-label space while communicating
//! only through asynchronous, unordered, fire-and-forget messages. The
//! [`FollowController`] runs the activation state machine and owns the
//! per-activation label generator; [`transport::ContextTree`] is the seam
//! to the embedding environment.

pub mod controller;
pub mod producer;
pub mod store;
pub mod transport;

pub use controller::{FollowController, DEFAULT_HINT_CHARSET};
pub use producer::HintKeyProducer;
