//! Operator-console logic, independent of any renderer.
//!
//! - [`gate`]: the session gate and navigation.
//! - [`session`]: login and logout.
//! - [`sync`]: the per-collection synchronizer and its local mirror.
//! - [`form`]: the view / add / edit controller and its draft.
//! - [`board`]: one collection page, tying a synchronizer to a form.

pub mod board;
pub mod form;
pub mod gate;
pub mod session;
pub mod sync;

#[cfg(test)]
mod fake;

pub use board::{Board, Submitted};
pub use form::Mode;
pub use gate::{Navigator, Route, SessionGate};
pub use session::Session;
pub use sync::{ConfirmedDelete, DeleteRequest, Notice, Synchronizer};
