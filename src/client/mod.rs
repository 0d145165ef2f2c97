//! Client for the todo API.
//!
//! [`TodoClient`] only builds requests and parses responses; a [`Transport`]
//! performs the round-trip; [`Board`] keeps the view state a UI renders.

pub mod api;
pub mod board;
pub mod error;
pub mod transport;

pub use api::{HttpRequest, HttpResponse, TodoClient};
pub use board::{Board, LoadState};
pub use error::ClientError;
pub use transport::{Transport, UreqTransport};
