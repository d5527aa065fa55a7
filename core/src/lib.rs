//! Synchronous client for the communication service rooms API.
//!
//! # Overview
//! `RoomsClient` is the facade: one method per room lifecycle action. Each
//! call builds an `HttpRequest`, signs it, hands it to a `Transport`, and
//! translates the `HttpResponse` back into a `Room`.
//!
//! # Design
//! - `RoomsCodec` is stateless and never touches the network. Every operation
//!   is split into `build_*` (produces a request) and `parse_*` (consumes a
//!   response), so the I/O boundary stays explicit and testable.
//! - `Transport` is the only seam that performs I/O. `UreqTransport` is the
//!   default; tests plug in recording fakes.
//! - `Room` and `Participant` are the single domain model. The serde shapes in
//!   `wire` stay crate-private and are converted by `translate`.

pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod identifier;
pub mod model;
pub mod transport;

mod translate;
mod wire;

pub use auth::AuthPolicy;
pub use client::RoomsClient;
pub use codec::RoomsCodec;
pub use config::{ClientOptions, ConnectionString, Credential};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use identifier::{CommunicationCloudEnvironment, CommunicationIdentifier};
pub use model::{CreateRoomOptions, Participant, Room, UpdateRoomOptions};
pub use transport::{Transport, UreqTransport};
