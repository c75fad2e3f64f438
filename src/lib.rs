//! Room relay for slot-machine spins.
//!
//! Clients join named rooms, get the live roster of each room they are in,
//! and have their spins relayed to everyone else in the room. State lives
//! in memory only.

pub mod config;
pub mod error;
pub mod groups;
pub mod protocol;
pub mod registry;
pub mod room;
pub mod server;
pub mod types;

pub use config::{InvalidPayloadPolicy, ServerConfig};
pub use error::RelayError;
pub use registry::RoomRegistry;
pub use server::{Server, handle_client, run};
pub use types::{ConnectionId, RoomId};
