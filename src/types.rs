use std::fmt;

use serde::{Serialize, Serializer};

/// A unique identifier for a live connection.
///
/// Assigned by the server when the socket is accepted and never handed
/// out twice within one process. On the wire it travels as a string
/// (`"conn-7"`), which is what clients see as `socketId` and `playerId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

impl Serialize for ConnectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A room identifier. Opaque to the server: any string names a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// Room used when a client does not name one.
    pub const DEFAULT: &'static str = "default_room";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Pick the room an event targets. Absent and empty ids both fall
    /// back to [`RoomId::DEFAULT`].
    pub fn resolve(requested: Option<&str>) -> Self {
        match requested {
            Some(id) if !id.is_empty() => Self::new(id),
            _ => Self::new(Self::DEFAULT),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
