use serde::Serialize;

use crate::types::ConnectionId;

/// One connection's participation in a room, as broadcast in `room_update`.
///
/// `id` and `socket_id` carry the same value; clients use `id` as the
/// player id and `socketId` to match themselves in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: ConnectionId,
    pub name: Option<String>,
    pub socket_id: ConnectionId,
}

impl Member {
    pub fn new(connection: ConnectionId, name: Option<String>) -> Self {
        Self {
            id: connection,
            name,
            socket_id: connection,
        }
    }
}

/// A room roster. Members stay in join order.
#[derive(Debug, Default)]
pub struct Room {
    members: Vec<Member>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `connection` unless it is already here. An existing entry keeps
    /// its original name. Returns `true` if the roster changed.
    pub fn upsert(&mut self, connection: ConnectionId, name: Option<String>) -> bool {
        if self.contains(connection) {
            return false;
        }
        self.members.push(Member::new(connection, name));
        true
    }

    /// Returns `true` if `connection` was a member.
    pub fn remove(&mut self, connection: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.socket_id != connection);
        self.members.len() != before
    }

    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.members.iter().any(|m| m.socket_id == connection)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    #[test]
    fn upsert_keeps_first_name() {
        let mut room = Room::new();
        assert!(room.upsert(conn(1), Some("Alice".into())));
        assert!(!room.upsert(conn(1), Some("Mallory".into())));

        assert_eq!(room.members().len(), 1);
        assert_eq!(room.members()[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut room = Room::new();
        for n in 1..=4 {
            room.upsert(conn(n), None);
        }

        assert!(room.remove(conn(2)));
        assert!(!room.remove(conn(2)));

        let ids: Vec<_> = room.members().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![conn(1), conn(3), conn(4)]);
    }

    #[test]
    fn member_wire_shape() {
        let json = serde_json::to_value(Member::new(conn(3), Some("Bob".into()))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "conn-3", "name": "Bob", "socketId": "conn-3" })
        );
    }
}
