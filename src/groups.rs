use std::collections::HashMap;

use crate::types::{ConnectionId, RoomId};

/// Broadcast-group subscriptions: which connections receive what is
/// addressed to a room.
///
/// This is transport state, kept apart from the rosters in the registry.
/// Subscribing happens on join; the only way out is disconnect.
#[derive(Debug, Default)]
pub struct Groups {
    subscribers: HashMap<RoomId, Vec<ConnectionId>>,
}

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, room_id: &RoomId, connection: ConnectionId) {
        let subscribers = self.subscribers.entry(room_id.clone()).or_default();
        if !subscribers.contains(&connection) {
            subscribers.push(connection);
        }
    }

    /// Drop `connection` from every group. Groups left with no subscribers
    /// are forgotten.
    pub fn unsubscribe_all(&mut self, connection: ConnectionId) {
        self.subscribers.retain(|_, subscribers| {
            subscribers.retain(|&c| c != connection);
            !subscribers.is_empty()
        });
    }

    pub fn subscribers(&self, room_id: &RoomId) -> &[ConnectionId] {
        self.subscribers
            .get(room_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_is_idempotent() {
        let mut groups = Groups::new();
        let room = RoomId::new("r1");

        groups.subscribe(&room, ConnectionId::new(1));
        groups.subscribe(&room, ConnectionId::new(2));
        groups.subscribe(&room, ConnectionId::new(1));

        assert_eq!(
            groups.subscribers(&room),
            &[ConnectionId::new(1), ConnectionId::new(2)]
        );
    }

    #[test]
    fn unsubscribe_all_leaves_other_connections() {
        let mut groups = Groups::new();
        let (a, b) = (RoomId::new("a"), RoomId::new("b"));

        groups.subscribe(&a, ConnectionId::new(1));
        groups.subscribe(&b, ConnectionId::new(1));
        groups.subscribe(&b, ConnectionId::new(2));
        groups.unsubscribe_all(ConnectionId::new(1));

        assert!(groups.subscribers(&a).is_empty());
        assert_eq!(groups.subscribers(&b), &[ConnectionId::new(2)]);
    }
}
