use std::collections::{BTreeSet, HashMap};

use crate::room::{Member, Room};
use crate::types::{ConnectionId, RoomId};

/// Who is where.
///
/// Rooms are created lazily on first join. `memberships` is a reverse index
/// (connection → rooms) used only so that disconnect cleanup does not have to
/// scan every room; the rosters in `rooms` are the source of truth.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<ConnectionId, BTreeSet<RoomId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the room, creating an empty one if this is the first time it is named.
    pub fn ensure_room(&mut self, room_id: &RoomId) -> &mut Room {
        self.rooms.entry(room_id.clone()).or_default()
    }

    /// Add `connection` to the room if it is not already a member and return
    /// the current roster. A repeated join never renames the member.
    pub fn upsert_member(
        &mut self,
        room_id: &RoomId,
        connection: ConnectionId,
        name: Option<String>,
    ) -> &[Member] {
        if self.ensure_room(room_id).upsert(connection, name) {
            self.memberships
                .entry(connection)
                .or_default()
                .insert(room_id.clone());
        }
        self.rooms
            .get(room_id)
            .map(Room::members)
            .unwrap_or_default()
    }

    /// Drop `connection` from every room it belongs to. Returns each room that
    /// actually changed with its remaining roster; untouched rooms are left out.
    pub fn remove_member_everywhere(&mut self, connection: ConnectionId) -> Vec<(RoomId, Vec<Member>)> {
        let Some(room_ids) = self.memberships.remove(&connection) else {
            return Vec::new();
        };

        let mut affected = Vec::with_capacity(room_ids.len());
        for room_id in room_ids {
            if let Some(room) = self.rooms.get_mut(&room_id) {
                if room.remove(connection) {
                    let members = room.members().to_vec();
                    affected.push((room_id, members));
                }
            }
        }
        affected
    }

    /// Forget a room if nobody is left in it. Returns `true` if it was removed.
    pub fn remove_room_if_empty(&mut self, room_id: &RoomId) -> bool {
        match self.rooms.get(room_id) {
            Some(room) if room.is_empty() => {
                self.rooms.remove(room_id);
                true
            }
            _ => false,
        }
    }

    pub fn members(&self, room_id: &RoomId) -> Option<&[Member]> {
        self.rooms.get(room_id).map(Room::members)
    }

    pub fn is_member(&self, room_id: &RoomId, connection: ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.contains(connection))
    }

    /// Rooms `connection` currently belongs to, in room id order.
    pub fn rooms_of(&self, connection: ConnectionId) -> Vec<RoomId> {
        self.memberships
            .get(&connection)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
