// ============================
// crates/realtime-lib/src/registry.rs
// ============================
//! Connection registry and room membership.
//!
//! Maps each identity to its single live connection handle and keeps the
//! role-room / identity-room membership derived from it. One coarse lock
//! guards both maps so registration, removal, and broadcast snapshots are
//! atomic with respect to each other (no torn broadcast lists).

use crate::metrics as keys;
use hrms_common::{Identity, Role, ServerEvent, UserId};
use metrics::{counter, gauge};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use uuid::Uuid;

/// A live transport handle bound to exactly one identity.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub connection_id: Uuid,
    pub role: Role,
    pub tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(role: Role, tx: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            role,
            tx,
        }
    }
}

/// A named set of connections: one room per role value, one per identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    Role(Role),
    Identity(UserId),
}

#[derive(Default)]
struct RegistryInner {
    by_user: HashMap<UserId, ConnectionHandle>,
    rooms: HashMap<Room, HashSet<UserId>>,
}

impl RegistryInner {
    fn leave_rooms(&mut self, user_id: &str, role: Role) {
        for room in [
            Room::Role(role),
            Room::Identity(user_id.to_string()),
        ] {
            if let Some(members) = self.rooms.get_mut(&room) {
                members.remove(user_id);
                if members.is_empty() {
                    self.rooms.remove(&room);
                }
            }
        }
    }
}

/// Owned registry of live connections.
///
/// Invariant: at most one entry per identity. Registering a new handle for
/// an already-present identity atomically replaces the old entry
/// (single-connection-per-identity policy; the evicted handle is returned
/// so the caller can close it).
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle for an identity, joining its role room and
    /// identity room. Unconditionally overwrites any existing entry and
    /// returns the evicted handle, if any.
    pub fn register(
        &self,
        identity: &Identity,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        let mut inner = self.inner.write();

        let evicted = inner.by_user.insert(identity.user_id.clone(), handle);
        if let Some(old) = &evicted {
            // the role may have changed between logins
            if old.role != identity.role {
                inner.leave_rooms(&identity.user_id, old.role);
            }
            counter!(keys::REGISTRY_EVICTED).increment(1);
        }

        for room in [
            Room::Role(identity.role),
            Room::Identity(identity.user_id.clone()),
        ] {
            inner
                .rooms
                .entry(room)
                .or_default()
                .insert(identity.user_id.clone());
        }

        gauge!(keys::WS_ACTIVE).set(inner.by_user.len() as f64);
        evicted
    }

    /// Remove the entry for an identity, but only if it still points at
    /// `connection_id`. Guards against a stale disconnect from a
    /// connection already superseded by a newer `register`.
    pub fn unregister(&self, user_id: &str, connection_id: Uuid) -> bool {
        let mut inner = self.inner.write();

        let current = inner
            .by_user
            .get(user_id)
            .filter(|h| h.connection_id == connection_id)
            .map(|h| h.role);
        let Some(role) = current else {
            return false;
        };

        inner.by_user.remove(user_id);
        inner.leave_rooms(user_id, role);
        gauge!(keys::WS_ACTIVE).set(inner.by_user.len() as f64);
        true
    }

    /// O(1) lookup of the live handle for an identity.
    pub fn lookup(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.inner.read().by_user.get(user_id).cloned()
    }

    /// Snapshot of the handles currently in a room.
    pub fn members(&self, room: &Room) -> Vec<ConnectionHandle> {
        let inner = self.inner.read();
        inner
            .rooms
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|user_id| inner.by_user.get(user_id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of every registered handle.
    pub fn all(&self) -> Vec<ConnectionHandle> {
        self.inner.read().by_user.values().cloned().collect()
    }

    /// Number of distinct identities with a tracked connection.
    pub fn connected_count(&self) -> usize {
        self.inner.read().by_user.len()
    }

    /// Identity ids currently in a role room.
    pub fn users_in_role(&self, role: Role) -> Vec<UserId> {
        let inner = self.inner.read();
        inner
            .rooms
            .get(&Room::Role(role))
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }
}
