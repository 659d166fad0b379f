// ============================
// crates/realtime-lib/src/router.rs
// ============================
//! Broadcast fabric over the connection registry.
//!
//! Delivery is fire-and-forget, at-most-once: an absent identity is a
//! silent drop, and a full or closed connection channel drops the event at
//! the transport boundary with no retry and no confirmation. Consumers
//! needing guaranteed delivery must add a queue as a separate collaborator.

use crate::metrics as keys;
use crate::registry::{ConnectionHandle, ConnectionRegistry, Room};
use hrms_common::{Role, ServerEvent};
use metrics::counter;
use std::sync::Arc;
use tracing::debug;

/// Unicast, role-broadcast, and all-broadcast primitives.
#[derive(Clone)]
pub struct RoomRouter {
    registry: Arc<ConnectionRegistry>,
}

impl RoomRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Emit an event to one identity's connection. Returns whether a live
    /// handle accepted it.
    pub fn send_to_identity(&self, user_id: &str, event: ServerEvent) -> bool {
        match self.registry.lookup(user_id) {
            Some(handle) => deliver(&handle, event),
            None => {
                debug!(user_id, event = event.name(), "unicast target not connected, dropping");
                false
            },
        }
    }

    /// Emit an event to every current member of a role room. Best-effort
    /// with respect to concurrent join/leave: no snapshot isolation.
    pub fn broadcast_to_role(&self, role: Role, event: ServerEvent) -> usize {
        let members = self.registry.members(&Room::Role(role));
        members
            .iter()
            .filter(|handle| deliver(handle, event.clone()))
            .count()
    }

    /// Emit an event to every currently registered connection.
    pub fn broadcast_to_all(&self, event: ServerEvent) -> usize {
        let handles = self.registry.all();
        handles
            .iter()
            .filter(|handle| deliver(handle, event.clone()))
            .count()
    }
}

fn deliver(handle: &ConnectionHandle, event: ServerEvent) -> bool {
    match handle.tx.try_send(event) {
        Ok(()) => true,
        Err(err) => {
            counter!(keys::DELIVERY_DROPPED).increment(1);
            debug!(connection_id = %handle.connection_id, %err, "dropping undeliverable event");
            false
        },
    }
}
