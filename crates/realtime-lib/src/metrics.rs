// ==============
// crates/realtime-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const WS_CONNECTION: &str = "ws.connection";
pub const WS_DISCONNECTION: &str = "ws.disconnection";
pub const WS_ACTIVE: &str = "ws.active";
pub const WS_AUTH_REJECTED: &str = "ws.auth_rejected";
pub const EVENT_DISPATCHED: &str = "event.dispatched";
pub const EVENT_ERROR: &str = "event.error";
pub const DELIVERY_DROPPED: &str = "delivery.dropped";
pub const REGISTRY_EVICTED: &str = "registry.evicted";
