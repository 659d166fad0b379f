// ============================
// crates/realtime-lib/src/lib.rs
// ============================
//! Real-time notification and analytics core for the HRMS backend.
//!
//! The pieces compose in one direction: the WebSocket router authenticates
//! connections through the [`auth::AuthGate`], registers them in the
//! [`registry::ConnectionRegistry`], and feeds parsed requests to the
//! [`handlers::RequestHandlers`], which aggregate through the
//! [`analytics::AggregationEngine`] and fan results out through the
//! [`router::RoomRouter`].

pub mod analytics;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod insights;
pub mod metrics;
pub mod registry;
pub mod router;
pub mod store;
pub mod validation;
pub mod ws_router;

use crate::auth::{AuthGate, TokenVerifier};
use crate::config::Settings;
use crate::handlers::RequestHandlers;
use crate::insights::{InsightsProvider, StaticInsights};
use crate::registry::ConnectionRegistry;
use crate::router::RoomRouter;
use crate::store::RecordStore;
use std::sync::Arc;

/// Shared application state handed to every connection.
pub struct AppState {
    /// Record store backing lookups and aggregation.
    pub store: Arc<dyn RecordStore>,
    /// Live connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Room-scoped delivery over the registry.
    pub router: RoomRouter,
    /// Named request handlers.
    pub handlers: RequestHandlers,
    /// Handshake authentication gate.
    pub auth: AuthGate,
    /// Loaded server settings.
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, settings: Settings) -> Self {
        Self::with_insights(store, settings, Arc::new(StaticInsights))
    }

    pub fn with_insights(
        store: Arc<dyn RecordStore>,
        settings: Settings,
        insights: Arc<dyn InsightsProvider>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let router = RoomRouter::new(registry.clone());
        let handlers = RequestHandlers::new(store.clone(), router.clone(), insights);
        let auth = AuthGate::new(TokenVerifier::new(&settings.jwt_secret));
        Self {
            store,
            registry,
            router,
            handlers,
            auth,
            settings,
        }
    }
}
