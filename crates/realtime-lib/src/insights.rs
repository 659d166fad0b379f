// ============================
// crates/realtime-lib/src/insights.rs
// ============================
//! Pluggable team-insights collaborator.
//!
//! The dashboard carries an opaque insights block produced outside this
//! core. [`StaticInsights`] is the bundled stand-in until a real provider
//! is wired up.

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Source of the dashboard's insights block.
#[async_trait]
pub trait InsightsProvider: Send + Sync {
    /// Insights for a manager's team. The content is opaque to the core
    /// and passed through to the dashboard event unchanged.
    async fn team_insights(&self, manager_profile_id: &str) -> Result<Value, AppError>;
}

/// Static placeholder provider.
pub struct StaticInsights;

#[async_trait]
impl InsightsProvider for StaticInsights {
    async fn team_insights(&self, _manager_profile_id: &str) -> Result<Value, AppError> {
        Ok(json!({
            "productivityTrend": "increasing",
            "teamMorale": "high",
            "recommendations": [
                "Consider implementing flexible work hours",
                "Team performance is above average",
                "Schedule regular one-on-ones with team members"
            ],
            "riskFactors": [],
            "opportunities": [
                "Cross-training opportunities identified",
                "Mentorship program could benefit junior members"
            ]
        }))
    }
}
