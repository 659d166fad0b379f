// ============================
// crates/realtime-lib/src/handlers.rs
// ============================
//! Named request/response operations.
//!
//! Every request runs through the same gate: authorization against a
//! static per-event role table, payload validation, then execution. A
//! request either fully succeeds (one well-formed response/notification
//! set) or fully fails (one `error` event to the requester, produced by
//! the connection loop from the returned error). Failures never broadcast
//! and never tear down the connection.

use crate::analytics::{AggregationEngine, Window};
use crate::error::AppError;
use crate::insights::InsightsProvider;
use crate::metrics as keys;
use crate::router::RoomRouter;
use crate::store::{LeaveDecision, RecordStore};
use crate::validation;
use chrono::Utc;
use hrms_common::{
    ClientEvent, EmployeeProfile, Identity, LeaveAction, PerformanceReview, ReviewStatus, Role,
    ServerEvent, TimeRange, UserId,
};
use metrics::counter;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Roles allowed to invoke each request event.
pub fn authorized_roles(event: &ClientEvent) -> &'static [Role] {
    const MANAGEMENT: &[Role] = &[Role::Manager, Role::Hr, Role::Admin];
    match event {
        ClientEvent::RequestDashboardData { .. }
        | ClientEvent::ApproveLeave { .. }
        | ClientEvent::CreatePerformanceReview { .. }
        | ClientEvent::RequestTeamAnalytics { .. } => MANAGEMENT,
    }
}

/// Per-request context: the authenticated requester and the channel back
/// to its own connection.
pub struct RequestContext {
    pub identity: Identity,
    pub reply: mpsc::Sender<ServerEvent>,
}

impl RequestContext {
    /// Emit an event to the requester's own connection, dropping it at the
    /// transport boundary if the channel is full or closed.
    pub fn emit(&self, event: ServerEvent) {
        if self.reply.try_send(event).is_err() {
            counter!(keys::DELIVERY_DROPPED).increment(1);
        }
    }
}

/// The named request handlers, sharing the store, router, and engine.
pub struct RequestHandlers {
    store: Arc<dyn RecordStore>,
    router: RoomRouter,
    engine: AggregationEngine,
    insights: Arc<dyn InsightsProvider>,
}

impl RequestHandlers {
    pub fn new(
        store: Arc<dyn RecordStore>,
        router: RoomRouter,
        insights: Arc<dyn InsightsProvider>,
    ) -> Self {
        let engine = AggregationEngine::new(store.clone());
        Self {
            store,
            router,
            engine,
            insights,
        }
    }

    /// Authorize, validate, and execute one request.
    ///
    /// Errors are returned to the connection loop, which converts each into
    /// exactly one `error` event for the requester.
    pub async fn dispatch(&self, ctx: &RequestContext, event: ClientEvent) -> Result<(), AppError> {
        if !authorized_roles(&event).contains(&ctx.identity.role) {
            return Err(AppError::Authorization(event.name().to_string()));
        }
        validation::validate_client_event(&event)?;

        counter!(keys::EVENT_DISPATCHED, "event" => event.name()).increment(1);
        match event {
            ClientEvent::RequestDashboardData {
                time_range,
                manager_id,
            } => self.dashboard_data(ctx, time_range, manager_id).await,
            ClientEvent::ApproveLeave {
                leave_id,
                action,
                rejection_reason,
            } => self.approve_leave(ctx, leave_id, action, rejection_reason).await,
            ClientEvent::CreatePerformanceReview {
                employee_id,
                review_data,
            } => {
                self.create_performance_review(ctx, employee_id, review_data)
                    .await
            },
            ClientEvent::RequestTeamAnalytics {
                time_range,
                manager_id,
            } => self.team_analytics(ctx, time_range, manager_id).await,
        }
    }

    /// Resolve the subject group for an aggregation request: the
    /// requester's (or the named manager's) profile plus its reports.
    async fn resolve_subject_group(
        &self,
        requester: &Identity,
        manager_id: Option<&str>,
    ) -> Result<(EmployeeProfile, Vec<EmployeeProfile>), AppError> {
        let user_id = manager_id.unwrap_or(&requester.user_id);
        let profile = self
            .store
            .find_profile_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Manager profile not found".to_string()))?;

        let reports = self.store.find_reports(&profile.id).await?;
        Ok((profile, reports))
    }

    async fn dashboard_data(
        &self,
        ctx: &RequestContext,
        time_range: TimeRange,
        manager_id: Option<UserId>,
    ) -> Result<(), AppError> {
        let (profile, reports) = self
            .resolve_subject_group(&ctx.identity, manager_id.as_deref())
            .await?;
        let subjects: Vec<UserId> = reports.iter().map(|p| p.user_id.clone()).collect();
        let window = Window::resolve(time_range, Utc::now());

        // All four parts are computed before anything is emitted, so the
        // dashboard event is atomic: never partial.
        let (attendance_data, pending_leaves, performance_data, ai_insights) = tokio::try_join!(
            self.engine.attendance_summary(&subjects, &window),
            self.engine.pending_leaves(&subjects),
            self.engine.performance_summary(&subjects, &window),
            self.insights.team_insights(&profile.id),
        )?;

        ctx.emit(ServerEvent::DashboardData {
            team_members: reports.len(),
            attendance_data,
            pending_leaves,
            performance_data,
            ai_insights,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn approve_leave(
        &self,
        ctx: &RequestContext,
        leave_id: String,
        action: LeaveAction,
        rejection_reason: Option<String>,
    ) -> Result<(), AppError> {
        let leave = self
            .store
            .find_leave(&leave_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

        let now = Utc::now();
        self.store
            .record_leave_decision(
                &leave_id,
                LeaveDecision {
                    status: action.status(),
                    decided_by: ctx.identity.user_id.clone(),
                    decided_at: now,
                    notes: rejection_reason.clone(),
                },
            )
            .await?;

        let employee_name = self
            .store
            .find_profile_by_user(&leave.employee_id)
            .await?
            .map(|p| p.display_name())
            .unwrap_or_else(|| "Unknown".to_string());

        info!(
            leave_id,
            action = action.as_decision(),
            decided_by = ctx.identity.user_id,
            "leave request decided"
        );

        let status = action.as_decision().to_string();

        // Three-way fan-out; all three emissions happen for every
        // successful decision, none is optional.
        self.router.send_to_identity(
            &leave.employee_id,
            ServerEvent::LeaveDecision {
                leave_request_id: leave_id.clone(),
                status: status.clone(),
                decided_by: ctx.identity.user_id.clone(),
                note: rejection_reason,
                timestamp: now,
            },
        );
        ctx.emit(ServerEvent::LeaveApproved {
            success: true,
            leave_request_id: leave_id.clone(),
            status: status.clone(),
            employee_name: employee_name.clone(),
        });
        self.router.broadcast_to_role(
            Role::Manager,
            ServerEvent::LeaveUpdated {
                leave_request_id: leave_id,
                status,
                employee_name,
                decided_by: ctx.identity.user_id.clone(),
            },
        );
        Ok(())
    }

    async fn create_performance_review(
        &self,
        ctx: &RequestContext,
        employee_id: UserId,
        review_data: Value,
    ) -> Result<(), AppError> {
        let overall_rating = review_data
            .get("overallRating")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        let now = Utc::now();
        let review = PerformanceReview {
            id: String::new(), // assigned by the store
            employee_id: employee_id.clone(),
            reviewer_id: ctx.identity.user_id.clone(),
            overall_rating,
            status: ReviewStatus::Pending,
            details: review_data,
            created_at: now,
            updated_at: now,
        };
        let review_id = self.store.insert_review(review).await?;

        let employee_name = self
            .store
            .find_profile_by_user(&employee_id)
            .await?
            .map(|p| p.display_name())
            .unwrap_or_else(|| "Unknown".to_string());

        info!(review_id, employee_id, "performance review created");

        self.router.send_to_identity(
            &employee_id,
            ServerEvent::PerformanceReviewCreated {
                review_id: review_id.clone(),
                reviewer_id: Some(ctx.identity.user_id.clone()),
                message: Some("New performance review has been created for you".to_string()),
                success: None,
                employee_name: None,
            },
        );
        ctx.emit(ServerEvent::PerformanceReviewCreated {
            review_id,
            reviewer_id: None,
            message: None,
            success: Some(true),
            employee_name: Some(employee_name),
        });
        Ok(())
    }

    async fn team_analytics(
        &self,
        ctx: &RequestContext,
        time_range: TimeRange,
        manager_id: Option<UserId>,
    ) -> Result<(), AppError> {
        let (_profile, reports) = self
            .resolve_subject_group(&ctx.identity, manager_id.as_deref())
            .await?;
        let subjects: Vec<UserId> = reports.iter().map(|p| p.user_id.clone()).collect();
        let window = Window::resolve(time_range, Utc::now());

        let analytics = self.engine.team_analytics(&subjects, &window).await?;

        ctx.emit(ServerEvent::TeamAnalytics {
            analytics,
            team_size: reports.len(),
            time_range,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
