// ================
// crates/common/src/lib.rs
// ================
//! Shared types for the HRMS real-time service.
//! This module defines the WebSocket event protocol spoken between the
//! server and its clients, the closed role set, and the domain records
//! consumed by the aggregation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identity id as stored in the external user record set.
pub type UserId = String;

/// Closed set of roles an identity can hold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Employee,
    Manager,
    Hr,
    Admin,
    Candidate,
}

impl Role {
    /// Wire/storage form of the role, e.g. `MANAGER`.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "EMPLOYEE",
            Role::Manager => "MANAGER",
            Role::Hr => "HR",
            Role::Admin => "ADMIN",
            Role::Candidate => "CANDIDATE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated actor: user id plus the role resolved at connect time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

/// Keyword describing the aggregation window.
///
/// Day counts are calendar-approximate, not calendar-exact.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    Quarter,
}

impl TimeRange {
    /// Fixed day count for the window.
    pub fn days(self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
        }
    }
}

/// Default window for analytics requests when the client omits one.
fn analytics_default_range() -> TimeRange {
    TimeRange::Month
}

/// Daily attendance status values.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// Leave request lifecycle states.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Applied,
    Approved,
    Rejected,
}

/// Performance review lifecycle states.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Completed,
}

/// Decision a reviewer takes on a leave request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeaveAction {
    Approve,
    Reject,
}

impl LeaveAction {
    /// Uppercased wire form carried by decision events, e.g. `APPROVE`.
    pub fn as_decision(self) -> &'static str {
        match self {
            LeaveAction::Approve => "APPROVE",
            LeaveAction::Reject => "REJECT",
        }
    }

    /// Leave status the store records for this decision.
    pub fn status(self) -> LeaveStatus {
        match self {
            LeaveAction::Approve => LeaveStatus::Approved,
            LeaveAction::Reject => LeaveStatus::Rejected,
        }
    }
}

/// Employee profile record from the external store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub id: String,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub employee_code: String,
    pub designation: String,
    /// Profile id of this employee's manager, if any.
    pub manager_id: Option<String>,
}

impl EmployeeProfile {
    /// Human-readable display name used in notifications.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One daily attendance record for one subject.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub employee_id: UserId,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub total_hours: f64,
}

/// Leave request record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,
    pub employee_id: UserId,
    pub leave_type_id: String,
    pub leave_days: u32,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Leave type lookup record (name only — the core consumes nothing else).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    pub id: String,
    pub name: String,
}

/// Performance review record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReview {
    pub id: String,
    pub employee_id: UserId,
    pub reviewer_id: UserId,
    pub overall_rating: f64,
    pub status: ReviewStatus,
    /// Free-form review content supplied by the reviewer.
    pub details: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendance aggregate for the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    /// Integer percentage in `[0, 100]`; 0 when the group is empty.
    pub attendance_rate: u32,
    pub total_days: u64,
    pub present_days: u64,
    pub absent_days: u64,
    pub team_size: usize,
}

/// Display fields of the subject attached to a pending leave.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDisplay {
    pub name: String,
    pub employee_code: String,
    pub designation: String,
}

/// Pending leave request enriched with leave-type and subject display data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingLeave {
    #[serde(flatten)]
    pub request: LeaveRequest,
    pub leave_type: String,
    pub employee: Option<EmployeeDisplay>,
}

/// Performance aggregate for the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    /// `round(mean(overallRating))`; 0 when no completed reviews exist.
    pub average_score: u32,
    pub total_reviews: usize,
    pub recent_reviews: Vec<PerformanceReview>,
}

/// Attendance block of the team analytics report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceAnalytics {
    pub total_days: usize,
    pub present_days: usize,
    pub absent_days: usize,
    pub late_days: usize,
    pub average_hours: f64,
}

/// Leave block of the team analytics report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveAnalytics {
    pub total_requests: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    pub total_days: u64,
}

/// Performance block of the team analytics report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAnalytics {
    pub total_reviews: usize,
    /// `round(mean(overallRating))`; 0 when no reviews fall in the window.
    pub average_rating: u32,
    pub completed: usize,
    pub pending: usize,
}

/// Three-part windowed report served by `request_team_analytics`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TeamAnalyticsReport {
    pub attendance: AttendanceAnalytics,
    pub leaves: LeaveAnalytics,
    pub performance: PerformanceAnalytics,
}

/// Requests sent from client to server.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Request the dashboard block for the requester's (or named
    /// manager's) subject group.
    #[serde(rename_all = "camelCase")]
    RequestDashboardData {
        #[serde(default)]
        time_range: TimeRange,
        manager_id: Option<UserId>,
    },
    /// Decide a pending leave request.
    #[serde(rename_all = "camelCase")]
    ApproveLeave {
        leave_id: String,
        action: LeaveAction,
        rejection_reason: Option<String>,
    },
    /// Open a new performance review for a subject.
    #[serde(rename_all = "camelCase")]
    CreatePerformanceReview {
        employee_id: UserId,
        review_data: Value,
    },
    /// Request the windowed team analytics report.
    #[serde(rename_all = "camelCase")]
    RequestTeamAnalytics {
        #[serde(default = "analytics_default_range")]
        time_range: TimeRange,
        manager_id: Option<UserId>,
    },
}

impl ClientEvent {
    /// Wire name of the event, for logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::RequestDashboardData { .. } => "request_dashboard_data",
            ClientEvent::ApproveLeave { .. } => "approve_leave",
            ClientEvent::CreatePerformanceReview { .. } => "create_performance_review",
            ClientEvent::RequestTeamAnalytics { .. } => "request_team_analytics",
        }
    }
}

/// Events emitted from server to client.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Greeting confirming a successful connection.
    #[serde(rename_all = "camelCase")]
    Connected {
        message: String,
        user_id: UserId,
        role: Role,
        timestamp: DateTime<Utc>,
    },
    /// Full dashboard block; all four parts are always present together.
    #[serde(rename_all = "camelCase")]
    DashboardData {
        team_members: usize,
        attendance_data: AttendanceSummary,
        pending_leaves: Vec<PendingLeave>,
        performance_data: PerformanceSummary,
        ai_insights: Value,
        timestamp: DateTime<Utc>,
    },
    /// Unicast to the subject of a decided leave request.
    #[serde(rename_all = "camelCase")]
    LeaveDecision {
        leave_request_id: String,
        /// Uppercased action, e.g. `APPROVE`.
        status: String,
        decided_by: UserId,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// Unicast confirmation back to the deciding requester.
    #[serde(rename_all = "camelCase")]
    LeaveApproved {
        success: bool,
        leave_request_id: String,
        status: String,
        employee_name: String,
    },
    /// Broadcast to the MANAGER room after every leave decision.
    #[serde(rename_all = "camelCase")]
    LeaveUpdated {
        leave_request_id: String,
        status: String,
        employee_name: String,
        decided_by: UserId,
    },
    /// Sent to both the subject (informational) and the requester
    /// (confirmation) of a new review; the optional fields differ per
    /// audience.
    #[serde(rename_all = "camelCase")]
    PerformanceReviewCreated {
        review_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reviewer_id: Option<UserId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        success: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        employee_name: Option<String>,
    },
    /// Windowed analytics report for the requester.
    #[serde(rename_all = "camelCase")]
    TeamAnalytics {
        analytics: TeamAnalyticsReport,
        team_size: usize,
        time_range: TimeRange,
        timestamp: DateTime<Utc>,
    },
    /// Single failure event, delivered to the requester only.
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl ServerEvent {
    /// Wire name of the event, for logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::DashboardData { .. } => "dashboard_data",
            ServerEvent::LeaveDecision { .. } => "leave_decision",
            ServerEvent::LeaveApproved { .. } => "leave_approved",
            ServerEvent::LeaveUpdated { .. } => "leave_updated",
            ServerEvent::PerformanceReviewCreated { .. } => "performance_review_created",
            ServerEvent::TeamAnalytics { .. } => "team_analytics",
            ServerEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_client_event_wire_names() {
        let json = r#"{"event":"approve_leave","leaveId":"L1","action":"approve","rejectionReason":null}"#;
        let parsed: ClientEvent = serde_json::from_str(json).unwrap();
        match parsed {
            ClientEvent::ApproveLeave {
                leave_id,
                action,
                rejection_reason,
            } => {
                assert_eq!(leave_id, "L1");
                assert_eq!(action, LeaveAction::Approve);
                assert!(rejection_reason.is_none());
            },
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_dashboard_request_defaults() {
        // timeRange defaults to week for dashboard requests
        let json = r#"{"event":"request_dashboard_data"}"#;
        let parsed: ClientEvent = serde_json::from_str(json).unwrap();
        match parsed {
            ClientEvent::RequestDashboardData {
                time_range,
                manager_id,
            } => {
                assert_eq!(time_range, TimeRange::Week);
                assert!(manager_id.is_none());
            },
            other => panic!("wrong variant: {other:?}"),
        }

        // and to month for analytics requests
        let json = r#"{"event":"request_team_analytics"}"#;
        let parsed: ClientEvent = serde_json::from_str(json).unwrap();
        match parsed {
            ClientEvent::RequestTeamAnalytics { time_range, .. } => {
                assert_eq!(time_range, TimeRange::Month);
            },
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_server_event_serialization() {
        let event = ServerEvent::Connected {
            message: "Connected to real-time updates".to_string(),
            user_id: "u1".to_string(),
            role: Role::Manager,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["event"], "connected");
        assert_eq!(parsed["userId"], "u1");
        assert_eq!(parsed["role"], "MANAGER");
        assert!(parsed["timestamp"].is_string());
    }

    #[test]
    fn test_error_event_omits_empty_detail() {
        let event = ServerEvent::Error {
            message: "Access denied".to_string(),
            error: None,
        };
        let parsed: Value = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(parsed["event"], "error");
        assert_eq!(parsed["message"], "Access denied");
        assert!(parsed.get("error").is_none());
    }

    #[test]
    fn test_time_range_days() {
        assert_eq!(TimeRange::Week.days(), 7);
        assert_eq!(TimeRange::Month.days(), 30);
        assert_eq!(TimeRange::Quarter.days(), 90);
    }

    #[test]
    fn test_leave_action_forms() {
        assert_eq!(LeaveAction::Approve.as_decision(), "APPROVE");
        assert_eq!(LeaveAction::Reject.as_decision(), "REJECT");
        assert_eq!(LeaveAction::Approve.status(), LeaveStatus::Approved);
        assert_eq!(LeaveAction::Reject.status(), LeaveStatus::Rejected);
    }
}
