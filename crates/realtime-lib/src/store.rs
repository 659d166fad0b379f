// ============================
// crates/realtime-lib/src/store.rs
// ============================
//! Record store abstraction.
//!
//! The real-time core never owns its records: identities, profiles,
//! attendance, leaves, and reviews live in an external document store
//! reached through [`RecordStore`]. The trait assumes read-your-writes
//! consistency on the path from a handler write to the reads used to build
//! that handler's own response.
//!
//! [`MemoryStore`] is the bundled implementation used by the demo binary
//! and the test suite.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hrms_common::{
    AttendanceRecord, EmployeeProfile, Identity, LeaveRequest, LeaveStatus, LeaveType,
    PerformanceReview, ReviewStatus, UserId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Fields written when a leave request is decided.
#[derive(Debug, Clone)]
pub struct LeaveDecision {
    pub status: LeaveStatus,
    pub decided_by: UserId,
    pub decided_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Trait for the external record store collaborator.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Resolve an identity (id + current role) by user id.
    async fn find_identity(&self, user_id: &str) -> Result<Option<Identity>, AppError>;

    /// Find the employee profile owned by a user id.
    async fn find_profile_by_user(&self, user_id: &str)
        -> Result<Option<EmployeeProfile>, AppError>;

    /// Profiles whose `manager_id` equals the given profile id.
    async fn find_reports(&self, manager_profile_id: &str)
        -> Result<Vec<EmployeeProfile>, AppError>;

    /// Attendance records for the subjects inside `[from, to)`.
    async fn attendance_between(
        &self,
        subjects: &[UserId],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AppError>;

    /// Leave requests for the subjects still in the `APPLIED` state.
    async fn pending_leaves(&self, subjects: &[UserId]) -> Result<Vec<LeaveRequest>, AppError>;

    /// Leave requests for the subjects created inside `[from, to)`.
    async fn leaves_between(
        &self,
        subjects: &[UserId],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LeaveRequest>, AppError>;

    /// Look up one leave request by id.
    async fn find_leave(&self, leave_id: &str) -> Result<Option<LeaveRequest>, AppError>;

    /// Persist a decision on an existing leave request.
    async fn record_leave_decision(
        &self,
        leave_id: &str,
        decision: LeaveDecision,
    ) -> Result<(), AppError>;

    /// Look up a leave type by id.
    async fn find_leave_type(&self, leave_type_id: &str) -> Result<Option<LeaveType>, AppError>;

    /// Insert a new performance review, assigning and returning its id.
    async fn insert_review(&self, review: PerformanceReview) -> Result<String, AppError>;

    /// Completed reviews for the subjects, newest first.
    async fn completed_reviews(&self, subjects: &[UserId])
        -> Result<Vec<PerformanceReview>, AppError>;

    /// Reviews for the subjects created inside `[from, to)`.
    async fn reviews_between(
        &self,
        subjects: &[UserId],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PerformanceReview>, AppError>;
}

#[derive(Default)]
struct MemoryInner {
    identities: HashMap<UserId, Identity>,
    profiles: Vec<EmployeeProfile>,
    attendance: Vec<AttendanceRecord>,
    leaves: HashMap<String, LeaveRequest>,
    leave_types: HashMap<String, LeaveType>,
    reviews: HashMap<String, PerformanceReview>,
}

/// In-memory implementation of [`RecordStore`].
///
/// One coarse lock over all record sets; reads after writes inside the same
/// process always observe the write.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_identity(&self, identity: Identity) {
        self.inner
            .write()
            .identities
            .insert(identity.user_id.clone(), identity);
    }

    pub fn put_profile(&self, profile: EmployeeProfile) {
        self.inner.write().profiles.push(profile);
    }

    pub fn put_attendance(&self, record: AttendanceRecord) {
        self.inner.write().attendance.push(record);
    }

    pub fn put_leave(&self, leave: LeaveRequest) {
        self.inner.write().leaves.insert(leave.id.clone(), leave);
    }

    pub fn put_leave_type(&self, leave_type: LeaveType) {
        self.inner
            .write()
            .leave_types
            .insert(leave_type.id.clone(), leave_type);
    }

    pub fn put_review(&self, review: PerformanceReview) {
        self.inner.write().reviews.insert(review.id.clone(), review);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_identity(&self, user_id: &str) -> Result<Option<Identity>, AppError> {
        Ok(self.inner.read().identities.get(user_id).cloned())
    }

    async fn find_profile_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<EmployeeProfile>, AppError> {
        Ok(self
            .inner
            .read()
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn find_reports(
        &self,
        manager_profile_id: &str,
    ) -> Result<Vec<EmployeeProfile>, AppError> {
        Ok(self
            .inner
            .read()
            .profiles
            .iter()
            .filter(|p| p.manager_id.as_deref() == Some(manager_profile_id))
            .cloned()
            .collect())
    }

    async fn attendance_between(
        &self,
        subjects: &[UserId],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self
            .inner
            .read()
            .attendance
            .iter()
            .filter(|r| subjects.contains(&r.employee_id) && r.date >= from && r.date < to)
            .cloned()
            .collect())
    }

    async fn pending_leaves(&self, subjects: &[UserId]) -> Result<Vec<LeaveRequest>, AppError> {
        Ok(self
            .inner
            .read()
            .leaves
            .values()
            .filter(|l| subjects.contains(&l.employee_id) && l.status == LeaveStatus::Applied)
            .cloned()
            .collect())
    }

    async fn leaves_between(
        &self,
        subjects: &[UserId],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        Ok(self
            .inner
            .read()
            .leaves
            .values()
            .filter(|l| {
                subjects.contains(&l.employee_id) && l.created_at >= from && l.created_at < to
            })
            .cloned()
            .collect())
    }

    async fn find_leave(&self, leave_id: &str) -> Result<Option<LeaveRequest>, AppError> {
        Ok(self.inner.read().leaves.get(leave_id).cloned())
    }

    async fn record_leave_decision(
        &self,
        leave_id: &str,
        decision: LeaveDecision,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.write();
        let leave = inner
            .leaves
            .get_mut(leave_id)
            .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

        leave.status = decision.status;
        leave.decided_by = Some(decision.decided_by);
        leave.decided_at = Some(decision.decided_at);
        leave.notes = decision.notes;
        Ok(())
    }

    async fn find_leave_type(&self, leave_type_id: &str) -> Result<Option<LeaveType>, AppError> {
        Ok(self.inner.read().leave_types.get(leave_type_id).cloned())
    }

    async fn insert_review(&self, mut review: PerformanceReview) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        review.id = id.clone();
        self.inner.write().reviews.insert(id.clone(), review);
        Ok(id)
    }

    async fn completed_reviews(
        &self,
        subjects: &[UserId],
    ) -> Result<Vec<PerformanceReview>, AppError> {
        let mut reviews: Vec<_> = self
            .inner
            .read()
            .reviews
            .values()
            .filter(|r| subjects.contains(&r.employee_id) && r.status == ReviewStatus::Completed)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn reviews_between(
        &self,
        subjects: &[UserId],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PerformanceReview>, AppError> {
        Ok(self
            .inner
            .read()
            .reviews
            .values()
            .filter(|r| {
                subjects.contains(&r.employee_id) && r.created_at >= from && r.created_at < to
            })
            .cloned()
            .collect())
    }
}
