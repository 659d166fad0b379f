// ============================
// crates/realtime-lib/src/analytics.rs
// ============================
//! Aggregation engine: time-windowed attendance, leave, and performance
//! summaries over the record store. Consumed only by the request handlers.

use crate::error::AppError;
use crate::store::RecordStore;
use chrono::{DateTime, Duration, Utc};
use hrms_common::{
    AttendanceAnalytics, AttendanceStatus, AttendanceSummary, EmployeeDisplay, LeaveAnalytics,
    LeaveStatus, PendingLeave, PerformanceAnalytics, PerformanceSummary, ReviewStatus,
    TeamAnalyticsReport, TimeRange, UserId,
};
use std::sync::Arc;

/// Half-open aggregation interval `[now - N days, now)`.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: i64,
}

impl Window {
    /// Resolve a time-range keyword against a reference instant.
    pub fn resolve(range: TimeRange, now: DateTime<Utc>) -> Self {
        let days = range.days();
        Self {
            start: now - Duration::days(days),
            end: now,
            days,
        }
    }
}

/// Computes windowed summaries for a subject group.
pub struct AggregationEngine {
    store: Arc<dyn RecordStore>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Attendance aggregate over the window.
    ///
    /// `rate = round(present / (subjects × days) × 100)`, defined as 0 when
    /// the denominator is 0. Always an integer in `[0, 100]`.
    pub async fn attendance_summary(
        &self,
        subjects: &[UserId],
        window: &Window,
    ) -> Result<AttendanceSummary, AppError> {
        let records = self
            .store
            .attendance_between(subjects, window.start, window.end)
            .await?;

        let possible = subjects.len() as u64 * window.days as u64;
        let present = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count() as u64;

        let rate = if possible > 0 {
            (present as f64 / possible as f64 * 100.0).round() as u32
        } else {
            0
        };

        Ok(AttendanceSummary {
            attendance_rate: rate.min(100),
            total_days: window.days as u64,
            present_days: present,
            absent_days: possible.saturating_sub(present),
            team_size: subjects.len(),
        })
    }

    /// Pending leave requests for the group, each enriched with the
    /// leave-type name and the subject's display fields.
    pub async fn pending_leaves(&self, subjects: &[UserId]) -> Result<Vec<PendingLeave>, AppError> {
        let requests = self.store.pending_leaves(subjects).await?;

        let mut enriched = Vec::with_capacity(requests.len());
        for request in requests {
            let leave_type = self
                .store
                .find_leave_type(&request.leave_type_id)
                .await?
                .map(|t| t.name)
                .unwrap_or_else(|| "Unknown".to_string());

            let employee = self
                .store
                .find_profile_by_user(&request.employee_id)
                .await?
                .map(|profile| EmployeeDisplay {
                    name: profile.display_name(),
                    employee_code: profile.employee_code,
                    designation: profile.designation,
                });

            enriched.push(PendingLeave {
                request,
                leave_type,
                employee,
            });
        }

        Ok(enriched)
    }

    /// Performance aggregate over completed reviews created inside the
    /// window. `averageScore = round(mean(overallRating))`, 0 when empty.
    pub async fn performance_summary(
        &self,
        subjects: &[UserId],
        window: &Window,
    ) -> Result<PerformanceSummary, AppError> {
        let reviews: Vec<_> = self
            .store
            .completed_reviews(subjects)
            .await?
            .into_iter()
            .filter(|r| r.created_at >= window.start && r.created_at < window.end)
            .collect();

        if reviews.is_empty() {
            return Ok(PerformanceSummary {
                average_score: 0,
                total_reviews: 0,
                recent_reviews: Vec::new(),
            });
        }

        let total: f64 = reviews.iter().map(|r| r.overall_rating).sum();
        let average_score = (total / reviews.len() as f64).round() as u32;

        Ok(PerformanceSummary {
            average_score,
            total_reviews: reviews.len(),
            recent_reviews: reviews.iter().take(5).cloned().collect(),
        })
    }

    /// Three-part analytics block over the window: attendance counts by
    /// status, leave counts by status plus total leave-days, and review
    /// counts by status plus average rating.
    pub async fn team_analytics(
        &self,
        subjects: &[UserId],
        window: &Window,
    ) -> Result<TeamAnalyticsReport, AppError> {
        let attendance = self
            .store
            .attendance_between(subjects, window.start, window.end)
            .await?;
        let leaves = self
            .store
            .leaves_between(subjects, window.start, window.end)
            .await?;
        let reviews = self
            .store
            .reviews_between(subjects, window.start, window.end)
            .await?;

        let average_hours = if attendance.is_empty() {
            0.0
        } else {
            attendance.iter().map(|r| r.total_hours).sum::<f64>() / attendance.len() as f64
        };

        let average_rating = if reviews.is_empty() {
            0
        } else {
            (reviews.iter().map(|r| r.overall_rating).sum::<f64>() / reviews.len() as f64).round()
                as u32
        };

        Ok(TeamAnalyticsReport {
            attendance: AttendanceAnalytics {
                total_days: attendance.len(),
                present_days: count_status(&attendance, AttendanceStatus::Present),
                absent_days: count_status(&attendance, AttendanceStatus::Absent),
                late_days: count_status(&attendance, AttendanceStatus::Late),
                average_hours,
            },
            leaves: LeaveAnalytics {
                total_requests: leaves.len(),
                approved: leaves
                    .iter()
                    .filter(|l| l.status == LeaveStatus::Approved)
                    .count(),
                rejected: leaves
                    .iter()
                    .filter(|l| l.status == LeaveStatus::Rejected)
                    .count(),
                pending: leaves
                    .iter()
                    .filter(|l| l.status == LeaveStatus::Applied)
                    .count(),
                total_days: leaves.iter().map(|l| u64::from(l.leave_days)).sum(),
            },
            performance: PerformanceAnalytics {
                total_reviews: reviews.len(),
                average_rating,
                completed: reviews
                    .iter()
                    .filter(|r| r.status == ReviewStatus::Completed)
                    .count(),
                pending: reviews
                    .iter()
                    .filter(|r| r.status == ReviewStatus::Pending)
                    .count(),
            },
        })
    }
}

fn count_status(records: &[hrms_common::AttendanceRecord], status: AttendanceStatus) -> usize {
    records.iter().filter(|r| r.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use hrms_common::{AttendanceRecord, LeaveRequest, LeaveType, PerformanceReview};
    use serde_json::json;

    fn engine_with_store() -> (AggregationEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (AggregationEngine::new(store.clone()), store)
    }

    fn attendance(employee: &str, age_days: i64, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: employee.to_string(),
            date: Utc::now() - Duration::days(age_days),
            status,
            total_hours: 8.0,
        }
    }

    fn review(employee: &str, rating: f64, status: ReviewStatus, age_days: i64) -> PerformanceReview {
        PerformanceReview {
            id: format!("r-{employee}-{age_days}"),
            employee_id: employee.to_string(),
            reviewer_id: "mgr".to_string(),
            overall_rating: rating,
            status,
            details: json!({}),
            created_at: Utc::now() - Duration::days(age_days),
            updated_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_window_resolution() {
        let now = Utc::now();
        let window = Window::resolve(TimeRange::Quarter, now);
        assert_eq!(window.days, 90);
        assert_eq!(window.end, now);
        assert_eq!(window.start, now - Duration::days(90));
    }

    #[tokio::test]
    async fn test_attendance_rate_two_subjects_one_week() {
        // 2 subjects x 7 days = 14 possible, 10 present -> round(10/14*100) = 71
        let (engine, store) = engine_with_store();
        let subjects = vec!["a".to_string(), "b".to_string()];
        for day in 1..=5 {
            store.put_attendance(attendance("a", day, AttendanceStatus::Present));
            store.put_attendance(attendance("b", day, AttendanceStatus::Present));
        }
        store.put_attendance(attendance("a", 6, AttendanceStatus::Absent));

        let window = Window::resolve(TimeRange::Week, Utc::now());
        let summary = engine.attendance_summary(&subjects, &window).await.unwrap();

        assert_eq!(summary.present_days, 10);
        assert_eq!(summary.attendance_rate, 71);
        assert_eq!(summary.absent_days, 4);
        assert_eq!(summary.team_size, 2);
    }

    #[tokio::test]
    async fn test_attendance_rate_zero_for_empty_group() {
        let (engine, _store) = engine_with_store();
        for range in [TimeRange::Week, TimeRange::Month, TimeRange::Quarter] {
            let window = Window::resolve(range, Utc::now());
            let summary = engine.attendance_summary(&[], &window).await.unwrap();
            assert_eq!(summary.attendance_rate, 0);
            assert_eq!(summary.team_size, 0);
        }
    }

    #[tokio::test]
    async fn test_attendance_excludes_records_outside_window() {
        let (engine, store) = engine_with_store();
        let subjects = vec!["a".to_string()];
        store.put_attendance(attendance("a", 1, AttendanceStatus::Present));
        store.put_attendance(attendance("a", 20, AttendanceStatus::Present));

        let window = Window::resolve(TimeRange::Week, Utc::now());
        let summary = engine.attendance_summary(&subjects, &window).await.unwrap();
        assert_eq!(summary.present_days, 1);
    }

    #[tokio::test]
    async fn test_performance_summary_rounds_mean() {
        let (engine, store) = engine_with_store();
        let subjects = vec!["a".to_string()];
        store.put_review(review("a", 4.0, ReviewStatus::Completed, 2));
        store.put_review(review("a", 5.0, ReviewStatus::Completed, 3));
        // pending reviews are excluded from the dashboard aggregate
        store.put_review(review("a", 1.0, ReviewStatus::Pending, 4));

        let window = Window::resolve(TimeRange::Month, Utc::now());
        let summary = engine.performance_summary(&subjects, &window).await.unwrap();
        assert_eq!(summary.total_reviews, 2);
        // round(4.5) rounds half away from zero
        assert_eq!(summary.average_score, 5);
    }

    #[tokio::test]
    async fn test_performance_summary_zero_when_empty() {
        let (engine, _store) = engine_with_store();
        let window = Window::resolve(TimeRange::Week, Utc::now());
        let summary = engine
            .performance_summary(&["a".to_string()], &window)
            .await
            .unwrap();
        assert_eq!(summary.average_score, 0);
        assert_eq!(summary.total_reviews, 0);
        assert!(summary.recent_reviews.is_empty());
    }

    #[tokio::test]
    async fn test_team_analytics_counts_and_average() {
        let (engine, store) = engine_with_store();
        let subjects = vec!["a".to_string(), "b".to_string()];

        store.put_attendance(attendance("a", 1, AttendanceStatus::Present));
        store.put_attendance(attendance("a", 2, AttendanceStatus::Late));
        store.put_attendance(attendance("b", 1, AttendanceStatus::Absent));

        store.put_leave(LeaveRequest {
            id: "L1".to_string(),
            employee_id: "a".to_string(),
            leave_type_id: "lt".to_string(),
            leave_days: 3,
            status: LeaveStatus::Approved,
            created_at: Utc::now() - Duration::days(2),
            decided_by: Some("mgr".to_string()),
            decided_at: Some(Utc::now()),
            notes: None,
        });
        store.put_leave(LeaveRequest {
            id: "L2".to_string(),
            employee_id: "b".to_string(),
            leave_type_id: "lt".to_string(),
            leave_days: 1,
            status: LeaveStatus::Applied,
            created_at: Utc::now() - Duration::days(4),
            decided_by: None,
            decided_at: None,
            notes: None,
        });

        store.put_review(review("a", 3.0, ReviewStatus::Completed, 2));
        store.put_review(review("b", 4.0, ReviewStatus::Pending, 3));

        let window = Window::resolve(TimeRange::Month, Utc::now());
        let report = engine.team_analytics(&subjects, &window).await.unwrap();

        assert_eq!(report.attendance.total_days, 3);
        assert_eq!(report.attendance.present_days, 1);
        assert_eq!(report.attendance.late_days, 1);
        assert_eq!(report.attendance.absent_days, 1);
        assert!((report.attendance.average_hours - 8.0).abs() < f64::EPSILON);

        assert_eq!(report.leaves.total_requests, 2);
        assert_eq!(report.leaves.approved, 1);
        assert_eq!(report.leaves.pending, 1);
        assert_eq!(report.leaves.total_days, 4);

        assert_eq!(report.performance.total_reviews, 2);
        assert_eq!(report.performance.completed, 1);
        assert_eq!(report.performance.pending, 1);
        // round(mean(3, 4)) = round(3.5) = 4
        assert_eq!(report.performance.average_rating, 4);
    }

    #[tokio::test]
    async fn test_team_analytics_empty_window_is_all_zero() {
        let (engine, _store) = engine_with_store();
        let window = Window::resolve(TimeRange::Week, Utc::now());
        let report = engine
            .team_analytics(&["a".to_string()], &window)
            .await
            .unwrap();
        assert_eq!(report.performance.average_rating, 0);
        assert_eq!(report.leaves.total_requests, 0);
        assert!((report.attendance.average_hours - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_pending_leave_enrichment() {
        let (engine, store) = engine_with_store();
        store.put_leave_type(LeaveType {
            id: "lt-sick".to_string(),
            name: "Sick Leave".to_string(),
        });
        store.put_profile(hrms_common::EmployeeProfile {
            id: "p1".to_string(),
            user_id: "a".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            employee_code: "E-17".to_string(),
            designation: "Engineer".to_string(),
            manager_id: None,
        });
        store.put_leave(LeaveRequest {
            id: "L1".to_string(),
            employee_id: "a".to_string(),
            leave_type_id: "lt-sick".to_string(),
            leave_days: 2,
            status: LeaveStatus::Applied,
            created_at: Utc::now(),
            decided_by: None,
            decided_at: None,
            notes: None,
        });
        store.put_leave(LeaveRequest {
            id: "L2".to_string(),
            employee_id: "a".to_string(),
            leave_type_id: "lt-missing".to_string(),
            leave_days: 1,
            status: LeaveStatus::Applied,
            created_at: Utc::now(),
            decided_by: None,
            decided_at: None,
            notes: None,
        });

        let mut pending = engine.pending_leaves(&["a".to_string()]).await.unwrap();
        pending.sort_by(|a, b| a.request.id.cmp(&b.request.id));
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].leave_type, "Sick Leave");
        let employee = pending[0].employee.as_ref().unwrap();
        assert_eq!(employee.name, "Asha Rao");
        assert_eq!(employee.employee_code, "E-17");
        // unknown leave type falls back instead of failing the dashboard
        assert_eq!(pending[1].leave_type, "Unknown");
    }
}
