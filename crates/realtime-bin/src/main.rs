// ============================
// crates/realtime-bin/src/main.rs
// ============================
use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use hrms_common::{
    AttendanceRecord, AttendanceStatus, EmployeeProfile, Identity, LeaveRequest, LeaveStatus,
    LeaveType, Role,
};
use hrms_realtime_lib::auth::TokenIssuer;
use hrms_realtime_lib::config::Settings;
use hrms_realtime_lib::store::MemoryStore;
use hrms_realtime_lib::{ws_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hrms-realtime", about = "HRMS real-time notification server")]
struct Args {
    /// Path to a TOML settings file (defaults to config.toml in the
    /// working directory).
    #[arg(long)]
    config: Option<String>,

    /// Seed the in-memory store with demo records and log demo tokens.
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    if args.seed_demo {
        seed_demo(&store, &settings)?;
    }

    let state = Arc::new(AppState::new(store, settings.clone()));
    let app = ws_router::create_router(state);

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    info!(addr = %settings.bind_addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Seed a manager with one report, a pending leave, and a week of
/// attendance, then log a token for each so a client can connect straight
/// away.
fn seed_demo(store: &MemoryStore, settings: &Settings) -> anyhow::Result<()> {
    store.put_identity(Identity {
        user_id: "demo-manager".to_string(),
        role: Role::Manager,
    });
    store.put_identity(Identity {
        user_id: "demo-employee".to_string(),
        role: Role::Employee,
    });

    store.put_profile(EmployeeProfile {
        id: "prof-manager".to_string(),
        user_id: "demo-manager".to_string(),
        first_name: "Dana".to_string(),
        last_name: "Reyes".to_string(),
        employee_code: "M-001".to_string(),
        designation: "Engineering Manager".to_string(),
        manager_id: None,
    });
    store.put_profile(EmployeeProfile {
        id: "prof-employee".to_string(),
        user_id: "demo-employee".to_string(),
        first_name: "Sam".to_string(),
        last_name: "Iqbal".to_string(),
        employee_code: "E-001".to_string(),
        designation: "Engineer".to_string(),
        manager_id: Some("prof-manager".to_string()),
    });

    for day in 1..=5 {
        store.put_attendance(AttendanceRecord {
            employee_id: "demo-employee".to_string(),
            date: Utc::now() - Duration::days(day),
            status: AttendanceStatus::Present,
            total_hours: 8.0,
        });
    }

    store.put_leave_type(LeaveType {
        id: "lt-annual".to_string(),
        name: "Annual Leave".to_string(),
    });
    store.put_leave(LeaveRequest {
        id: "leave-demo-1".to_string(),
        employee_id: "demo-employee".to_string(),
        leave_type_id: "lt-annual".to_string(),
        leave_days: 3,
        status: LeaveStatus::Applied,
        created_at: Utc::now() - Duration::days(1),
        decided_by: None,
        decided_at: None,
        notes: None,
    });

    let issuer = TokenIssuer::new(&settings.jwt_secret, settings.token_ttl_secs);
    for user_id in ["demo-manager", "demo-employee"] {
        let token = issuer.issue(user_id)?;
        info!(user_id, token, "demo token");
    }
    Ok(())
}
