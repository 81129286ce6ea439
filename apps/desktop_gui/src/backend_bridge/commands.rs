//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::{navigation::Section, services::ReportKind};
use shared::protocol::EntityKind;

#[derive(Debug, Clone)]
pub enum BackendCommand {
    RestoreSession,
    Login {
        email: String,
        password: String,
    },
    Logout,
    LoadDashboard,
    LoadSection(Section),
    /// Creates a record when `id` is `None`, otherwise patches it.
    SaveRecord {
        section: Section,
        id: Option<i64>,
        payload: serde_json::Value,
    },
    DeleteRecord {
        section: Section,
        id: i64,
    },
    AnalyzeTransition {
        kind: EntityKind,
        id: i64,
        target: String,
        reason: Option<String>,
    },
    ExecuteTransition {
        kind: EntityKind,
        id: i64,
        target: String,
        reason: Option<String>,
    },
    DownloadReport {
        kind: ReportKind,
        target: PathBuf,
    },
}
