//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = match &cmd {
        BackendCommand::RestoreSession => "restore_session",
        BackendCommand::Login { .. } => "login",
        BackendCommand::Logout => "logout",
        BackendCommand::LoadDashboard => "load_dashboard",
        BackendCommand::LoadSection(_) => "load_section",
        BackendCommand::SaveRecord { .. } => "save_record",
        BackendCommand::DeleteRecord { .. } => "delete_record",
        BackendCommand::AnalyzeTransition { .. } => "analyze_transition",
        BackendCommand::ExecuteTransition { .. } => "execute_transition",
        BackendCommand::DownloadReport { .. } => "download_report",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "command queue full");
            *status = "Too many pending requests; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "backend worker gone");
            *status = "Backend worker disconnected; restart the application".to_string();
        }
    }
}
