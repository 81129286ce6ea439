//! Backend-to-UI events and the error model shown in the status banner.

use std::path::PathBuf;

use client_core::{dashboard::Dashboard, navigation::Section, ClientError, Session};
use shared::{
    domain::{Contract, Invoice, Payment, Property, User},
    protocol::{EntityKind, TransitionAnalysis, TransitionOutcome},
};

/// One section's records as fetched from the backend.
#[derive(Debug, Clone)]
pub enum SectionData {
    Properties(Vec<Property>),
    Contracts(Vec<Contract>),
    Invoices(Vec<Invoice>),
    Payments(Vec<Payment>),
    Users(Vec<User>),
}

impl SectionData {
    pub fn section(&self) -> Section {
        match self {
            SectionData::Properties(_) => Section::Properties,
            SectionData::Contracts(_) => Section::Contracts,
            SectionData::Invoices(_) => Section::Invoices,
            SectionData::Payments(_) => Section::Payments,
            SectionData::Users(_) => Section::Users,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SectionData::Properties(items) => items.len(),
            SectionData::Contracts(items) => items.len(),
            SectionData::Invoices(items) => items.len(),
            SectionData::Payments(items) => items.len(),
            SectionData::Users(items) => items.len(),
        }
    }
}

pub enum UiEvent {
    Info(String),
    SignedIn(Session),
    /// No persisted session, or it was discarded.
    SignedOut,
    DashboardLoaded(Box<Dashboard>),
    SectionLoaded(SectionData),
    SectionFailed {
        section: Section,
        error: UiError,
    },
    TransitionAnalyzed {
        kind: EntityKind,
        id: i64,
        analysis: TransitionAnalysis,
    },
    TransitionExecuted {
        kind: EntityKind,
        id: i64,
        outcome: TransitionOutcome,
    },
    RecordSaved {
        section: Section,
        id: Option<i64>,
    },
    RecordDeleted {
        section: Section,
        id: i64,
    },
    ReportSaved(PathBuf),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Login,
    Load,
    Save,
    Transition,
    Report,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
    reauth: bool,
}

impl UiError {
    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::NotAuthenticated
            | ClientError::SessionExpired
            | ClientError::Unauthorized(_)
            | ClientError::Forbidden(_) => UiErrorCategory::Auth,
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::Server { status, .. } if matches!(status, 502..=504) => {
                UiErrorCategory::Transport
            }
            ClientError::Config(_)
            | ClientError::Validation(_)
            | ClientError::NotFound(_)
            | ClientError::Rejected { .. } => UiErrorCategory::Validation,
            _ => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context,
            message: err.to_string(),
            reauth: err.requires_reauth(),
        }
    }

    /// For failures that never reached the client library, such as a dead
    /// worker thread.
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("session expired") || lower.contains("not signed in") {
            UiErrorCategory::Auth
        } else if lower.contains("disconnected")
            || lower.contains("connection")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            UiErrorCategory::Transport
        } else if lower.contains("invalid") || lower.contains("required") {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };
        Self {
            category,
            context,
            message,
            reauth: category == UiErrorCategory::Auth,
        }
    }

    /// Whether the user has to sign in again. A 403 is an auth error but
    /// keeps the session.
    pub fn requires_reauth(&self) -> bool {
        self.reauth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn label(&self) -> &'static str {
        match self.category {
            UiErrorCategory::Auth => "Authentication",
            UiErrorCategory::Transport => "Connection",
            UiErrorCategory::Validation => "Rejected",
            UiErrorCategory::Unknown => "Unexpected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_sessions_send_the_user_back_to_login() {
        let err = UiError::from_client(UiErrorContext::Load, &ClientError::SessionExpired);
        assert_eq!(err.category(), UiErrorCategory::Auth);
        assert!(err.requires_reauth());
    }

    #[test]
    fn forbidden_is_auth_but_keeps_the_session() {
        let err = UiError::from_client(
            UiErrorContext::Load,
            &ClientError::Forbidden("solo administradores".into()),
        );
        assert_eq!(err.category(), UiErrorCategory::Auth);
        assert!(!err.requires_reauth());
        assert!(err.message().contains("solo administradores"));
    }

    #[test]
    fn backend_rejections_are_validation_errors() {
        let err = UiError::from_client(
            UiErrorContext::Transition,
            &ClientError::Rejected {
                status: 409,
                message: "contrato cancelado".into(),
            },
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert_eq!(err.context(), UiErrorContext::Transition);
    }

    #[test]
    fn gateway_errors_count_as_connection_problems() {
        let err = UiError::from_client(
            UiErrorContext::Load,
            &ClientError::Server {
                status: 503,
                message: "Service Unavailable".into(),
            },
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);

        let err = UiError::from_client(
            UiErrorContext::Load,
            &ClientError::Server {
                status: 500,
                message: "boom".into(),
            },
        );
        assert_eq!(err.category(), UiErrorCategory::Unknown);
    }

    #[test]
    fn classifies_worker_disconnect_as_transport_error() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "Backend worker disconnected; restart the application",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(!err.requires_reauth());
    }
}
