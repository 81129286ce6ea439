//! UI layer for desktop GUI: app shell, record tables, dashboards and forms.

pub mod app;
pub mod dashboard_view;
pub mod records;
pub mod report_form;

pub use app::{RentManagerApp, UiPreferences, PREFS_STORAGE_KEY};
