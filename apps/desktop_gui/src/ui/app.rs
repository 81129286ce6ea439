use std::{collections::HashMap, time::Duration};

use client_core::{
    dashboard::Dashboard,
    navigation::{landing_section, sections_for, Permissions, Section},
    Session, TransitionService,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::protocol::{EntityKind, TransitionAnalysis};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::dashboard_view;
use crate::ui::records::{self, RecordRow};
use crate::ui::report_form::{ReportChoice, ReportForm};

pub const PREFS_STORAGE_KEY: &str = "rentmanager_desktop.prefs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    pub dark_mode: bool,
    pub last_section: Option<String>,
    pub last_email: String,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            last_section: None,
            last_email: String::new(),
        }
    }
}

impl UiPreferences {
    /// The remembered section if `role` may still open it, otherwise the
    /// role's landing section.
    pub fn start_section(&self, role: shared::domain::Role) -> Section {
        self.last_section
            .as_deref()
            .and_then(|label| Section::ALL.into_iter().find(|s| s.label() == label))
            .filter(|section| sections_for(role).contains(section))
            .unwrap_or_else(|| landing_section(role))
    }
}

#[derive(Debug, Clone, Default)]
enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppView {
    Login,
    Main,
}

struct TransitionDialog {
    kind: EntityKind,
    id: i64,
    current: String,
    targets: Vec<&'static str>,
    selected: usize,
    reason: String,
    analysis: Option<TransitionAnalysis>,
    error: Option<String>,
    busy: bool,
}

impl TransitionDialog {
    fn target(&self) -> Option<&'static str> {
        self.targets.get(self.selected).copied()
    }

    fn reason(&self) -> Option<String> {
        let reason = self.reason.trim();
        (!reason.is_empty()).then(|| reason.to_string())
    }
}

struct RecordEditor {
    section: Section,
    id: Option<i64>,
    text: String,
    error: Option<String>,
}

enum RowAction {
    Edit(serde_json::Value, i64),
    Transition(i64, &'static str),
    Delete(i64),
}

pub struct RentManagerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    api_url: String,
    view: AppView,
    restoring: bool,
    email: String,
    password: String,
    session: Option<Session>,
    section: Section,
    prefs: UiPreferences,
    applied_dark_mode: Option<bool>,
    status: String,
    banner: Option<UiError>,
    dashboard: LoadState<Dashboard>,
    records: HashMap<Section, LoadState<Vec<RecordRow>>>,
    filter: String,
    transition: Option<TransitionDialog>,
    pending_delete: Option<(Section, i64)>,
    editor: Option<RecordEditor>,
    report: ReportForm,
}

impl RentManagerApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_url: String,
        prefs: Option<UiPreferences>,
    ) -> Self {
        let prefs = prefs.unwrap_or_default();
        let mut app = Self {
            cmd_tx,
            ui_rx,
            api_url,
            view: AppView::Login,
            restoring: true,
            email: prefs.last_email.clone(),
            password: String::new(),
            session: None,
            section: Section::Overview,
            prefs,
            applied_dark_mode: None,
            status: "Restoring session...".to_string(),
            banner: None,
            dashboard: LoadState::Idle,
            records: HashMap::new(),
            filter: String::new(),
            transition: None,
            pending_delete: None,
            editor: None,
            report: ReportForm::default(),
        };
        app.send(BackendCommand::RestoreSession);
        app
    }

    fn send(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn permissions(&self) -> Option<Permissions> {
        self.session
            .as_ref()
            .map(|session| Permissions::for_role(session.role()))
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::SignedIn(session) => {
                    self.restoring = false;
                    self.password.clear();
                    self.banner = None;
                    self.reset_caches();
                    self.status = format!(
                        "Signed in as {} ({})",
                        session.user.display_name(),
                        session.role().label()
                    );
                    self.prefs.last_email = session.user.email.clone();
                    let start = self.prefs.start_section(session.role());
                    self.session = Some(session);
                    self.view = AppView::Main;
                    self.select_section(start);
                }
                UiEvent::SignedOut => self.sign_out_locally("Signed out"),
                UiEvent::DashboardLoaded(dashboard) => {
                    self.dashboard = LoadState::Loaded(*dashboard);
                }
                UiEvent::SectionLoaded(data) => {
                    self.records
                        .insert(data.section(), LoadState::Loaded(records::rows(&data)));
                }
                UiEvent::SectionFailed { section, error } => {
                    if error.requires_reauth() {
                        self.handle_error(error);
                    } else {
                        self.records
                            .insert(section, LoadState::Failed(error.message().to_string()));
                    }
                }
                UiEvent::TransitionAnalyzed { kind, id, analysis } => {
                    if let Some(dialog) = self
                        .transition
                        .as_mut()
                        .filter(|d| d.kind == kind && d.id == id)
                    {
                        dialog.busy = false;
                        dialog.error = None;
                        dialog.analysis = Some(analysis);
                    }
                }
                UiEvent::TransitionExecuted { kind, id, outcome } => {
                    if outcome.exito {
                        self.transition = None;
                        self.status = format!(
                            "{} {id}: {} -> {}",
                            kind.resource(),
                            outcome.estado_anterior,
                            outcome.estado_nuevo
                        );
                        self.dashboard = LoadState::Idle;
                        self.reload(self.section);
                    } else if let Some(dialog) = self.transition.as_mut() {
                        dialog.busy = false;
                        dialog.error = Some(
                            outcome
                                .mensaje
                                .unwrap_or_else(|| "The backend did not apply the change".into()),
                        );
                    }
                }
                UiEvent::RecordSaved { section, id } => {
                    self.editor = None;
                    self.status = match id {
                        Some(id) => format!("Saved {} {id}", section.label().to_lowercase()),
                        None => format!("Created a record in {}", section.label().to_lowercase()),
                    };
                    self.dashboard = LoadState::Idle;
                    self.reload(section);
                }
                UiEvent::RecordDeleted { section, id } => {
                    self.status = format!("Deleted {} {id}", section.label().to_lowercase());
                    self.dashboard = LoadState::Idle;
                    self.reload(section);
                }
                UiEvent::ReportSaved(path) => {
                    self.status = format!("Report saved to {}", path.display());
                }
                UiEvent::Error(error) => self.handle_error(error),
            }
        }
    }

    fn handle_error(&mut self, error: UiError) {
        tracing::warn!(context = ?error.context(), "{}", error.message());
        if error.requires_reauth() {
            self.sign_out_locally("Session ended; sign in again");
        }
        match error.context() {
            UiErrorContext::Load if matches!(self.dashboard, LoadState::Loading) => {
                self.dashboard = LoadState::Failed(error.message().to_string());
            }
            UiErrorContext::Transition => {
                if let Some(dialog) = self.transition.as_mut() {
                    dialog.busy = false;
                    dialog.error = Some(error.message().to_string());
                }
            }
            UiErrorContext::Save => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.error = Some(error.message().to_string());
                }
            }
            UiErrorContext::Login | UiErrorContext::BackendStartup => self.restoring = false,
            _ => {}
        }
        self.status = format!("{}: {}", error.label(), error.message());
        self.banner = Some(error);
    }

    fn sign_out_locally(&mut self, status: &str) {
        self.session = None;
        self.view = AppView::Login;
        self.restoring = false;
        self.reset_caches();
        self.status = status.to_string();
    }

    fn reset_caches(&mut self) {
        self.dashboard = LoadState::Idle;
        self.records.clear();
        self.filter.clear();
        self.transition = None;
        self.pending_delete = None;
        self.editor = None;
    }

    fn reload(&mut self, section: Section) {
        match section {
            Section::Overview => {
                self.dashboard = LoadState::Loading;
                self.send(BackendCommand::LoadDashboard);
            }
            Section::Reports => {}
            _ => {
                self.records.insert(section, LoadState::Loading);
                self.send(BackendCommand::LoadSection(section));
            }
        }
    }

    fn select_section(&mut self, section: Section) {
        if self.section != section {
            self.filter.clear();
        }
        self.section = section;
        self.prefs.last_section = Some(section.label().to_string());
        let stale = match section {
            Section::Overview => matches!(self.dashboard, LoadState::Idle),
            Section::Reports => false,
            _ => matches!(
                self.records.get(&section),
                None | Some(LoadState::Idle)
            ),
        };
        if stale {
            self.reload(section);
        }
    }

    fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_dark_mode != Some(self.prefs.dark_mode) {
            ctx.set_visuals(if self.prefs.dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            self.applied_dark_mode = Some(self.prefs.dark_mode);
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.banner.clone() else {
            return;
        };
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{}: {}", banner.label(), banner.message()))
                            .color(egui::Color32::WHITE),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.banner = None;
                        }
                    });
                });
            });
    }

    fn show_login_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            ui.add_space((avail.y * 0.15).clamp(18.0, 120.0));
            ui.vertical_centered(|ui| {
                ui.set_width(avail.x.clamp(320.0, 420.0));
                ui.heading("RentManager");
                ui.weak(&self.api_url);
                ui.add_space(8.0);
                self.show_status_banner(ui);

                if self.restoring {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Restoring session...");
                    });
                    return;
                }

                ui.add_space(6.0);
                ui.add(
                    egui::TextEdit::singleline(&mut self.email)
                        .hint_text("Email")
                        .desired_width(f32::INFINITY),
                );
                let password = ui.add(
                    egui::TextEdit::singleline(&mut self.password)
                        .password(true)
                        .hint_text("Password")
                        .desired_width(f32::INFINITY),
                );

                let ready = !self.email.trim().is_empty() && !self.password.is_empty();
                let enter = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let clicked = ui
                    .add_enabled(ready, egui::Button::new("Sign in"))
                    .clicked();
                if ready && (clicked || enter) {
                    self.status = "Signing in...".to_string();
                    let cmd = BackendCommand::Login {
                        email: self.email.trim().to_string(),
                        password: self.password.clone(),
                    };
                    self.send(cmd);
                }
                ui.add_space(6.0);
                ui.weak(&self.status);
            });
        });
    }

    fn show_main_workspace(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.clone() else {
            self.view = AppView::Login;
            return;
        };
        let role = session.role();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("RentManager");
                ui.separator();
                ui.label(format!(
                    "{} ({})",
                    session.user.display_name(),
                    role.label()
                ));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Sign out").clicked() {
                        self.send(BackendCommand::Logout);
                    }
                    ui.checkbox(&mut self.prefs.dark_mode, "Dark");
                    if ui.button("Refresh").clicked() {
                        self.reload(self.section);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.weak(&self.status);
        });

        egui::SidePanel::left("navigation")
            .resizable(false)
            .default_width(150.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                for section in sections_for(role) {
                    if ui
                        .selectable_label(self.section == *section, section.label())
                        .clicked()
                    {
                        self.select_section(*section);
                    }
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            match self.section {
                Section::Overview => self.show_overview(ui),
                Section::Reports => self.show_reports(ui),
                section => self.show_records(ui, section),
            }
        });

        self.show_transition_window(ctx);
        self.show_delete_confirmation(ctx);
        self.show_editor_window(ctx);
    }

    fn show_overview(&mut self, ui: &mut egui::Ui) {
        ui.heading("Overview");
        ui.add_space(6.0);
        let mut retry = false;
        match &self.dashboard {
            LoadState::Idle | LoadState::Loading => {
                ui.spinner();
            }
            LoadState::Failed(message) => {
                ui.colored_label(egui::Color32::LIGHT_RED, message);
                retry = ui.button("Retry").clicked();
            }
            LoadState::Loaded(dashboard) => {
                egui::ScrollArea::vertical().show(ui, |ui| dashboard_view::show(ui, dashboard));
            }
        }
        if retry {
            self.reload(Section::Overview);
        }
    }

    fn show_records(&mut self, ui: &mut egui::Ui, section: Section) {
        let actions = self
            .permissions()
            .map(|p| p.actions(section))
            .unwrap_or_default();

        ui.horizontal(|ui| {
            ui.heading(section.label());
            ui.add_space(12.0);
            ui.add(
                egui::TextEdit::singleline(&mut self.filter)
                    .hint_text("Filter")
                    .desired_width(200.0),
            );
            if actions.create && ui.button("New...").clicked() {
                self.editor = Some(RecordEditor {
                    section,
                    id: None,
                    text: pretty(&records::create_template(section)),
                    error: None,
                });
            }
        });
        ui.add_space(6.0);

        let mut retry = false;
        let mut clicked: Option<RowAction> = None;
        match self.records.get(&section) {
            None | Some(LoadState::Idle) | Some(LoadState::Loading) => {
                ui.spinner();
            }
            Some(LoadState::Failed(message)) => {
                ui.colored_label(egui::Color32::LIGHT_RED, message);
                retry = ui.button("Retry").clicked();
            }
            Some(LoadState::Loaded(rows)) if rows.is_empty() => {
                ui.weak("No data");
            }
            Some(LoadState::Loaded(rows)) => {
                let visible: Vec<&RecordRow> =
                    rows.iter().filter(|row| row.matches(&self.filter)).collect();
                if visible.is_empty() {
                    ui.weak("No records match the filter");
                }
                let with_actions = actions.edit || actions.delete || actions.transition;
                egui::ScrollArea::both().show(ui, |ui| {
                    egui::Grid::new(("records", section.label()))
                        .striped(true)
                        .show(ui, |ui| {
                            for header in records::headers(section) {
                                ui.strong(*header);
                            }
                            if with_actions {
                                ui.strong("");
                            }
                            ui.end_row();

                            for row in visible {
                                for cell in &row.cells {
                                    ui.label(cell);
                                }
                                if with_actions {
                                    ui.horizontal(|ui| {
                                        if actions.edit && ui.small_button("Edit").clicked() {
                                            clicked = Some(RowAction::Edit(
                                                records::edit_draft(row),
                                                row.id,
                                            ));
                                        }
                                        if let Some(state) =
                                            row.state.filter(|_| actions.transition)
                                        {
                                            if ui.small_button("Change state").clicked() {
                                                clicked = Some(RowAction::Transition(row.id, state));
                                            }
                                        }
                                        if actions.delete && ui.small_button("Delete").clicked() {
                                            clicked = Some(RowAction::Delete(row.id));
                                        }
                                    });
                                }
                                ui.end_row();
                            }
                        });
                });
            }
        }

        if retry {
            self.reload(section);
        }
        match clicked {
            Some(RowAction::Edit(draft, id)) => {
                self.editor = Some(RecordEditor {
                    section,
                    id: Some(id),
                    text: pretty(&draft),
                    error: None,
                });
            }
            Some(RowAction::Transition(id, current)) => {
                if let Some(kind) = section.entity_kind() {
                    self.transition = Some(TransitionDialog {
                        kind,
                        id,
                        current: current.to_string(),
                        targets: TransitionService::candidate_targets(kind, current),
                        selected: 0,
                        reason: String::new(),
                        analysis: None,
                        error: None,
                        busy: false,
                    });
                }
            }
            Some(RowAction::Delete(id)) => self.pending_delete = Some((section, id)),
            None => {}
        }
    }

    fn show_reports(&mut self, ui: &mut egui::Ui) {
        ui.heading("Reports");
        ui.add_space(6.0);
        egui::Grid::new("report_form").num_columns(2).show(ui, |ui| {
            ui.label("Report");
            egui::ComboBox::from_id_salt("report_choice")
                .selected_text(self.report.choice.label())
                .show_ui(ui, |ui| {
                    for choice in ReportChoice::ALL {
                        ui.selectable_value(&mut self.report.choice, choice, choice.label());
                    }
                });
            ui.end_row();

            if self.report.choice.needs_id() {
                ui.label("Record id");
                ui.text_edit_singleline(&mut self.report.id);
                ui.end_row();
            } else {
                ui.label("From");
                ui.add(egui::TextEdit::singleline(&mut self.report.from).hint_text("2025-01-01"));
                ui.end_row();
                ui.label("To");
                ui.add(egui::TextEdit::singleline(&mut self.report.to).hint_text("2025-12-31"));
                ui.end_row();
            }
        });
        ui.add_space(8.0);

        if ui.button("Save report...").clicked() {
            match self.report.build() {
                Ok(kind) => {
                    if let Some(target) = rfd::FileDialog::new()
                        .set_file_name(kind.default_filename())
                        .save_file()
                    {
                        self.status = "Downloading report...".to_string();
                        self.send(BackendCommand::DownloadReport { kind, target });
                    }
                }
                Err(message) => self.status = message,
            }
        }
    }

    fn show_transition_window(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut command = None;
        if let Some(dialog) = self.transition.as_mut() {
            egui::Window::new(format!("Change state: {} {}", dialog.kind.resource(), dialog.id))
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("Current state: {}", dialog.current));
                    if dialog.targets.is_empty() {
                        ui.weak("No other states");
                        return;
                    }

                    let before = dialog.selected;
                    egui::ComboBox::from_id_salt("transition_target")
                        .selected_text(dialog.target().unwrap_or_default())
                        .show_ui(ui, |ui| {
                            for (idx, target) in dialog.targets.iter().enumerate() {
                                ui.selectable_value(&mut dialog.selected, idx, *target);
                            }
                        });
                    if before != dialog.selected {
                        dialog.analysis = None;
                        dialog.error = None;
                    }
                    ui.add(
                        egui::TextEdit::multiline(&mut dialog.reason)
                            .hint_text("Reason (optional)")
                            .desired_rows(2),
                    );

                    if let Some(analysis) = &dialog.analysis {
                        if analysis.permitida {
                            ui.colored_label(egui::Color32::LIGHT_GREEN, "Allowed");
                        } else {
                            ui.colored_label(egui::Color32::LIGHT_RED, "Not allowed");
                        }
                        for reason in &analysis.motivos {
                            ui.label(format!("- {reason}"));
                        }
                        for warning in &analysis.advertencias {
                            ui.colored_label(egui::Color32::YELLOW, format!("! {warning}"));
                        }
                    }
                    if let Some(error) = &dialog.error {
                        ui.colored_label(egui::Color32::LIGHT_RED, error);
                    }

                    let Some(target) = dialog.target() else {
                        return;
                    };
                    ui.horizontal(|ui| {
                        if ui
                            .add_enabled(!dialog.busy, egui::Button::new("Analyze"))
                            .clicked()
                        {
                            dialog.busy = true;
                            command = Some(BackendCommand::AnalyzeTransition {
                                kind: dialog.kind,
                                id: dialog.id,
                                target: target.to_string(),
                                reason: dialog.reason(),
                            });
                        }
                        let allowed = dialog.analysis.as_ref().is_some_and(|a| a.permitida);
                        if ui
                            .add_enabled(allowed && !dialog.busy, egui::Button::new("Execute"))
                            .clicked()
                        {
                            dialog.busy = true;
                            command = Some(BackendCommand::ExecuteTransition {
                                kind: dialog.kind,
                                id: dialog.id,
                                target: target.to_string(),
                                reason: dialog.reason(),
                            });
                        }
                        if dialog.busy {
                            ui.spinner();
                        }
                    });
                });
        }
        if !open {
            self.transition = None;
        }
        if let Some(cmd) = command {
            self.send(cmd);
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some((section, id)) = self.pending_delete else {
            return;
        };
        let mut decision = None;
        egui::Window::new("Confirm delete")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Delete {} {id}? This cannot be undone.",
                    section.label().to_lowercase()
                ));
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });
        match decision {
            Some(true) => {
                self.pending_delete = None;
                self.send(BackendCommand::DeleteRecord { section, id });
            }
            Some(false) => self.pending_delete = None,
            None => {}
        }
    }

    fn show_editor_window(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut command = None;
        let mut cancel = false;
        if let Some(editor) = self.editor.as_mut() {
            let title = match editor.id {
                Some(id) => format!("Edit {} {id}", editor.section.label().to_lowercase()),
                None => format!("New record in {}", editor.section.label().to_lowercase()),
            };
            egui::Window::new(title)
                .open(&mut open)
                .collapsible(false)
                .default_width(420.0)
                .show(ctx, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut editor.text)
                            .code_editor()
                            .desired_rows(14)
                            .desired_width(f32::INFINITY),
                    );
                    if let Some(error) = &editor.error {
                        ui.colored_label(egui::Color32::LIGHT_RED, error);
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            match serde_json::from_str::<serde_json::Value>(&editor.text) {
                                Ok(payload) => {
                                    editor.error = None;
                                    command = Some(BackendCommand::SaveRecord {
                                        section: editor.section,
                                        id: editor.id,
                                        payload,
                                    });
                                }
                                Err(err) => editor.error = Some(format!("Invalid JSON: {err}")),
                            }
                        }
                        cancel = ui.button("Cancel").clicked();
                    });
                });
        }
        if !open || cancel {
            self.editor = None;
        }
        if let Some(cmd) = command {
            self.send(cmd);
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

impl eframe::App for RentManagerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.apply_theme_if_needed(ctx);

        match self.view {
            AppView::Login => self.show_login_screen(ctx),
            AppView::Main => self.show_main_workspace(ctx),
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(serialized) = serde_json::to_string(&self.prefs) {
            storage.set_string(PREFS_STORAGE_KEY, serialized);
        }
    }
}
