//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use chrono::Local;
use client_core::{
    dashboard::load_dashboard,
    navigation::Section,
    services::{Resource, ResourceService},
    ClientError, ClientResult, RentManagerClient, Session, Settings,
};
use crossbeam_channel::{Receiver, Sender};
use serde::de::DeserializeOwned;
use shared::domain::{ContractId, InvoiceId, PaymentId, PropertyId, UserId};
use tracing::{debug, error, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{SectionData, UiError, UiErrorContext, UiEvent};

/// Starts the worker thread. It owns a tokio runtime and the client, and
/// answers every command with one or more [`UiEvent`]s until either channel
/// closes.
pub fn launch(
    settings: Settings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to build backend runtime: {err}");
                let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker could not start: {err}"),
                )));
                return;
            }
        };

        let client = match RentManagerClient::with_file_session(&settings) {
            Ok(client) => client,
            Err(err) => {
                error!("failed to build api client: {err}");
                let _ = ui_tx.send(UiEvent::Error(UiError::from_client(
                    UiErrorContext::BackendStartup,
                    &err,
                )));
                return;
            }
        };
        info!(api = client.base_url(), "backend worker ready");

        let mut worker = Worker::new(client);
        for cmd in cmd_rx.iter() {
            for event in runtime.block_on(worker.handle(cmd)) {
                if ui_tx.send(event).is_err() {
                    debug!("ui gone; stopping backend worker");
                    return;
                }
            }
        }
        debug!("command queue closed; stopping backend worker");
    })
}

pub struct Worker {
    client: RentManagerClient,
    session: Option<Session>,
}

impl Worker {
    pub fn new(client: RentManagerClient) -> Self {
        Self {
            client,
            session: None,
        }
    }

    /// Runs one command. When the backend refuses the session, the worker's
    /// copy and the persisted one are dropped before the events go out.
    pub async fn handle(&mut self, cmd: BackendCommand) -> Vec<UiEvent> {
        let events = self.run(cmd).await;
        if events.iter().any(rejects_session) {
            self.session = None;
            if let Err(err) = self.client.auth.invalidate().await {
                warn!("could not clear rejected session: {err}");
            }
        }
        events
    }

    async fn run(&mut self, cmd: BackendCommand) -> Vec<UiEvent> {
        match cmd {
            BackendCommand::RestoreSession => match self.client.auth.restore().await {
                Ok(Some(session)) => {
                    self.session = Some(session.clone());
                    vec![UiEvent::SignedIn(session)]
                }
                Ok(None) => vec![UiEvent::SignedOut],
                Err(err) => vec![
                    UiEvent::Error(UiError::from_client(UiErrorContext::Login, &err)),
                    UiEvent::SignedOut,
                ],
            },
            BackendCommand::Login { email, password } => {
                match self.client.auth.login(&email, &password).await {
                    Ok(session) => {
                        self.session = Some(session.clone());
                        vec![UiEvent::SignedIn(session)]
                    }
                    Err(err) => vec![UiEvent::Error(UiError::from_client(
                        UiErrorContext::Login,
                        &err,
                    ))],
                }
            }
            BackendCommand::Logout => {
                self.session = None;
                match self.client.auth.logout().await {
                    Ok(()) => vec![UiEvent::SignedOut],
                    Err(err) => vec![
                        UiEvent::Error(UiError::from_client(UiErrorContext::General, &err)),
                        UiEvent::SignedOut,
                    ],
                }
            }
            BackendCommand::LoadDashboard => {
                let Some(session) = &self.session else {
                    return vec![UiEvent::Error(UiError::from_client(
                        UiErrorContext::Load,
                        &ClientError::NotAuthenticated,
                    ))];
                };
                match load_dashboard(&self.client, session, Local::now().date_naive()).await {
                    Ok(dashboard) => vec![UiEvent::DashboardLoaded(Box::new(dashboard))],
                    Err(err) => vec![UiEvent::Error(UiError::from_client(
                        UiErrorContext::Load,
                        &err,
                    ))],
                }
            }
            BackendCommand::LoadSection(section) => match load_section(&self.client, section).await
            {
                Ok(Some(data)) => vec![UiEvent::SectionLoaded(data)],
                Ok(None) => Vec::new(),
                Err(err) => vec![UiEvent::SectionFailed {
                    section,
                    error: UiError::from_client(UiErrorContext::Load, &err),
                }],
            },
            BackendCommand::SaveRecord {
                section,
                id,
                payload,
            } => match save_record(&self.client, section, id, payload).await {
                Ok(()) => vec![UiEvent::RecordSaved { section, id }],
                Err(err) => vec![UiEvent::Error(UiError::from_client(
                    UiErrorContext::Save,
                    &err,
                ))],
            },
            BackendCommand::DeleteRecord { section, id } => {
                match delete_record(&self.client, section, id).await {
                    Ok(()) => vec![UiEvent::RecordDeleted { section, id }],
                    Err(err) => vec![UiEvent::Error(UiError::from_client(
                        UiErrorContext::Save,
                        &err,
                    ))],
                }
            }
            BackendCommand::AnalyzeTransition {
                kind,
                id,
                target,
                reason,
            } => match self
                .client
                .transitions
                .analyze(kind, id, &target, reason.as_deref())
                .await
            {
                Ok(analysis) => vec![UiEvent::TransitionAnalyzed { kind, id, analysis }],
                Err(err) => vec![UiEvent::Error(UiError::from_client(
                    UiErrorContext::Transition,
                    &err,
                ))],
            },
            BackendCommand::ExecuteTransition {
                kind,
                id,
                target,
                reason,
            } => match self
                .client
                .transitions
                .execute(kind, id, &target, reason.as_deref())
                .await
            {
                Ok(outcome) => vec![UiEvent::TransitionExecuted { kind, id, outcome }],
                Err(err) => vec![UiEvent::Error(UiError::from_client(
                    UiErrorContext::Transition,
                    &err,
                ))],
            },
            BackendCommand::DownloadReport { kind, target } => {
                let saved = match self.client.reports.download(kind).await {
                    Ok(document) => document.save_to(&target).await,
                    Err(err) => Err(err),
                };
                match saved {
                    Ok(path) => vec![UiEvent::ReportSaved(path)],
                    Err(err) => vec![UiEvent::Error(UiError::from_client(
                        UiErrorContext::Report,
                        &err,
                    ))],
                }
            }
        }
    }
}

fn rejects_session(event: &UiEvent) -> bool {
    match event {
        UiEvent::Error(error) | UiEvent::SectionFailed { error, .. } => error.requires_reauth(),
        _ => false,
    }
}

/// Overview and Reports have no record list; they yield `None`.
async fn load_section(
    client: &RentManagerClient,
    section: Section,
) -> ClientResult<Option<SectionData>> {
    let data = match section {
        Section::Properties => SectionData::Properties(client.properties.list().await?),
        Section::Contracts => SectionData::Contracts(client.contracts.list().await?),
        Section::Invoices => SectionData::Invoices(client.invoices.list().await?),
        Section::Payments => SectionData::Payments(client.payments.list().await?),
        Section::Users => SectionData::Users(client.users.list().await?),
        Section::Overview | Section::Reports => return Ok(None),
    };
    debug!(section = section.label(), records = data.len(), "section loaded");
    Ok(Some(data))
}

async fn save_record(
    client: &RentManagerClient,
    section: Section,
    id: Option<i64>,
    payload: serde_json::Value,
) -> ClientResult<()> {
    match section {
        Section::Properties => save(&client.properties, id, payload).await,
        Section::Contracts => save(&client.contracts, id, payload).await,
        Section::Invoices => save(&client.invoices, id, payload).await,
        Section::Payments => save(&client.payments, id, payload).await,
        Section::Users => save(&client.users, id, payload).await,
        Section::Overview | Section::Reports => Err(ClientError::Validation(format!(
            "{} has no editable records",
            section.label()
        ))),
    }
}

async fn save<R>(
    service: &ResourceService<R>,
    id: Option<i64>,
    payload: serde_json::Value,
) -> ClientResult<()>
where
    R: Resource,
    R::New: DeserializeOwned,
    R::Update: DeserializeOwned,
{
    let invalid = |err: serde_json::Error| ClientError::Validation(err.to_string());
    match id {
        None => {
            let new: R::New = serde_json::from_value(payload).map_err(invalid)?;
            service.create(&new).await?;
        }
        Some(id) => {
            let patch: R::Update = serde_json::from_value(payload).map_err(invalid)?;
            service.update(R::id(id), &patch).await?;
        }
    }
    Ok(())
}

async fn delete_record(client: &RentManagerClient, section: Section, id: i64) -> ClientResult<()> {
    match section {
        Section::Properties => client.properties.delete(PropertyId(id)).await,
        Section::Contracts => client.contracts.delete(ContractId(id)).await,
        Section::Invoices => client.invoices.delete(InvoiceId(id)).await,
        Section::Payments => client.payments.delete(PaymentId(id)).await,
        Section::Users => client.users.delete(UserId(id)).await,
        Section::Overview | Section::Reports => Err(ClientError::Validation(format!(
            "{} has no deletable records",
            section.label()
        ))),
    }
}
