use std::sync::Arc;

pub mod api;
pub mod dashboard;
pub mod error;
pub mod navigation;
pub mod services;
pub mod session;
pub mod settings;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult};
pub use services::{
    AuthService, ContractService, InvoiceService, PaymentService, PropertyService, ReportService,
    TransitionService, UserService,
};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use settings::Settings;

/// Every per-resource service around one shared HTTP client and session store.
#[derive(Clone)]
pub struct RentManagerClient {
    api: Arc<ApiClient>,
    pub auth: AuthService,
    pub properties: PropertyService,
    pub contracts: ContractService,
    pub invoices: InvoiceService,
    pub payments: PaymentService,
    pub users: UserService,
    pub transitions: TransitionService,
    pub reports: ReportService,
}

impl RentManagerClient {
    pub fn new(settings: &Settings, store: Arc<dyn SessionStore>) -> ClientResult<Self> {
        let api = Arc::new(ApiClient::new(settings)?);
        Ok(Self {
            auth: AuthService::new(api.clone(), store),
            properties: PropertyService::new(api.clone()),
            contracts: ContractService::new(api.clone()),
            invoices: InvoiceService::new(api.clone()),
            payments: PaymentService::new(api.clone()),
            users: UserService::new(api.clone()),
            transitions: TransitionService::new(api.clone()),
            reports: ReportService::new(api.clone()),
            api,
        })
    }

    /// Client whose session is persisted as `session.json` in the settings'
    /// data directory.
    pub fn with_file_session(settings: &Settings) -> ClientResult<Self> {
        let data_dir = settings.resolve_data_dir()?;
        Self::new(settings, Arc::new(FileSessionStore::in_dir(&data_dir)))
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
