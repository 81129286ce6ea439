use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::NaiveDate;
use shared::domain::{ContractId, InvoiceId, PropertyId, UserId};
use tracing::info;

use crate::{
    api::{bare_filename, ApiClient, API_PREFIX},
    error::{ClientError, ClientResult},
};

/// Reports rendered by the backend. The client downloads them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Property(PropertyId),
    Contract(ContractId),
    Invoice(InvoiceId),
    TenantStatement(UserId),
    Financial { from: NaiveDate, to: NaiveDate },
}

impl ReportKind {
    pub fn path(&self) -> String {
        match self {
            ReportKind::Property(id) => format!("{API_PREFIX}/reportes/propiedad/{id}"),
            ReportKind::Contract(id) => format!("{API_PREFIX}/reportes/contrato/{id}"),
            ReportKind::Invoice(id) => format!("{API_PREFIX}/reportes/factura/{id}"),
            ReportKind::TenantStatement(id) => format!("{API_PREFIX}/reportes/inquilino/{id}"),
            ReportKind::Financial { .. } => format!("{API_PREFIX}/reportes/financiero"),
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            ReportKind::Financial { from, to } => vec![
                ("desde", from.format("%Y-%m-%d").to_string()),
                ("hasta", to.format("%Y-%m-%d").to_string()),
            ],
            _ => Vec::new(),
        }
    }

    pub fn default_filename(&self) -> String {
        match self {
            ReportKind::Property(id) => format!("propiedad-{id}.pdf"),
            ReportKind::Contract(id) => format!("contrato-{id}.pdf"),
            ReportKind::Invoice(id) => format!("factura-{id}.pdf"),
            ReportKind::TenantStatement(id) => format!("inquilino-{id}.pdf"),
            ReportKind::Financial { from, to } => format!(
                "financiero-{}-{}.pdf",
                from.format("%Y%m%d"),
                to.format("%Y%m%d")
            ),
        }
    }

    fn validate(&self) -> ClientResult<()> {
        if let ReportKind::Financial { from, to } = self {
            if from > to {
                return Err(ClientError::Validation(format!(
                    "report range starts after it ends ({from} > {to})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

impl ReportDocument {
    /// Writes the document to `target`. A directory target receives the
    /// final component of the suggested filename.
    pub async fn save_to(&self, target: &Path) -> ClientResult<PathBuf> {
        let path = if tokio::fs::metadata(target)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            let name = bare_filename(&self.filename).ok_or_else(|| {
                ClientError::Validation(format!("unusable report filename {:?}", self.filename))
            })?;
            target.join(name)
        } else {
            target.to_path_buf()
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &self.bytes).await?;
        info!(path = %path.display(), bytes = self.bytes.len(), "report saved");
        Ok(path)
    }
}

#[derive(Clone)]
pub struct ReportService {
    api: Arc<ApiClient>,
}

impl ReportService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn download(&self, kind: ReportKind) -> ClientResult<ReportDocument> {
        kind.validate()?;
        let blob = self.api.get_bytes(&kind.path(), &kind.query()).await?;
        if blob.bytes.is_empty() {
            return Err(ClientError::Decode(format!("{}: empty report body", kind.path())));
        }
        Ok(ReportDocument {
            filename: blob.filename.unwrap_or_else(|| kind.default_filename()),
            content_type: blob.content_type,
            bytes: blob.bytes,
        })
    }
}
