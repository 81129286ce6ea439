use chrono::NaiveDate;
use client_core::services::ReportKind;
use shared::domain::{ContractId, InvoiceId, PropertyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportChoice {
    Property,
    Contract,
    Invoice,
    TenantStatement,
    Financial,
}

impl ReportChoice {
    pub const ALL: [ReportChoice; 5] = [
        ReportChoice::Property,
        ReportChoice::Contract,
        ReportChoice::Invoice,
        ReportChoice::TenantStatement,
        ReportChoice::Financial,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReportChoice::Property => "Property sheet",
            ReportChoice::Contract => "Contract",
            ReportChoice::Invoice => "Invoice",
            ReportChoice::TenantStatement => "Tenant statement",
            ReportChoice::Financial => "Financial summary",
        }
    }

    pub fn needs_id(self) -> bool {
        self != ReportChoice::Financial
    }
}

#[derive(Debug, Clone)]
pub struct ReportForm {
    pub choice: ReportChoice,
    pub id: String,
    pub from: String,
    pub to: String,
}

impl Default for ReportForm {
    fn default() -> Self {
        Self {
            choice: ReportChoice::Property,
            id: String::new(),
            from: String::new(),
            to: String::new(),
        }
    }
}

impl ReportForm {
    pub fn build(&self) -> Result<ReportKind, String> {
        if !self.choice.needs_id() {
            let from = parse_date("from", &self.from)?;
            let to = parse_date("to", &self.to)?;
            if from > to {
                return Err("the range starts after it ends".into());
            }
            return Ok(ReportKind::Financial { from, to });
        }

        let id: i64 = self
            .id
            .trim()
            .parse()
            .map_err(|_| format!("`{}` is not a record id", self.id.trim()))?;
        Ok(match self.choice {
            ReportChoice::Property => ReportKind::Property(PropertyId(id)),
            ReportChoice::Contract => ReportKind::Contract(ContractId(id)),
            ReportChoice::Invoice => ReportKind::Invoice(InvoiceId(id)),
            ReportChoice::TenantStatement | ReportChoice::Financial => {
                ReportKind::TenantStatement(UserId(id))
            }
        })
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("`{field}` must be a date like 2025-01-31"))
}
