//! Table projections of fetched records, plus the JSON drafts used by the
//! record editor.

use serde::Serialize;
use serde_json::{json, Value};

use client_core::navigation::Section;

use crate::controller::events::SectionData;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub id: i64,
    /// Wire name of the lifecycle state, for records that have one.
    pub state: Option<&'static str>,
    pub cells: Vec<String>,
    pub raw: Value,
}

impl RecordRow {
    fn new(id: i64, state: Option<&'static str>, cells: Vec<String>, record: &impl Serialize) -> Self {
        Self {
            id,
            state,
            cells,
            raw: serde_json::to_value(record).unwrap_or_default(),
        }
    }

    /// Case-insensitive substring match on any cell. An empty filter matches
    /// everything.
    pub fn matches(&self, filter: &str) -> bool {
        let needle = filter.trim().to_lowercase();
        needle.is_empty()
            || self
                .cells
                .iter()
                .any(|cell| cell.to_lowercase().contains(&needle))
    }
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".into())
}

pub fn headers(section: Section) -> &'static [&'static str] {
    match section {
        Section::Properties => &["ID", "Address", "City", "Rent", "State", "Owner"],
        Section::Contracts => &["ID", "Property", "Tenant", "Start", "End", "Monthly", "State"],
        Section::Invoices => &["ID", "Contract", "Issued", "Due", "Amount", "State", "Concept"],
        Section::Payments => &["ID", "Invoice", "Paid on", "Amount", "Method", "State"],
        Section::Users => &["ID", "Name", "Email", "Role", "Active"],
        Section::Overview | Section::Reports => &[],
    }
}

pub fn rows(data: &SectionData) -> Vec<RecordRow> {
    match data {
        SectionData::Properties(items) => items
            .iter()
            .map(|p| {
                RecordRow::new(
                    p.id.0,
                    Some(p.state.wire_name()),
                    vec![
                        p.id.to_string(),
                        p.address.clone(),
                        or_dash(&p.city),
                        money(p.monthly_rent),
                        p.state.label().to_string(),
                        p.owner_id.to_string(),
                    ],
                    p,
                )
            })
            .collect(),
        SectionData::Contracts(items) => items
            .iter()
            .map(|c| {
                RecordRow::new(
                    c.id.0,
                    Some(c.state.wire_name()),
                    vec![
                        c.id.to_string(),
                        c.property_id.to_string(),
                        c.tenant_id.to_string(),
                        c.start_date.to_string(),
                        c.end_date.to_string(),
                        money(c.monthly_amount),
                        c.state.label().to_string(),
                    ],
                    c,
                )
            })
            .collect(),
        SectionData::Invoices(items) => items
            .iter()
            .map(|i| {
                RecordRow::new(
                    i.id.0,
                    Some(i.state.wire_name()),
                    vec![
                        i.id.to_string(),
                        i.contract_id.to_string(),
                        i.issue_date.to_string(),
                        i.due_date.to_string(),
                        money(i.amount),
                        i.state.label().to_string(),
                        or_dash(&i.concept),
                    ],
                    i,
                )
            })
            .collect(),
        SectionData::Payments(items) => items
            .iter()
            .map(|p| {
                RecordRow::new(
                    p.id.0,
                    Some(p.state.wire_name()),
                    vec![
                        p.id.to_string(),
                        p.invoice_id.to_string(),
                        p.paid_on.to_string(),
                        money(p.amount),
                        format!("{:?}", p.method).to_lowercase(),
                        p.state.label().to_string(),
                    ],
                    p,
                )
            })
            .collect(),
        SectionData::Users(items) => items
            .iter()
            .map(|u| {
                RecordRow::new(
                    u.id.0,
                    None,
                    vec![
                        u.id.to_string(),
                        u.display_name(),
                        u.email.clone(),
                        u.role.label().to_string(),
                        if u.active { "yes" } else { "no" }.to_string(),
                    ],
                    u,
                )
            })
            .collect(),
    }
}

/// Starting JSON for a new record of `section`.
pub fn create_template(section: Section) -> Value {
    match section {
        Section::Properties => json!({
            "direccion": "",
            "ciudad": "",
            "tipo": "departamento",
            "precio_alquiler": 0.0,
            "id_propietario": 0
        }),
        Section::Contracts => json!({
            "id_propiedad": 0,
            "id_inquilino": 0,
            "fecha_inicio": "2025-01-01",
            "fecha_fin": "2025-12-31",
            "monto_mensual": 0.0
        }),
        Section::Invoices => json!({
            "id_contrato": 0,
            "fecha_emision": "2025-01-01",
            "fecha_vencimiento": "2025-01-10",
            "monto": 0.0,
            "concepto": ""
        }),
        Section::Payments => json!({
            "id_factura": 0,
            "monto": 0.0,
            "fecha_pago": "2025-01-01",
            "metodo": "transferencia"
        }),
        Section::Users => json!({
            "nombre": "",
            "email": "",
            "password": "",
            "rol": "inquilino"
        }),
        Section::Overview | Section::Reports => json!({}),
    }
}

/// The record's fields minus the ones an update cannot change.
pub fn edit_draft(row: &RecordRow) -> Value {
    let mut draft = row.raw.clone();
    if let Some(fields) = draft.as_object_mut() {
        fields.remove("id");
        fields.remove("estado");
    }
    draft
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shared::domain::{ContractId, Invoice, InvoiceId, InvoiceState, Role, User, UserId};

    use super::*;

    fn invoice(id: i64, concept: &str) -> Invoice {
        Invoice {
            id: InvoiceId(id),
            contract_id: ContractId(4),
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 1).expect("date"),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 10).expect("date"),
            amount: 450.0,
            concept: Some(concept.into()),
            state: InvoiceState::Vencida,
        }
    }

    #[test]
    fn rows_follow_headers() {
        let data = SectionData::Invoices(vec![invoice(1, "Marzo")]);
        let rows = rows(&data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells.len(), headers(Section::Invoices).len());
        assert_eq!(rows[0].state, Some("vencida"));
        assert_eq!(rows[0].cells[4], "450.00");
    }

    #[test]
    fn filter_is_case_insensitive() {
        let data = SectionData::Invoices(vec![invoice(1, "Marzo"), invoice(2, "Abril")]);
        let rows = rows(&data);
        let hits: Vec<i64> = rows.iter().filter(|r| r.matches("marzo")).map(|r| r.id).collect();
        assert_eq!(hits, vec![1]);
        assert!(rows.iter().all(|r| r.matches("  ")));
    }

    #[test]
    fn users_have_no_lifecycle_state() {
        let data = SectionData::Users(vec![User {
            id: UserId(9),
            name: "Rita".into(),
            last_name: Some("Paz".into()),
            email: "rita@example.com".into(),
            role: Role::Contador,
            phone: None,
            active: false,
        }]);
        let rows = rows(&data);
        let row = &rows[0];
        assert_eq!(row.state, None);
        assert_eq!(row.cells[1], "Rita Paz");
        assert_eq!(row.cells[4], "no");
    }

    #[test]
    fn edit_draft_drops_id_and_state() {
        let rows = rows(&SectionData::Invoices(vec![invoice(3, "Mayo")]));
        let draft = edit_draft(&rows[0]);
        assert!(draft.get("id").is_none());
        assert!(draft.get("estado").is_none());
        assert_eq!(draft["concepto"], "Mayo");
    }

    #[test]
    fn templates_parse_as_new_records() {
        let property: shared::protocol::NewProperty =
            serde_json::from_value(create_template(Section::Properties)).expect("property");
        assert_eq!(property.monthly_rent, 0.0);
        let _: shared::protocol::NewPayment =
            serde_json::from_value(create_template(Section::Payments)).expect("payment");
        let _: shared::protocol::NewUser =
            serde_json::from_value(create_template(Section::Users)).expect("user");
    }
}
