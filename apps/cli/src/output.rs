//! Plain-text tables and dashboard printouts for `rentctl`.

use client_core::dashboard::{
    AccountantDashboard, AdminDashboard, Dashboard, OwnerDashboard, PropertyLedger, Summary,
    TenantDashboard,
};
use shared::domain::{Contract, Invoice, Payment, Property, User};

pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".into())
}

impl Tabular for Property {
    fn headers() -> &'static [&'static str] {
        &["ID", "ADDRESS", "CITY", "KIND", "RENT", "STATE", "OWNER"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.address.clone(),
            opt(&self.city),
            format!("{:?}", self.kind).to_lowercase(),
            money(self.monthly_rent),
            self.state.label().to_string(),
            self.owner_id.to_string(),
        ]
    }
}

impl Tabular for Contract {
    fn headers() -> &'static [&'static str] {
        &["ID", "PROPERTY", "TENANT", "START", "END", "MONTHLY", "STATE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.property_id.to_string(),
            self.tenant_id.to_string(),
            self.start_date.to_string(),
            self.end_date.to_string(),
            money(self.monthly_amount),
            self.state.label().to_string(),
        ]
    }
}

impl Tabular for Invoice {
    fn headers() -> &'static [&'static str] {
        &["ID", "CONTRACT", "ISSUED", "DUE", "AMOUNT", "STATE", "CONCEPT"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.contract_id.to_string(),
            self.issue_date.to_string(),
            self.due_date.to_string(),
            money(self.amount),
            self.state.label().to_string(),
            opt(&self.concept),
        ]
    }
}

impl Tabular for Payment {
    fn headers() -> &'static [&'static str] {
        &["ID", "INVOICE", "PAID ON", "AMOUNT", "METHOD", "STATE", "REFERENCE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.invoice_id.to_string(),
            self.paid_on.to_string(),
            money(self.amount),
            format!("{:?}", self.method).to_lowercase(),
            self.state.label().to_string(),
            opt(&self.reference),
        ]
    }
}

impl Tabular for User {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "EMAIL", "ROLE", "ACTIVE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.display_name(),
            self.email.clone(),
            self.role.label().to_string(),
            if self.active { "yes" } else { "no" }.to_string(),
        ]
    }
}

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "(no data)\n".to_string();
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let line = |cells: Vec<&str>, out: &mut String| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}", width = *width))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    };
    line(headers.to_vec(), &mut out);
    for row in rows {
        line(row.iter().map(String::as_str).collect(), &mut out);
    }
    out
}

pub fn table<T: Tabular>(items: &[T]) -> String {
    let rows: Vec<Vec<String>> = items.iter().map(Tabular::row).collect();
    render_table(T::headers(), &rows)
}

fn summary_block(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "occupancy {}  expected rent {}  invoiced {}  collected {}  outstanding {}  collection {}  overdue {}\n",
        percent(summary.occupancy_rate),
        money(summary.expected_monthly_rent),
        money(summary.invoiced),
        money(summary.collected),
        money(summary.outstanding),
        percent(summary.collection_rate),
        summary.overdue_invoices,
    ));
    let states = |pairs: Vec<(&str, usize)>| {
        pairs
            .into_iter()
            .map(|(label, n)| format!("{label}={n}"))
            .collect::<Vec<_>>()
            .join(" ")
    };
    out.push_str(&format!(
        "properties: {}\n",
        states(summary.properties_by_state.iter().map(|(s, n)| (s.wire_name(), *n)).collect())
    ));
    out.push_str(&format!(
        "contracts:  {}\n",
        states(summary.contracts_by_state.iter().map(|(s, n)| (s.wire_name(), *n)).collect())
    ));
    out.push_str(&format!(
        "invoices:   {}\n",
        states(summary.invoices_by_state.iter().map(|(s, n)| (s.wire_name(), *n)).collect())
    ));
    out.push_str(&format!(
        "payments:   {}\n",
        states(summary.payments_by_state.iter().map(|(s, n)| (s.wire_name(), *n)).collect())
    ));
    out
}

fn ledger_table(ledgers: &[PropertyLedger]) -> String {
    let rows: Vec<Vec<String>> = ledgers
        .iter()
        .map(|l| {
            vec![
                l.property.id.to_string(),
                l.property.address.clone(),
                l.property.state.label().to_string(),
                l.active_contract()
                    .map(|c| c.tenant_id.to_string())
                    .unwrap_or_else(|| "-".into()),
                money(l.total_invoiced),
                money(l.total_paid),
                money(l.outstanding),
                l.overdue_invoices.to_string(),
            ]
        })
        .collect();
    render_table(
        &["ID", "ADDRESS", "STATE", "TENANT", "INVOICED", "PAID", "OUTSTANDING", "OVERDUE"],
        &rows,
    )
}

fn admin(d: &AdminDashboard) -> String {
    let users = d
        .users_by_role
        .iter()
        .map(|(role, n)| format!("{}={n}", role.label()))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "== Administrator overview ==\n{}users: {users}\n\n{}",
        summary_block(&d.summary),
        ledger_table(&d.ledgers)
    )
}

fn owner(d: &OwnerDashboard) -> String {
    format!(
        "== Owner overview (user {}) ==\n{}\n{}",
        d.owner_id,
        summary_block(&d.summary),
        ledger_table(&d.ledgers)
    )
}

fn tenant(d: &TenantDashboard) -> String {
    let next = d
        .next_due
        .as_ref()
        .map(|i| format!("invoice {} for {} due {}", i.id, money(i.amount), i.due_date))
        .unwrap_or_else(|| "nothing pending".into());
    format!(
        "== Tenant overview (user {}) ==\nbalance due {}  next: {next}  overdue {}\n\nContracts\n{}\nInvoices\n{}\nPayments\n{}",
        d.tenant_id,
        money(d.balance_due),
        d.overdue.len(),
        table(&d.contracts),
        table(&d.invoices),
        table(&d.payments),
    )
}

fn accountant(d: &AccountantDashboard) -> String {
    let monthly: Vec<Vec<String>> = d
        .monthly
        .iter()
        .map(|m| vec![m.month.clone(), money(m.invoiced), money(m.paid)])
        .collect();
    format!(
        "== Accountant overview ==\n{}\nOverdue invoices\n{}\nPayments pending confirmation\n{}\nMonthly collection\n{}",
        summary_block(&d.summary),
        table(&d.overdue_invoices),
        table(&d.pending_payments),
        render_table(&["MONTH", "INVOICED", "PAID"], &monthly),
    )
}

pub fn dashboard(d: &Dashboard) -> String {
    match d {
        Dashboard::Admin(d) => admin(d),
        Dashboard::Owner(d) => owner(d),
        Dashboard::Tenant(d) => tenant(d),
        Dashboard::Accountant(d) => accountant(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_aligned_columns() {
        let out = render_table(
            &["ID", "NAME"],
            &[
                vec!["1".into(), "Ana".into()],
                vec!["10".into(), "Bartolomé".into()],
            ],
        );
        assert_eq!(out, "ID  NAME\n1   Ana\n10  Bartolomé\n");
    }

    #[test]
    fn empty_tables_say_so() {
        assert_eq!(render_table(&["ID"], &[]), "(no data)\n");
    }

    #[test]
    fn formats_money_and_rates() {
        assert_eq!(money(1234.5), "1234.50");
        assert_eq!(percent(0.5), "50.0%");
        assert_eq!(opt::<String>(&None), "-");
    }
}
