//! Read-only rendering of the role dashboards.

use client_core::dashboard::{
    AccountantDashboard, AdminDashboard, Dashboard, OwnerDashboard, PropertyLedger, Summary,
    TenantDashboard,
};
use eframe::egui;
use shared::domain::{Invoice, Payment};

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub fn show(ui: &mut egui::Ui, dashboard: &Dashboard) {
    match dashboard {
        Dashboard::Admin(d) => admin(ui, d),
        Dashboard::Owner(d) => owner(ui, d),
        Dashboard::Tenant(d) => tenant(ui, d),
        Dashboard::Accountant(d) => accountant(ui, d),
    }
}

fn stat(ui: &mut egui::Ui, label: &str, value: String) {
    ui.vertical(|ui| {
        ui.weak(label);
        ui.heading(value);
    });
    ui.add_space(18.0);
}

fn summary(ui: &mut egui::Ui, summary: &Summary) {
    ui.horizontal_wrapped(|ui| {
        stat(ui, "Occupancy", percent(summary.occupancy_rate));
        stat(ui, "Expected rent", money(summary.expected_monthly_rent));
        stat(ui, "Invoiced", money(summary.invoiced));
        stat(ui, "Collected", money(summary.collected));
        stat(ui, "Outstanding", money(summary.outstanding));
        stat(ui, "Collection rate", percent(summary.collection_rate));
        stat(ui, "Overdue", summary.overdue_invoices.to_string());
    });
    ui.add_space(6.0);

    egui::Grid::new("state_counts").striped(true).show(ui, |ui| {
        let rows: [(&str, Vec<(&str, usize)>); 4] = [
            (
                "Properties",
                summary
                    .properties_by_state
                    .iter()
                    .map(|(s, n)| (s.label(), *n))
                    .collect(),
            ),
            (
                "Contracts",
                summary
                    .contracts_by_state
                    .iter()
                    .map(|(s, n)| (s.label(), *n))
                    .collect(),
            ),
            (
                "Invoices",
                summary
                    .invoices_by_state
                    .iter()
                    .map(|(s, n)| (s.label(), *n))
                    .collect(),
            ),
            (
                "Payments",
                summary
                    .payments_by_state
                    .iter()
                    .map(|(s, n)| (s.label(), *n))
                    .collect(),
            ),
        ];
        for (entity, counts) in rows {
            ui.strong(entity);
            for (state, n) in counts {
                ui.label(format!("{state}: {n}"));
            }
            ui.end_row();
        }
    });
}

fn ledgers(ui: &mut egui::Ui, ledgers: &[PropertyLedger]) {
    ui.add_space(10.0);
    ui.strong("Properties");
    if ledgers.is_empty() {
        ui.weak("No data");
        return;
    }
    egui::Grid::new("ledgers").striped(true).show(ui, |ui| {
        for header in ["ID", "Address", "State", "Tenant", "Invoiced", "Paid", "Outstanding", "Overdue"] {
            ui.strong(header);
        }
        ui.end_row();
        for ledger in ledgers {
            ui.label(ledger.property.id.to_string());
            ui.label(&ledger.property.address);
            ui.label(ledger.property.state.label());
            ui.label(
                ledger
                    .active_contract()
                    .map(|c| c.tenant_id.to_string())
                    .unwrap_or_else(|| "-".into()),
            );
            ui.label(money(ledger.total_invoiced));
            ui.label(money(ledger.total_paid));
            ui.label(money(ledger.outstanding));
            ui.label(ledger.overdue_invoices.to_string());
            ui.end_row();
        }
    });
}

fn invoices(ui: &mut egui::Ui, id: &str, title: &str, items: &[Invoice]) {
    ui.add_space(10.0);
    ui.strong(title);
    if items.is_empty() {
        ui.weak("No data");
        return;
    }
    egui::Grid::new(id).striped(true).show(ui, |ui| {
        for header in ["ID", "Contract", "Due", "Amount", "State"] {
            ui.strong(header);
        }
        ui.end_row();
        for invoice in items {
            ui.label(invoice.id.to_string());
            ui.label(invoice.contract_id.to_string());
            ui.label(invoice.due_date.to_string());
            ui.label(money(invoice.amount));
            ui.label(invoice.state.label());
            ui.end_row();
        }
    });
}

fn payments(ui: &mut egui::Ui, id: &str, title: &str, items: &[Payment]) {
    ui.add_space(10.0);
    ui.strong(title);
    if items.is_empty() {
        ui.weak("No data");
        return;
    }
    egui::Grid::new(id).striped(true).show(ui, |ui| {
        for header in ["ID", "Invoice", "Paid on", "Amount", "State"] {
            ui.strong(header);
        }
        ui.end_row();
        for payment in items {
            ui.label(payment.id.to_string());
            ui.label(payment.invoice_id.to_string());
            ui.label(payment.paid_on.to_string());
            ui.label(money(payment.amount));
            ui.label(payment.state.label());
            ui.end_row();
        }
    });
}

fn admin(ui: &mut egui::Ui, d: &AdminDashboard) {
    summary(ui, &d.summary);
    ui.add_space(6.0);
    ui.horizontal_wrapped(|ui| {
        for (role, n) in &d.users_by_role {
            stat(ui, role.label(), n.to_string());
        }
    });
    ledgers(ui, &d.ledgers);
}

fn owner(ui: &mut egui::Ui, d: &OwnerDashboard) {
    summary(ui, &d.summary);
    ledgers(ui, &d.ledgers);
}

fn tenant(ui: &mut egui::Ui, d: &TenantDashboard) {
    ui.horizontal_wrapped(|ui| {
        stat(ui, "Balance due", money(d.balance_due));
        stat(ui, "Contracts", d.contracts.len().to_string());
        stat(ui, "Overdue", d.overdue.len().to_string());
    });
    match &d.next_due {
        Some(invoice) => {
            ui.label(format!(
                "Next payment: invoice {} for {} due {}",
                invoice.id,
                money(invoice.amount),
                invoice.due_date
            ));
        }
        None => {
            ui.weak("Nothing pending");
        }
    }
    for property in &d.properties {
        ui.label(format!("{} ({})", property.address, property.state.label()));
    }
    invoices(ui, "tenant_invoices", "Invoices", &d.invoices);
    payments(ui, "tenant_payments", "Payments", &d.payments);
}

fn accountant(ui: &mut egui::Ui, d: &AccountantDashboard) {
    summary(ui, &d.summary);
    invoices(ui, "overdue_invoices", "Overdue invoices", &d.overdue_invoices);
    payments(
        ui,
        "pending_payments",
        "Payments pending confirmation",
        &d.pending_payments,
    );

    ui.add_space(10.0);
    ui.strong("Monthly collection");
    egui::Grid::new("monthly").striped(true).show(ui, |ui| {
        for header in ["Month", "Invoiced", "Paid"] {
            ui.strong(header);
        }
        ui.end_row();
        for month in &d.monthly {
            ui.label(&month.month);
            ui.label(money(month.invoiced));
            ui.label(money(month.paid));
            ui.end_row();
        }
    });
}
