//! Client-side aggregation for the role dashboards.
//!
//! Everything here works on lists already fetched from the backend: records
//! are joined by foreign key and summarized. Records whose parent is not in
//! the fetched lists are ignored.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use shared::domain::{
    Contract, ContractId, ContractState, Invoice, InvoiceId, InvoiceState, Payment, PaymentState,
    Property, PropertyId, PropertyState, Role, User, UserId,
};
use tracing::debug;

use crate::{
    error::{ClientError, ClientResult},
    session::Session,
    RentManagerClient,
};

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn count_states<S: Copy + PartialEq>(all: &[S], items: impl Iterator<Item = S>) -> Vec<(S, usize)> {
    let mut counts: Vec<(S, usize)> = all.iter().map(|s| (*s, 0)).collect();
    for item in items {
        if let Some(slot) = counts.iter_mut().find(|(s, _)| *s == item) {
            slot.1 += 1;
        }
    }
    counts
}

fn billable(invoice: &Invoice) -> bool {
    invoice.state != InvoiceState::Anulada
}

fn confirmed(payment: &Payment) -> bool {
    payment.state == PaymentState::Confirmado
}

/// The four lists a dashboard is built from.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    pub properties: Vec<Property>,
    pub contracts: Vec<Contract>,
    pub invoices: Vec<Invoice>,
    pub payments: Vec<Payment>,
}

impl Portfolio {
    pub fn new(
        properties: Vec<Property>,
        contracts: Vec<Contract>,
        invoices: Vec<Invoice>,
        payments: Vec<Payment>,
    ) -> Self {
        Self {
            properties,
            contracts,
            invoices,
            payments,
        }
    }

    /// Properties of `owner_id` and everything hanging off them.
    pub fn owned_by(&self, owner_id: UserId) -> Portfolio {
        let properties: Vec<Property> = self
            .properties
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        let property_ids: HashSet<PropertyId> = properties.iter().map(|p| p.id).collect();
        let contracts = self
            .contracts
            .iter()
            .filter(|c| property_ids.contains(&c.property_id))
            .cloned()
            .collect();
        self.with_contracts(properties, contracts)
    }

    /// Contracts of `tenant_id`, their properties, invoices and payments.
    pub fn leased_by(&self, tenant_id: UserId) -> Portfolio {
        let contracts: Vec<Contract> = self
            .contracts
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect();
        let property_ids: HashSet<PropertyId> = contracts.iter().map(|c| c.property_id).collect();
        let properties = self
            .properties
            .iter()
            .filter(|p| property_ids.contains(&p.id))
            .cloned()
            .collect();
        self.with_contracts(properties, contracts)
    }

    fn with_contracts(&self, properties: Vec<Property>, contracts: Vec<Contract>) -> Portfolio {
        let contract_ids: HashSet<ContractId> = contracts.iter().map(|c| c.id).collect();
        let invoices: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|i| contract_ids.contains(&i.contract_id))
            .cloned()
            .collect();
        let invoice_ids: HashSet<InvoiceId> = invoices.iter().map(|i| i.id).collect();
        let payments = self
            .payments
            .iter()
            .filter(|p| invoice_ids.contains(&p.invoice_id))
            .cloned()
            .collect();
        Portfolio {
            properties,
            contracts,
            invoices,
            payments,
        }
    }

    pub fn ledgers(&self, today: NaiveDate) -> Vec<PropertyLedger> {
        build_ledgers(
            &self.properties,
            &self.contracts,
            &self.invoices,
            &self.payments,
            today,
        )
    }

    pub fn summary(&self, today: NaiveDate) -> Summary {
        Summary::compute(self, today)
    }

    /// Confirmed amount paid against each invoice.
    pub fn paid_by_invoice(&self) -> HashMap<InvoiceId, f64> {
        let mut paid: HashMap<InvoiceId, f64> = HashMap::new();
        for payment in self.payments.iter().filter(|p| confirmed(p)) {
            *paid.entry(payment.invoice_id).or_default() += payment.amount;
        }
        paid
    }
}

/// One property with its contracts, their invoices and those invoices'
/// payments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyLedger {
    pub property: Property,
    pub contracts: Vec<Contract>,
    pub invoices: Vec<Invoice>,
    pub payments: Vec<Payment>,
    pub total_invoiced: f64,
    pub total_paid: f64,
    pub outstanding: f64,
    pub overdue_invoices: usize,
}

impl PropertyLedger {
    pub fn active_contract(&self) -> Option<&Contract> {
        self.contracts
            .iter()
            .find(|c| c.state == ContractState::Activo)
    }
}

pub fn build_ledgers(
    properties: &[Property],
    contracts: &[Contract],
    invoices: &[Invoice],
    payments: &[Payment],
    today: NaiveDate,
) -> Vec<PropertyLedger> {
    let mut contracts_by_property: HashMap<PropertyId, Vec<&Contract>> = HashMap::new();
    for contract in contracts {
        contracts_by_property
            .entry(contract.property_id)
            .or_default()
            .push(contract);
    }
    let mut invoices_by_contract: HashMap<ContractId, Vec<&Invoice>> = HashMap::new();
    for invoice in invoices {
        invoices_by_contract
            .entry(invoice.contract_id)
            .or_default()
            .push(invoice);
    }
    let mut payments_by_invoice: HashMap<InvoiceId, Vec<&Payment>> = HashMap::new();
    for payment in payments {
        payments_by_invoice
            .entry(payment.invoice_id)
            .or_default()
            .push(payment);
    }

    properties
        .iter()
        .map(|property| {
            let contracts: Vec<Contract> = contracts_by_property
                .get(&property.id)
                .map(|cs| cs.iter().map(|c| (*c).clone()).collect())
                .unwrap_or_default();
            let invoices: Vec<Invoice> = contracts
                .iter()
                .filter_map(|c| invoices_by_contract.get(&c.id))
                .flatten()
                .map(|i| (*i).clone())
                .collect();
            let payments: Vec<Payment> = invoices
                .iter()
                .filter_map(|i| payments_by_invoice.get(&i.id))
                .flatten()
                .map(|p| (*p).clone())
                .collect();

            let total_invoiced = round_cents(
                invoices.iter().filter(|i| billable(i)).map(|i| i.amount).sum(),
            );
            let total_paid = round_cents(
                payments.iter().filter(|p| confirmed(p)).map(|p| p.amount).sum(),
            );
            let overdue_invoices = invoices.iter().filter(|i| i.is_overdue(today)).count();

            PropertyLedger {
                property: property.clone(),
                contracts,
                invoices,
                payments,
                total_invoiced,
                total_paid,
                outstanding: round_cents((total_invoiced - total_paid).max(0.0)),
                overdue_invoices,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub properties_by_state: Vec<(PropertyState, usize)>,
    pub contracts_by_state: Vec<(ContractState, usize)>,
    pub invoices_by_state: Vec<(InvoiceState, usize)>,
    pub payments_by_state: Vec<(PaymentState, usize)>,
    /// Occupied over non-inactive properties, in `[0, 1]`.
    pub occupancy_rate: f64,
    pub expected_monthly_rent: f64,
    pub invoiced: f64,
    pub collected: f64,
    pub outstanding: f64,
    pub collection_rate: f64,
    pub overdue_invoices: usize,
}

impl Summary {
    pub fn compute(portfolio: &Portfolio, today: NaiveDate) -> Self {
        let occupied = portfolio
            .properties
            .iter()
            .filter(|p| p.state == PropertyState::Ocupada)
            .count();
        let rentable = portfolio
            .properties
            .iter()
            .filter(|p| p.state != PropertyState::Inactiva)
            .count();
        let occupancy_rate = if rentable == 0 {
            0.0
        } else {
            occupied as f64 / rentable as f64
        };

        let expected_monthly_rent = round_cents(
            portfolio
                .contracts
                .iter()
                .filter(|c| c.state == ContractState::Activo)
                .map(|c| c.monthly_amount)
                .sum(),
        );
        let invoiced = round_cents(
            portfolio
                .invoices
                .iter()
                .filter(|i| billable(i))
                .map(|i| i.amount)
                .sum(),
        );
        let collected = round_cents(
            portfolio
                .payments
                .iter()
                .filter(|p| confirmed(p))
                .map(|p| p.amount)
                .sum(),
        );
        let collection_rate = if invoiced > 0.0 {
            collected / invoiced
        } else {
            0.0
        };

        Self {
            properties_by_state: count_states(
                PropertyState::ALL,
                portfolio.properties.iter().map(|p| p.state),
            ),
            contracts_by_state: count_states(
                ContractState::ALL,
                portfolio.contracts.iter().map(|c| c.state),
            ),
            invoices_by_state: count_states(
                InvoiceState::ALL,
                portfolio.invoices.iter().map(|i| i.state),
            ),
            payments_by_state: count_states(
                PaymentState::ALL,
                portfolio.payments.iter().map(|p| p.state),
            ),
            occupancy_rate,
            expected_monthly_rent,
            invoiced,
            collected,
            outstanding: round_cents((invoiced - collected).max(0.0)),
            collection_rate,
            overdue_invoices: portfolio
                .invoices
                .iter()
                .filter(|i| i.is_overdue(today))
                .count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminDashboard {
    pub summary: Summary,
    pub users_by_role: Vec<(Role, usize)>,
    pub ledgers: Vec<PropertyLedger>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerDashboard {
    pub owner_id: UserId,
    pub summary: Summary,
    pub ledgers: Vec<PropertyLedger>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantDashboard {
    pub tenant_id: UserId,
    pub contracts: Vec<Contract>,
    pub properties: Vec<Property>,
    pub invoices: Vec<Invoice>,
    pub payments: Vec<Payment>,
    pub balance_due: f64,
    pub next_due: Option<Invoice>,
    pub overdue: Vec<Invoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCollection {
    /// `YYYY-MM` of the invoices' issue date.
    pub month: String,
    pub invoiced: f64,
    pub paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountantDashboard {
    pub summary: Summary,
    pub overdue_invoices: Vec<Invoice>,
    pub pending_payments: Vec<Payment>,
    pub monthly: Vec<MonthlyCollection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Admin(AdminDashboard),
    Owner(OwnerDashboard),
    Tenant(TenantDashboard),
    Accountant(AccountantDashboard),
}

impl Dashboard {
    pub fn build(
        role: Role,
        user_id: UserId,
        portfolio: &Portfolio,
        users: &[User],
        today: NaiveDate,
    ) -> Self {
        match role {
            Role::Administrador => Dashboard::Admin(admin_dashboard(portfolio, users, today)),
            Role::Propietario => Dashboard::Owner(owner_dashboard(portfolio, user_id, today)),
            Role::Inquilino => Dashboard::Tenant(tenant_dashboard(portfolio, user_id, today)),
            Role::Contador => Dashboard::Accountant(accountant_dashboard(portfolio, today)),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Dashboard::Admin(_) => Role::Administrador,
            Dashboard::Owner(_) => Role::Propietario,
            Dashboard::Tenant(_) => Role::Inquilino,
            Dashboard::Accountant(_) => Role::Contador,
        }
    }
}

pub fn admin_dashboard(portfolio: &Portfolio, users: &[User], today: NaiveDate) -> AdminDashboard {
    let mut users_by_role: Vec<(Role, usize)> = Role::ALL.iter().map(|r| (*r, 0)).collect();
    for user in users {
        if let Some(slot) = users_by_role.iter_mut().find(|(r, _)| *r == user.role) {
            slot.1 += 1;
        }
    }
    AdminDashboard {
        summary: portfolio.summary(today),
        users_by_role,
        ledgers: portfolio.ledgers(today),
    }
}

pub fn owner_dashboard(portfolio: &Portfolio, owner_id: UserId, today: NaiveDate) -> OwnerDashboard {
    let owned = portfolio.owned_by(owner_id);
    OwnerDashboard {
        owner_id,
        summary: owned.summary(today),
        ledgers: owned.ledgers(today),
    }
}

pub fn tenant_dashboard(
    portfolio: &Portfolio,
    tenant_id: UserId,
    today: NaiveDate,
) -> TenantDashboard {
    let leased = portfolio.leased_by(tenant_id);
    let paid = leased.paid_by_invoice();

    let open: Vec<&Invoice> = leased
        .invoices
        .iter()
        .filter(|i| matches!(i.state, InvoiceState::Pendiente | InvoiceState::Vencida))
        .collect();
    let balance_due = round_cents(
        open.iter()
            .map(|i| (i.amount - paid.get(&i.id).copied().unwrap_or(0.0)).max(0.0))
            .sum(),
    );
    let next_due = open
        .iter()
        .min_by_key(|i| (i.due_date, i.id))
        .map(|i| (*i).clone());
    let mut overdue: Vec<Invoice> = leased
        .invoices
        .iter()
        .filter(|i| i.is_overdue(today))
        .cloned()
        .collect();
    overdue.sort_by_key(|i| (i.due_date, i.id));

    TenantDashboard {
        tenant_id,
        contracts: leased.contracts,
        properties: leased.properties,
        invoices: leased.invoices,
        payments: leased.payments,
        balance_due,
        next_due,
        overdue,
    }
}

pub fn accountant_dashboard(portfolio: &Portfolio, today: NaiveDate) -> AccountantDashboard {
    let mut overdue_invoices: Vec<Invoice> = portfolio
        .invoices
        .iter()
        .filter(|i| i.is_overdue(today))
        .cloned()
        .collect();
    overdue_invoices.sort_by_key(|i| (i.due_date, i.id));

    let mut pending_payments: Vec<Payment> = portfolio
        .payments
        .iter()
        .filter(|p| p.state == PaymentState::Pendiente)
        .cloned()
        .collect();
    pending_payments.sort_by_key(|p| (p.paid_on, p.id));

    AccountantDashboard {
        summary: portfolio.summary(today),
        overdue_invoices,
        pending_payments,
        monthly: monthly_collection(portfolio),
    }
}

/// Invoiced and confirmed-paid totals grouped by invoice issue month, oldest
/// first.
pub fn monthly_collection(portfolio: &Portfolio) -> Vec<MonthlyCollection> {
    let paid = portfolio.paid_by_invoice();
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for invoice in portfolio.invoices.iter().filter(|i| billable(i)) {
        let slot = months
            .entry(invoice.issue_date.format("%Y-%m").to_string())
            .or_default();
        slot.0 += invoice.amount;
        slot.1 += paid.get(&invoice.id).copied().unwrap_or(0.0);
    }
    months
        .into_iter()
        .map(|(month, (invoiced, paid))| MonthlyCollection {
            month,
            invoiced: round_cents(invoiced),
            paid: round_cents(paid),
        })
        .collect()
}

/// Fetches the four lists concurrently. A list the backend refuses (403) is
/// treated as empty so a partially-privileged role still gets a dashboard.
pub async fn load_portfolio(client: &RentManagerClient) -> ClientResult<Portfolio> {
    let (properties, contracts, invoices, payments) = futures::try_join!(
        tolerate_forbidden(client.properties.list()),
        tolerate_forbidden(client.contracts.list()),
        tolerate_forbidden(client.invoices.list()),
        tolerate_forbidden(client.payments.list()),
    )?;
    debug!(
        properties = properties.len(),
        contracts = contracts.len(),
        invoices = invoices.len(),
        payments = payments.len(),
        "portfolio loaded"
    );
    Ok(Portfolio::new(properties, contracts, invoices, payments))
}

async fn tolerate_forbidden<T>(
    fut: impl std::future::Future<Output = ClientResult<Vec<T>>>,
) -> ClientResult<Vec<T>> {
    match fut.await {
        Err(ClientError::Forbidden(message)) => {
            debug!("list not visible to this role: {message}");
            Ok(Vec::new())
        }
        other => other,
    }
}

pub async fn load_dashboard(
    client: &RentManagerClient,
    session: &Session,
    today: NaiveDate,
) -> ClientResult<Dashboard> {
    let role = session.role();
    let (portfolio, users) = if role == Role::Administrador {
        futures::try_join!(load_portfolio(client), client.users.list())?
    } else {
        (load_portfolio(client).await?, Vec::new())
    };
    Ok(Dashboard::build(
        role,
        session.user_id(),
        &portfolio,
        &users,
        today,
    ))
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
