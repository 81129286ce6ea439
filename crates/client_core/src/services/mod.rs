//! Typed wrappers over the backend's per-resource endpoints.

use std::{fmt, marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{
        Contract, ContractId, Invoice, InvoiceId, Payment, PaymentId, Property, PropertyId, User,
        UserId,
    },
    protocol::{
        ContractUpdate, InvoiceUpdate, NewContract, NewInvoice, NewPayment, NewProperty, NewUser,
        PaymentUpdate, PropertyUpdate, UserUpdate,
    },
};
use tracing::info;

use crate::{
    api::{ApiClient, ResourcePath},
    error::ClientResult,
};

pub mod auth;
pub mod reports;
pub mod transitions;

pub use auth::AuthService;
pub use reports::{ReportDocument, ReportKind, ReportService};
pub use transitions::TransitionService;

/// A backend resource reachable through the `obtener|crear|actualizar|eliminar`
/// route family.
pub trait Resource: Send + Sync + 'static {
    const PATH: ResourcePath;
    type Id: Copy + fmt::Display + Send + Sync;
    type Entity: DeserializeOwned + Send;
    type New: Serialize + Sync;
    type Update: Serialize + Sync;

    fn raw_id(id: Self::Id) -> i64;
    fn id(raw: i64) -> Self::Id;
}

macro_rules! resource {
    ($marker:ident, $path:literal, $id:ident, $entity:ty, $new:ty, $update:ty) => {
        pub struct $marker;

        impl Resource for $marker {
            const PATH: ResourcePath = ResourcePath::new($path);
            type Id = $id;
            type Entity = $entity;
            type New = $new;
            type Update = $update;

            fn raw_id(id: Self::Id) -> i64 {
                id.0
            }

            fn id(raw: i64) -> Self::Id {
                $id(raw)
            }
        }
    };
}

resource!(Properties, "propiedades", PropertyId, Property, NewProperty, PropertyUpdate);
resource!(Contracts, "contratos", ContractId, Contract, NewContract, ContractUpdate);
resource!(Invoices, "facturas", InvoiceId, Invoice, NewInvoice, InvoiceUpdate);
resource!(Payments, "pagos", PaymentId, Payment, NewPayment, PaymentUpdate);
resource!(Users, "usuarios", UserId, User, NewUser, UserUpdate);

pub type PropertyService = ResourceService<Properties>;
pub type ContractService = ResourceService<Contracts>;
pub type InvoiceService = ResourceService<Invoices>;
pub type PaymentService = ResourceService<Payments>;
pub type UserService = ResourceService<Users>;

pub struct ResourceService<R: Resource> {
    api: Arc<ApiClient>,
    _resource: PhantomData<R>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self::new(self.api.clone())
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    pub async fn list(&self) -> ClientResult<Vec<R::Entity>> {
        self.api.get_json(&R::PATH.list()).await
    }

    pub async fn get(&self, id: R::Id) -> ClientResult<R::Entity> {
        self.api.get_json(&R::PATH.item(R::raw_id(id))).await
    }

    pub async fn create(&self, new: &R::New) -> ClientResult<R::Entity> {
        let created = self.api.post_json(&R::PATH.create(), new).await?;
        info!(resource = R::PATH.resource(), "created record");
        Ok(created)
    }

    pub async fn update(&self, id: R::Id, patch: &R::Update) -> ClientResult<R::Entity> {
        let updated = self
            .api
            .put_json(&R::PATH.update(R::raw_id(id)), patch)
            .await?;
        info!(resource = R::PATH.resource(), id = %id, "updated record");
        Ok(updated)
    }

    pub async fn delete(&self, id: R::Id) -> ClientResult<()> {
        self.api.delete(&R::PATH.delete(R::raw_id(id))).await?;
        info!(resource = R::PATH.resource(), id = %id, "deleted record");
        Ok(())
    }
}

impl ResourceService<Properties> {
    pub async fn list_by_owner(&self, owner_id: UserId) -> ClientResult<Vec<Property>> {
        let mut properties = self.list().await?;
        properties.retain(|p| p.owner_id == owner_id);
        Ok(properties)
    }
}

impl ResourceService<Contracts> {
    pub async fn list_by_property(&self, property_id: PropertyId) -> ClientResult<Vec<Contract>> {
        let mut contracts = self.list().await?;
        contracts.retain(|c| c.property_id == property_id);
        Ok(contracts)
    }

    pub async fn list_by_tenant(&self, tenant_id: UserId) -> ClientResult<Vec<Contract>> {
        let mut contracts = self.list().await?;
        contracts.retain(|c| c.tenant_id == tenant_id);
        Ok(contracts)
    }
}

impl ResourceService<Invoices> {
    pub async fn list_by_contract(&self, contract_id: ContractId) -> ClientResult<Vec<Invoice>> {
        let mut invoices = self.list().await?;
        invoices.retain(|i| i.contract_id == contract_id);
        Ok(invoices)
    }
}

impl ResourceService<Payments> {
    pub async fn list_by_invoice(&self, invoice_id: InvoiceId) -> ClientResult<Vec<Payment>> {
        let mut payments = self.list().await?;
        payments.retain(|p| p.invoice_id == invoice_id);
        Ok(payments)
    }
}
