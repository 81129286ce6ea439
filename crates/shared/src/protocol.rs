use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ContractId, ContractState, InvoiceId, InvoiceState, PaymentMethod, PaymentState, PropertyId,
    PropertyKind, PropertyState, Role, User, UserId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario", alias = "user")]
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "apellido", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "rol", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "activo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "ciudad", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "tipo")]
    pub kind: PropertyKind,
    #[serde(rename = "habitaciones", default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(rename = "area_m2", default, skip_serializing_if = "Option::is_none")]
    pub area_m2: Option<f64>,
    #[serde(rename = "precio_alquiler")]
    pub monthly_rent: f64,
    #[serde(rename = "id_propietario")]
    pub owner_id: UserId,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update. The lifecycle state is absent on purpose: it only changes
/// through the transition endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    #[serde(rename = "direccion", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "ciudad", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyKind>,
    #[serde(rename = "habitaciones", default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(rename = "area_m2", default, skip_serializing_if = "Option::is_none")]
    pub area_m2: Option<f64>,
    #[serde(rename = "precio_alquiler", default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<f64>,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContract {
    #[serde(rename = "id_propiedad")]
    pub property_id: PropertyId,
    #[serde(rename = "id_inquilino")]
    pub tenant_id: UserId,
    #[serde(rename = "fecha_inicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "fecha_fin")]
    pub end_date: NaiveDate,
    #[serde(rename = "monto_mensual")]
    pub monthly_amount: f64,
    #[serde(rename = "deposito", default, skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractUpdate {
    #[serde(rename = "fecha_inicio", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "fecha_fin", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "monto_mensual", default, skip_serializing_if = "Option::is_none")]
    pub monthly_amount: Option<f64>,
    #[serde(rename = "deposito", default, skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    #[serde(rename = "id_contrato")]
    pub contract_id: ContractId,
    #[serde(rename = "fecha_emision")]
    pub issue_date: NaiveDate,
    #[serde(rename = "fecha_vencimiento")]
    pub due_date: NaiveDate,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "concepto", default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceUpdate {
    #[serde(rename = "fecha_vencimiento", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "monto", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "concepto", default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    #[serde(rename = "id_factura")]
    pub invoice_id: InvoiceId,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "fecha_pago")]
    pub paid_on: NaiveDate,
    #[serde(rename = "metodo")]
    pub method: PaymentMethod,
    #[serde(rename = "referencia", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentUpdate {
    #[serde(rename = "monto", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "fecha_pago", default, skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<NaiveDate>,
    #[serde(rename = "metodo", default, skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(rename = "referencia", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Resources whose lifecycle is driven through the transition endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Propiedades,
    Contratos,
    Facturas,
    Pagos,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Propiedades,
        EntityKind::Contratos,
        EntityKind::Facturas,
        EntityKind::Pagos,
    ];

    pub fn resource(self) -> &'static str {
        match self {
            EntityKind::Propiedades => "propiedades",
            EntityKind::Contratos => "contratos",
            EntityKind::Facturas => "facturas",
            EntityKind::Pagos => "pagos",
        }
    }

    /// Wire names of every lifecycle state of this kind, in declaration order.
    pub fn states(self) -> Vec<&'static str> {
        match self {
            EntityKind::Propiedades => PropertyState::ALL.iter().map(|s| s.wire_name()).collect(),
            EntityKind::Contratos => ContractState::ALL.iter().map(|s| s.wire_name()).collect(),
            EntityKind::Facturas => InvoiceState::ALL.iter().map(|s| s.wire_name()).collect(),
            EntityKind::Pagos => PaymentState::ALL.iter().map(|s| s.wire_name()).collect(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "propiedades" | "propiedad" | "property" | "properties" => Some(Self::Propiedades),
            "contratos" | "contrato" | "contract" | "contracts" => Some(Self::Contratos),
            "facturas" | "factura" | "invoice" | "invoices" => Some(Self::Facturas),
            "pagos" | "pago" | "payment" | "payments" => Some(Self::Pagos),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub estado_destino: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionAnalysis {
    pub permitida: bool,
    pub estado_actual: String,
    pub estado_destino: String,
    #[serde(default)]
    pub motivos: Vec<String>,
    #[serde(default)]
    pub advertencias: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub exito: bool,
    pub estado_anterior: String,
    pub estado_nuevo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
}
