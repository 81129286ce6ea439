use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(PropertyId);
id_newtype!(ContractId);
id_newtype!(InvoiceId);
id_newtype!(PaymentId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "admin")]
    Administrador,
    Propietario,
    Inquilino,
    Contador,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Administrador,
        Role::Propietario,
        Role::Inquilino,
        Role::Contador,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Role::Administrador => "Administrator",
            Role::Propietario => "Owner",
            Role::Inquilino => "Tenant",
            Role::Contador => "Accountant",
        }
    }
}

/// Backend-managed lifecycle states. The client only displays them and offers
/// them as transition targets; admissibility is always decided server-side.
macro_rules! lifecycle_state {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $wire:literal, $label:literal, terminal = $terminal:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn wire_name(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn is_terminal(self) -> bool {
                match self {
                    $($name::$variant => $terminal,)+
                }
            }

            pub fn from_wire(raw: &str) -> Option<Self> {
                let raw = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|state| state.wire_name().eq_ignore_ascii_case(raw))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.wire_name())
            }
        }
    };
}

lifecycle_state! {
    PropertyState {
        Disponible => "disponible", "Available", terminal = false;
        Ocupada => "ocupada", "Occupied", terminal = false;
        Mantenimiento => "mantenimiento", "Under maintenance", terminal = false;
        Inactiva => "inactiva", "Inactive", terminal = false;
    }
}

lifecycle_state! {
    ContractState {
        Borrador => "borrador", "Draft", terminal = false;
        Activo => "activo", "Active", terminal = false;
        Suspendido => "suspendido", "Suspended", terminal = false;
        Finalizado => "finalizado", "Finished", terminal = true;
        Cancelado => "cancelado", "Cancelled", terminal = true;
    }
}

lifecycle_state! {
    InvoiceState {
        Pendiente => "pendiente", "Pending", terminal = false;
        Pagada => "pagada", "Paid", terminal = true;
        Vencida => "vencida", "Overdue", terminal = false;
        Anulada => "anulada", "Voided", terminal = true;
    }
}

lifecycle_state! {
    PaymentState {
        Pendiente => "pendiente", "Pending confirmation", terminal = false;
        Confirmado => "confirmado", "Confirmed", terminal = false;
        Rechazado => "rechazado", "Rejected", terminal = true;
        Reembolsado => "reembolsado", "Refunded", terminal = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
    Tarjeta,
    Cheque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Casa,
    Departamento,
    Local,
    Oficina,
    Terreno,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
}

impl User {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.trim().is_empty() => format!("{} {}", self.name, last),
            _ => self.name.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
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
    #[serde(rename = "estado")]
    pub state: PropertyState,
    #[serde(rename = "id_propietario")]
    pub owner_id: UserId,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
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
    #[serde(rename = "estado")]
    pub state: ContractState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
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
    #[serde(rename = "estado")]
    pub state: InvoiceState,
}

impl Invoice {
    /// Pending past its due date, or already marked overdue by the backend.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.state {
            InvoiceState::Vencida => true,
            InvoiceState::Pendiente => self.due_date < today,
            InvoiceState::Pagada | InvoiceState::Anulada => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
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
    #[serde(rename = "estado")]
    pub state: PaymentState,
}
