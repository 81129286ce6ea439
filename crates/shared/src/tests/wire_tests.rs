use chrono::NaiveDate;
use serde_json::json;

use crate::{
    domain::{
        ContractId, ContractState, Invoice, InvoiceId, InvoiceState, PaymentState, Property,
        PropertyKind, PropertyState, Role, User, UserId,
    },
    error::{ApiError, ErrorCode},
    protocol::{EntityKind, LoginResponse, PropertyUpdate, TransitionRequest},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn property_deserializes_from_backend_shape() {
    let raw = json!({
        "id": 4,
        "direccion": "Av. Siempre Viva 742",
        "tipo": "casa",
        "precio_alquiler": 850.5,
        "estado": "disponible",
        "id_propietario": 12
    });

    let property: Property = serde_json::from_value(raw).expect("property");
    assert_eq!(property.address, "Av. Siempre Viva 742");
    assert_eq!(property.kind, PropertyKind::Casa);
    assert_eq!(property.state, PropertyState::Disponible);
    assert_eq!(property.owner_id, UserId(12));
    assert!(property.city.is_none());
    assert!(property.bedrooms.is_none());
}

#[test]
fn login_response_accepts_admin_alias_and_defaults_active() {
    let raw = json!({
        "token": "abc.def.ghi",
        "usuario": {
            "id": 1,
            "nombre": "Ana",
            "email": "ana@example.com",
            "rol": "admin"
        }
    });

    let login: LoginResponse = serde_json::from_value(raw).expect("login");
    assert_eq!(login.user.role, Role::Administrador);
    assert!(login.user.active);
    assert_eq!(login.user.display_name(), "Ana");
}

#[test]
fn unknown_role_is_rejected() {
    let raw = json!({ "id": 1, "nombre": "x", "email": "x@y", "rol": "superuser" });
    assert!(serde_json::from_value::<User>(raw).is_err());
}

#[test]
fn partial_update_omits_unset_fields() {
    let patch = PropertyUpdate {
        monthly_rent: Some(900.0),
        ..Default::default()
    };
    let value = serde_json::to_value(&patch).expect("serialize");
    assert_eq!(value, json!({ "precio_alquiler": 900.0 }));
}

#[test]
fn transition_request_omits_missing_reason() {
    let req = TransitionRequest {
        estado_destino: "activo".to_string(),
        motivo: None,
    };
    assert_eq!(
        serde_json::to_value(&req).expect("serialize"),
        json!({ "estado_destino": "activo" })
    );
}

#[test]
fn api_error_accepts_legacy_mensaje_body() {
    let err: ApiError =
        serde_json::from_value(json!({ "mensaje": "contrato no encontrado" })).expect("error");
    assert_eq!(err.code, ErrorCode::Unknown);
    assert_eq!(err.message, "contrato no encontrado");

    let err: ApiError =
        serde_json::from_value(json!({ "code": "conflict", "message": "busy" })).expect("error");
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[test]
fn lifecycle_states_parse_case_insensitively() {
    assert_eq!(ContractState::from_wire(" Activo "), Some(ContractState::Activo));
    assert_eq!(PaymentState::from_wire("reembolsado"), Some(PaymentState::Reembolsado));
    assert_eq!(InvoiceState::from_wire("borrador"), None);
    assert!(ContractState::Cancelado.is_terminal());
    assert!(!ContractState::Suspendido.is_terminal());
}

#[test]
fn entity_kind_lists_states_in_declaration_order() {
    assert_eq!(
        EntityKind::Facturas.states(),
        vec!["pendiente", "pagada", "vencida", "anulada"]
    );
    assert_eq!(EntityKind::parse("Contract"), Some(EntityKind::Contratos));
    assert_eq!(EntityKind::parse("leases"), None);
}

#[test]
fn pending_invoice_past_due_is_overdue() {
    let invoice = Invoice {
        id: InvoiceId(1),
        contract_id: ContractId(1),
        issue_date: date(2024, 1, 1),
        due_date: date(2024, 1, 10),
        amount: 500.0,
        concept: None,
        state: InvoiceState::Pendiente,
    };
    assert!(!invoice.is_overdue(date(2024, 1, 10)));
    assert!(invoice.is_overdue(date(2024, 1, 11)));

    let paid = Invoice {
        state: InvoiceState::Pagada,
        ..invoice
    };
    assert!(!paid.is_overdue(date(2024, 3, 1)));
}
