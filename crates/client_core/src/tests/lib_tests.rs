use super::*;

use std::sync::Mutex as StdMutex;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::NaiveDate;
use serde_json::{json, Value};
use shared::{
    domain::{
        ContractId, ContractState, PropertyId, PropertyKind, PropertyState, Role, User, UserId,
    },
    protocol::{EntityKind, NewProperty, PropertyUpdate},
};
use tokio::net::TcpListener;

use crate::{
    dashboard::{load_dashboard, Dashboard},
    services::ReportKind,
};

const TOKEN: &str = "tok-123";

#[derive(Clone, Default)]
struct MockBackend {
    forbid_payments: bool,
    role: &'static str,
    last_update: Arc<StdMutex<Option<Value>>>,
    last_auth: Arc<StdMutex<Option<String>>>,
}

fn authorized(state: &MockBackend, headers: &HeaderMap) -> bool {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ok = auth.as_deref() == Some(&format!("Bearer {TOKEN}"));
    *state.last_auth.lock().expect("lock") = auth;
    ok
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "code": "unauthorized", "message": "token inválido" })),
    )
        .into_response()
}

async fn login(State(state): State<MockBackend>, Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "mensaje": "credenciales inválidas" })),
        )
            .into_response();
    }
    Json(json!({
        "token": TOKEN,
        "usuario": {
            "id": 10,
            "nombre": "Olga",
            "email": body["email"],
            "rol": state.role
        }
    }))
    .into_response()
}

async fn list_properties(State(state): State<MockBackend>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 1, "direccion": "Calle 1", "tipo": "casa", "precio_alquiler": 500.0,
          "estado": "ocupada", "id_propietario": 10 },
        { "id": 2, "direccion": "Calle 2", "tipo": "local", "precio_alquiler": 900.0,
          "estado": "disponible", "id_propietario": 20 }
    ]))
    .into_response()
}

async fn list_contracts(State(state): State<MockBackend>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    // Wrapped in an envelope on purpose.
    Json(json!({ "data": [
        { "id": 11, "id_propiedad": 1, "id_inquilino": 100, "fecha_inicio": "2024-01-01",
          "fecha_fin": "2024-12-31", "monto_mensual": 500.0, "estado": "activo" }
    ]}))
    .into_response()
}

async fn list_invoices(State(state): State<MockBackend>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 21, "id_contrato": 11, "fecha_emision": "2024-01-01",
          "fecha_vencimiento": "2024-01-10", "monto": 500.0, "estado": "pendiente" }
    ]))
    .into_response()
}

async fn list_payments(State(state): State<MockBackend>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if state.forbid_payments {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "mensaje": "sin permisos" })),
        )
            .into_response();
    }
    Json(json!([
        { "id": 31, "id_factura": 21, "monto": 200.0, "fecha_pago": "2024-01-08",
          "metodo": "efectivo", "estado": "confirmado" }
    ]))
    .into_response()
}

async fn list_users(State(state): State<MockBackend>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 10, "nombre": "Olga", "email": "o@x", "rol": "propietario" },
        { "id": 100, "nombre": "Tito", "email": "t@x", "rol": "inquilino" }
    ]))
    .into_response()
}

async fn create_property(Json(body): Json<Value>) -> Response {
    let mut created = body.clone();
    created["id"] = json!(42);
    created["estado"] = json!("disponible");
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_property(
    State(state): State<MockBackend>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    *state.last_update.lock().expect("lock") = Some(body.clone());
    Json(json!({
        "id": id, "direccion": "Calle 1", "tipo": "casa",
        "precio_alquiler": body["precio_alquiler"], "estado": "ocupada", "id_propietario": 10
    }))
    .into_response()
}

async fn delete_property(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "not_found", "message": "propiedad no existe" })),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn analyze_contract(Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    let target = body["estado_destino"].as_str().unwrap_or_default().to_string();
    let allowed = target != "borrador";
    let motivos: Vec<String> = if allowed {
        Vec::new()
    } else {
        vec![format!("contrato {id} ya firmado")]
    };
    Json(json!({
        "permitida": allowed,
        "estado_actual": "activo",
        "estado_destino": target,
        "motivos": motivos,
    }))
    .into_response()
}

async fn execute_contract(Json(body): Json<Value>) -> Response {
    let target = body["estado_destino"].as_str().unwrap_or_default().to_string();
    if target == "cancelado" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "code": "conflict", "message": "contrato con facturas pendientes" })),
        )
            .into_response();
    }
    Json(json!({
        "exito": true,
        "estado_anterior": "activo",
        "estado_nuevo": target,
        "mensaje": body["motivo"],
    }))
    .into_response()
}

async fn contract_report(Path(id): Path<i64>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"contrato-{id}-firmado.pdf\""),
            ),
        ],
        b"%PDF-1.7 fake".to_vec(),
    )
        .into_response()
}

async fn hostile_property_report() -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"../escaped.pdf\""),
        ],
        b"%PDF-1.7 fake".to_vec(),
    )
        .into_response()
}

async fn financial_report(
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    let body = format!(
        "{}..{}",
        params.get("desde").cloned().unwrap_or_default(),
        params.get("hasta").cloned().unwrap_or_default()
    );
    ([(header::CONTENT_TYPE, "application/pdf")], body).into_response()
}

async fn broken_server() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn spawn_backend(state: MockBackend) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/propiedades/obtener", get(list_properties))
        .route("/api/v1/propiedades/crear", post(create_property))
        .route("/api/v1/propiedades/actualizar/:id", put(update_property))
        .route("/api/v1/propiedades/eliminar/:id", delete(delete_property))
        .route("/api/v1/contratos/obtener", get(list_contracts))
        .route("/api/v1/contratos/:id/analizar-transicion", post(analyze_contract))
        .route("/api/v1/contratos/:id/ejecutar-transicion", post(execute_contract))
        .route("/api/v1/facturas/obtener", get(list_invoices))
        .route("/api/v1/pagos/obtener", get(list_payments))
        .route("/api/v1/usuarios/obtener", get(list_users))
        .route("/api/v1/reportes/contrato/:id", get(contract_report))
        .route("/api/v1/reportes/financiero", get(financial_report))
        .route("/api/v1/reportes/propiedad/:id", get(hostile_property_report))
        .route("/api/v1/facturas/obtener/:id", get(broken_server))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> RentManagerClient {
    let settings = Settings::default()
        .with_api_base_url(base_url)
        .expect("settings");
    RentManagerClient::new(&settings, Arc::new(MemorySessionStore::default())).expect("client")
}

async fn signed_in(role: &'static str, forbid_payments: bool) -> (RentManagerClient, MockBackend) {
    let backend = MockBackend {
        role,
        forbid_payments,
        ..Default::default()
    };
    let url = spawn_backend(backend.clone()).await;
    let client = client_for(&url);
    client
        .auth
        .login("olga@example.com", "secret")
        .await
        .expect("login");
    (client, backend)
}

fn stored_session(token: impl Into<String>) -> Session {
    Session::new(
        token,
        User {
            id: UserId(10),
            name: "Olga".to_string(),
            last_name: None,
            email: "olga@example.com".to_string(),
            role: Role::Propietario,
            phone: None,
            active: true,
        },
    )
}

fn expired_jwt() -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(
        r#"{{"sub":"10","exp":{}}}"#,
        chrono::Utc::now().timestamp() - 60
    ));
    format!("{header}.{claims}.signature")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[tokio::test]
async fn login_persists_session_and_attaches_bearer_token() {
    let (client, backend) = signed_in("propietario", false).await;

    let session = client.auth.current_session().await.expect("session");
    assert_eq!(session.role(), Role::Propietario);
    assert_eq!(session.user_id(), UserId(10));

    let properties = client.properties.list().await.expect("properties");
    assert_eq!(properties.len(), 2);
    assert_eq!(
        backend.last_auth.lock().expect("lock").as_deref(),
        Some("Bearer tok-123")
    );
}

#[tokio::test]
async fn bad_credentials_surface_backend_message() {
    let url = spawn_backend(MockBackend {
        role: "inquilino",
        ..Default::default()
    })
    .await;
    let client = client_for(&url);

    let err = client
        .auth
        .login("olga@example.com", "wrong")
        .await
        .expect_err("login must fail");
    assert!(err.requires_reauth());
    assert_eq!(err.to_string(), "unauthorized: credenciales inválidas");
    assert!(matches!(
        client.auth.current_session().await,
        Err(ClientError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn blank_credentials_are_rejected_locally() {
    let client = client_for("http://127.0.0.1:9");
    let err = client.auth.login("  ", "secret").await.expect_err("blank");
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn requests_without_session_are_unauthorized() {
    let url = spawn_backend(MockBackend::default()).await;
    let client = client_for(&url);
    let err = client.properties.list().await.expect_err("no token");
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn logout_drops_token_and_session() {
    let (client, _backend) = signed_in("administrador", false).await;
    client.auth.logout().await.expect("logout");

    assert!(matches!(
        client.properties.list().await,
        Err(ClientError::Unauthorized(_))
    ));
    assert!(client.auth.restore().await.expect("restore").is_none());
}

#[tokio::test]
async fn restore_reinstalls_persisted_token() {
    let backend = MockBackend {
        role: "inquilino",
        ..Default::default()
    };
    let url = spawn_backend(backend.clone()).await;
    let settings = Settings::default().with_api_base_url(&url).expect("settings");
    let store = Arc::new(MemorySessionStore::default());

    let first = RentManagerClient::new(&settings, store.clone()).expect("client");
    first.auth.login("a@b", "secret").await.expect("login");

    let second = RentManagerClient::new(&settings, store).expect("client");
    let restored = second.auth.restore().await.expect("restore").expect("session");
    assert_eq!(restored.token, TOKEN);
    assert_eq!(second.properties.list().await.expect("list").len(), 2);
}

#[tokio::test]
async fn expired_session_is_discarded_on_restore() {
    let store = Arc::new(MemorySessionStore::with_session(stored_session(expired_jwt())));
    let settings = Settings::default()
        .with_api_base_url("http://127.0.0.1:9")
        .expect("settings");
    let client = RentManagerClient::new(&settings, store.clone()).expect("client");

    assert!(matches!(
        client.auth.restore().await,
        Err(ClientError::SessionExpired)
    ));
    assert_eq!(store.load().await.expect("load"), None);
    assert!(!client.api.has_token().await);
    assert!(client.auth.restore().await.expect("restore").is_none());
}

#[tokio::test]
async fn expired_session_is_discarded_when_read() {
    let store = Arc::new(MemorySessionStore::with_session(stored_session(expired_jwt())));
    let client = RentManagerClient::new(&Settings::default(), store.clone()).expect("client");

    assert!(matches!(
        client.auth.current_session().await,
        Err(ClientError::SessionExpired)
    ));
    assert_eq!(store.load().await.expect("load"), None);
    assert!(matches!(
        client.auth.current_session().await,
        Err(ClientError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn rejected_session_is_not_restored_again() {
    let url = spawn_backend(MockBackend::default()).await;
    let settings = Settings::default().with_api_base_url(&url).expect("settings");
    let store = Arc::new(MemorySessionStore::with_session(stored_session("revoked")));
    let client = RentManagerClient::new(&settings, store.clone()).expect("client");

    client.auth.restore().await.expect("restore").expect("session");
    let err = client.properties.list().await.expect_err("revoked token");
    assert!(err.requires_reauth());

    client.auth.invalidate().await.expect("invalidate");
    assert_eq!(store.load().await.expect("load"), None);
    assert!(!client.api.has_token().await);

    let next = RentManagerClient::new(&settings, store).expect("client");
    assert!(next.auth.restore().await.expect("restore").is_none());
}

#[tokio::test]
async fn filters_are_applied_client_side() {
    let (client, _backend) = signed_in("propietario", false).await;

    let owned = client.properties.list_by_owner(UserId(10)).await.expect("owned");
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, PropertyId(1));

    let by_tenant = client.contracts.list_by_tenant(UserId(100)).await.expect("tenant");
    assert_eq!(by_tenant.len(), 1);
    assert!(client
        .contracts
        .list_by_property(PropertyId(2))
        .await
        .expect("by property")
        .is_empty());
}

#[tokio::test]
async fn create_update_and_delete_round_trip() {
    let (client, backend) = signed_in("administrador", false).await;

    let created = client
        .properties
        .create(&NewProperty {
            address: "Nueva 5".to_string(),
            city: Some("Lima".to_string()),
            kind: PropertyKind::Oficina,
            bedrooms: None,
            area_m2: Some(80.0),
            monthly_rent: 1200.0,
            owner_id: UserId(10),
            description: None,
        })
        .await
        .expect("create");
    assert_eq!(created.id, PropertyId(42));
    assert_eq!(created.state, PropertyState::Disponible);

    let updated = client
        .properties
        .update(
            PropertyId(1),
            &PropertyUpdate {
                monthly_rent: Some(650.0),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.monthly_rent, 650.0);
    assert_eq!(
        backend.last_update.lock().expect("lock").clone(),
        Some(json!({ "precio_alquiler": 650.0 }))
    );

    client.properties.delete(PropertyId(1)).await.expect("delete");
    let err = client
        .properties
        .delete(PropertyId(404))
        .await
        .expect_err("missing");
    assert!(matches!(err, ClientError::NotFound(ref m) if m == "propiedad no existe"));
}

#[tokio::test]
async fn server_errors_keep_raw_body() {
    let (client, _backend) = signed_in("contador", false).await;
    let err = client
        .invoices
        .get(shared::domain::InvoiceId(1))
        .await
        .expect_err("500");
    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn transitions_are_analyzed_then_executed() {
    let (client, _backend) = signed_in("propietario", false).await;

    let analysis = client
        .transitions
        .analyze(EntityKind::Contratos, 11, "Borrador", None)
        .await
        .expect("analyze");
    assert!(!analysis.permitida);
    assert_eq!(analysis.motivos, vec!["contrato 11 ya firmado".to_string()]);
    assert!(analysis.advertencias.is_empty());

    let outcome = client
        .transitions
        .execute(EntityKind::Contratos, 11, "suspendido", Some("impago"))
        .await
        .expect("execute");
    assert!(outcome.exito);
    assert_eq!(outcome.estado_nuevo, ContractState::Suspendido.wire_name());
    assert_eq!(outcome.mensaje.as_deref(), Some("impago"));

    let err = client
        .transitions
        .execute(EntityKind::Contratos, 11, "cancelado", None)
        .await
        .expect_err("conflict");
    assert!(matches!(
        err,
        ClientError::Rejected { status: 409, ref message } if message == "contrato con facturas pendientes"
    ));
}

#[tokio::test]
async fn reports_are_downloaded_verbatim() {
    let (client, _backend) = signed_in("contador", false).await;

    let doc = client
        .reports
        .download(ReportKind::Contract(ContractId(11)))
        .await
        .expect("report");
    assert_eq!(doc.bytes, b"%PDF-1.7 fake");
    assert_eq!(doc.filename, "contrato-11-firmado.pdf");
    assert_eq!(doc.content_type.as_deref(), Some("application/pdf"));

    let doc = client
        .reports
        .download(ReportKind::Financial {
            from: date(2024, 1, 1),
            to: date(2024, 6, 30),
        })
        .await
        .expect("financial");
    assert_eq!(doc.bytes, b"2024-01-01..2024-06-30");
    assert_eq!(doc.filename, "financiero-20240101-20240630.pdf");
}

#[tokio::test]
async fn downloaded_report_cannot_escape_output_directory() {
    let (client, _backend) = signed_in("contador", false).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let reports = dir.path().join("reports");
    std::fs::create_dir(&reports).expect("mkdir");

    let doc = client
        .reports
        .download(ReportKind::Property(PropertyId(1)))
        .await
        .expect("report");
    assert_eq!(doc.filename, "escaped.pdf");

    let saved = doc.save_to(&reports).await.expect("save");
    assert_eq!(saved, reports.join("escaped.pdf"));
    assert!(!dir.path().join("escaped.pdf").exists());
}

#[tokio::test]
async fn dashboard_loads_for_owner_and_tolerates_forbidden_lists() {
    let (client, _backend) = signed_in("propietario", true).await;
    let session = client.auth.current_session().await.expect("session");

    let dashboard = load_dashboard(&client, &session, date(2024, 2, 1))
        .await
        .expect("dashboard");
    let Dashboard::Owner(owner) = dashboard else {
        panic!("expected owner dashboard");
    };
    assert_eq!(owner.ledgers.len(), 1);
    let ledger = &owner.ledgers[0];
    assert_eq!(ledger.total_invoiced, 500.0);
    // Payments were forbidden, so nothing counts as collected.
    assert_eq!(ledger.total_paid, 0.0);
    assert_eq!(ledger.overdue_invoices, 1);
}

#[tokio::test]
async fn admin_dashboard_includes_user_counts() {
    let (client, _backend) = signed_in("admin", false).await;
    let session = client.auth.current_session().await.expect("session");

    let Dashboard::Admin(admin) = load_dashboard(&client, &session, date(2024, 2, 1))
        .await
        .expect("dashboard")
    else {
        panic!("expected admin dashboard");
    };
    assert_eq!(admin.summary.collected, 200.0);
    assert_eq!(admin.summary.outstanding, 300.0);
    assert!(admin
        .users_by_role
        .contains(&(Role::Inquilino, 1)));
}
