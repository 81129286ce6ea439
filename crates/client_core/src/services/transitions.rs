use std::sync::Arc;

use shared::protocol::{EntityKind, TransitionAnalysis, TransitionOutcome, TransitionRequest};
use tracing::info;

use crate::{
    api::{ApiClient, ResourcePath},
    error::{ClientError, ClientResult},
};

/// Requests lifecycle changes. Whether a transition is admissible is decided
/// by the backend; the client only names the target state.
#[derive(Clone)]
pub struct TransitionService {
    api: Arc<ApiClient>,
}

impl TransitionService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Every state of `kind` except `current`, in declaration order.
    pub fn candidate_targets(kind: EntityKind, current: &str) -> Vec<&'static str> {
        kind.states()
            .into_iter()
            .filter(|state| !state.eq_ignore_ascii_case(current.trim()))
            .collect()
    }

    pub async fn analyze(
        &self,
        kind: EntityKind,
        id: i64,
        target: &str,
        reason: Option<&str>,
    ) -> ClientResult<TransitionAnalysis> {
        let request = build_request(kind, target, reason)?;
        let path = ResourcePath::new(kind.resource()).analyze_transition(id);
        let analysis: TransitionAnalysis = self.api.post_json(&path, &request).await?;
        info!(
            resource = kind.resource(),
            id,
            target = %request.estado_destino,
            allowed = analysis.permitida,
            "transition analyzed"
        );
        Ok(analysis)
    }

    pub async fn execute(
        &self,
        kind: EntityKind,
        id: i64,
        target: &str,
        reason: Option<&str>,
    ) -> ClientResult<TransitionOutcome> {
        let request = build_request(kind, target, reason)?;
        let path = ResourcePath::new(kind.resource()).execute_transition(id);
        let outcome: TransitionOutcome = self.api.post_json(&path, &request).await?;
        info!(
            resource = kind.resource(),
            id,
            from = %outcome.estado_anterior,
            to = %outcome.estado_nuevo,
            success = outcome.exito,
            "transition executed"
        );
        Ok(outcome)
    }
}

fn build_request(
    kind: EntityKind,
    target: &str,
    reason: Option<&str>,
) -> ClientResult<TransitionRequest> {
    let target = target.trim().to_ascii_lowercase();
    if !kind.states().contains(&target.as_str()) {
        return Err(ClientError::Validation(format!(
            "'{target}' is not a {} state (expected one of: {})",
            kind.resource(),
            kind.states().join(", ")
        )));
    }
    let motivo = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);
    Ok(TransitionRequest {
        estado_destino: target,
        motivo,
    })
}
