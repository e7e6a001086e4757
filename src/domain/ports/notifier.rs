use crate::error::ServiceResult;
use crate::models::SlaPhase;
use serde::{Deserialize, Serialize};

/// One live countdown entry in a workspace broadcast batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownUpdate {
    pub instance_id: String,
    pub target_type: String,
    pub target_id: String,
    pub phase: SlaPhase,
    pub remaining_minutes: i64,
    pub used_percent: f64,
    pub remaining_display: String,
}

/// Outbound notification boundary.
///
/// The engine only decides what to send and to whom; delivery mechanics live
/// behind this trait and are best-effort. A failed delivery must never undo
/// or block the state transition that triggered it.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn emit_workspace_batch_update(
        &self,
        workspace_id: &str,
        updates: &[CountdownUpdate],
    ) -> ServiceResult<()>;

    async fn emit_workspace_event(
        &self,
        workspace_id: &str,
        event_name: &str,
        payload: serde_json::Value,
    ) -> ServiceResult<()>;

    #[allow(clippy::too_many_arguments)]
    async fn send_warning_email(
        &self,
        assignee: &Assignee,
        target_id: &str,
        definition_name: &str,
        phase: SlaPhase,
        remaining_minutes: i64,
        used_percent: f64,
    ) -> ServiceResult<()>;

    async fn send_breach_email(
        &self,
        assignee: &Assignee,
        target_id: &str,
        definition_name: &str,
        phase: SlaPhase,
    ) -> ServiceResult<()>;
}

/// Resolved recipient identity for per-target emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignee {
    pub email: String,
    pub name: String,
}
