//! Default notifier and directory implementations.
//!
//! `LogNotifier` writes every outbound notification to the log instead of a
//! real transport; deployments embed the engine with their own `Notifier`
//! (websocket fan-out, SMTP) and `AssigneeDirectory` implementations.

use crate::domain::ports::{Assignee, AssigneeDirectory, CountdownUpdate, Notifier};
use crate::error::ServiceResult;
use crate::models::SlaPhase;
use tracing::{info, warn};

#[derive(Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn emit_workspace_batch_update(
        &self,
        workspace_id: &str,
        updates: &[CountdownUpdate],
    ) -> ServiceResult<()> {
        info!(
            workspace_id = %workspace_id,
            count = updates.len(),
            "SLA countdown batch"
        );
        Ok(())
    }

    async fn emit_workspace_event(
        &self,
        workspace_id: &str,
        event_name: &str,
        payload: serde_json::Value,
    ) -> ServiceResult<()> {
        info!(
            workspace_id = %workspace_id,
            event = %event_name,
            payload = %payload,
            "SLA workspace event"
        );
        Ok(())
    }

    async fn send_warning_email(
        &self,
        assignee: &Assignee,
        target_id: &str,
        definition_name: &str,
        phase: SlaPhase,
        remaining_minutes: i64,
        used_percent: f64,
    ) -> ServiceResult<()> {
        warn!(
            to = %assignee.email,
            target_id = %target_id,
            definition = %definition_name,
            phase = %phase,
            remaining_minutes = remaining_minutes,
            used_percent = used_percent,
            "SLA warning email (log only)"
        );
        Ok(())
    }

    async fn send_breach_email(
        &self,
        assignee: &Assignee,
        target_id: &str,
        definition_name: &str,
        phase: SlaPhase,
    ) -> ServiceResult<()> {
        warn!(
            to = %assignee.email,
            target_id = %target_id,
            definition = %definition_name,
            phase = %phase,
            "SLA breach email (log only)"
        );
        Ok(())
    }
}

/// Directory that never resolves anyone. Broadcasts and audit events still
/// happen; emails are suppressed.
#[derive(Default)]
pub struct NullAssigneeDirectory;

#[async_trait::async_trait]
impl AssigneeDirectory for NullAssigneeDirectory {
    async fn resolve_assignee(
        &self,
        _target_type: &str,
        _target_id: &str,
    ) -> ServiceResult<Option<Assignee>> {
        Ok(None)
    }
}
