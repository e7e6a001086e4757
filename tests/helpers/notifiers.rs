use slatrack::domain::ports::{Assignee, AssigneeDirectory, CountdownUpdate, Notifier};
use slatrack::error::ServiceResult;
use slatrack::models::SlaPhase;
use std::sync::Mutex;

/// Notifier that records every call for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub batches: Mutex<Vec<(String, Vec<CountdownUpdate>)>>,
    pub workspace_events: Mutex<Vec<(String, String, serde_json::Value)>>,
    pub warning_emails: Mutex<Vec<(String, String, f64)>>,
    pub breach_emails: Mutex<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn emit_workspace_batch_update(
        &self,
        workspace_id: &str,
        updates: &[CountdownUpdate],
    ) -> ServiceResult<()> {
        self.batches
            .lock()
            .unwrap()
            .push((workspace_id.to_string(), updates.to_vec()));
        Ok(())
    }

    async fn emit_workspace_event(
        &self,
        workspace_id: &str,
        event_name: &str,
        payload: serde_json::Value,
    ) -> ServiceResult<()> {
        self.workspace_events.lock().unwrap().push((
            workspace_id.to_string(),
            event_name.to_string(),
            payload,
        ));
        Ok(())
    }

    async fn send_warning_email(
        &self,
        assignee: &Assignee,
        target_id: &str,
        _definition_name: &str,
        _phase: SlaPhase,
        _remaining_minutes: i64,
        used_percent: f64,
    ) -> ServiceResult<()> {
        self.warning_emails.lock().unwrap().push((
            assignee.email.clone(),
            target_id.to_string(),
            used_percent,
        ));
        Ok(())
    }

    async fn send_breach_email(
        &self,
        assignee: &Assignee,
        target_id: &str,
        _definition_name: &str,
        _phase: SlaPhase,
    ) -> ServiceResult<()> {
        self.breach_emails
            .lock()
            .unwrap()
            .push((assignee.email.clone(), target_id.to_string()));
        Ok(())
    }
}

/// Directory returning a fixed assignee (or none).
pub struct StaticAssigneeDirectory {
    pub assignee: Option<Assignee>,
}

#[async_trait::async_trait]
impl AssigneeDirectory for StaticAssigneeDirectory {
    async fn resolve_assignee(
        &self,
        _target_type: &str,
        _target_id: &str,
    ) -> ServiceResult<Option<Assignee>> {
        Ok(self.assignee.clone())
    }
}
