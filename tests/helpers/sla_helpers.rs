use crate::helpers::notifiers::{RecordingNotifier, StaticAssigneeDirectory};
use slatrack::domain::ports::Assignee;
use slatrack::events::EventBus;
use slatrack::models::{
    BusinessHours, ConditionValue, EscalationRule, SlaDefinition, SlaEvent, SlaEventType,
};
use slatrack::{Database, SlaService};
use std::collections::HashMap;
use std::sync::Arc;

/// Calendar-off definition with no conditions, created directly through the
/// repository.
pub async fn create_test_definition(
    db: &Database,
    workspace_id: &str,
    applies_to: &str,
    response_time: Option<i64>,
    resolution_time: Option<i64>,
) -> SlaDefinition {
    let definition = SlaDefinition::new(
        workspace_id.to_string(),
        format!("Test SLA {}", &uuid::Uuid::new_v4().to_string()[..8]),
        applies_to.to_string(),
        HashMap::new(),
        response_time,
        resolution_time,
        false,
        BusinessHours::default(),
        vec![],
        0,
    );
    db.create_sla_definition(&definition)
        .await
        .expect("Failed to create test definition");
    definition
}

/// Like `create_test_definition` but with conditions, escalation rules, a
/// custom warning threshold, and a priority.
pub async fn create_custom_definition(
    db: &Database,
    workspace_id: &str,
    applies_to: &str,
    conditions: HashMap<String, ConditionValue>,
    resolution_time: i64,
    warning_threshold: f64,
    escalation_rules: Vec<EscalationRule>,
    priority: i64,
) -> SlaDefinition {
    let definition = SlaDefinition::new(
        workspace_id.to_string(),
        format!("Custom SLA p{}", priority),
        applies_to.to_string(),
        conditions,
        None,
        Some(resolution_time),
        false,
        BusinessHours::default(),
        escalation_rules,
        priority,
    )
    .with_warning_threshold(warning_threshold);
    db.create_sla_definition(&definition)
        .await
        .expect("Failed to create custom definition");
    definition
}

pub fn build_service(db: &Database, notifier: Arc<RecordingNotifier>) -> SlaService {
    SlaService::new(
        Arc::new(db.clone()),
        notifier,
        Arc::new(StaticAssigneeDirectory { assignee: None }),
        EventBus::new(100),
    )
}

pub fn build_service_with_assignee(
    db: &Database,
    notifier: Arc<RecordingNotifier>,
    assignee: Assignee,
) -> SlaService {
    SlaService::new(
        Arc::new(db.clone()),
        notifier,
        Arc::new(StaticAssigneeDirectory {
            assignee: Some(assignee),
        }),
        EventBus::new(100),
    )
}

/// Rewrite an instance's clock fields to simulate elapsed time without
/// sleeping in tests.
pub async fn backdate_instance(
    db: &Database,
    instance_id: &str,
    created_at: &str,
    response_due_at: Option<&str>,
    resolution_due_at: Option<&str>,
) {
    sqlx::query(
        "UPDATE sla_instances SET created_at = ?, response_due_at = ?, resolution_due_at = ?
         WHERE id = ?",
    )
    .bind(created_at)
    .bind(response_due_at)
    .bind(resolution_due_at)
    .bind(instance_id)
    .execute(db.pool())
    .await
    .expect("Failed to backdate instance");
}

pub async fn get_events(db: &Database, instance_id: &str) -> Vec<SlaEvent> {
    db.list_sla_events(instance_id)
        .await
        .expect("Failed to list events")
}

pub async fn count_events(db: &Database, instance_id: &str, event_type: SlaEventType) -> usize {
    get_events(db, instance_id)
        .await
        .iter()
        .filter(|e| e.event_type == event_type)
        .count()
}
