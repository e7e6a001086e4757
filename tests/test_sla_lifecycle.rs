mod helpers;

use chrono::{Duration, Utc};
use helpers::*;
use slatrack::models::{ConditionValue, PhaseStatus, SlaEventType};
use std::collections::HashMap;
use std::sync::Arc;

// ========================================
// Instance creation and matching
// ========================================

#[tokio::test]
async fn test_create_instance_applies_matching_definition() {
    let db = setup_test_db().await;
    let definition = create_test_definition(&db, "ws-1", "ticket", Some(60), Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .expect("Expected an instance");

    assert_eq!(instance.sla_definition_id, definition.id);
    assert_eq!(instance.response_status, PhaseStatus::Pending);
    assert_eq!(instance.resolution_status, PhaseStatus::Pending);
    assert!(instance.response_due_at.is_some());
    assert!(instance.resolution_due_at.is_some());

    let events = get_events(&db, &instance.id).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, SlaEventType::Created);
    assert_eq!(events[0].event_data["definition_id"], definition.id);
}

#[tokio::test]
async fn test_create_instance_without_match_is_untracked() {
    let db = setup_test_db().await;
    let mut conditions = HashMap::new();
    conditions.insert(
        "priority".to_string(),
        ConditionValue::Scalar("high".to_string()),
    );
    create_custom_definition(&db, "ws-1", "ticket", conditions, 480, 80.0, vec![], 10).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let mut context = HashMap::new();
    context.insert("priority".to_string(), "low".to_string());
    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &context)
        .await
        .unwrap();
    assert!(instance.is_none());

    // Wrong workspace and wrong target type also stay untracked.
    assert!(service
        .create_instance("ws-2", "ticket", "ticket-2", &HashMap::new())
        .await
        .unwrap()
        .is_none());
    assert!(service
        .create_instance("ws-1", "task", "task-1", &HashMap::new())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_create_instance_highest_priority_definition_wins() {
    let db = setup_test_db().await;
    let mut high_only = HashMap::new();
    high_only.insert(
        "priority".to_string(),
        ConditionValue::OneOf(vec!["high".to_string(), "urgent".to_string()]),
    );
    let urgent =
        create_custom_definition(&db, "ws-1", "ticket", high_only, 240, 80.0, vec![], 10).await;
    let catch_all =
        create_custom_definition(&db, "ws-1", "ticket", HashMap::new(), 960, 80.0, vec![], 1).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let mut context = HashMap::new();
    context.insert("priority".to_string(), "urgent".to_string());
    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &context)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(instance.sla_definition_id, urgent.id);

    context.insert("priority".to_string(), "low".to_string());
    let instance = service
        .create_instance("ws-1", "ticket", "ticket-2", &context)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(instance.sla_definition_id, catch_all.id);
}

#[tokio::test]
async fn test_response_only_definition_tracks_single_phase() {
    let db = setup_test_db().await;
    create_test_definition(&db, "ws-1", "ticket", Some(60), None).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(instance.response_status, PhaseStatus::Pending);
    assert_eq!(instance.resolution_status, PhaseStatus::Met);
    assert!(instance.resolution_due_at.is_none());
}

// ========================================
// Response and resolution recording
// ========================================

#[tokio::test]
async fn test_record_response_within_deadline_is_met() {
    let db = setup_test_db().await;
    create_test_definition(&db, "ws-1", "ticket", Some(60), Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();

    let updated = service
        .record_response("ticket", "ticket-1")
        .await
        .unwrap()
        .expect("Expected a pending instance");
    assert_eq!(updated.response_status, PhaseStatus::Met);
    assert!(updated.first_response_at.is_some());
    // Resolution phase is untouched.
    assert_eq!(updated.resolution_status, PhaseStatus::Pending);

    assert_eq!(
        count_events(&db, &updated.id, SlaEventType::ResponseRecorded).await,
        1
    );
}

#[tokio::test]
async fn test_record_response_after_deadline_is_breached() {
    let db = setup_test_db().await;
    create_test_definition(&db, "ws-1", "ticket", Some(60), Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();

    // Simulate the response arriving two hours past a one-hour budget.
    let now = Utc::now();
    backdate_instance(
        &db,
        &instance.id,
        &(now - Duration::minutes(180)).to_rfc3339(),
        Some(&(now - Duration::minutes(120)).to_rfc3339()),
        instance.resolution_due_at.as_deref(),
    )
    .await;

    let updated = service
        .record_response("ticket", "ticket-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.response_status, PhaseStatus::Breached);
    assert!(updated.first_response_at.is_some());
}

#[tokio::test]
async fn test_duplicate_response_is_a_no_op() {
    let db = setup_test_db().await;
    create_test_definition(&db, "ws-1", "ticket", Some(60), Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();
    service.record_response("ticket", "ticket-1").await.unwrap();

    // Second response finds no pending phase and records nothing.
    let second = service.record_response("ticket", "ticket-1").await.unwrap();
    assert!(second.is_none());
    assert_eq!(
        count_events(&db, &instance.id, SlaEventType::ResponseRecorded).await,
        1
    );
}

#[tokio::test]
async fn test_record_resolution_completes_instance() {
    let db = setup_test_db().await;
    create_test_definition(&db, "ws-1", "ticket", Some(60), Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();
    service.record_response("ticket", "ticket-1").await.unwrap();
    let resolved = service
        .record_resolution("ticket", "ticket-1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(resolved.resolution_status, PhaseStatus::Met);
    assert!(resolved.resolved_at.is_some());
    assert!(!resolved.has_pending_phase());

    let events = get_events(&db, &instance.id).await;
    let types: Vec<_> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![
            SlaEventType::Created,
            SlaEventType::ResponseRecorded,
            SlaEventType::Resolved,
        ]
    );
}

// ========================================
// Pause and resume
// ========================================

#[tokio::test]
async fn test_pause_and_resume_credit_paused_minutes() {
    let db = setup_test_db().await;
    create_test_definition(&db, "ws-1", "ticket", None, Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();

    let paused = service.pause_sla(&instance.id, "waiting on customer").await.unwrap();
    assert!(paused.is_paused);
    assert!(paused.paused_at.is_some());

    // Pausing again is a no-op: no second event.
    service.pause_sla(&instance.id, "again").await.unwrap();
    assert_eq!(count_events(&db, &instance.id, SlaEventType::Paused).await, 1);

    // Simulate a 30 minute pause by rewriting paused_at.
    let paused_at = (Utc::now() - Duration::minutes(30)).to_rfc3339();
    sqlx::query("UPDATE sla_instances SET paused_at = ? WHERE id = ?")
        .bind(&paused_at)
        .bind(&instance.id)
        .execute(db.pool())
        .await
        .unwrap();

    let resumed = service.resume_sla(&instance.id).await.unwrap();
    assert!(!resumed.is_paused);
    assert!(resumed.paused_at.is_none());
    assert_eq!(resumed.total_paused_minutes, 30);

    // Resuming a running instance is a no-op.
    service.resume_sla(&instance.id).await.unwrap();
    assert_eq!(count_events(&db, &instance.id, SlaEventType::Resumed).await, 1);

    let events = get_events(&db, &instance.id).await;
    let resumed_event = events
        .iter()
        .find(|e| e.event_type == SlaEventType::Resumed)
        .unwrap();
    assert_eq!(resumed_event.event_data["paused_minutes"], 30);
}

#[tokio::test]
async fn test_pause_unknown_instance_is_not_found() {
    let db = setup_test_db().await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let result = service.pause_sla("no-such-id", "reason").await;
    assert!(matches!(
        result,
        Err(slatrack::ServiceError::NotFound(_))
    ));
}

// ========================================
// Status and dashboard
// ========================================

#[tokio::test]
async fn test_get_status_reports_pending_countdowns() {
    let db = setup_test_db().await;
    let definition = create_test_definition(&db, "ws-1", "ticket", Some(60), Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();

    let status = service
        .get_status("ticket", "ticket-1")
        .await
        .unwrap()
        .expect("Expected tracked status");
    assert_eq!(status.definition_name, definition.name);

    let response = status.response.expect("Expected response snapshot");
    assert!(response.remaining_minutes > 0 && response.remaining_minutes <= 60);
    assert!(response.used_percent < 5.0);
    assert!(!response.remaining_display.is_empty());
    assert!(status.resolution.is_some());

    // After responding, only the resolution snapshot remains.
    service.record_response("ticket", "ticket-1").await.unwrap();
    let status = service.get_status("ticket", "ticket-1").await.unwrap().unwrap();
    assert!(status.response.is_none());
    assert!(status.resolution.is_some());

    // An untracked target has no status.
    assert!(service.get_status("ticket", "other").await.unwrap().is_none());
}

#[tokio::test]
async fn test_dashboard_partitions_by_resolution_outcome() {
    let db = setup_test_db().await;
    create_test_definition(&db, "ws-1", "ticket", None, Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    for n in 0..4 {
        service
            .create_instance("ws-1", "ticket", &format!("ticket-{}", n), &HashMap::new())
            .await
            .unwrap()
            .unwrap();
    }

    // ticket-0 resolved in time, ticket-1 marked breached by hand,
    // ticket-2 and ticket-3 left pending with ticket-3 deep in its budget.
    service.record_resolution("ticket", "ticket-0").await.unwrap();
    let breached = db
        .find_pending_resolution_sla_instance("ticket", "ticket-1")
        .await
        .unwrap()
        .unwrap();
    db.mark_sla_resolution(&breached.id, PhaseStatus::Breached, None)
        .await
        .unwrap();

    let at_risk = db
        .find_pending_resolution_sla_instance("ticket", "ticket-3")
        .await
        .unwrap()
        .unwrap();
    let now = Utc::now();
    backdate_instance(
        &db,
        &at_risk.id,
        &(now - Duration::minutes(440)).to_rfc3339(),
        None,
        Some(&(now + Duration::minutes(40)).to_rfc3339()),
    )
    .await;

    let dashboard = service.get_dashboard("ws-1").await.unwrap();
    assert_eq!(dashboard.total, 4);
    assert_eq!(dashboard.met, 1);
    assert_eq!(dashboard.breached, 1);
    assert_eq!(dashboard.pending, 2);
    assert_eq!(dashboard.at_risk, 1);
    assert_eq!(
        dashboard.met + dashboard.breached + dashboard.pending,
        dashboard.total
    );

    // Other workspaces see nothing.
    let empty = service.get_dashboard("ws-2").await.unwrap();
    assert_eq!(empty.total, 0);
}

#[tokio::test]
async fn test_dashboard_at_risk_is_subset_of_pending() {
    let db = setup_test_db().await;
    // A response-only definition: resolution starts met, so the instance
    // never enters the pending bucket.
    create_test_definition(&db, "ws-1", "ticket", Some(60), None).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();

    // Push the response phase to 90% of its budget.
    let now = Utc::now();
    backdate_instance(
        &db,
        &instance.id,
        &(now - Duration::minutes(54)).to_rfc3339(),
        Some(&(now + Duration::minutes(6)).to_rfc3339()),
        None,
    )
    .await;

    let dashboard = service.get_dashboard("ws-1").await.unwrap();
    assert_eq!(dashboard.total, 1);
    assert_eq!(dashboard.met, 1);
    assert_eq!(dashboard.pending, 0);
    assert_eq!(dashboard.at_risk, 0);
    assert!(dashboard.at_risk <= dashboard.pending);
    assert_eq!(
        dashboard.met + dashboard.breached + dashboard.pending,
        dashboard.total
    );
}

// ========================================
// Definition management
// ========================================

#[tokio::test]
async fn test_definition_validation_rejected_on_create() {
    let db = setup_test_db().await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let mut definition = create_test_definition(&db, "ws-1", "ticket", Some(60), None).await;
    definition.id = uuid::Uuid::new_v4().to_string();
    definition.response_time = Some(-5);
    let result = service.create_definition(definition).await;
    assert!(matches!(
        result,
        Err(slatrack::ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn test_definition_update_does_not_shift_existing_deadlines() {
    let db = setup_test_db().await;
    create_test_definition(&db, "ws-1", "ticket", None, Some(480)).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let instance = service
        .create_instance("ws-1", "ticket", "ticket-1", &HashMap::new())
        .await
        .unwrap()
        .unwrap();
    let original_due = instance.resolution_due_at.clone();

    let mut definition = service
        .get_definition(&instance.sla_definition_id)
        .await
        .unwrap();
    definition.resolution_time = Some(60);
    service.update_definition(definition).await.unwrap();

    let reloaded = service.get_instance(&instance.id).await.unwrap();
    assert_eq!(reloaded.resolution_due_at, original_due);
}

#[tokio::test]
async fn test_delete_definition_unknown_id_is_not_found() {
    let db = setup_test_db().await;
    let definition = create_test_definition(&db, "ws-1", "ticket", Some(60), None).await;
    let service = build_service(&db, Arc::new(RecordingNotifier::default()));

    let result = service.delete_definition("no-such-id").await;
    assert!(matches!(
        result,
        Err(slatrack::ServiceError::NotFound(_))
    ));

    service.delete_definition(&definition.id).await.unwrap();
    let result = service.get_definition(&definition.id).await;
    assert!(matches!(
        result,
        Err(slatrack::ServiceError::NotFound(_))
    ));
}
