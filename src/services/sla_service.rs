//! SLA lifecycle orchestration.
//!
//! All writes to instances flow through this service: creation on target
//! intake, response/resolution recording, pause/resume, and the periodic
//! violation sweep. Reads (status, dashboard, countdown broadcast) never
//! mutate state. Notification delivery is best-effort and can never roll
//! back a persisted transition.

use crate::domain::ports::{Assignee, AssigneeDirectory, CountdownUpdate, Notifier, SlaRepository};
use crate::error::{ServiceError, ServiceResult};
use crate::events::{EventBus, SystemEvent};
use crate::models::{
    PhaseSnapshot, PhaseStatus, SlaDashboard, SlaDefinition, SlaEvent, SlaEventType, SlaInstance,
    SlaPhase, SlaStatusInfo,
};
use crate::services::calendar;
use crate::services::matcher;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct SlaService {
    repository: Arc<dyn SlaRepository>,
    notifier: Arc<dyn Notifier>,
    directory: Arc<dyn AssigneeDirectory>,
    event_bus: EventBus,
}

fn parse_rfc3339(value: &str) -> ServiceResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ServiceError::Internal(format!("Invalid timestamp '{}': {}", value, e)))
}

impl SlaService {
    pub fn new(
        repository: Arc<dyn SlaRepository>,
        notifier: Arc<dyn Notifier>,
        directory: Arc<dyn AssigneeDirectory>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            repository,
            notifier,
            directory,
            event_bus,
        }
    }

    // ========================================
    // Definition management
    // ========================================

    pub async fn create_definition(&self, definition: SlaDefinition) -> ServiceResult<SlaDefinition> {
        definition.validate().map_err(ServiceError::Validation)?;
        self.repository.create_definition(&definition).await?;
        info!(
            definition_id = %definition.id,
            workspace_id = %definition.workspace_id,
            name = %definition.name,
            "Created SLA definition"
        );
        Ok(definition)
    }

    pub async fn get_definition(&self, definition_id: &str) -> ServiceResult<SlaDefinition> {
        self.repository
            .get_definition(definition_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("SLA definition not found: {}", definition_id))
            })
    }

    pub async fn list_definitions(&self, workspace_id: &str) -> ServiceResult<Vec<SlaDefinition>> {
        self.repository.list_definitions(workspace_id).await
    }

    /// Update a definition. Existing instances keep the deadlines computed at
    /// creation; only future matching sees the change.
    pub async fn update_definition(&self, definition: SlaDefinition) -> ServiceResult<SlaDefinition> {
        definition.validate().map_err(ServiceError::Validation)?;
        self.repository.update_definition(&definition).await?;
        Ok(definition)
    }

    pub async fn delete_definition(&self, definition_id: &str) -> ServiceResult<()> {
        self.repository.delete_definition(definition_id).await
    }

    // ========================================
    // Instance lifecycle
    // ========================================

    /// Start SLA tracking for a new target. Returns `None` when no active
    /// definition matches the target's context; an untracked target is not an
    /// error.
    pub async fn create_instance(
        &self,
        workspace_id: &str,
        target_type: &str,
        target_id: &str,
        context: &HashMap<String, String>,
    ) -> ServiceResult<Option<SlaInstance>> {
        let definitions = self
            .repository
            .find_active_definitions(workspace_id, target_type)
            .await?;
        let Some(definition) = matcher::select_definition(&definitions, context) else {
            debug!(
                workspace_id = %workspace_id,
                target_type = %target_type,
                target_id = %target_id,
                "No SLA definition matches target"
            );
            return Ok(None);
        };

        let now = Utc::now();
        let response_due_at = definition.response_time.map(|minutes| {
            calendar::calculate_deadline(
                now,
                minutes,
                &definition.business_hours,
                definition.business_hours_only,
            )
            .to_rfc3339()
        });
        let resolution_due_at = definition.resolution_time.map(|minutes| {
            calendar::calculate_deadline(
                now,
                minutes,
                &definition.business_hours,
                definition.business_hours_only,
            )
            .to_rfc3339()
        });

        let instance = SlaInstance::new(
            definition.id.clone(),
            workspace_id.to_string(),
            target_type.to_string(),
            target_id.to_string(),
            response_due_at,
            resolution_due_at,
        );
        self.repository.create_instance(&instance).await?;
        self.append_event(
            &instance.id,
            SlaEventType::Created,
            json!({
                "definition_id": definition.id,
                "definition_name": definition.name,
                "response_due_at": instance.response_due_at,
                "resolution_due_at": instance.resolution_due_at,
            }),
        )
        .await?;

        self.event_bus.publish(SystemEvent::SlaInstanceCreated {
            instance_id: instance.id.clone(),
            workspace_id: workspace_id.to_string(),
            target_type: target_type.to_string(),
            target_id: target_id.to_string(),
            definition_id: definition.id.clone(),
            timestamp: now.to_rfc3339(),
        });

        info!(
            instance_id = %instance.id,
            definition = %definition.name,
            target_id = %target_id,
            "Applied SLA to target"
        );
        Ok(Some(instance))
    }

    /// Record the first response on a target. A no-op when no instance is
    /// pending response (duplicate responses, untracked targets).
    pub async fn record_response(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        let Some(instance) = self
            .repository
            .find_pending_response_instance(target_type, target_id)
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now();
        let status = self.phase_outcome(&instance, SlaPhase::Response, now).await?;
        self.repository
            .mark_response(&instance.id, status, Some(&now.to_rfc3339()))
            .await?;
        self.append_event(
            &instance.id,
            SlaEventType::ResponseRecorded,
            json!({
                "outcome": status.to_string(),
                "responded_at": now.to_rfc3339(),
                "due_at": instance.response_due_at,
            }),
        )
        .await?;

        info!(
            instance_id = %instance.id,
            target_id = %target_id,
            outcome = %status,
            "Recorded first response"
        );
        self.get_instance(&instance.id).await.map(Some)
    }

    /// Record resolution of a target. A no-op when no instance is pending
    /// resolution.
    pub async fn record_resolution(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        let Some(instance) = self
            .repository
            .find_pending_resolution_instance(target_type, target_id)
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now();
        let status = self
            .phase_outcome(&instance, SlaPhase::Resolution, now)
            .await?;
        self.repository
            .mark_resolution(&instance.id, status, Some(&now.to_rfc3339()))
            .await?;
        self.append_event(
            &instance.id,
            SlaEventType::Resolved,
            json!({
                "outcome": status.to_string(),
                "resolved_at": now.to_rfc3339(),
                "due_at": instance.resolution_due_at,
            }),
        )
        .await?;

        info!(
            instance_id = %instance.id,
            target_id = %target_id,
            outcome = %status,
            "Recorded resolution"
        );
        self.get_instance(&instance.id).await.map(Some)
    }

    /// Pause the SLA clock. Pausing an already-paused instance is a no-op.
    pub async fn pause_sla(&self, instance_id: &str, reason: &str) -> ServiceResult<SlaInstance> {
        let instance = self.get_instance(instance_id).await?;
        if instance.is_paused {
            return Ok(instance);
        }

        let now = Utc::now().to_rfc3339();
        self.repository.set_paused(instance_id, &now).await?;
        self.append_event(
            instance_id,
            SlaEventType::Paused,
            json!({ "reason": reason, "paused_at": now }),
        )
        .await?;

        info!(instance_id = %instance_id, reason = %reason, "Paused SLA clock");
        self.get_instance(instance_id).await
    }

    /// Resume the SLA clock, crediting the paused interval back as whole
    /// minutes. Resuming a running instance is a no-op.
    pub async fn resume_sla(&self, instance_id: &str) -> ServiceResult<SlaInstance> {
        let instance = self.get_instance(instance_id).await?;
        if !instance.is_paused {
            return Ok(instance);
        }

        let now = Utc::now();
        let paused_minutes = match &instance.paused_at {
            Some(paused_at) => (now - parse_rfc3339(paused_at)?).num_minutes().max(0),
            None => 0,
        };
        let total_paused_minutes = instance.total_paused_minutes + paused_minutes;
        self.repository
            .set_resumed(instance_id, total_paused_minutes)
            .await?;
        self.append_event(
            instance_id,
            SlaEventType::Resumed,
            json!({
                "paused_minutes": paused_minutes,
                "total_paused_minutes": total_paused_minutes,
            }),
        )
        .await?;

        info!(
            instance_id = %instance_id,
            paused_minutes = paused_minutes,
            "Resumed SLA clock"
        );
        self.get_instance(instance_id).await
    }

    // ========================================
    // Target lifecycle entry points
    // ========================================

    /// Intake hook for a newly created target.
    pub async fn on_target_created(
        &self,
        workspace_id: &str,
        target_type: &str,
        target_id: &str,
        context: &HashMap<String, String>,
    ) -> ServiceResult<Option<SlaInstance>> {
        self.create_instance(workspace_id, target_type, target_id, context)
            .await
    }

    /// Intake hook for the first response on a target.
    pub async fn on_first_response(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        self.record_response(target_type, target_id).await
    }

    /// Intake hook for target resolution.
    pub async fn on_resolved(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        self.record_resolution(target_type, target_id).await
    }

    pub async fn get_instance(&self, instance_id: &str) -> ServiceResult<SlaInstance> {
        self.repository
            .get_instance(instance_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("SLA instance not found: {}", instance_id))
            })
    }

    pub async fn get_events(&self, instance_id: &str) -> ServiceResult<Vec<SlaEvent>> {
        self.repository.list_events(instance_id).await
    }

    // ========================================
    // Status and aggregation
    // ========================================

    /// Live status for a target: the stored instance plus countdown snapshots
    /// for whichever phases are still pending.
    pub async fn get_status(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaStatusInfo>> {
        let Some(instance) = self
            .repository
            .find_instance_by_target(target_type, target_id)
            .await?
        else {
            return Ok(None);
        };
        let definition = self.get_definition(&instance.sla_definition_id).await?;

        let now = Utc::now();
        let response = self.phase_snapshot(&instance, &definition, SlaPhase::Response, now)?;
        let resolution = self.phase_snapshot(&instance, &definition, SlaPhase::Resolution, now)?;

        Ok(Some(SlaStatusInfo {
            instance,
            definition_name: definition.name,
            response,
            resolution,
        }))
    }

    /// Workspace rollup over resolution outcomes, with `at_risk` counting
    /// pending instances already past their definition's warning threshold.
    pub async fn get_dashboard(&self, workspace_id: &str) -> ServiceResult<SlaDashboard> {
        let instances = self
            .repository
            .list_instances_by_workspace(workspace_id)
            .await?;
        let now = Utc::now();
        let mut definitions: HashMap<String, SlaDefinition> = HashMap::new();
        let mut dashboard = SlaDashboard::default();

        for instance in &instances {
            dashboard.total += 1;
            match instance.resolution_status {
                PhaseStatus::Pending => dashboard.pending += 1,
                PhaseStatus::Met => dashboard.met += 1,
                PhaseStatus::Breached => dashboard.breached += 1,
            }
            // at_risk is a refinement of pending, so it must count over the
            // same partition the pending bucket uses.
            if instance.resolution_status != PhaseStatus::Pending {
                continue;
            }

            let definition = match definitions.get(&instance.sla_definition_id) {
                Some(def) => def.clone(),
                None => {
                    let def = self.get_definition(&instance.sla_definition_id).await?;
                    definitions.insert(instance.sla_definition_id.clone(), def.clone());
                    def
                }
            };

            let mut max_used = 0f64;
            for phase in [SlaPhase::Response, SlaPhase::Resolution] {
                if let Some(snapshot) = self.phase_snapshot(instance, &definition, phase, now)? {
                    max_used = max_used.max(snapshot.used_percent);
                }
            }
            if max_used >= definition.warning_threshold {
                dashboard.at_risk += 1;
            }
        }

        Ok(dashboard)
    }

    // ========================================
    // Periodic ticks
    // ========================================

    /// Read-only broadcast of live countdowns, batched per workspace.
    /// Delivery failures are logged and never propagated.
    pub async fn broadcast_countdowns(&self) -> ServiceResult<()> {
        let instances = self.repository.list_pending_instances().await?;
        if instances.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut definitions: HashMap<String, SlaDefinition> = HashMap::new();
        let mut batches: HashMap<String, Vec<CountdownUpdate>> = HashMap::new();

        for instance in &instances {
            let definition = match definitions.get(&instance.sla_definition_id) {
                Some(def) => def.clone(),
                None => match self.repository.get_definition(&instance.sla_definition_id).await {
                    Ok(Some(def)) => {
                        definitions.insert(instance.sla_definition_id.clone(), def.clone());
                        def
                    }
                    Ok(None) => {
                        warn!(
                            instance_id = %instance.id,
                            definition_id = %instance.sla_definition_id,
                            "Instance references missing SLA definition, skipping"
                        );
                        continue;
                    }
                    Err(e) => {
                        error!(instance_id = %instance.id, error = %e, "Failed to load SLA definition");
                        continue;
                    }
                },
            };

            for phase in [SlaPhase::Response, SlaPhase::Resolution] {
                match self.phase_snapshot(instance, &definition, phase, now) {
                    Ok(Some(snapshot)) => {
                        batches
                            .entry(instance.workspace_id.clone())
                            .or_default()
                            .push(CountdownUpdate {
                                instance_id: instance.id.clone(),
                                target_type: instance.target_type.clone(),
                                target_id: instance.target_id.clone(),
                                phase,
                                remaining_minutes: snapshot.remaining_minutes,
                                used_percent: snapshot.used_percent,
                                remaining_display: snapshot.remaining_display,
                            });
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!(instance_id = %instance.id, error = %e, "Failed to compute countdown");
                    }
                }
            }
        }

        for (workspace_id, updates) in &batches {
            if let Err(e) = self
                .notifier
                .emit_workspace_batch_update(workspace_id, updates)
                .await
            {
                error!(workspace_id = %workspace_id, error = %e, "Failed to broadcast SLA countdowns");
            }
        }

        Ok(())
    }

    /// Sweep all running instances for breaches and escalation thresholds.
    /// Per-instance failures are logged and the sweep continues; paused
    /// instances are excluded entirely.
    pub async fn check_violations(&self) -> ServiceResult<()> {
        let instances = self.repository.list_unpaused_pending_instances().await?;
        if instances.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut definitions: HashMap<String, SlaDefinition> = HashMap::new();

        for instance in instances {
            let definition = match definitions.get(&instance.sla_definition_id) {
                Some(def) => def.clone(),
                None => match self.repository.get_definition(&instance.sla_definition_id).await {
                    Ok(Some(def)) => {
                        definitions.insert(instance.sla_definition_id.clone(), def.clone());
                        def
                    }
                    Ok(None) => {
                        warn!(
                            instance_id = %instance.id,
                            definition_id = %instance.sla_definition_id,
                            "Instance references missing SLA definition, skipping"
                        );
                        continue;
                    }
                    Err(e) => {
                        error!(instance_id = %instance.id, error = %e, "Failed to load SLA definition");
                        continue;
                    }
                },
            };

            if let Err(e) = self.check_instance(&instance, &definition, now).await {
                error!(
                    instance_id = %instance.id,
                    error = %e,
                    "Failed to evaluate SLA instance"
                );
            }
        }

        Ok(())
    }

    async fn check_instance(
        &self,
        instance: &SlaInstance,
        definition: &SlaDefinition,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        // Shared per-instance watermark: a rung fired for either phase never
        // fires again for the other.
        let mut escalation_level = instance.current_escalation_level;

        for phase in [SlaPhase::Response, SlaPhase::Resolution] {
            let (status, due_at) = match phase {
                SlaPhase::Response => (instance.response_status, &instance.response_due_at),
                SlaPhase::Resolution => (instance.resolution_status, &instance.resolution_due_at),
            };
            if status != PhaseStatus::Pending {
                continue;
            }
            let Some(due_at) = due_at else {
                continue;
            };
            let deadline = parse_rfc3339(due_at)?;
            let remaining = calendar::calculate_remaining_minutes(
                deadline,
                now,
                &definition.business_hours,
                definition.business_hours_only,
                instance.total_paused_minutes,
            );

            if remaining <= 0 {
                self.handle_breach(instance, definition, phase, due_at, now)
                    .await?;
                continue;
            }

            let used = calendar::calculate_used_percent(
                parse_rfc3339(&instance.created_at)?,
                deadline,
                now,
                &definition.business_hours,
                definition.business_hours_only,
                instance.total_paused_minutes,
            );
            if used < definition.warning_threshold {
                continue;
            }

            let rule = definition
                .escalation_rules
                .iter()
                .filter(|rule| rule.threshold <= used && rule.threshold > escalation_level)
                .max_by(|a, b| a.threshold.total_cmp(&b.threshold));
            if let Some(rule) = rule {
                escalation_level = rule.threshold;
                self.handle_warning(instance, definition, phase, rule.clone(), remaining, used, now)
                    .await?;
            }
        }

        Ok(())
    }

    async fn handle_breach(
        &self,
        instance: &SlaInstance,
        definition: &SlaDefinition,
        phase: SlaPhase,
        due_at: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        // Persist the terminal state first so a notification failure cannot
        // re-trigger the breach on the next sweep.
        match phase {
            SlaPhase::Response => {
                self.repository
                    .mark_response(&instance.id, PhaseStatus::Breached, None)
                    .await?
            }
            SlaPhase::Resolution => {
                self.repository
                    .mark_resolution(&instance.id, PhaseStatus::Breached, None)
                    .await?
            }
        }
        self.append_event(
            &instance.id,
            SlaEventType::Breached,
            json!({
                "phase": phase.to_string(),
                "due_at": due_at,
                "detected_at": now.to_rfc3339(),
            }),
        )
        .await?;

        warn!(
            instance_id = %instance.id,
            target_id = %instance.target_id,
            phase = %phase,
            due_at = %due_at,
            "SLA breached"
        );

        self.event_bus.publish(SystemEvent::SlaBreached {
            instance_id: instance.id.clone(),
            workspace_id: instance.workspace_id.clone(),
            target_id: instance.target_id.clone(),
            phase: phase.to_string(),
            deadline_at: due_at.to_string(),
            timestamp: now.to_rfc3339(),
        });

        if let Err(e) = self
            .notifier
            .emit_workspace_event(
                &instance.workspace_id,
                "sla:breached",
                json!({
                    "instance_id": instance.id,
                    "target_type": instance.target_type,
                    "target_id": instance.target_id,
                    "phase": phase.to_string(),
                    "due_at": due_at,
                }),
            )
            .await
        {
            error!(instance_id = %instance.id, error = %e, "Failed to emit breach event");
        }

        match self
            .directory
            .resolve_assignee(&instance.target_type, &instance.target_id)
            .await
        {
            Ok(Some(assignee)) => {
                if let Err(e) = self
                    .notifier
                    .send_breach_email(&assignee, &instance.target_id, &definition.name, phase)
                    .await
                {
                    error!(instance_id = %instance.id, error = %e, "Failed to send breach email");
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!(instance_id = %instance.id, error = %e, "Failed to resolve assignee");
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_warning(
        &self,
        instance: &SlaInstance,
        definition: &SlaDefinition,
        phase: SlaPhase,
        rule: crate::models::EscalationRule,
        remaining_minutes: i64,
        used_percent: f64,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        self.repository
            .set_escalation_level(&instance.id, rule.threshold, &now.to_rfc3339())
            .await?;
        self.append_event(
            &instance.id,
            SlaEventType::WarningSent,
            json!({
                "phase": phase.to_string(),
                "threshold": rule.threshold,
                "used_percent": used_percent,
                "remaining_minutes": remaining_minutes,
            }),
        )
        .await?;

        warn!(
            instance_id = %instance.id,
            target_id = %instance.target_id,
            phase = %phase,
            threshold = rule.threshold,
            used_percent = used_percent,
            "SLA warning threshold crossed"
        );

        self.event_bus.publish(SystemEvent::SlaWarning {
            instance_id: instance.id.clone(),
            workspace_id: instance.workspace_id.clone(),
            target_id: instance.target_id.clone(),
            phase: phase.to_string(),
            threshold: rule.threshold,
            used_percent,
            timestamp: now.to_rfc3339(),
        });

        if let Err(e) = self
            .notifier
            .emit_workspace_event(
                &instance.workspace_id,
                "sla:warning",
                json!({
                    "instance_id": instance.id,
                    "target_type": instance.target_type,
                    "target_id": instance.target_id,
                    "phase": phase.to_string(),
                    "threshold": rule.threshold,
                    "used_percent": used_percent,
                    "remaining_minutes": remaining_minutes,
                }),
            )
            .await
        {
            error!(instance_id = %instance.id, error = %e, "Failed to emit warning event");
        }

        if rule.notify_assignee {
            match self
                .directory
                .resolve_assignee(&instance.target_type, &instance.target_id)
                .await
            {
                Ok(Some(assignee)) => {
                    if let Err(e) = self
                        .notifier
                        .send_warning_email(
                            &assignee,
                            &instance.target_id,
                            &definition.name,
                            phase,
                            remaining_minutes,
                            used_percent,
                        )
                        .await
                    {
                        error!(instance_id = %instance.id, error = %e, "Failed to send warning email");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!(instance_id = %instance.id, error = %e, "Failed to resolve assignee");
                }
            }
        }
        for email in &rule.notify_emails {
            let recipient = Assignee {
                email: email.clone(),
                name: email.clone(),
            };
            if let Err(e) = self
                .notifier
                .send_warning_email(
                    &recipient,
                    &instance.target_id,
                    &definition.name,
                    phase,
                    remaining_minutes,
                    used_percent,
                )
                .await
            {
                error!(instance_id = %instance.id, recipient = %email, error = %e, "Failed to send warning email");
            }
        }

        Ok(())
    }

    // ========================================
    // Helpers
    // ========================================

    /// Countdown snapshot for one phase, `None` when that phase is not
    /// pending or has no deadline.
    fn phase_snapshot(
        &self,
        instance: &SlaInstance,
        definition: &SlaDefinition,
        phase: SlaPhase,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<PhaseSnapshot>> {
        let (status, due_at) = match phase {
            SlaPhase::Response => (instance.response_status, &instance.response_due_at),
            SlaPhase::Resolution => (instance.resolution_status, &instance.resolution_due_at),
        };
        if status != PhaseStatus::Pending {
            return Ok(None);
        }
        let Some(due_at) = due_at else {
            return Ok(None);
        };

        let deadline = parse_rfc3339(due_at)?;
        let remaining_minutes = calendar::calculate_remaining_minutes(
            deadline,
            now,
            &definition.business_hours,
            definition.business_hours_only,
            instance.total_paused_minutes,
        );
        let used_percent = calendar::calculate_used_percent(
            parse_rfc3339(&instance.created_at)?,
            deadline,
            now,
            &definition.business_hours,
            definition.business_hours_only,
            instance.total_paused_minutes,
        );

        Ok(Some(PhaseSnapshot {
            phase,
            due_at: due_at.clone(),
            remaining_minutes,
            used_percent,
            remaining_display: calendar::format_duration(remaining_minutes),
        }))
    }

    /// Met or breached, judged at `now` against the phase deadline with
    /// paused time credited back.
    async fn phase_outcome(
        &self,
        instance: &SlaInstance,
        phase: SlaPhase,
        now: DateTime<Utc>,
    ) -> ServiceResult<PhaseStatus> {
        let due_at = match phase {
            SlaPhase::Response => &instance.response_due_at,
            SlaPhase::Resolution => &instance.resolution_due_at,
        };
        let Some(due_at) = due_at else {
            return Ok(PhaseStatus::Met);
        };
        let definition = self.get_definition(&instance.sla_definition_id).await?;
        let remaining = calendar::calculate_remaining_minutes(
            parse_rfc3339(due_at)?,
            now,
            &definition.business_hours,
            definition.business_hours_only,
            instance.total_paused_minutes,
        );
        Ok(if remaining >= 0 {
            PhaseStatus::Met
        } else {
            PhaseStatus::Breached
        })
    }

    async fn append_event(
        &self,
        instance_id: &str,
        event_type: SlaEventType,
        event_data: serde_json::Value,
    ) -> ServiceResult<()> {
        let event = SlaEvent::new(instance_id.to_string(), event_type, event_data);
        self.repository.append_event(&event).await
    }
}
