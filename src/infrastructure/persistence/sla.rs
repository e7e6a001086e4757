use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::Database;
use crate::models::{PhaseStatus, SlaDefinition, SlaEvent, SlaInstance};
use sqlx::any::AnyRow;
use sqlx::Row;

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

fn map_definition_row(row: &AnyRow) -> ServiceResult<SlaDefinition> {
    let conditions_json: String = row.try_get("conditions")?;
    let business_hours_json: String = row.try_get("business_hours")?;
    let escalation_rules_json: String = row.try_get("escalation_rules")?;

    Ok(SlaDefinition {
        id: row.try_get("id")?,
        workspace_id: row.try_get("workspace_id")?,
        name: row.try_get("name")?,
        applies_to: row.try_get("applies_to")?,
        conditions: serde_json::from_str(&conditions_json)
            .map_err(|e| ServiceError::Internal(format!("Invalid conditions JSON: {}", e)))?,
        response_time: row
            .try_get::<Option<i64>, _>("response_time")
            .or_else(|_| Ok::<_, sqlx::Error>(None))?,
        resolution_time: row
            .try_get::<Option<i64>, _>("resolution_time")
            .or_else(|_| Ok::<_, sqlx::Error>(None))?,
        warning_threshold: row.try_get("warning_threshold")?,
        business_hours_only: row.try_get::<i64, _>("business_hours_only")? != 0,
        business_hours: serde_json::from_str(&business_hours_json)
            .map_err(|e| ServiceError::Internal(format!("Invalid business hours JSON: {}", e)))?,
        escalation_rules: serde_json::from_str(&escalation_rules_json)
            .map_err(|e| ServiceError::Internal(format!("Invalid escalation rules JSON: {}", e)))?,
        priority: row.try_get("priority")?,
        is_active: row.try_get::<i64, _>("is_active")? != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_instance_row(row: &AnyRow) -> ServiceResult<SlaInstance> {
    let response_status: String = row.try_get("response_status")?;
    let resolution_status: String = row.try_get("resolution_status")?;

    Ok(SlaInstance {
        id: row.try_get("id")?,
        sla_definition_id: row.try_get("sla_definition_id")?,
        workspace_id: row.try_get("workspace_id")?,
        target_type: row.try_get("target_type")?,
        target_id: row.try_get("target_id")?,
        // For nullable columns, try_get may fail with NULL values in the sqlx
        // Any driver; fall back to None.
        response_due_at: row
            .try_get::<Option<String>, _>("response_due_at")
            .or_else(|_| Ok::<_, sqlx::Error>(None))?,
        resolution_due_at: row
            .try_get::<Option<String>, _>("resolution_due_at")
            .or_else(|_| Ok::<_, sqlx::Error>(None))?,
        response_status: response_status
            .parse()
            .map_err(|e: String| ServiceError::Internal(format!("Invalid response_status: {}", e)))?,
        resolution_status: resolution_status.parse().map_err(|e: String| {
            ServiceError::Internal(format!("Invalid resolution_status: {}", e))
        })?,
        first_response_at: row
            .try_get::<Option<String>, _>("first_response_at")
            .or_else(|_| Ok::<_, sqlx::Error>(None))?,
        resolved_at: row
            .try_get::<Option<String>, _>("resolved_at")
            .or_else(|_| Ok::<_, sqlx::Error>(None))?,
        is_paused: row.try_get::<i64, _>("is_paused")? != 0,
        paused_at: row
            .try_get::<Option<String>, _>("paused_at")
            .or_else(|_| Ok::<_, sqlx::Error>(None))?,
        total_paused_minutes: row.try_get("total_paused_minutes")?,
        current_escalation_level: row.try_get("current_escalation_level")?,
        last_escalation_at: row
            .try_get::<Option<String>, _>("last_escalation_at")
            .or_else(|_| Ok::<_, sqlx::Error>(None))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_event_row(row: &AnyRow) -> ServiceResult<SlaEvent> {
    let event_type: String = row.try_get("event_type")?;
    let event_data: String = row.try_get("event_data")?;

    Ok(SlaEvent {
        id: row.try_get("id")?,
        sla_instance_id: row.try_get("sla_instance_id")?,
        event_type: event_type
            .parse()
            .map_err(|e: String| ServiceError::Internal(format!("Invalid event_type: {}", e)))?,
        event_data: serde_json::from_str(&event_data)
            .map_err(|e| ServiceError::Internal(format!("Invalid event_data JSON: {}", e)))?,
        created_at: row.try_get("created_at")?,
    })
}

const DEFINITION_COLUMNS: &str = "id, workspace_id, name, applies_to, conditions, response_time, \
     resolution_time, warning_threshold, business_hours_only, business_hours, escalation_rules, \
     priority, is_active, created_at, updated_at";

const INSTANCE_COLUMNS: &str = "id, sla_definition_id, workspace_id, target_type, target_id, \
     response_due_at, resolution_due_at, response_status, resolution_status, first_response_at, \
     resolved_at, is_paused, paused_at, total_paused_minutes, current_escalation_level, \
     last_escalation_at, created_at, updated_at";

impl Database {
    // ========================================
    // SLA Definition Operations
    // ========================================

    pub async fn create_sla_definition(&self, definition: &SlaDefinition) -> ServiceResult<()> {
        let conditions = serde_json::to_string(&definition.conditions)
            .map_err(|e| ServiceError::Internal(format!("Failed to encode conditions: {}", e)))?;
        let business_hours = serde_json::to_string(&definition.business_hours).map_err(|e| {
            ServiceError::Internal(format!("Failed to encode business hours: {}", e))
        })?;
        let escalation_rules =
            serde_json::to_string(&definition.escalation_rules).map_err(|e| {
                ServiceError::Internal(format!("Failed to encode escalation rules: {}", e))
            })?;

        sqlx::query(
            "INSERT INTO sla_definitions (id, workspace_id, name, applies_to, conditions, \
             response_time, resolution_time, warning_threshold, business_hours_only, \
             business_hours, escalation_rules, priority, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&definition.id)
        .bind(&definition.workspace_id)
        .bind(&definition.name)
        .bind(&definition.applies_to)
        .bind(conditions)
        .bind(definition.response_time)
        .bind(definition.resolution_time)
        .bind(definition.warning_threshold)
        .bind(definition.business_hours_only as i64)
        .bind(business_hours)
        .bind(escalation_rules)
        .bind(definition.priority)
        .bind(definition.is_active as i64)
        .bind(&definition.created_at)
        .bind(&definition.updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_sla_definition(&self, id: &str) -> ServiceResult<Option<SlaDefinition>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sla_definitions WHERE id = ?",
            DEFINITION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_definition_row).transpose()
    }

    pub async fn list_sla_definitions(
        &self,
        workspace_id: &str,
    ) -> ServiceResult<Vec<SlaDefinition>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sla_definitions WHERE workspace_id = ? ORDER BY priority DESC, created_at ASC",
            DEFINITION_COLUMNS
        ))
        .bind(workspace_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(map_definition_row).collect()
    }

    pub async fn find_active_sla_definitions(
        &self,
        workspace_id: &str,
        applies_to: &str,
    ) -> ServiceResult<Vec<SlaDefinition>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sla_definitions
             WHERE workspace_id = ? AND applies_to = ? AND is_active = 1
             ORDER BY priority DESC, created_at ASC",
            DEFINITION_COLUMNS
        ))
        .bind(workspace_id)
        .bind(applies_to)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(map_definition_row).collect()
    }

    pub async fn update_sla_definition(&self, definition: &SlaDefinition) -> ServiceResult<()> {
        let conditions = serde_json::to_string(&definition.conditions)
            .map_err(|e| ServiceError::Internal(format!("Failed to encode conditions: {}", e)))?;
        let business_hours = serde_json::to_string(&definition.business_hours).map_err(|e| {
            ServiceError::Internal(format!("Failed to encode business hours: {}", e))
        })?;
        let escalation_rules =
            serde_json::to_string(&definition.escalation_rules).map_err(|e| {
                ServiceError::Internal(format!("Failed to encode escalation rules: {}", e))
            })?;

        let result = sqlx::query(
            "UPDATE sla_definitions SET name = ?, applies_to = ?, conditions = ?, \
             response_time = ?, resolution_time = ?, warning_threshold = ?, \
             business_hours_only = ?, business_hours = ?, escalation_rules = ?, priority = ?, \
             is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&definition.name)
        .bind(&definition.applies_to)
        .bind(conditions)
        .bind(definition.response_time)
        .bind(definition.resolution_time)
        .bind(definition.warning_threshold)
        .bind(definition.business_hours_only as i64)
        .bind(business_hours)
        .bind(escalation_rules)
        .bind(definition.priority)
        .bind(definition.is_active as i64)
        .bind(now_rfc3339())
        .bind(&definition.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!(
                "SLA definition not found: {}",
                definition.id
            )));
        }

        Ok(())
    }

    pub async fn delete_sla_definition(&self, id: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM sla_definitions WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!(
                "SLA definition not found: {}",
                id
            )));
        }

        Ok(())
    }

    // ========================================
    // SLA Instance Operations
    // ========================================

    pub async fn create_sla_instance(&self, instance: &SlaInstance) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO sla_instances (id, sla_definition_id, workspace_id, target_type, \
             target_id, response_due_at, resolution_due_at, response_status, resolution_status, \
             first_response_at, resolved_at, is_paused, paused_at, total_paused_minutes, \
             current_escalation_level, last_escalation_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&instance.id)
        .bind(&instance.sla_definition_id)
        .bind(&instance.workspace_id)
        .bind(&instance.target_type)
        .bind(&instance.target_id)
        .bind(&instance.response_due_at)
        .bind(&instance.resolution_due_at)
        .bind(instance.response_status.to_string())
        .bind(instance.resolution_status.to_string())
        .bind(&instance.first_response_at)
        .bind(&instance.resolved_at)
        .bind(instance.is_paused as i64)
        .bind(&instance.paused_at)
        .bind(instance.total_paused_minutes)
        .bind(instance.current_escalation_level)
        .bind(&instance.last_escalation_at)
        .bind(&instance.created_at)
        .bind(&instance.updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_sla_instance(&self, id: &str) -> ServiceResult<Option<SlaInstance>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sla_instances WHERE id = ?",
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_instance_row).transpose()
    }

    pub async fn find_sla_instance_by_target(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sla_instances WHERE target_type = ? AND target_id = ?
             ORDER BY created_at DESC LIMIT 1",
            INSTANCE_COLUMNS
        ))
        .bind(target_type)
        .bind(target_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_instance_row).transpose()
    }

    pub async fn find_pending_response_sla_instance(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sla_instances
             WHERE target_type = ? AND target_id = ? AND response_status = 'pending'
             LIMIT 1",
            INSTANCE_COLUMNS
        ))
        .bind(target_type)
        .bind(target_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_instance_row).transpose()
    }

    pub async fn find_pending_resolution_sla_instance(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sla_instances
             WHERE target_type = ? AND target_id = ? AND resolution_status = 'pending'
             LIMIT 1",
            INSTANCE_COLUMNS
        ))
        .bind(target_type)
        .bind(target_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(map_instance_row).transpose()
    }

    pub async fn list_pending_sla_instances(&self) -> ServiceResult<Vec<SlaInstance>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sla_instances
             WHERE response_status = 'pending' OR resolution_status = 'pending'
             ORDER BY created_at ASC",
            INSTANCE_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(map_instance_row).collect()
    }

    pub async fn list_unpaused_pending_sla_instances(&self) -> ServiceResult<Vec<SlaInstance>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sla_instances
             WHERE is_paused = 0 AND (response_status = 'pending' OR resolution_status = 'pending')
             ORDER BY created_at ASC",
            INSTANCE_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(map_instance_row).collect()
    }

    pub async fn list_sla_instances_by_workspace(
        &self,
        workspace_id: &str,
    ) -> ServiceResult<Vec<SlaInstance>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sla_instances WHERE workspace_id = ? ORDER BY created_at ASC",
            INSTANCE_COLUMNS
        ))
        .bind(workspace_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(map_instance_row).collect()
    }

    pub async fn mark_sla_response(
        &self,
        instance_id: &str,
        status: PhaseStatus,
        first_response_at: Option<&str>,
    ) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE sla_instances SET response_status = ?, first_response_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(first_response_at)
        .bind(now_rfc3339())
        .bind(instance_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn mark_sla_resolution(
        &self,
        instance_id: &str,
        status: PhaseStatus,
        resolved_at: Option<&str>,
    ) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE sla_instances SET resolution_status = ?, resolved_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(resolved_at)
        .bind(now_rfc3339())
        .bind(instance_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn set_sla_paused(&self, instance_id: &str, paused_at: &str) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE sla_instances SET is_paused = 1, paused_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(paused_at)
        .bind(now_rfc3339())
        .bind(instance_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn set_sla_resumed(
        &self,
        instance_id: &str,
        total_paused_minutes: i64,
    ) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE sla_instances SET is_paused = 0, paused_at = NULL, total_paused_minutes = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(total_paused_minutes)
        .bind(now_rfc3339())
        .bind(instance_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn set_sla_escalation_level(
        &self,
        instance_id: &str,
        level: f64,
        escalated_at: &str,
    ) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE sla_instances SET current_escalation_level = ?, last_escalation_at = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(level)
        .bind(escalated_at)
        .bind(now_rfc3339())
        .bind(instance_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    // ========================================
    // SLA Event Operations
    // ========================================

    pub async fn append_sla_event(&self, event: &SlaEvent) -> ServiceResult<()> {
        let event_data = serde_json::to_string(&event.event_data)
            .map_err(|e| ServiceError::Internal(format!("Failed to encode event data: {}", e)))?;

        sqlx::query(
            "INSERT INTO sla_events (id, sla_instance_id, event_type, event_data, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&event.id)
        .bind(&event.sla_instance_id)
        .bind(event.event_type.to_string())
        .bind(event_data)
        .bind(&event.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn list_sla_events(&self, sla_instance_id: &str) -> ServiceResult<Vec<SlaEvent>> {
        let rows = sqlx::query(
            "SELECT id, sla_instance_id, event_type, event_data, created_at
             FROM sla_events WHERE sla_instance_id = ? ORDER BY created_at ASC",
        )
        .bind(sla_instance_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(map_event_row).collect()
    }
}

// Implement SlaRepository trait for Database
#[async_trait::async_trait]
impl crate::domain::ports::SlaRepository for Database {
    async fn create_definition(&self, definition: &SlaDefinition) -> ServiceResult<()> {
        self.create_sla_definition(definition).await
    }

    async fn get_definition(&self, definition_id: &str) -> ServiceResult<Option<SlaDefinition>> {
        self.get_sla_definition(definition_id).await
    }

    async fn list_definitions(&self, workspace_id: &str) -> ServiceResult<Vec<SlaDefinition>> {
        self.list_sla_definitions(workspace_id).await
    }

    async fn find_active_definitions(
        &self,
        workspace_id: &str,
        applies_to: &str,
    ) -> ServiceResult<Vec<SlaDefinition>> {
        self.find_active_sla_definitions(workspace_id, applies_to).await
    }

    async fn update_definition(&self, definition: &SlaDefinition) -> ServiceResult<()> {
        self.update_sla_definition(definition).await
    }

    async fn delete_definition(&self, definition_id: &str) -> ServiceResult<()> {
        self.delete_sla_definition(definition_id).await
    }

    async fn create_instance(&self, instance: &SlaInstance) -> ServiceResult<()> {
        self.create_sla_instance(instance).await
    }

    async fn get_instance(&self, instance_id: &str) -> ServiceResult<Option<SlaInstance>> {
        self.get_sla_instance(instance_id).await
    }

    async fn find_instance_by_target(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        self.find_sla_instance_by_target(target_type, target_id).await
    }

    async fn find_pending_response_instance(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        self.find_pending_response_sla_instance(target_type, target_id)
            .await
    }

    async fn find_pending_resolution_instance(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>> {
        self.find_pending_resolution_sla_instance(target_type, target_id)
            .await
    }

    async fn list_pending_instances(&self) -> ServiceResult<Vec<SlaInstance>> {
        self.list_pending_sla_instances().await
    }

    async fn list_unpaused_pending_instances(&self) -> ServiceResult<Vec<SlaInstance>> {
        self.list_unpaused_pending_sla_instances().await
    }

    async fn list_instances_by_workspace(
        &self,
        workspace_id: &str,
    ) -> ServiceResult<Vec<SlaInstance>> {
        self.list_sla_instances_by_workspace(workspace_id).await
    }

    async fn mark_response(
        &self,
        instance_id: &str,
        status: PhaseStatus,
        first_response_at: Option<&str>,
    ) -> ServiceResult<()> {
        self.mark_sla_response(instance_id, status, first_response_at)
            .await
    }

    async fn mark_resolution(
        &self,
        instance_id: &str,
        status: PhaseStatus,
        resolved_at: Option<&str>,
    ) -> ServiceResult<()> {
        self.mark_sla_resolution(instance_id, status, resolved_at).await
    }

    async fn set_paused(&self, instance_id: &str, paused_at: &str) -> ServiceResult<()> {
        self.set_sla_paused(instance_id, paused_at).await
    }

    async fn set_resumed(&self, instance_id: &str, total_paused_minutes: i64) -> ServiceResult<()> {
        self.set_sla_resumed(instance_id, total_paused_minutes).await
    }

    async fn set_escalation_level(
        &self,
        instance_id: &str,
        level: f64,
        escalated_at: &str,
    ) -> ServiceResult<()> {
        self.set_sla_escalation_level(instance_id, level, escalated_at)
            .await
    }

    async fn append_event(&self, event: &SlaEvent) -> ServiceResult<()> {
        self.append_sla_event(event).await
    }

    async fn list_events(&self, sla_instance_id: &str) -> ServiceResult<Vec<SlaEvent>> {
        self.list_sla_events(sla_instance_id).await
    }
}
