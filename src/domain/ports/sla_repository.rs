use crate::error::ServiceResult;
use crate::models::{PhaseStatus, SlaDefinition, SlaEvent, SlaInstance};

/// Repository for SLA definitions, instances, and the append-only event log.
#[async_trait::async_trait]
pub trait SlaRepository: Send + Sync {
    // Definition operations
    async fn create_definition(&self, definition: &SlaDefinition) -> ServiceResult<()>;
    async fn get_definition(&self, definition_id: &str) -> ServiceResult<Option<SlaDefinition>>;
    async fn list_definitions(&self, workspace_id: &str) -> ServiceResult<Vec<SlaDefinition>>;
    /// Active definitions for one workspace/target-type, ordered by
    /// descending priority (matching order).
    async fn find_active_definitions(
        &self,
        workspace_id: &str,
        applies_to: &str,
    ) -> ServiceResult<Vec<SlaDefinition>>;
    async fn update_definition(&self, definition: &SlaDefinition) -> ServiceResult<()>;
    async fn delete_definition(&self, definition_id: &str) -> ServiceResult<()>;

    // Instance operations
    async fn create_instance(&self, instance: &SlaInstance) -> ServiceResult<()>;
    async fn get_instance(&self, instance_id: &str) -> ServiceResult<Option<SlaInstance>>;
    async fn find_instance_by_target(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>>;
    async fn find_pending_response_instance(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>>;
    async fn find_pending_resolution_instance(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<SlaInstance>>;
    /// Instances with any phase still pending (broadcast tick input).
    async fn list_pending_instances(&self) -> ServiceResult<Vec<SlaInstance>>;
    /// Non-paused instances with any phase still pending (violation tick input).
    async fn list_unpaused_pending_instances(&self) -> ServiceResult<Vec<SlaInstance>>;
    async fn list_instances_by_workspace(
        &self,
        workspace_id: &str,
    ) -> ServiceResult<Vec<SlaInstance>>;
    async fn mark_response(
        &self,
        instance_id: &str,
        status: PhaseStatus,
        first_response_at: Option<&str>,
    ) -> ServiceResult<()>;
    async fn mark_resolution(
        &self,
        instance_id: &str,
        status: PhaseStatus,
        resolved_at: Option<&str>,
    ) -> ServiceResult<()>;
    async fn set_paused(&self, instance_id: &str, paused_at: &str) -> ServiceResult<()>;
    async fn set_resumed(&self, instance_id: &str, total_paused_minutes: i64) -> ServiceResult<()>;
    async fn set_escalation_level(
        &self,
        instance_id: &str,
        level: f64,
        escalated_at: &str,
    ) -> ServiceResult<()>;

    // Event operations
    async fn append_event(&self, event: &SlaEvent) -> ServiceResult<()>;
    async fn list_events(&self, sla_instance_id: &str) -> ServiceResult<Vec<SlaEvent>>;
}
