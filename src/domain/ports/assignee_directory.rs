use crate::domain::ports::notifier::Assignee;
use crate::error::ServiceResult;

/// Target metadata lookup used for email notifications.
///
/// Returning `None` suppresses the email but not the workspace broadcast or
/// the audit event.
#[async_trait::async_trait]
pub trait AssigneeDirectory: Send + Sync {
    async fn resolve_assignee(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> ServiceResult<Option<Assignee>>;
}
