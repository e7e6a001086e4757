use crate::models::business_hours::BusinessHours;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A required value for one condition key.
///
/// `OneOf` matches when the context value is a member of the set (OR
/// semantics); `Scalar` requires exact equality. An empty scalar or empty set
/// is a wildcard and always matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Scalar(String),
    OneOf(Vec<String>),
}

impl ConditionValue {
    pub fn is_wildcard(&self) -> bool {
        match self {
            ConditionValue::Scalar(s) => s.is_empty(),
            ConditionValue::OneOf(values) => values.is_empty(),
        }
    }
}

/// One rung of an escalation policy. Rungs fire at most once per instance,
/// in increasing threshold order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRule {
    pub threshold: f64, // percent of SLA consumed
    #[serde(default)]
    pub notify_assignee: bool,
    #[serde(default)]
    pub notify_emails: Vec<String>,
}

/// Declarative SLA configuration for one workspace: which targets it applies
/// to, the time commitments, and the escalation policy.
///
/// Definitions are immutable once referenced by instances: updating one only
/// affects the matching of future instances, never already-computed deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaDefinition {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub applies_to: String, // target-type tag, e.g. "entity", "task", "process"
    pub conditions: HashMap<String, ConditionValue>,
    pub response_time: Option<i64>,   // minutes
    pub resolution_time: Option<i64>, // minutes
    pub warning_threshold: f64,       // percent, default 80
    pub business_hours_only: bool,
    pub business_hours: BusinessHours,
    pub escalation_rules: Vec<EscalationRule>,
    pub priority: i64, // higher wins ties during matching
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub const DEFAULT_WARNING_THRESHOLD: f64 = 80.0;

impl SlaDefinition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        workspace_id: String,
        name: String,
        applies_to: String,
        conditions: HashMap<String, ConditionValue>,
        response_time: Option<i64>,
        resolution_time: Option<i64>,
        business_hours_only: bool,
        business_hours: BusinessHours,
        escalation_rules: Vec<EscalationRule>,
        priority: i64,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workspace_id,
            name,
            applies_to,
            conditions,
            response_time,
            resolution_time,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            business_hours_only,
            business_hours,
            escalation_rules,
            priority,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn with_warning_threshold(mut self, threshold: f64) -> Self {
        self.warning_threshold = threshold;
        self
    }

    /// Validate durations, threshold, and the business-hours window.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Definition name must not be empty".to_string());
        }
        if self.response_time.is_none() && self.resolution_time.is_none() {
            return Err("Definition must set at least one of response/resolution time".to_string());
        }
        if let Some(minutes) = self.response_time {
            if minutes <= 0 {
                return Err("response_time must be greater than 0".to_string());
            }
        }
        if let Some(minutes) = self.resolution_time {
            if minutes <= 0 {
                return Err("resolution_time must be greater than 0".to_string());
            }
        }
        if !(0.0..=100.0).contains(&self.warning_threshold) {
            return Err(format!(
                "warning_threshold must be within 0-100, got {}",
                self.warning_threshold
            ));
        }
        for rule in &self.escalation_rules {
            if !(0.0..=100.0).contains(&rule.threshold) {
                return Err(format!(
                    "escalation threshold must be within 0-100, got {}",
                    rule.threshold
                ));
            }
        }
        self.business_hours.validate(self.business_hours_only)
    }
}
