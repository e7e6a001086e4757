use serde::{Deserialize, Serialize};

/// Status of one tracked phase (response or resolution).
///
/// Transitions pending -> met or pending -> breached exactly once; both
/// outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Pending,
    Met,
    Breached,
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseStatus::Pending => write!(f, "pending"),
            PhaseStatus::Met => write!(f, "met"),
            PhaseStatus::Breached => write!(f, "breached"),
        }
    }
}

impl std::str::FromStr for PhaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PhaseStatus::Pending),
            "met" => Ok(PhaseStatus::Met),
            "breached" => Ok(PhaseStatus::Breached),
            _ => Err(format!("Invalid phase status: {}", s)),
        }
    }
}

/// The two phases an instance can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlaPhase {
    Response,
    Resolution,
}

impl std::fmt::Display for SlaPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlaPhase::Response => write!(f, "response"),
            SlaPhase::Resolution => write!(f, "resolution"),
        }
    }
}

/// One tracked SLA commitment attached to a target.
///
/// Deadlines are computed once at creation and never shifted afterwards;
/// paused time is reconciled through `total_paused_minutes`, which consumers
/// add back when computing remaining/used time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaInstance {
    pub id: String,
    pub sla_definition_id: String,
    pub workspace_id: String,
    pub target_type: String,
    pub target_id: String,
    pub response_due_at: Option<String>,
    pub resolution_due_at: Option<String>,
    pub response_status: PhaseStatus,
    pub resolution_status: PhaseStatus,
    pub first_response_at: Option<String>,
    pub resolved_at: Option<String>,
    pub is_paused: bool,
    pub paused_at: Option<String>,
    pub total_paused_minutes: i64,
    pub current_escalation_level: f64, // highest threshold already fired
    pub last_escalation_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl SlaInstance {
    pub fn new(
        sla_definition_id: String,
        workspace_id: String,
        target_type: String,
        target_id: String,
        response_due_at: Option<String>,
        resolution_due_at: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        // An omitted phase starts met and is never tracked.
        let response_status = if response_due_at.is_some() {
            PhaseStatus::Pending
        } else {
            PhaseStatus::Met
        };
        let resolution_status = if resolution_due_at.is_some() {
            PhaseStatus::Pending
        } else {
            PhaseStatus::Met
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sla_definition_id,
            workspace_id,
            target_type,
            target_id,
            response_due_at,
            resolution_due_at,
            response_status,
            resolution_status,
            first_response_at: None,
            resolved_at: None,
            is_paused: false,
            paused_at: None,
            total_paused_minutes: 0,
            current_escalation_level: 0.0,
            last_escalation_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn has_pending_phase(&self) -> bool {
        self.response_status == PhaseStatus::Pending
            || self.resolution_status == PhaseStatus::Pending
    }
}

/// Live view of one pending phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSnapshot {
    pub phase: SlaPhase,
    pub due_at: String,
    pub remaining_minutes: i64,
    pub used_percent: f64,
    pub remaining_display: String,
}

/// Status report for one target, combining the stored instance with live
/// countdowns for whichever phases are still pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaStatusInfo {
    pub instance: SlaInstance,
    pub definition_name: String,
    pub response: Option<PhaseSnapshot>,
    pub resolution: Option<PhaseSnapshot>,
}

/// Workspace-level aggregation over resolution outcomes.
///
/// `met + breached + pending == total`; `at_risk` counts pending instances
/// already past their warning threshold, so `at_risk <= pending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlaDashboard {
    pub total: i64,
    pub pending: i64,
    pub met: i64,
    pub breached: i64,
    pub at_risk: i64,
}
