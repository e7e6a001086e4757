use serde::{Deserialize, Serialize};

/// Type of a lifecycle transition in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaEventType {
    Created,
    ResponseRecorded,
    Resolved,
    Paused,
    Resumed,
    WarningSent,
    Breached,
}

impl std::fmt::Display for SlaEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlaEventType::Created => write!(f, "created"),
            SlaEventType::ResponseRecorded => write!(f, "response_recorded"),
            SlaEventType::Resolved => write!(f, "resolved"),
            SlaEventType::Paused => write!(f, "paused"),
            SlaEventType::Resumed => write!(f, "resumed"),
            SlaEventType::WarningSent => write!(f, "warning_sent"),
            SlaEventType::Breached => write!(f, "breached"),
        }
    }
}

impl std::str::FromStr for SlaEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(SlaEventType::Created),
            "response_recorded" => Ok(SlaEventType::ResponseRecorded),
            "resolved" => Ok(SlaEventType::Resolved),
            "paused" => Ok(SlaEventType::Paused),
            "resumed" => Ok(SlaEventType::Resumed),
            "warning_sent" => Ok(SlaEventType::WarningSent),
            "breached" => Ok(SlaEventType::Breached),
            _ => Err(format!("Invalid SLA event type: {}", s)),
        }
    }
}

/// Append-only audit record of one lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaEvent {
    pub id: String,
    pub sla_instance_id: String,
    pub event_type: SlaEventType,
    pub event_data: serde_json::Value,
    pub created_at: String,
}

impl SlaEvent {
    pub fn new(
        sla_instance_id: String,
        event_type: SlaEventType,
        event_data: serde_json::Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sla_instance_id,
            event_type,
            event_data,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
