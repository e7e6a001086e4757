use serde::{Deserialize, Serialize};

/// Weekly recurring working window attached to an SLA definition.
///
/// Weekday numbers follow 0 = Sunday .. 6 = Saturday. The `timezone` field is
/// advisory only: the deadline arithmetic reads wall-clock hours and minutes
/// without converting between zones. This is a known simplification carried
/// from the original design; do not change it without product sign-off, since
/// stored deadlines already assume this behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub start: String, // "HH:MM", e.g. "09:00"
    pub end: String,   // "HH:MM", e.g. "17:00"
    pub timezone: String,
    pub workdays: Vec<u8>,
}

impl BusinessHours {
    pub fn new(start: String, end: String, timezone: String, workdays: Vec<u8>) -> Self {
        Self {
            start,
            end,
            timezone,
            workdays,
        }
    }

    /// Validate the window. `business_hours_only` definitions additionally
    /// require a non-empty workday set.
    pub fn validate(&self, business_hours_only: bool) -> Result<(), String> {
        let open = parse_time_of_day(&self.start)
            .ok_or_else(|| format!("Invalid start time: {}", self.start))?;
        let close = parse_time_of_day(&self.end)
            .ok_or_else(|| format!("Invalid end time: {}", self.end))?;

        if open >= close {
            return Err(format!(
                "Business hours start ({}) must be before end ({})",
                self.start, self.end
            ));
        }

        if let Some(day) = self.workdays.iter().find(|d| **d > 6) {
            return Err(format!("Invalid weekday number: {}", day));
        }

        if business_hours_only && self.workdays.is_empty() {
            return Err("Workdays must be non-empty for business-hours SLAs".to_string());
        }

        Ok(())
    }

    /// Minutes since midnight at which business opens. Malformed times fall
    /// back to 0 so the calendar walk degenerates rather than panics.
    pub fn open_minutes(&self) -> i64 {
        parse_time_of_day(&self.start).unwrap_or(0)
    }

    /// Minutes since midnight at which business closes.
    pub fn close_minutes(&self) -> i64 {
        parse_time_of_day(&self.end).unwrap_or(0)
    }

    pub fn is_workday(&self, weekday: u8) -> bool {
        self.workdays.contains(&weekday)
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        // Monday through Friday, 09:00-17:00
        Self {
            start: "09:00".to_string(),
            end: "17:00".to_string(),
            timezone: "UTC".to_string(),
            workdays: vec![1, 2, 3, 4, 5],
        }
    }
}

/// Parse an "HH:MM" time-of-day string into minutes since midnight.
pub fn parse_time_of_day(s: &str) -> Option<i64> {
    let (h, m) = s.split_once(':')?;
    let h: i64 = h.parse().ok()?;
    let m: i64 = m.parse().ok()?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return None;
    }
    Some(h * 60 + m)
}
