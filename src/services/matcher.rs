//! Definition selection for new targets.
//!
//! Conditions use OR semantics within a key (set membership) and AND
//! semantics across keys. Empty condition values are wildcards. Matching a
//! target against zero definitions is not an error: the target is simply
//! untracked.

use crate::models::{ConditionValue, SlaDefinition};
use std::collections::HashMap;

/// True iff every non-wildcard condition is satisfied by the context.
pub fn matches_conditions(
    conditions: &HashMap<String, ConditionValue>,
    context: &HashMap<String, String>,
) -> bool {
    for (key, expected) in conditions {
        if expected.is_wildcard() {
            continue;
        }
        let Some(actual) = context.get(key) else {
            return false;
        };
        let matched = match expected {
            ConditionValue::Scalar(value) => actual == value,
            ConditionValue::OneOf(values) => values.contains(actual),
        };
        if !matched {
            return false;
        }
    }
    true
}

/// Pick the first matching definition. Callers supply definitions already
/// ordered by descending priority, so the first match wins ties.
pub fn select_definition(
    definitions: &[SlaDefinition],
    context: &HashMap<String, String>,
) -> Option<SlaDefinition> {
    definitions
        .iter()
        .find(|def| matches_conditions(&def.conditions, context))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BusinessHours;

    fn definition_with(conditions: HashMap<String, ConditionValue>, priority: i64) -> SlaDefinition {
        SlaDefinition::new(
            "ws-1".to_string(),
            format!("def-p{}", priority),
            "entity".to_string(),
            conditions,
            Some(60),
            None,
            false,
            BusinessHours::default(),
            vec![],
            priority,
        )
    }

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_conditions_match_anything() {
        assert!(matches_conditions(&HashMap::new(), &context(&[])));
        assert!(matches_conditions(
            &HashMap::new(),
            &context(&[("priority", "low")])
        ));
    }

    #[test]
    fn test_scalar_condition_requires_equality() {
        let mut conditions = HashMap::new();
        conditions.insert(
            "priority".to_string(),
            ConditionValue::Scalar("high".to_string()),
        );

        assert!(matches_conditions(&conditions, &context(&[("priority", "high")])));
        assert!(!matches_conditions(&conditions, &context(&[("priority", "low")])));
        // Missing key fails a non-wildcard condition.
        assert!(!matches_conditions(&conditions, &context(&[])));
    }

    #[test]
    fn test_set_condition_requires_membership() {
        let mut conditions = HashMap::new();
        conditions.insert(
            "priority".to_string(),
            ConditionValue::OneOf(vec!["high".to_string(), "urgent".to_string()]),
        );

        assert!(matches_conditions(&conditions, &context(&[("priority", "urgent")])));
        assert!(!matches_conditions(&conditions, &context(&[("priority", "low")])));
    }

    #[test]
    fn test_wildcard_values_are_ignored() {
        let mut conditions = HashMap::new();
        conditions.insert("priority".to_string(), ConditionValue::Scalar(String::new()));
        conditions.insert("channel".to_string(), ConditionValue::OneOf(vec![]));

        assert!(matches_conditions(&conditions, &context(&[])));
    }

    #[test]
    fn test_conditions_are_anded_across_keys() {
        let mut conditions = HashMap::new();
        conditions.insert(
            "priority".to_string(),
            ConditionValue::Scalar("high".to_string()),
        );
        conditions.insert(
            "channel".to_string(),
            ConditionValue::Scalar("email".to_string()),
        );

        assert!(matches_conditions(
            &conditions,
            &context(&[("priority", "high"), ("channel", "email")])
        ));
        assert!(!matches_conditions(
            &conditions,
            &context(&[("priority", "high"), ("channel", "chat")])
        ));
    }

    #[test]
    fn test_select_definition_first_match_wins() {
        let mut high_only = HashMap::new();
        high_only.insert(
            "priority".to_string(),
            ConditionValue::Scalar("high".to_string()),
        );

        // Ordered by descending priority, as the repository returns them.
        let definitions = vec![definition_with(high_only, 10), definition_with(HashMap::new(), 1)];

        let picked = select_definition(&definitions, &context(&[("priority", "high")])).unwrap();
        assert_eq!(picked.priority, 10);

        // High-priority definition does not match; fall through to catch-all.
        let picked = select_definition(&definitions, &context(&[("priority", "low")])).unwrap();
        assert_eq!(picked.priority, 1);
    }

    #[test]
    fn test_select_definition_no_match() {
        let mut high_only = HashMap::new();
        high_only.insert(
            "priority".to_string(),
            ConditionValue::Scalar("high".to_string()),
        );
        let definitions = vec![definition_with(high_only, 10)];

        assert!(select_definition(&definitions, &context(&[("priority", "low")])).is_none());
    }
}
