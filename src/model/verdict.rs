//! Screenshot compliance verdict models

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Label → compliance flag, as judged by the vision backend
///
/// Labels are sites or free-text activity descriptions chosen by the model;
/// they are not restricted to the submitted lists. `true` means allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
#[serde(transparent)]
pub struct ComplianceVerdict(pub BTreeMap<String, bool>);

impl ComplianceVerdict {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Labels judged non-compliant
    pub fn violations(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, allowed)| !**allowed)
            .map(|(label, _)| label.as_str())
    }
}

impl FromIterator<(String, bool)> for ComplianceVerdict {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Reply shape requested from the vision backend
///
/// Only used to describe the schema in the prompt; replies are parsed leniently.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationReply {
    pub result: ComplianceVerdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_flat_map() {
        let verdict: ComplianceVerdict = [
            ("youtube.com".to_string(), false),
            ("github.com".to_string(), true),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"github.com": true, "youtube.com": false})
        );
    }

    #[test]
    fn test_violations() {
        let verdict: ComplianceVerdict = [
            ("scrolling social media".to_string(), false),
            ("github.com".to_string(), true),
        ]
        .into_iter()
        .collect();

        let violations: Vec<_> = verdict.violations().collect();
        assert_eq!(violations, vec!["scrolling social media"]);
    }
}
