use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::types::{
    AccumulationLogRecord, ActivityPointRecord, LectureRecord, PracticePlanRecord, PracticeRecord,
    QuestionRecord, QuizPublishHistoryRecord,
};

/// A bulk set of records to load into a store, read from YAML or JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub lectures: Vec<LectureRecord>,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub practice_plans: Vec<PracticePlanRecord>,
    #[serde(default)]
    pub practices: Vec<PracticeRecord>,
    #[serde(default)]
    pub activity_points: Vec<ActivityPointRecord>,
    #[serde(default)]
    pub accumulation_logs: Vec<AccumulationLogRecord>,
    #[serde(default)]
    pub quiz_history: Vec<QuizPublishHistoryRecord>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_snapshot_parses() {
        let yaml = r#"
members: [u1, u2]
lectures:
  - id: 1
    title: Rust basics
    attendees: [u1, u3]
    message_ref: "9001"
practices:
  - plan_id: 5
    seq: 0
    date: 2026-03-01
"#;
        let snapshot: Snapshot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(snapshot.members, vec!["u1", "u2"]);
        assert_eq!(snapshot.lectures[0].attendees, vec!["u1", "u3"]);
        assert_eq!(
            snapshot.lectures[0].message_ref.as_ref().map(|m| m.as_str()),
            Some("9001")
        );
        assert_eq!(snapshot.practices[0].plan_id, 5);
        assert!(snapshot.quiz_history.is_empty());
    }
}
