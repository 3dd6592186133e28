use serde::{Deserialize, Serialize};

use super::exam::ExamRecord;
use super::session::SessionRecord;

/// Who a grader report row belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantIdentity {
    pub name: String,
    /// NPM
    pub student_id: String,
    pub class_label: String,
    /// Opaque "last access" text; empty when the page does not show it
    #[serde(default)]
    pub last_access: String,
}

impl ParticipantIdentity {
    pub fn new(
        name: impl Into<String>,
        student_id: impl Into<String>,
        class_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            student_id: student_id.into(),
            class_label: class_label.into(),
            last_access: String::new(),
        }
    }

    /// Identity known only by its NPM
    pub fn from_student_id(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            ..Self::default()
        }
    }

    /// Fill empty fields from `other`; fields already set are kept
    pub fn merge_missing(&mut self, other: &ParticipantIdentity) {
        fill(&mut self.name, &other.name);
        fill(&mut self.class_label, &other.class_label);
        fill(&mut self.last_access, &other.last_access);
    }
}

fn fill(target: &mut String, source: &str) {
    if target.is_empty() && !source.is_empty() {
        *target = source.to_string();
    }
}

/// Outcome of the attendance rule for one participant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceVerdict {
    /// Participant must be dropped from the course
    pub is_ineligible: bool,
    /// Meetings counted as absences, in stored order, capped at the absence limit
    pub absent_indexes: Vec<u32>,
}

impl AttendanceVerdict {
    pub fn absence_count(&self) -> usize {
        self.absent_indexes.len()
    }
}

/// A course participant with the records scraped for them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(flatten)]
    pub identity: ParticipantIdentity,
    /// Meetings in page order, never re-sorted
    pub sessions: Vec<SessionRecord>,
    pub exams: Vec<ExamRecord>,
    /// Last computed verdict; stale after further appends until re-evaluated
    #[serde(default)]
    pub verdict: AttendanceVerdict,
}

impl Participant {
    pub fn new(identity: ParticipantIdentity) -> Self {
        Self {
            identity,
            sessions: Vec::new(),
            exams: Vec::new(),
            verdict: AttendanceVerdict::default(),
        }
    }

    pub fn student_id(&self) -> &str {
        &self.identity.student_id
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn push_session(&mut self, record: SessionRecord) {
        self.sessions.push(record);
    }

    pub fn push_exam(&mut self, record: ExamRecord) {
        self.exams.push(record);
    }

    pub fn is_ineligible(&self) -> bool {
        self.verdict.is_ineligible
    }

    pub fn absent_session_indexes(&self) -> &[u32] {
        &self.verdict.absent_indexes
    }

    pub fn absence_count(&self) -> usize {
        self.verdict.absence_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_missing_keeps_existing_fields() {
        let mut identity = ParticipantIdentity::from_student_id("50421234");
        identity.class_label = "3IA01".to_string();

        let scraped = ParticipantIdentity {
            name: "Budi Santoso".to_string(),
            student_id: "50421234".to_string(),
            class_label: "3IA02".to_string(),
            last_access: "2 days 3 hours".to_string(),
        };
        identity.merge_missing(&scraped);

        assert_eq!(identity.name, "Budi Santoso");
        assert_eq!(identity.class_label, "3IA01");
        assert_eq!(identity.last_access, "2 days 3 hours");
    }

    #[test]
    fn test_new_participant_is_eligible() {
        let participant = Participant::new(ParticipantIdentity::new("Sari", "10121001", "1KA01"));
        assert!(!participant.is_ineligible());
        assert!(participant.absent_session_indexes().is_empty());
        assert_eq!(participant.absence_count(), 0);
    }

    #[test]
    fn test_serializes_identity_flat() {
        let mut participant =
            Participant::new(ParticipantIdentity::new("Sari", "10121001", "1KA01"));
        participant.push_session(SessionRecord::new(1, true, false));

        let json = serde_json::to_value(&participant).unwrap();
        assert_eq!(json["student_id"], "10121001");
        assert_eq!(json["sessions"][0]["session_index"], 1);
        assert_eq!(json["verdict"]["is_ineligible"], false);
    }
}
