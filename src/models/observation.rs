//! Rows handed from the page extractors to the participant roster

use serde::{Deserialize, Serialize};

use super::participant::ParticipantIdentity;

/// One `(student, meeting)` cell pair of the grader report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionObservation {
    pub student_id: String,
    pub session_index: u32,
    pub pre_test_completed: bool,
    pub post_test_completed: bool,
}

/// One `(student, exam)` cell of the grader report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamObservation {
    pub student_id: String,
    pub exam_index: u32,
    pub grade: i32,
    pub attempted: bool,
}

/// Everything extracted from one grader report page, in page order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraderReport {
    pub participants: Vec<ParticipantIdentity>,
    pub sessions: Vec<SessionObservation>,
    pub exams: Vec<ExamObservation>,
}

impl GraderReport {
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.sessions.is_empty() && self.exams.is_empty()
    }
}
