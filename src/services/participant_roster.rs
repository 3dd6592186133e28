//! Participant roster - business capability layer
//!
//! Accumulates scraped rows into participants keyed by NPM. Appending never
//! computes a verdict; call [`ParticipantRoster::evaluate_all`] once every row
//! of the course has been ingested.

use std::collections::HashMap;

use crate::models::{ExamRecord, GraderReport, Participant, ParticipantIdentity, SessionRecord};
use crate::services::attendance_evaluator::AttendanceEvaluator;

/// Participants of one course, in first-seen order
#[derive(Debug, Default)]
pub struct ParticipantRoster {
    participants: Vec<Participant>,
    index: HashMap<String, usize>,
}

impl ParticipantRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity; empty fields of a known participant are filled in
    pub fn register(&mut self, identity: ParticipantIdentity) -> &mut Participant {
        let existing = self.index.get(&identity.student_id).copied();
        match existing {
            Some(slot) => {
                let participant = &mut self.participants[slot];
                participant.identity.merge_missing(&identity);
                participant
            }
            None => self.insert(identity),
        }
    }

    /// Append a meeting, creating the participant if unseen.
    ///
    /// Repeated meeting numbers are kept as separate records.
    pub fn add_session(
        &mut self,
        student_id: &str,
        session_index: u32,
        pre_test_completed: bool,
        post_test_completed: bool,
    ) {
        self.entry(student_id).push_session(SessionRecord::new(
            session_index,
            pre_test_completed,
            post_test_completed,
        ));
    }

    /// Append an exam result, creating the participant if unseen
    pub fn add_exam(&mut self, student_id: &str, exam_index: u32, grade: i32, attempted: bool) {
        self.entry(student_id)
            .push_exam(ExamRecord::new(exam_index, grade, attempted));
    }

    /// Replay one grader report: identities first, then rows in page order
    pub fn ingest(&mut self, report: GraderReport) {
        for identity in report.participants {
            self.register(identity);
        }
        for row in report.sessions {
            self.add_session(
                &row.student_id,
                row.session_index,
                row.pre_test_completed,
                row.post_test_completed,
            );
        }
        for row in report.exams {
            self.add_exam(&row.student_id, row.exam_index, row.grade, row.attempted);
        }
    }

    /// Recompute every participant's verdict; returns how many are ineligible
    pub fn evaluate_all(&mut self, evaluator: &AttendanceEvaluator) -> usize {
        let mut ineligible = 0;
        for participant in &mut self.participants {
            if evaluator.evaluate_participant(participant).is_ineligible {
                ineligible += 1;
            }
        }
        ineligible
    }

    pub fn get(&self, student_id: &str) -> Option<&Participant> {
        self.index.get(student_id).map(|&slot| &self.participants[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Participants whose last verdict says drop
    pub fn ineligible(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_ineligible())
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn into_participants(self) -> Vec<Participant> {
        self.participants
    }

    fn entry(&mut self, student_id: &str) -> &mut Participant {
        let existing = self.index.get(student_id).copied();
        match existing {
            Some(slot) => &mut self.participants[slot],
            None => self.insert(ParticipantIdentity::from_student_id(student_id)),
        }
    }

    fn insert(&mut self, identity: ParticipantIdentity) -> &mut Participant {
        let slot = self.participants.len();
        self.index.insert(identity.student_id.clone(), slot);
        self.participants.push(Participant::new(identity));
        &mut self.participants[slot]
    }
}
