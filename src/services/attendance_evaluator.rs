//! Attendance rule - business capability layer
//!
//! Decides whether a participant is dropped ("Delete") for missing meetings,
//! and which meetings caused it.

use crate::models::{AttendanceVerdict, Participant, SessionRecord};
use tracing::debug;

/// Absences after which a participant is dropped
pub const DEFAULT_ABSENCE_LIMIT: usize = 2;

/// Attendance evaluator
///
/// Responsibilities:
/// - walks a participant's meetings in stored (page) order
/// - collects absent meeting numbers until the limit is hit, then stops
/// - holds no per-participant state; every call starts from scratch
#[derive(Debug, Clone, Copy)]
pub struct AttendanceEvaluator {
    absence_limit: usize,
}

impl AttendanceEvaluator {
    pub fn new(absence_limit: usize) -> Self {
        Self {
            absence_limit: absence_limit.max(1),
        }
    }

    pub fn absence_limit(&self) -> usize {
        self.absence_limit
    }

    /// Compute the verdict for a meeting sequence.
    ///
    /// A present meeting never forgives an earlier absence. Once the number of
    /// absences reaches the limit the walk stops, so at most `absence_limit`
    /// indexes are reported: the first ones in stored order.
    pub fn evaluate(&self, sessions: &[SessionRecord]) -> AttendanceVerdict {
        let mut verdict = AttendanceVerdict::default();

        for session in sessions {
            if session.is_present() {
                continue;
            }

            verdict.absent_indexes.push(session.session_index);

            if verdict.absent_indexes.len() == self.absence_limit {
                verdict.is_ineligible = true;
                break;
            }
        }

        verdict
    }

    /// Evaluate `participant` and replace its stored verdict
    pub fn evaluate_participant<'a>(&self, participant: &'a mut Participant) -> &'a AttendanceVerdict {
        participant.verdict = self.evaluate(&participant.sessions);

        debug!(
            "{} ({}) -> ineligible={} absent={:?}",
            participant.name(),
            participant.student_id(),
            participant.verdict.is_ineligible,
            participant.verdict.absent_indexes
        );

        &participant.verdict
    }
}

impl Default for AttendanceEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_ABSENCE_LIMIT)
    }
}
