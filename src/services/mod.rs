pub mod attendance_evaluator;
pub mod participant_roster;
pub mod report_writer;

pub use attendance_evaluator::{AttendanceEvaluator, DEFAULT_ABSENCE_LIMIT};
pub use participant_roster::ParticipantRoster;
pub use report_writer::{CourseReport, ReportWriter};
