pub mod course;
pub mod exam;
pub mod observation;
pub mod participant;
pub mod session;

pub use course::{parse_course_id, Course};
pub use exam::ExamRecord;
pub use observation::{ExamObservation, GraderReport, SessionObservation};
pub use participant::{AttendanceVerdict, Participant, ParticipantIdentity};
pub use session::SessionRecord;
