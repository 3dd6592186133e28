//! # LEPKOM attendance
//!
//! Crawls the LEPKOM e-learning portal (Moodle), collects every course's
//! grader report and flags participants who missed too many meetings.
//!
//! ## Architecture
//!
//! ### ① Clients and parsers
//! - `clients/` - `PortalClient`, the only owner of the HTTP session
//! - `parsers/` - pure HTML extraction: login token, course list, grader report
//!
//! ### ② Services
//! - `AttendanceEvaluator` - the two-absences rule
//! - `ParticipantRoster` - groups scraped rows per participant (NPM)
//! - `ReportWriter` - course JSON and the ineligible list
//!
//! ### ③ Orchestration
//! - `orchestrator/batch_processor` - login, course list, bounded concurrency
//! - `orchestrator/course_processor` - one course from report to verdicts
//!
//! A meeting ("pertemuan") counts as attended when its pre-test or post-test
//! was submitted. Meetings are walked in page order; the second absence marks
//! the participant for deletion and ends the walk.

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parsers;
pub mod services;
pub mod utils;

pub use clients::PortalClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    AttendanceVerdict, Course, ExamRecord, GraderReport, Participant, ParticipantIdentity,
    SessionRecord,
};
pub use orchestrator::{process_course, App};
pub use services::{AttendanceEvaluator, ParticipantRoster, ReportWriter};
