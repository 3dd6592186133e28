//! Orchestration layer
//!
//! ## Responsibilities
//!
//! Batch processing and scheduling; no business decisions are made here.
//!
//! ### `batch_processor` - batch course processor
//! - application lifecycle (initialise, log in, run)
//! - course listing (`Vec<Course>`)
//! - concurrency limit (`Semaphore`)
//! - owns the portal client
//! - global statistics
//!
//! ### `course_processor` - single course processor
//! - grader report → roster → attendance verdicts → reports
//! - per-course statistics
//!
//! ## Layering
//!
//! ```text
//! batch_processor (Vec<Course>)
//!     ↓
//! course_processor (one Course)
//!     ↓
//! services (roster / attendance evaluator / report writer)
//!     ↓
//! clients + parsers (portal HTTP session, HTML extraction)
//! ```

pub mod batch_processor;
pub mod course_processor;

pub use batch_processor::App;
pub use course_processor::{process_course, CourseStats};
