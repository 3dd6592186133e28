//! Single course processor - orchestration layer
//!
//! ## Responsibilities
//!
//! Handles one course end to end:
//!
//! 1. **Fetch**: download and parse the grader report
//! 2. **Aggregate**: feed every row into a `ParticipantRoster`
//! 3. **Evaluate**: run the attendance rule once all rows are in
//! 4. **Report**: write the course JSON and the ineligible list
//! 5. **Statistics**: log participant and drop counts

use crate::clients::PortalClient;
use crate::config::Config;
use crate::models::Course;
use crate::services::{AttendanceEvaluator, CourseReport, ParticipantRoster, ReportWriter};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Per-course statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CourseStats {
    pub participants: usize,
    pub ineligible: usize,
}

/// Process one course
///
/// # Arguments
/// - `client`: authenticated portal client
/// - `course`: course to process
/// - `course_index`: position in the course list (for logs)
/// - `config`: configuration
///
/// # Returns
/// Participant and drop counts for the course
pub async fn process_course(
    client: &PortalClient,
    course: &Course,
    course_index: usize,
    config: &Config,
) -> Result<CourseStats> {
    log_course_start(course_index, course);

    let report = client
        .fetch_grader_report(&course.id)
        .await
        .with_context(|| format!("cannot load grader report of {}", course))?;

    if report.participants.is_empty() {
        warn!("[Course {}] ⚠️ No participants in the grader report", course_index);
    }

    let mut roster = ParticipantRoster::new();
    roster.ingest(report);

    let evaluator = AttendanceEvaluator::new(config.absence_limit);
    let ineligible = roster.evaluate_all(&evaluator);

    let stats = CourseStats {
        participants: roster.len(),
        ineligible,
    };

    let writer = ReportWriter::new(&config.output_dir);
    for participant in roster.ineligible() {
        info!(
            "[Course {}] 🗑️ Delete {} {} ({}) - absent at {:?}",
            course_index,
            participant.student_id(),
            participant.name(),
            participant.identity.class_label,
            participant.absent_session_indexes()
        );
        writer
            .append_ineligible(course, participant)
            .await
            .context("cannot append to the ineligible list")?;
    }

    let path = writer
        .write_course(&CourseReport::new(course.clone(), roster.into_participants()))
        .await
        .with_context(|| format!("cannot write report of {}", course))?;
    info!("[Course {}] 📄 Report: {}", course_index, path.display());

    log_course_complete(course_index, &stats);

    Ok(stats)
}

// ========== Logging helpers ==========

fn log_course_start(course_index: usize, course: &Course) {
    info!("[Course {}] Start", course_index);
    info!("[Course {}] Name: {}", course_index, course.name);
    info!("[Course {}] ID: {}", course_index, course.id);
}

fn log_course_complete(course_index: usize, stats: &CourseStats) {
    info!(
        "[Course {}] Participants: {}, to delete: {}",
        course_index, stats.participants, stats.ineligible
    );
    info!("[Course {}] ✅ Done\n", course_index);
}
