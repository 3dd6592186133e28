//! Report writer - business capability layer
//!
//! Only writes files; knows nothing about how the data was gathered.

use crate::error::AppResult;
use crate::models::{Course, Participant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File collecting every participant to drop in one run, across courses
pub const INELIGIBLE_FILE: &str = "ineligible.txt";

/// Evaluated participants of one course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseReport {
    pub course: Course,
    pub generated_at: String,
    pub total: usize,
    pub ineligible: usize,
    pub participants: Vec<Participant>,
}

impl CourseReport {
    pub fn new(course: Course, participants: Vec<Participant>) -> Self {
        let ineligible = participants.iter().filter(|p| p.is_ineligible()).count();
        Self {
            course,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            total: participants.len(),
            ineligible,
            participants,
        }
    }
}

/// Report writer
///
/// Responsibilities:
/// - one pretty JSON file per course
/// - one appended line per ineligible participant in `ineligible.txt`
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `<output_dir>/<course id>.json`
    ///
    /// # Returns
    /// Path of the written file
    pub async fn write_course(&self, report: &CourseReport) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.output_dir).await?;

        let path = self
            .output_dir
            .join(format!("{}.json", file_stem(&report.course.id)));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).await?;

        debug!("Report written: {}", path.display());
        Ok(path)
    }

    /// Start an empty ineligible list; called once per run before any course
    /// appends to it.
    pub async fn reset_ineligible(&self) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.output_dir).await?;

        let path = self.output_dir.join(INELIGIBLE_FILE);
        fs::write(&path, "").await?;
        Ok(path)
    }

    /// Append one line for an ineligible participant.
    ///
    /// The line is flushed before returning, so it is on disk once the
    /// future resolves.
    pub async fn append_ineligible(&self, course: &Course, participant: &Participant) -> AppResult<()> {
        fs::create_dir_all(&self.output_dir).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.output_dir.join(INELIGIBLE_FILE))
            .await?;

        let line = format!(
            "{} | {} | {} | {} | absent at {:?}\n",
            course.name,
            participant.student_id(),
            participant.name(),
            participant.identity.class_label,
            participant.absent_session_indexes()
        );
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

/// Keep ids usable as file names
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
