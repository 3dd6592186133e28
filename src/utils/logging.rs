use anyhow::Result;
/// Logging utilities
///
/// Subscriber setup plus the banner helpers used by the orchestrator
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` for this crate when
/// `verbose` is on. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "info,lepkom_attendance=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Initialise the run log file
///
/// Truncates any previous run; [`append_run_summary`] adds the totals at the end.
///
/// # Arguments
/// - `log_file_path`: log file path
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nAttendance crawl log - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// Log startup information
///
/// # Arguments
/// - `portal`: portal root URL
/// - `max_concurrent`: courses processed at the same time
pub fn log_startup(portal: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 Starting attendance crawl");
    info!("🌐 Portal: {}", portal);
    info!("📊 Max concurrent courses: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// Log the course listing result
pub fn log_courses_loaded(total: usize, max_concurrent: usize) {
    info!("✓ Found {} courses", total);
    info!("📋 Processing in batches of {}", max_concurrent);
}

/// Log the start of a batch
///
/// # Arguments
/// - `batch_num`: batch number
/// - `total_batches`: number of batches
/// - `start`: first course number
/// - `end`: last course number
/// - `total`: number of courses
pub fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 Batch {}/{}", batch_num, total_batches);
    info!("📄 Courses {}-{} of {}", start, end, total);
    info!("{}", "=".repeat(60));
}

/// Log the end of a batch
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ Batch {} done: {}/{} succeeded", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// Print final statistics
pub fn print_final_stats(
    success: usize,
    failed: usize,
    total: usize,
    participants: usize,
    ineligible: usize,
    output_dir: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 Crawl finished");
    info!(
        "Finished at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ Courses succeeded: {}/{}", success, total);
    info!("❌ Courses failed: {}", failed);
    info!("👥 Participants: {}", participants);
    info!("🗑️ To delete: {}", ineligible);
    info!("{}", "=".repeat(60));
    info!("\nReports saved to: {}", output_dir);
}

/// Append the run totals to the log file started by [`init_log_file`]
pub fn append_run_summary(
    log_file_path: &str,
    success: usize,
    failed: usize,
    total: usize,
    participants: usize,
    ineligible: usize,
) -> Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(log_file_path)?;
    writeln!(
        file,
        "Finished at: {}\nCourses succeeded: {}/{}\nCourses failed: {}\nParticipants: {}\nTo delete: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        success,
        total,
        failed,
        participants,
        ineligible
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_log_file_writes_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("output.txt");
        init_log_file(path.to_str().unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("Attendance crawl log - "));
    }

    #[test]
    fn test_run_summary_follows_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("output.txt");
        let path = path.to_str().unwrap();

        init_log_file(path).unwrap();
        append_run_summary(path, 3, 1, 4, 90, 7).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("Courses succeeded: 3/4\n"));
        assert!(content.contains("Courses failed: 1\n"));
        assert!(content.ends_with("To delete: 7\n"));

        init_log_file(path).unwrap();
        assert!(!std::fs::read_to_string(path).unwrap().contains("Courses succeeded"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
