//! Batch course processor - orchestration layer
//!
//! ## Responsibilities
//!
//! Entry point of the crawl; owns the portal session.
//!
//! 1. **Initialisation**: log file, startup banner, login
//! 2. **Course listing**: read the dashboard (`Vec<Course>`)
//! 3. **Concurrency**: a semaphore bounds the number of courses in flight
//! 4. **Batching**: courses are processed in batches, one batch after another
//! 5. **Statistics**: totals over every course
//!
//! Single courses are delegated to `course_processor`.

use crate::clients::PortalClient;
use crate::config::Config;
use crate::models::Course;
use crate::orchestrator::course_processor::{self, CourseStats};
use crate::parsers::CourseFilter;
use crate::services::ReportWriter;
use crate::utils::logging;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// Application
pub struct App {
    config: Config,
    client: Arc<PortalClient>,
}

impl App {
    /// Initialise the application and log in
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(config.portal_root(), config.max_concurrent_courses);

        let client = PortalClient::new(&config).context("cannot build the HTTP client")?;
        client
            .authenticate(&config.username, &config.password)
            .await
            .context("login failed")?;

        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    /// Run the crawl
    pub async fn run(&self) -> Result<()> {
        info!("\n📁 Reading the course list...");
        let courses = self
            .client
            .fetch_courses(&CourseFilter::from_config(&self.config))
            .await
            .context("cannot list courses")?;

        logging::log_courses_loaded(courses.len(), self.config.max_concurrent_courses);

        ReportWriter::new(&self.config.output_dir)
            .reset_ineligible()
            .await
            .context("cannot reset the ineligible list")?;

        let stats = self.process_all_courses(courses).await?;

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            stats.participants,
            stats.ineligible,
            &self.config.output_dir,
        );
        logging::append_run_summary(
            &self.config.output_log_file,
            stats.success,
            stats.failed,
            stats.total,
            stats.participants,
            stats.ineligible,
        )?;

        Ok(())
    }

    /// Process every course, batch by batch
    async fn process_all_courses(&self, courses: Vec<Course>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_courses.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = courses.len();
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for (batch_idx, batch) in courses.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let total_batches = total.div_ceil(batch_size);

            logging::log_batch_start(
                batch_idx + 1,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let batch_result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.absorb(&batch_result);
            logging::log_batch_complete(
                batch_idx + 1,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// Process one batch concurrently
    async fn process_batch(
        &self,
        batch: &[Course],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<ProcessingStats> {
        let mut handles = Vec::with_capacity(batch.len());
        let mut indexes = Vec::with_capacity(batch.len());

        for (idx, course) in batch.iter().enumerate() {
            let course_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let client = Arc::clone(&self.client);
            let course = course.clone();
            let config = self.config.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                course_processor::process_course(&client, &course, course_index, &config)
                    .await
                    .map_err(|e| {
                        error!("[Course {}] ❌ {:#}", course_index, e);
                        e
                    })
            }));
            indexes.push(course_index);
        }

        let mut result = ProcessingStats {
            total: batch.len(),
            ..Default::default()
        };

        for (course_index, joined) in indexes.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(course_stats)) => result.record_success(&course_stats),
                Ok(Err(_)) => result.failed += 1,
                Err(e) => {
                    error!("[Course {}] Task failed: {}", course_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// Run statistics
#[derive(Debug, Default, Clone, Copy)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
    participants: usize,
    ineligible: usize,
}

impl ProcessingStats {
    fn record_success(&mut self, course: &CourseStats) {
        self.success += 1;
        self.participants += course.participants;
        self.ineligible += course.ineligible;
    }

    fn absorb(&mut self, batch: &ProcessingStats) {
        self.success += batch.success;
        self.failed += batch.failed;
        self.participants += batch.participants;
        self.ineligible += batch.ineligible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_absorb_batches() {
        let mut batch = ProcessingStats::default();
        batch.record_success(&CourseStats {
            participants: 30,
            ineligible: 2,
        });
        batch.failed += 1;

        let mut total = ProcessingStats {
            total: 4,
            ..Default::default()
        };
        total.absorb(&batch);
        total.absorb(&batch);

        assert_eq!(total.success, 2);
        assert_eq!(total.failed, 2);
        assert_eq!(total.participants, 60);
        assert_eq!(total.ineligible, 4);
        assert_eq!(total.total, 4);
    }
}
