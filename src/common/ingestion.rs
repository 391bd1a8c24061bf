use std::time::Duration;

use aws_sdk_bedrockagent::error::DisplayErrorContext;
use aws_sdk_bedrockagent::types::IngestionJobStatus;
use tokio::time::sleep;
use tracing::info;

use crate::common::errors::Error;

/// Terminal result of waiting on an ingestion job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Complete,
    Failed(IngestionJobStatus),
    TimedOut,
}

impl JobOutcome {
    pub fn status(&self) -> &str {
        match self {
            JobOutcome::Complete => "COMPLETE",
            JobOutcome::Failed(status) => status.as_str(),
            JobOutcome::TimedOut => "TIMEOUT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionJobs {
    client: aws_sdk_bedrockagent::Client,
}

impl IngestionJobs {
    pub fn new(client: aws_sdk_bedrockagent::Client) -> Self {
        Self { client }
    }

    pub async fn start(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<String, Error> {
        let output = self
            .client
            .start_ingestion_job()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|err| Error::StartIngestionJob(DisplayErrorContext(&err).to_string()))?;

        let job = output.ingestion_job().ok_or(Error::MissingIngestionJob)?;

        Ok(job.ingestion_job_id().to_string())
    }

    pub async fn status(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
        job_id: &str,
    ) -> Result<IngestionJobStatus, Error> {
        let output = self
            .client
            .get_ingestion_job()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .ingestion_job_id(job_id)
            .send()
            .await
            .map_err(|err| Error::GetIngestionJob {
                job_id: job_id.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let job = output.ingestion_job().ok_or(Error::MissingIngestionJob)?;

        Ok(job.status().clone())
    }

    /// Polls the job every `poll_interval` until it reaches a terminal state.
    ///
    /// Elapsed time is counted in whole intervals, so the job is checked
    /// `max_wait / poll_interval` times (rounded up) before giving up.
    pub async fn wait_for_completion(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
        job_id: &str,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<JobOutcome, Error> {
        let mut elapsed = Duration::ZERO;

        while elapsed < max_wait {
            let status = self.status(knowledge_base_id, data_source_id, job_id).await?;
            info!("Ingestion job status: {}", status.as_str());

            match status {
                IngestionJobStatus::Complete => return Ok(JobOutcome::Complete),
                IngestionJobStatus::Failed | IngestionJobStatus::Stopped => {
                    return Ok(JobOutcome::Failed(status))
                }
                _ => {}
            }

            sleep(poll_interval).await;
            elapsed += poll_interval;
        }

        Ok(JobOutcome::TimedOut)
    }
}
