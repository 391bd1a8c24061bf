use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, Error as LambdaError, LambdaEvent};
use serde::Serialize;
use tracing::{error, info};

mod common;
use crate::common::cfn_response::{CfnResponder, ResponseBody, ResponseStatus};
use crate::common::config::Config;
use crate::common::errors::Error;
use crate::common::event::ProvisioningEvent;
use crate::common::ingestion::{IngestionJobs, JobOutcome};
use crate::common::utils::init_tracing;

/// `Data` attribute of the custom resource response.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SyncData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingestion_job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct SyncKnowledgeBase {
    ingestion_jobs: IngestionJobs,
    responder: CfnResponder,
    config: Config,
}

impl SyncKnowledgeBase {
    fn new(ingestion_jobs: IngestionJobs, responder: CfnResponder, config: Config) -> Self {
        Self {
            ingestion_jobs,
            responder,
            config,
        }
    }

    /// Handles one custom resource event and sends exactly one response.
    #[tracing::instrument(skip(self, event), fields(request_type = ?event.request_type))]
    async fn handle(
        &self,
        event: ProvisioningEvent,
        log_stream_name: &str,
    ) -> ResponseBody<SyncData> {
        if event.is_delete() {
            info!("Nothing to do on delete");
            return self
                .responder
                .report(
                    &event,
                    log_stream_name,
                    ResponseStatus::Success,
                    SyncData::default(),
                    None,
                )
                .await;
        }

        let (status, data, reason) = match self.sync(&event).await {
            Ok((status, data)) => (status, data, None),
            Err(err) => {
                error!("Error: {}", err);
                let data = SyncData {
                    error: Some(err.to_string()),
                    ..Default::default()
                };
                (ResponseStatus::Failed, data, Some(err.to_string()))
            }
        };

        self.responder
            .report(&event, log_stream_name, status, data, reason)
            .await
    }

    async fn sync(
        &self,
        event: &ProvisioningEvent,
    ) -> Result<(ResponseStatus, SyncData), Error> {
        let properties = &event.resource_properties;
        let knowledge_base_id = properties
            .knowledge_base_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or(self.config.knowledge_base_id.as_deref())
            .ok_or(Error::MissingKnowledgeBaseId)?;
        let data_source_id = properties
            .data_source_id
            .as_deref()
            .unwrap_or(self.config.data_source_id.as_str());

        info!(
            "Starting ingestion job for knowledge base: {}, data source: {}",
            knowledge_base_id, data_source_id
        );
        let job_id = self
            .ingestion_jobs
            .start(knowledge_base_id, data_source_id)
            .await?;
        info!("Ingestion job started with ID: {}", job_id);

        let outcome = self
            .ingestion_jobs
            .wait_for_completion(
                knowledge_base_id,
                data_source_id,
                &job_id,
                self.config.poll_interval,
                self.config.max_wait,
            )
            .await?;

        let status = match outcome {
            JobOutcome::Complete => {
                info!("Ingestion job completed successfully");
                ResponseStatus::Success
            }
            JobOutcome::Failed(_) => {
                error!("Ingestion job failed with status: {}", outcome.status());
                ResponseStatus::Failed
            }
            JobOutcome::TimedOut => {
                error!("Timed out waiting for ingestion job to complete");
                ResponseStatus::Failed
            }
        };

        let data = SyncData {
            ingestion_job_id: Some(job_id),
            status: Some(outcome.status().to_string()),
            error: None,
        };

        Ok((status, data))
    }
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    init_tracing();

    let config = Config::from_env();
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let bedrock_client = aws_sdk_bedrockagent::Client::new(&aws_config);
    let http_client = reqwest::Client::builder().build()?;

    let handler = SyncKnowledgeBase::new(
        IngestionJobs::new(bedrock_client),
        CfnResponder::new(http_client),
        config,
    );

    lambda_runtime::run(service_fn(|event: LambdaEvent<ProvisioningEvent>| async {
        let (payload, context) = event.into_parts();

        let log_stream_name = &context.env_config.log_stream;

        Result::<_, LambdaError>::Ok(handler.handle(payload, log_stream_name).await)
    }))
    .await
}
