use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("KnowledgeBaseId is not set in ResourceProperties or KNOWLEDGE_BASE_ID")]
    MissingKnowledgeBaseId,
    #[error("Failed to start ingestion job: {0}")]
    StartIngestionJob(String),
    #[error("Failed to get ingestion job {job_id}: {message}")]
    GetIngestionJob { job_id: String, message: String },
    #[error("Ingestion job response is missing the job description")]
    MissingIngestionJob,
}
