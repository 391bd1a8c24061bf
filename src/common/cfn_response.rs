use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::common::event::ProvisioningEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Body CloudFormation expects on the pre-signed response URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseBody<T> {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: Option<String>,
    pub request_id: Option<String>,
    pub logical_resource_id: Option<String>,
    pub no_echo: bool,
    pub data: T,
}

impl<T: Serialize> ResponseBody<T> {
    pub fn new(
        event: &ProvisioningEvent,
        log_stream_name: &str,
        status: ResponseStatus,
        data: T,
        reason: Option<String>,
    ) -> Self {
        Self {
            status,
            reason: reason.unwrap_or_else(|| {
                format!("See the details in CloudWatch Log Stream: {log_stream_name}")
            }),
            physical_resource_id: event
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| log_stream_name.to_string()),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }
}

/// Sends custom resource results back to CloudFormation.
#[derive(Debug, Clone, Default)]
pub struct CfnResponder {
    http_client: reqwest::Client,
}

impl CfnResponder {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Builds the response body and PUTs it to the event's response URL.
    ///
    /// Delivery is best effort: failures are logged and the body is returned
    /// either way.
    pub async fn report<T: Serialize>(
        &self,
        event: &ProvisioningEvent,
        log_stream_name: &str,
        status: ResponseStatus,
        data: T,
        reason: Option<String>,
    ) -> ResponseBody<T> {
        let body = ResponseBody::new(event, log_stream_name, status, data, reason);

        let Some(response_url) = event.response_url.as_deref() else {
            warn!("No ResponseURL in event, skipping CloudFormation response");
            return body;
        };
        info!("ResponseURL: {}", response_url);

        let json_body = match serde_json::to_string(&body) {
            Ok(val) => val,
            Err(err) => {
                error!("Failed to serialize response body: {}", err);
                return body;
            }
        };
        info!("Response body: {}", json_body);

        match self.put(response_url, json_body).await {
            Ok(status) if status.is_success() => info!("Status code: {}", status),
            Ok(status) => error!("Response URL rejected the response with: {}", status),
            Err(err) => error!("Sending response failed with: {}", err),
        }

        body
    }

    async fn put(&self, url: &str, body: String) -> Result<StatusCode, reqwest::Error> {
        let response = self
            .http_client
            .put(url)
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await?;

        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event_with_url(response_url: Option<String>) -> ProvisioningEvent {
        serde_json::from_value(json!({
            "RequestType": "Create",
            "ResponseURL": response_url,
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
            "RequestId": "request-1",
            "LogicalResourceId": "SyncKnowledgeBase",
            "ResourceProperties": { "KnowledgeBaseId": "KB12345" }
        }))
        .unwrap()
    }

    #[test]
    fn body_defaults_reason_and_physical_id_to_log_stream() {
        let event = event_with_url(None);
        let body = ResponseBody::new(
            &event,
            "2024/01/01/[$LATEST]abc",
            ResponseStatus::Success,
            json!({}),
            None,
        );

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "Status": "SUCCESS",
                "Reason": "See the details in CloudWatch Log Stream: 2024/01/01/[$LATEST]abc",
                "PhysicalResourceId": "2024/01/01/[$LATEST]abc",
                "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
                "RequestId": "request-1",
                "LogicalResourceId": "SyncKnowledgeBase",
                "NoEcho": false,
                "Data": {}
            })
        );
    }

    #[test]
    fn body_keeps_existing_physical_id_and_reason() {
        let mut event = event_with_url(None);
        event.physical_resource_id = Some("KB12345-sync".to_string());

        let body = ResponseBody::new(
            &event,
            "stream",
            ResponseStatus::Failed,
            json!({ "Status": "TIMEOUT" }),
            Some("took too long".to_string()),
        );

        assert_eq!(body.physical_resource_id, "KB12345-sync");
        assert_eq!(body.reason, "took too long");
        assert_eq!(
            serde_json::to_value(&body).unwrap()["Status"],
            Value::from("FAILED")
        );
    }

    #[tokio::test]
    async fn puts_body_to_response_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/response"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let event = event_with_url(Some(format!("{}/response", mock_server.uri())));
        let responder = CfnResponder::default();

        responder
            .report(
                &event,
                "stream",
                ResponseStatus::Success,
                json!({ "IngestionJobId": "JOB1" }),
                None,
            )
            .await;

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.headers.get("content-type").unwrap(), "");
        assert_eq!(
            request.headers.get("content-length").unwrap(),
            request.body.len().to_string().as_str()
        );

        let sent: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(sent["Status"], "SUCCESS");
        assert_eq!(sent["RequestId"], "request-1");
        assert_eq!(sent["Data"]["IngestionJobId"], "JOB1");
    }

    #[tokio::test]
    async fn rejected_response_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&mock_server)
            .await;

        let event = event_with_url(Some(format!("{}/expired", mock_server.uri())));
        let body = CfnResponder::default()
            .report(&event, "stream", ResponseStatus::Failed, json!({}), None)
            .await;

        assert_eq!(body.status, ResponseStatus::Failed);
    }

    #[tokio::test]
    async fn unreachable_response_url_is_logged_only() {
        let event = event_with_url(Some("http://127.0.0.1:1/response".to_string()));

        let body = CfnResponder::default()
            .report(&event, "stream", ResponseStatus::Success, json!({}), None)
            .await;

        assert_eq!(body.status, ResponseStatus::Success);
    }

    #[tokio::test]
    async fn missing_response_url_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let event = event_with_url(None);
        let body = CfnResponder::default()
            .report(&event, "stream", ResponseStatus::Success, json!({}), None)
            .await;

        assert_eq!(body.request_id.as_deref(), Some("request-1"));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
