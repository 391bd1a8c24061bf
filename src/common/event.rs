use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    pub knowledge_base_id: Option<String>,
    pub data_source_id: Option<String>,
}

/// Custom resource request sent by CloudFormation.
///
/// The callback fields are optional because the stack may also invoke the
/// function directly with just `RequestType` and `ResourceProperties`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningEvent {
    pub request_type: RequestType,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
    #[serde(rename = "ResponseURL")]
    pub response_url: Option<String>,
    pub stack_id: Option<String>,
    pub request_id: Option<String>,
    pub logical_resource_id: Option<String>,
    pub physical_resource_id: Option<String>,
}

impl ProvisioningEvent {
    pub fn is_delete(&self) -> bool {
        self.request_type == RequestType::Delete
    }
}
