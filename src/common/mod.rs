pub mod cfn_response;
pub mod config;
pub mod errors;
pub mod event;
pub mod ingestion;
pub mod utils;

pub const DATA_SOURCE_ID_DEFAULT: &str = "fomc-reports";
