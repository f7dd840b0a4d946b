use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, parse_duration};
use crate::error::ValidationError;

/// Every run option, all optional. Values given on the command line win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub payload: Option<String>,
    pub location: Option<bool>,
    pub max_redirs: Option<usize>,
    pub insecure: Option<bool>,
    pub ca_certificates: Option<PathBuf>,
    pub dry_run: Option<bool>,
    pub timeout: Option<DurationValue>,
    pub strategy: Option<String>,
    pub plot: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub request_timeout: Option<DurationValue>,
    pub max_batch_size: Option<usize>,
}

/// A duration given either as whole seconds or as text such as `"500ms"`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}
