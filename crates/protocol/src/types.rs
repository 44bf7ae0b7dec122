use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{API_HOST, API_PATH, UPLOAD_HOST, UPLOAD_PATH};

/// Service region, sent as the `Region` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "bj")]
    Beijing,
    #[serde(rename = "gz")]
    Guangzhou,
    #[serde(rename = "sh")]
    Shanghai,
    #[serde(rename = "hk")]
    HongKong,
    #[serde(rename = "ca")]
    NorthAmerica,
    #[serde(rename = "sg")]
    Singapore,
    #[serde(rename = "shjr")]
    ShanghaiFinance,
    #[serde(rename = "szjr")]
    ShenzhenFinance,
    #[serde(rename = "gzopen")]
    GuangzhouOpen,
}

impl Region {
    /// Returns the wire value of the region.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Beijing => "bj",
            Region::Guangzhou => "gz",
            Region::Shanghai => "sh",
            Region::HongKong => "hk",
            Region::NorthAmerica => "ca",
            Region::Singapore => "sg",
            Region::ShanghaiFinance => "shjr",
            Region::ShenzhenFinance => "szjr",
            Region::GuangzhouOpen => "gzopen",
        }
    }
}

/// HTTP method of a signed request. Part of the string to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote endpoint. `host` and `path` also feed the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    pub host: String,
    pub path: String,
}

fn default_scheme() -> String {
    "https".into()
}

impl Endpoint {
    pub fn new(scheme: &str, host: &str, path: &str) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
        }
    }

    /// Category and media management endpoint.
    pub fn api() -> Self {
        Self::new("https", API_HOST, API_PATH)
    }

    /// Upload endpoint.
    pub fn upload() -> Self {
        Self::new("https", UPLOAD_HOST, UPLOAD_PATH)
    }

    /// Full request URL.
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

/// Optional metadata attached to an upload. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub is_transcode: bool,
    #[serde(default)]
    pub is_screenshot: bool,
    #[serde(default)]
    pub is_watermark: bool,
    /// Storage lifetime requested for the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_time: Option<i64>,
}

/// Task priority of pull uploads and file deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "1",
            Priority::Medium => "0",
            Priority::Low => "2",
        }
    }
}

/// One entry of a pull-upload batch: the service fetches `url` itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub url: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_md5: Option<String>,
    #[serde(default)]
    pub is_transcode: bool,
    #[serde(default)]
    pub is_screenshot: bool,
    #[serde(default)]
    pub is_watermark: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// A part the server already holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInfo {
    pub offset: u64,
    #[serde(rename = "dataLen")]
    pub length: u64,
    #[serde(rename = "dataMd5")]
    pub md5: String,
}

impl PartInfo {
    /// Exclusive end offset.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Identity of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSuccess {
    pub file_id: String,
    pub url: String,
}
