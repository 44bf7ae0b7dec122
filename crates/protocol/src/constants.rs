use std::fmt;

use serde::{Deserialize, Serialize};

/// Default host for category and media management requests.
pub const API_HOST: &str = "vod.api.qcloud.com";

/// Default path for category and media management requests.
pub const API_PATH: &str = "/v2/index.php";

/// Default host for upload requests.
pub const UPLOAD_HOST: &str = "vod2.qcloud.com";

/// Default path for upload requests.
pub const UPLOAD_PATH: &str = "/v3/index.php";

/// Part size used when the caller does not pick one (1 MiB).
pub const DEFAULT_PART_SIZE: u64 = 1024 * 1024;

/// Maximum length of an uploaded file name, in bytes.
pub const MAX_FILE_NAME_BYTES: usize = 40;

/// Error code for invalid caller input.
pub const PARAM_ERROR_CODE: i64 = -11;

/// Error code for server failures without a server-supplied code.
pub const SERVER_ERROR_CODE: i64 = -12;

/// Error code for transport failures.
pub const NETWORK_ERROR_CODE: i64 = -13;

/// Request parameter names.
pub mod keys {
    // Common request parameters.
    pub const ACTION: &str = "Action";
    pub const REGION: &str = "Region";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const NONCE: &str = "Nonce";
    pub const SECRET_ID: &str = "SecretId";
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";

    // Upload fields.
    pub const FILE_NAME: &str = "fileName";
    pub const FILE_SHA: &str = "fileSha";
    pub const FILE_SIZE: &str = "fileSize";
    pub const DATA_SIZE: &str = "dataSize";
    pub const FILE_TYPE: &str = "fileType";
    pub const FILE_ID: &str = "fileId";
    pub const OFFSET: &str = "offset";
    pub const DATA_MD5: &str = "dataMd5";
    pub const URL: &str = "url";
    pub const TAGS: &str = "tags";
    pub const CLASS_ID: &str = "classId";
    pub const IS_TRANSCODE: &str = "isTranscode";
    pub const IS_SCREENSHOT: &str = "isScreenshot";
    pub const IS_WATERMARK: &str = "isWatermark";
    pub const STORE_TIME: &str = "storeTime";
    pub const EXTRA_USAGE: &str = "extra.usage";
    pub const EXTRA_FILE_ID: &str = "extra.fileId";
    pub const PULLSET: &str = "pullset";
    pub const FILE_MD5: &str = "fileMd5";
    pub const PRIORITY: &str = "priority";

    /// Flag value for enabled boolean options.
    pub const VALUE_TRUE: &str = "1";
}

/// Remote action identifier, sent as the `Action` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    // Upload
    InitUpload,
    UploadPart,
    FinishUpload,
    SmallFileUpload,
    MultiPullVodFile,

    // Categories
    CreateClass,
    DescribeAllClass,
    DescribeClass,
    ModifyClass,
    DeleteClass,

    // Media
    DescribeVodPlayUrls,
    DescribeRecordPlayInfo,
    DescribeVodPlayInfo,
    GetVideoInfo,
    ModifyVodInfo,
    CreateVodTags,
    DeleteVodTags,
    DeleteVodFile,
}

impl Action {
    /// Returns the wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::InitUpload => "InitUpload",
            Action::UploadPart => "UploadPart",
            Action::FinishUpload => "FinishUpload",
            Action::SmallFileUpload => "SmallFileUpload",
            Action::MultiPullVodFile => "MultiPullVodFile",
            Action::CreateClass => "CreateClass",
            Action::DescribeAllClass => "DescribeAllClass",
            Action::DescribeClass => "DescribeClass",
            Action::ModifyClass => "ModifyClass",
            Action::DeleteClass => "DeleteClass",
            Action::DescribeVodPlayUrls => "DescribeVodPlayUrls",
            Action::DescribeRecordPlayInfo => "DescribeRecordPlayInfo",
            Action::DescribeVodPlayInfo => "DescribeVodPlayInfo",
            Action::GetVideoInfo => "GetVideoInfo",
            Action::ModifyVodInfo => "ModifyVodInfo",
            Action::CreateVodTags => "CreateVodTags",
            Action::DeleteVodTags => "DeleteVodTags",
            Action::DeleteVodFile => "DeleteVodFile",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
