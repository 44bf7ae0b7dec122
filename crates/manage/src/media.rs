//! Media file metadata: play URLs, file info, tags and deletion.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vodsdk_protocol::constants::keys;
use vodsdk_protocol::{Action, Priority, VodError};
use vodsdk_transport::{Call, Dispatcher};

const VID: &str = "vid";
const PAGE_NO: &str = "pageNo";
const PAGE_SIZE: &str = "pageSize";
const INFO_FILTER: &str = "infoFilter";
const FILE_INTRO: &str = "fileIntro";
const EXPIRE_TIME: &str = "expireTime";

/// One playable rendition of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayInfo {
    pub url: String,
    #[serde(default)]
    pub definition: i64,
    #[serde(default, rename = "vbitrate")]
    pub bitrate: i64,
    #[serde(default, rename = "vheight")]
    pub height: i64,
    #[serde(default, rename = "vwidth")]
    pub width: i64,
}

/// A media file with its renditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(rename = "fileId")]
    pub file_id: String,
    #[serde(default, rename = "fileName")]
    pub file_name: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, rename = "playSet")]
    pub play_set: Vec<PlayInfo>,
}

/// Sections of `GetVideoInfo` to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoFilter {
    BasicInfo,
    TranscodeInfo,
    ImageSpriteInfo,
    SnapshotByTimeOffsetInfo,
}

impl InfoFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            InfoFilter::BasicInfo => "basicInfo",
            InfoFilter::TranscodeInfo => "transcodeInfo",
            InfoFilter::ImageSpriteInfo => "imageSpriteInfo",
            InfoFilter::SnapshotByTimeOffsetInfo => "snapshotByTimeOffsetInfo",
        }
    }
}

/// Changes applied by [`MediaManager::modify_vod_info`]. Unset fields are
/// left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyVodInfo {
    pub class_id: Option<i64>,
    pub file_name: Option<String>,
    pub file_intro: Option<String>,
    /// Expiry as the service's `yyyy-MM-dd HH:mm:ss` text.
    pub expire_time: Option<String>,
}

impl ModifyVodInfo {
    pub fn is_empty(&self) -> bool {
        self.class_id.is_none()
            && self.file_name.is_none()
            && self.file_intro.is_none()
            && self.expire_time.is_none()
    }
}

#[derive(Deserialize)]
struct PlaySet {
    #[serde(default, rename = "playSet")]
    play_set: Vec<PlayInfo>,
}

#[derive(Deserialize)]
struct FileSet {
    #[serde(default, rename = "fileSet")]
    file_set: Vec<FileInfo>,
}

/// Media file operations.
pub struct MediaManager {
    dispatcher: Arc<Dispatcher>,
}

impl MediaManager {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn describe_vod_play_urls(&self, file_id: &str) -> Result<Vec<PlayInfo>, VodError> {
        require(keys::FILE_ID, file_id)?;
        let call = Call::api(Action::DescribeVodPlayUrls).param(keys::FILE_ID, file_id);
        let set: PlaySet = self.dispatcher.call_checked(&call).await?.into_body()?;
        debug!(file_id, renditions = set.play_set.len(), "play urls");
        Ok(set.play_set)
    }

    /// Files recorded under a live-stream video id.
    pub async fn describe_record_play_info(&self, vid: &str) -> Result<Vec<FileInfo>, VodError> {
        require(VID, vid)?;
        let call = Call::api(Action::DescribeRecordPlayInfo).param(VID, vid);
        let set: FileSet = self.dispatcher.call_checked(&call).await?.into_body()?;
        Ok(set.file_set)
    }

    /// Files whose name starts with `file_name`, paged.
    pub async fn describe_vod_play_info(
        &self,
        file_name: &str,
        page_no: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<FileInfo>, VodError> {
        require(keys::FILE_NAME, file_name)?;
        let call = Call::api(Action::DescribeVodPlayInfo)
            .param(keys::FILE_NAME, file_name)
            .param_opt(PAGE_NO, page_no)
            .param_opt(PAGE_SIZE, page_size);
        let set: FileSet = self.dispatcher.call_checked(&call).await?.into_body()?;
        Ok(set.file_set)
    }

    /// Raw `GetVideoInfo` reply body. An empty `filters` returns every section.
    pub async fn get_video_info(
        &self,
        file_id: &str,
        filters: &[InfoFilter],
    ) -> Result<serde_json::Value, VodError> {
        require(keys::FILE_ID, file_id)?;
        let names: Vec<&str> = filters.iter().map(|f| f.as_str()).collect();
        let call = Call::api(Action::GetVideoInfo)
            .param(keys::FILE_ID, file_id)
            .indexed(INFO_FILTER, &names);
        let reply = self.dispatcher.call_checked(&call).await?;
        Ok(serde_json::Value::Object(reply.body))
    }

    pub async fn modify_vod_info(
        &self,
        file_id: &str,
        changes: &ModifyVodInfo,
    ) -> Result<(), VodError> {
        require(keys::FILE_ID, file_id)?;
        if changes.is_empty() {
            return Err(VodError::param("no changes given"));
        }
        let call = Call::api(Action::ModifyVodInfo)
            .param(keys::FILE_ID, file_id)
            .param_opt(keys::CLASS_ID, changes.class_id)
            .param_opt(keys::FILE_NAME, changes.file_name.as_deref())
            .param_opt(FILE_INTRO, changes.file_intro.as_deref())
            .param_opt(EXPIRE_TIME, changes.expire_time.as_deref());
        self.dispatcher.call_checked(&call).await?;
        info!(file_id, "file info modified");
        Ok(())
    }

    pub async fn create_vod_tags<S: AsRef<str>>(
        &self,
        file_id: &str,
        tags: &[S],
    ) -> Result<(), VodError> {
        self.tags(Action::CreateVodTags, file_id, tags).await
    }

    pub async fn delete_vod_tags<S: AsRef<str>>(
        &self,
        file_id: &str,
        tags: &[S],
    ) -> Result<(), VodError> {
        self.tags(Action::DeleteVodTags, file_id, tags).await
    }

    async fn tags<S: AsRef<str>>(
        &self,
        action: Action,
        file_id: &str,
        tags: &[S],
    ) -> Result<(), VodError> {
        require(keys::FILE_ID, file_id)?;
        if tags.is_empty() {
            return Err(VodError::param("tag list is empty"));
        }
        let call = Call::api(action)
            .param(keys::FILE_ID, file_id)
            .indexed(keys::TAGS, tags);
        self.dispatcher.call_checked(&call).await?;
        debug!(%action, file_id, count = tags.len(), "tags updated");
        Ok(())
    }

    /// Deletes a file and everything derived from it.
    pub async fn delete_vod_file(&self, file_id: &str, priority: Priority) -> Result<(), VodError> {
        require(keys::FILE_ID, file_id)?;
        let call = Call::api(Action::DeleteVodFile)
            .param(keys::FILE_ID, file_id)
            .param(keys::PRIORITY, priority.as_str());
        self.dispatcher.call_checked(&call).await?;
        info!(file_id, "file deleted");
        Ok(())
    }
}

fn require(name: &str, value: &str) -> Result<(), VodError> {
    if value.trim().is_empty() {
        return Err(VodError::param(format!("{name} is blank")));
    }
    Ok(())
}
