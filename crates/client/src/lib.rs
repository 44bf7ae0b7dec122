//! Client SDK for the VOD cloud service.
//!
//! [`VodClient`] is the entry point. It signs every request with one
//! [`Credential`] and exposes three services over a shared [`Dispatcher`]:
//!
//! - [`UploadEngine`] - chunked, resumable file upload, small-file upload
//!   and server-side URL pulls
//! - [`ClassManager`] - the category tree
//! - [`MediaManager`] - play URLs, file info, tags and deletion
//!
//! ```no_run
//! # async fn demo() -> Result<(), vodsdk::VodError> {
//! use vodsdk::{Credential, UploadOptions, VodClient};
//!
//! let client = VodClient::new(Credential::new(1255000000, "AKID...", "secret"))?;
//! let done = client
//!     .uploader()
//!     .upload_vod_file("trip.mp4", None, &UploadOptions::default(), None)
//!     .await?;
//! println!("{} -> {}", done.file_id, done.url);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::debug;

pub use vodsdk_manage::{
    ClassInfo, ClassManager, ClassNode, ClassSummary, ClassTree, FileInfo, InfoFilter,
    MediaManager, ModifyVodInfo, PlayInfo,
};
pub use vodsdk_protocol::{
    Endpoint, PartInfo, Priority, PullRequest, Region, UploadOptions, UploadSuccess, VodError,
};
pub use vodsdk_sign::Credential;
pub use vodsdk_transport::{
    ClientConfig, ConfigError, Dispatcher, HttpTransport, Transport, TransportError,
};
pub use vodsdk_upload::{UploadEngine, UploadEvent};

/// Entry point of the SDK.
///
/// Cloning is cheap; clones share the connection pool and the
/// in-progress upload guard.
#[derive(Clone)]
pub struct VodClient {
    dispatcher: Arc<Dispatcher>,
    classes: Arc<ClassManager>,
    media: Arc<MediaManager>,
    uploader: Arc<UploadEngine>,
}

impl VodClient {
    /// Client with the default configuration.
    pub fn new(credential: Credential) -> Result<Self, VodError> {
        Self::with_config(ClientConfig::default(), credential)
    }

    /// Client over the reqwest transport built from `config`.
    pub fn with_config(config: ClientConfig, credential: Credential) -> Result<Self, VodError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, credential, Arc::new(transport))
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(
        config: ClientConfig,
        credential: Credential,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, VodError> {
        config.validate()?;
        debug!(
            app_id = credential.app_id,
            region = ?config.region,
            part_size = config.part_size,
            "client configured"
        );
        let dispatcher = Arc::new(Dispatcher::new(transport, credential, config));
        Ok(Self {
            classes: Arc::new(ClassManager::new(dispatcher.clone())),
            media: Arc::new(MediaManager::new(dispatcher.clone())),
            uploader: Arc::new(UploadEngine::new(dispatcher.clone())),
            dispatcher,
        })
    }

    pub fn classes(&self) -> &Arc<ClassManager> {
        &self.classes
    }

    pub fn media(&self) -> &Arc<MediaManager> {
        &self.media
    }

    pub fn uploader(&self) -> &Arc<UploadEngine> {
        &self.uploader
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }
}
