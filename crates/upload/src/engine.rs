//! Upload protocol engine.
//!
//! [`UploadEngine::upload_vod_file`] drives one [`UploadSession`] through
//! init, sequential part upload (fresh or resumed) and finish. The three
//! protocol calls are also exposed on their own for callers that manage
//! sessions themselves.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vodsdk_protocol::constants::keys;
use vodsdk_protocol::response::{decode_ack, decode_init, decode_uploaded};
use vodsdk_protocol::{
    Action, InitResult, Priority, PullRequest, UploadOptions, UploadSuccess, VodError,
};
use vodsdk_transfer::{
    LocalFile, Part, PartReader, PlanStep, TransferError, UploadSession, file_sha1, inspect_file,
    sha1_hex, validate_file_name,
};
use vodsdk_transport::{Call, Dispatcher};

use crate::guard::ActiveUploads;
use crate::retry::send_with_retry;
use crate::types::UploadEvent;

/// Uploads files to the VOD service.
pub struct UploadEngine {
    dispatcher: Arc<Dispatcher>,
    active: ActiveUploads,
}

impl UploadEngine {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            active: ActiveUploads::default(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Opens or resumes the server-side upload for `session`.
    ///
    /// Never returns [`InitResult::Error`]: faults are retried while the
    /// server allows it, then surface as a server error.
    pub async fn init_upload(
        &self,
        session: &UploadSession,
        options: &UploadOptions,
    ) -> Result<InitResult, VodError> {
        require(keys::FILE_NAME, session.file_name())?;
        require(keys::FILE_SHA, session.file_sha())?;
        require(keys::FILE_TYPE, session.file_type())?;

        let call = Call::upload(Action::InitUpload)
            .param(keys::FILE_NAME, session.file_name())
            .param(keys::FILE_SHA, session.file_sha())
            .param(keys::FILE_SIZE, session.file_size())
            .param(keys::DATA_SIZE, session.part_size())
            .param(keys::FILE_TYPE, session.file_type());
        let call = with_options(call, options);

        send_with_retry(&self.dispatcher, &call, |raw| {
            Ok(decode_init(raw)?.into_reply())
        })
        .await
    }

    /// Uploads one part. Safe to repeat with the same arguments.
    pub async fn upload_part(&self, file_sha: &str, part: &Part) -> Result<(), VodError> {
        require(keys::FILE_SHA, file_sha)?;
        if part.data.len() as u64 != part.length {
            return Err(VodError::param(format!(
                "part at {} declares {} bytes but carries {}",
                part.offset,
                part.length,
                part.data.len()
            )));
        }

        let call = Call::upload(Action::UploadPart)
            .param(keys::FILE_SHA, file_sha)
            .param(keys::OFFSET, part.offset)
            .param(keys::DATA_SIZE, part.length)
            .param(keys::DATA_MD5, &part.md5)
            .bytes(part.data.clone());

        send_with_retry(&self.dispatcher, &call, decode_ack).await
    }

    /// Asks the server to assemble the uploaded parts.
    pub async fn finish_upload(&self, file_sha: &str) -> Result<UploadSuccess, VodError> {
        require(keys::FILE_SHA, file_sha)?;
        let call = Call::upload(Action::FinishUpload).param(keys::FILE_SHA, file_sha);
        send_with_retry(&self.dispatcher, &call, decode_uploaded).await
    }

    /// Uploads the file at `path`, resuming a previous partial upload.
    ///
    /// The upload name is the file name without its type extension; the
    /// type comes from `file_type` or the extension. Progress is reported
    /// on `events` when given. On failure the server keeps the parts it
    /// acknowledged and calling again resumes from them.
    pub async fn upload_vod_file(
        &self,
        path: impl AsRef<Path>,
        file_type: Option<&str>,
        options: &UploadOptions,
        events: Option<mpsc::Sender<UploadEvent>>,
    ) -> Result<UploadSuccess, VodError> {
        let path = path.as_ref().to_path_buf();
        let file_type = file_type.map(str::to_string);
        let (file, file_sha) = blocking(move || {
            let file = inspect_file(&path, file_type.as_deref())?;
            let sha = file_sha1(&file.path)?;
            Ok((file, sha))
        })
        .await?;

        let _claim = self.active.claim(&file_sha)?;
        let part_size = self.dispatcher.config().part_size;
        let mut session = UploadSession::new(
            &file.file_name,
            &file.file_type,
            &file_sha,
            file.size,
            part_size,
        )?;
        debug!(
            file = %file.path.display(),
            file_sha = %file_sha,
            size = file.size,
            part_size,
            "starting upload"
        );

        let events = Events(events);
        match self.run(&mut session, &file, options, &events).await {
            Ok(done) => {
                info!(file_sha = %file_sha, file_id = %done.file_id, "upload complete");
                events.emit(UploadEvent::Completed(done.clone())).await;
                Ok(done)
            }
            Err(e) => {
                session.fail();
                warn!(
                    file_sha = %file_sha,
                    cursor = session.cursor(),
                    error = %e,
                    "upload failed"
                );
                events
                    .emit(UploadEvent::Failed {
                        error: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        session: &mut UploadSession,
        file: &LocalFile,
        options: &UploadOptions,
        events: &Events,
    ) -> Result<UploadSuccess, VodError> {
        let (plan, resumed) = match self.init_upload(session, options).await? {
            InitResult::FreshUpload => (session.begin_fresh()?, false),
            InitResult::Resume { data_size, parts } => {
                (session.begin_resume(data_size, parts)?, true)
            }
            InitResult::AlreadyUploaded(done) => {
                info!(
                    file_sha = %session.file_sha(),
                    file_id = %done.file_id,
                    "file already uploaded"
                );
                session.complete_existing(done.clone())?;
                return Ok(done);
            }
            InitResult::Error(fault) => return Err(fault.into_error()),
        };

        events
            .emit(UploadEvent::Initialized {
                file_sha: session.file_sha().to_string(),
                resumed,
                parts: plan.upload.len(),
                bytes: plan.upload_bytes(),
            })
            .await;

        let part_size = session.part_size();
        let mut reader = blocking({
            let path = file.path.clone();
            move || PartReader::new(&path, part_size)
        })
        .await?;

        for step in plan.steps() {
            match step {
                PlanStep::Skip(part) => {
                    session.record_skipped(&part)?;
                    events
                        .emit(UploadEvent::PartSkipped {
                            offset: part.offset,
                            length: part.length,
                        })
                        .await;
                }
                PlanStep::Upload(range) => {
                    let (returned, part) = blocking(move || {
                        let part = reader.read_range(range.offset, range.length)?;
                        Ok((reader, part))
                    })
                    .await?;
                    reader = returned;

                    let part = part.ok_or_else(|| {
                        VodError::param(format!("file ended before offset {}", range.offset))
                    })?;
                    if part.length != range.length {
                        warn!(
                            offset = part.offset,
                            expected = range.length,
                            actual = part.length,
                            "short read, file changed during upload"
                        );
                    }

                    self.upload_part(session.file_sha(), &part).await?;
                    session.record_uploaded(part.offset, part.length)?;
                    debug!(offset = part.offset, length = part.length, "part uploaded");
                    events
                        .emit(UploadEvent::PartUploaded {
                            offset: part.offset,
                            length: part.length,
                        })
                        .await;
                }
            }
        }

        session.begin_finalize()?;
        let done = self.finish_upload(session.file_sha()).await?;
        session.complete(done.clone())?;
        Ok(done)
    }

    /// Uploads `data` in a single request.
    ///
    /// With `vod_file_id` the data is stored as the cover image of that
    /// file.
    pub async fn small_file_upload(
        &self,
        file_name: &str,
        file_type: &str,
        data: Vec<u8>,
        vod_file_id: Option<&str>,
    ) -> Result<UploadSuccess, VodError> {
        validate_file_name(file_name)?;
        require(keys::FILE_TYPE, file_type)?;
        if data.is_empty() {
            return Err(VodError::param("data is empty"));
        }

        let file_sha = sha1_hex(&data);
        let size = data.len() as u64;
        let mut call = Call::upload(Action::SmallFileUpload)
            .param(keys::FILE_NAME, file_name)
            .param(keys::FILE_SHA, &file_sha)
            .param(keys::FILE_SIZE, size)
            .param(keys::DATA_SIZE, size)
            .param(keys::FILE_TYPE, file_type);
        if let Some(id) = vod_file_id {
            call = call
                .param(keys::EXTRA_USAGE, keys::VALUE_TRUE)
                .param(keys::EXTRA_FILE_ID, id);
        }
        let call = call.bytes(data);

        let done = send_with_retry(&self.dispatcher, &call, decode_uploaded).await?;
        info!(file_sha = %file_sha, file_id = %done.file_id, "small file uploaded");
        Ok(done)
    }

    /// Asks the service to fetch each URL itself.
    pub async fn multi_pull_vod_file(&self, list: &[PullRequest]) -> Result<(), VodError> {
        if list.is_empty() {
            return Err(VodError::param("pull list is empty"));
        }

        let mut call = Call::api(Action::MultiPullVodFile).regional(true).form();
        for (i, pull) in list.iter().enumerate() {
            require(keys::URL, &pull.url)?;
            require(keys::FILE_NAME, &pull.file_name)?;

            let key = |name: &str| format!("{}.{}.{name}", keys::PULLSET, i + 1);
            call = call
                .param(key(keys::URL), &pull.url)
                .param(key(keys::FILE_NAME), &pull.file_name)
                .param_opt(key(keys::FILE_MD5), pull.file_md5.as_deref())
                .param_opt(key(keys::CLASS_ID), pull.class_id)
                .param_opt(key(keys::PRIORITY), pull.priority.map(Priority::as_str));
            for (name, on) in [
                (keys::IS_TRANSCODE, pull.is_transcode),
                (keys::IS_SCREENSHOT, pull.is_screenshot),
                (keys::IS_WATERMARK, pull.is_watermark),
            ] {
                if on {
                    call = call.param(key(name), keys::VALUE_TRUE);
                }
            }
            if !pull.tags.is_empty() {
                call = call.param(key(keys::TAGS), pull.tags.join(","));
            }
        }

        let reply = self.dispatcher.call(&call).await?;
        if reply.code < 0 {
            return Err(VodError::server(reply.code, reply.message()));
        }
        info!(count = list.len(), "pull upload submitted");
        Ok(())
    }
}

/// Adds the optional init parameters.
fn with_options(call: Call, options: &UploadOptions) -> Call {
    let mut call = call
        .param_opt(keys::CLASS_ID, options.class_id)
        .param_opt(keys::STORE_TIME, options.store_time)
        .indexed(keys::TAGS, options.tags.as_slice());
    for (name, on) in [
        (keys::IS_TRANSCODE, options.is_transcode),
        (keys::IS_SCREENSHOT, options.is_screenshot),
        (keys::IS_WATERMARK, options.is_watermark),
    ] {
        if on {
            call = call.param(name, keys::VALUE_TRUE);
        }
    }
    call
}

fn require(name: &str, value: &str) -> Result<(), VodError> {
    if value.trim().is_empty() {
        return Err(VodError::param(format!("{name} is blank")));
    }
    Ok(())
}

/// Runs file work off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, VodError>
where
    F: FnOnce() -> Result<T, TransferError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| VodError::Io(std::io::Error::other(format!("file task failed: {e}"))))?;
    Ok(result?)
}

struct Events(Option<mpsc::Sender<UploadEvent>>);

impl Events {
    async fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeVod, dispatcher, param};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use vodsdk_protocol::constants::{PARAM_ERROR_CODE, SERVER_ERROR_CODE};
    use vodsdk_transfer::md5_hex;
    use vodsdk_transport::RequestBody;

    const MIB: usize = 1_048_576;
    const FRESH: &str = r#"{"code":0,"message":""}"#;
    const ACK: &str = r#"{"code":0,"message":""}"#;
    const FINISHED: &str = r#"{"code":0,"fileId":"f1","url":"https://vod.example/f1"}"#;
    const RETRYABLE: &str = r#"{"code":-1,"message":"busy","canRetry":1}"#;

    fn video(dir: &Path, name: &str, size: usize) -> (PathBuf, Vec<u8>) {
        let data: Vec<u8> = (0..size).map(|i| (i % 253) as u8).collect();
        let path = dir.join(name);
        std::fs::write(&path, &data).unwrap();
        (path, data)
    }

    fn engine(fake: &Arc<FakeVod>) -> UploadEngine {
        UploadEngine::new(dispatcher(fake.clone(), 3))
    }

    fn part_offsets(fake: &FakeVod) -> Vec<u64> {
        fake.requests("UploadPart")
            .iter()
            .map(|r| param(r, "offset").unwrap().parse().unwrap())
            .collect()
    }

    fn resume_reply(parts: &[(usize, usize, &str)]) -> String {
        let list: Vec<String> = parts
            .iter()
            .map(|(o, l, m)| format!(r#"{{"offset":{o},"dataLen":{l},"dataMd5":"{m}"}}"#))
            .collect();
        format!(
            r#"{{"code":1,"codeDesc":"resume","dataSize":{MIB},"listParts":[{}]}}"#,
            list.join(",")
        )
    }

    #[tokio::test]
    async fn fresh_upload_end_to_end() {
        let dir = TempDir::new().unwrap();
        let (path, data) = video(dir.path(), "holiday.mp4", 1_500_000);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[FRESH]);
        fake.script("UploadPart", &[ACK]);
        fake.script("FinishUpload", &[FINISHED]);

        let done = engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(done.file_id, "f1");
        assert_eq!(done.url, "https://vod.example/f1");

        let sha = sha1_hex(&data);
        let init = &fake.requests("InitUpload")[0];
        assert_eq!(param(init, "fileName").as_deref(), Some("holiday"));
        assert_eq!(param(init, "fileType").as_deref(), Some("mp4"));
        assert_eq!(param(init, "fileSize").as_deref(), Some("1500000"));
        assert_eq!(param(init, "dataSize").as_deref(), Some("1048576"));
        assert_eq!(param(init, "fileSha"), Some(sha.clone()));

        let parts = fake.requests("UploadPart");
        assert_eq!(parts.len(), 2);
        assert_eq!(part_offsets(&fake), vec![0, MIB as u64]);
        assert_eq!(param(&parts[0], "dataSize").as_deref(), Some("1048576"));
        assert_eq!(param(&parts[1], "dataSize").as_deref(), Some("451424"));
        assert_eq!(param(&parts[1], "dataMd5"), Some(md5_hex(&data[MIB..])));
        assert_eq!(parts[1].body, RequestBody::Bytes(data[MIB..].to_vec()));
        for r in &parts {
            assert_eq!(param(r, "fileSha"), Some(sha.clone()));
        }

        assert_eq!(fake.requests("FinishUpload").len(), 1);
    }

    #[tokio::test]
    async fn resume_uploads_only_missing_tail() {
        let dir = TempDir::new().unwrap();
        let (path, data) = video(dir.path(), "holiday.mp4", 1_500_000);
        let fake = FakeVod::new();
        let head_md5 = md5_hex(&data[..MIB]);
        fake.script("InitUpload", &[&resume_reply(&[(0, MIB, &head_md5)])]);
        fake.script("UploadPart", &[ACK]);
        fake.script("FinishUpload", &[FINISHED]);

        let (tx, mut rx) = mpsc::channel(16);
        let done = engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), Some(tx))
            .await
            .unwrap();
        assert_eq!(done.file_id, "f1");
        assert_eq!(part_offsets(&fake), vec![MIB as u64]);

        let mut events = Vec::new();
        while let Some(e) = rx.recv().await {
            events.push(e);
        }
        assert_eq!(
            events[0],
            UploadEvent::Initialized {
                file_sha: sha1_hex(&data),
                resumed: true,
                parts: 1,
                bytes: 451_424,
            }
        );
        assert_eq!(
            events[1],
            UploadEvent::PartSkipped {
                offset: 0,
                length: MIB as u64
            }
        );
        assert_eq!(
            events[2],
            UploadEvent::PartUploaded {
                offset: MIB as u64,
                length: 451_424
            }
        );
        assert!(matches!(events[3], UploadEvent::Completed(_)));
    }

    #[tokio::test]
    async fn file_growing_after_hash_keeps_declared_size() {
        let dir = TempDir::new().unwrap();
        let (path, data) = video(dir.path(), "holiday.mp4", 1_500_000);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[FRESH]);
        fake.script("UploadPart", &[ACK]);
        fake.script("FinishUpload", &[FINISHED]);
        let grown = path.clone();
        fake.on_request(move |action| {
            if action == "InitUpload" {
                use std::io::Write;
                let mut f = std::fs::OpenOptions::new().append(true).open(&grown).unwrap();
                f.write_all(&[0u8; 5000]).unwrap();
            }
        });

        engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap();

        let parts = fake.requests("UploadPart");
        assert_eq!(parts.len(), 2);
        assert_eq!(param(&parts[1], "dataSize").as_deref(), Some("451424"));
        assert_eq!(parts[1].body, RequestBody::Bytes(data[MIB..].to_vec()));
    }

    #[tokio::test]
    async fn resume_without_listed_parts_reports_resumed() {
        let dir = TempDir::new().unwrap();
        let (path, _) = video(dir.path(), "holiday.mp4", 1_500_000);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[&resume_reply(&[])]);
        fake.script("UploadPart", &[ACK]);
        fake.script("FinishUpload", &[FINISHED]);

        let (tx, mut rx) = mpsc::channel(16);
        engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), Some(tx))
            .await
            .unwrap();

        match rx.recv().await {
            Some(UploadEvent::Initialized { resumed, parts, .. }) => {
                assert!(resumed);
                assert_eq!(parts, 2);
            }
            other => panic!("expected Initialized, got {other:?}"),
        }
        assert_eq!(part_offsets(&fake), vec![0, MIB as u64]);
    }

    #[tokio::test]
    async fn interrupted_upload_resumes_without_reuploading() {
        let dir = TempDir::new().unwrap();
        let (path, data) = video(dir.path(), "clip.mp4", 3 * MIB + 10);
        let engine_fake = FakeVod::new();
        engine_fake.script("InitUpload", &[FRESH]);
        engine_fake.script(
            "UploadPart",
            &[ACK, ACK, r#"{"code":-20010,"message":"storage full","canRetry":0}"#],
        );
        let engine = engine(&engine_fake);

        let err = engine
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), -20010);
        let first_run = part_offsets(&engine_fake);
        assert_eq!(first_run, vec![0, MIB as u64, 2 * MIB as u64]);
        assert!(engine_fake.requests("FinishUpload").is_empty());

        // The server kept the two acknowledged parts.
        let resumed = FakeVod::new();
        resumed.script(
            "InitUpload",
            &[&resume_reply(&[
                (0, MIB, &md5_hex(&data[..MIB])),
                (MIB, MIB, &md5_hex(&data[MIB..2 * MIB])),
            ])],
        );
        resumed.script("UploadPart", &[ACK]);
        resumed.script("FinishUpload", &[FINISHED]);
        let second = UploadEngine::new(dispatcher(resumed.clone(), 3))
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(second.file_id, "f1");

        // Acknowledged ranges from both runs tile the file exactly once.
        let mut acked: Vec<u64> = first_run[..2].to_vec();
        acked.extend(part_offsets(&resumed));
        assert_eq!(acked, vec![0, MIB as u64, 2 * MIB as u64, 3 * MIB as u64]);
    }

    #[tokio::test]
    async fn already_uploaded_skips_parts() {
        let dir = TempDir::new().unwrap();
        let (path, _) = video(dir.path(), "clip.mp4", 2048);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[r#"{"code":2,"fileId":"f7","url":"https://vod.example/f7"}"#]);

        let done = engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(done.file_id, "f7");
        assert_eq!(fake.total(), 1);
    }

    #[tokio::test]
    async fn init_retry_bound() {
        let dir = TempDir::new().unwrap();
        let (path, _) = video(dir.path(), "clip.mp4", 100);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[RETRYABLE]);

        let err = engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(fake.requests("InitUpload").len(), 3);
        assert!(matches!(err, VodError::Server { code: -1, .. }));
    }

    #[tokio::test]
    async fn retryable_part_fault_is_resent() {
        let dir = TempDir::new().unwrap();
        let (path, _) = video(dir.path(), "clip.mp4", 100);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[FRESH]);
        fake.script("UploadPart", &[RETRYABLE, ACK]);
        fake.script("FinishUpload", &[RETRYABLE, FINISHED]);

        engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap();
        let parts = fake.requests("UploadPart");
        assert_eq!(part_offsets(&fake), vec![0, 0]);
        // Each attempt carries its own signature.
        assert!(param(&parts[0], "Signature").is_some());
        assert!(param(&parts[1], "Signature").is_some());
        assert_eq!(fake.requests("FinishUpload").len(), 2);
    }

    #[tokio::test]
    async fn misaligned_resume_is_param_error() {
        let dir = TempDir::new().unwrap();
        let (path, _) = video(dir.path(), "clip.mp4", 3 * MIB);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[&resume_reply(&[(100, MIB, "x")])]);

        let err = engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), PARAM_ERROR_CODE);
        assert!(fake.requests("UploadPart").is_empty());
    }

    #[tokio::test]
    async fn resume_with_other_part_size_is_param_error() {
        let dir = TempDir::new().unwrap();
        let (path, _) = video(dir.path(), "clip.mp4", 2 * MIB);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[r#"{"code":1,"dataSize":524288,"listParts":[]}"#]);

        let err = engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), PARAM_ERROR_CODE);
    }

    #[tokio::test]
    async fn unknown_init_code_is_server_error() {
        let dir = TempDir::new().unwrap();
        let (path, _) = video(dir.path(), "clip.mp4", 10);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[r#"{"code":5,"message":"?"}"#]);

        let err = engine(&fake)
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, VodError::Server { code: 5, .. }));
    }

    #[tokio::test]
    async fn missing_file_fails_before_any_request() {
        let dir = TempDir::new().unwrap();
        let fake = FakeVod::new();
        let err = engine(&fake)
            .upload_vod_file(dir.path().join("gone.mp4"), None, &UploadOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), PARAM_ERROR_CODE);
        assert_eq!(fake.total(), 0);
    }

    #[tokio::test]
    async fn concurrent_upload_of_same_file_rejected() {
        let dir = TempDir::new().unwrap();
        let (path, data) = video(dir.path(), "clip.mp4", 64);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[FRESH]);
        fake.script("UploadPart", &[ACK]);
        fake.script("FinishUpload", &[FINISHED]);
        let engine = engine(&fake);

        let claim = engine.active.claim(&sha1_hex(&data)).unwrap();
        let err = engine
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), PARAM_ERROR_CODE);
        assert_eq!(fake.total(), 0);

        drop(claim);
        engine
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn guard_released_after_failure() {
        let dir = TempDir::new().unwrap();
        let (path, data) = video(dir.path(), "clip.mp4", 64);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[r#"{"code":-3,"message":"denied"}"#]);
        let engine = engine(&fake);

        assert!(engine
            .upload_vod_file(&path, None, &UploadOptions::default(), None)
            .await
            .is_err());
        assert!(!engine.active.is_active(&sha1_hex(&data)));
    }

    #[tokio::test]
    async fn init_carries_optional_params() {
        let dir = TempDir::new().unwrap();
        let (path, _) = video(dir.path(), "raw.bin", 10);
        let fake = FakeVod::new();
        fake.script("InitUpload", &[r#"{"code":2,"fileId":"f","url":"u"}"#]);

        let options = UploadOptions {
            tags: vec!["travel".into(), "2024".into()],
            class_id: Some(12),
            is_transcode: true,
            is_screenshot: false,
            is_watermark: true,
            store_time: Some(86_400),
        };
        engine(&fake)
            .upload_vod_file(&path, Some("mp4"), &options, None)
            .await
            .unwrap();

        let init = &fake.requests("InitUpload")[0];
        assert_eq!(param(init, "fileName").as_deref(), Some("raw"));
        assert_eq!(param(init, "fileType").as_deref(), Some("mp4"));
        assert_eq!(param(init, "tags.1").as_deref(), Some("travel"));
        assert_eq!(param(init, "tags.2").as_deref(), Some("2024"));
        assert_eq!(param(init, "classId").as_deref(), Some("12"));
        assert_eq!(param(init, "isTranscode").as_deref(), Some("1"));
        assert_eq!(param(init, "isScreenshot"), None);
        assert_eq!(param(init, "isWatermark").as_deref(), Some("1"));
        assert_eq!(param(init, "storeTime").as_deref(), Some("86400"));
    }

    #[tokio::test]
    async fn upload_part_rejects_length_mismatch() {
        let fake = FakeVod::new();
        let part = Part {
            offset: 0,
            length: 10,
            md5: md5_hex(b"abc"),
            data: b"abc".to_vec(),
        };
        let err = engine(&fake).upload_part("sha", &part).await.unwrap_err();
        assert_eq!(err.code(), PARAM_ERROR_CODE);
        assert_eq!(fake.total(), 0);
    }

    #[tokio::test]
    async fn finish_without_ids_is_malformed() {
        let fake = FakeVod::new();
        fake.script("FinishUpload", &[r#"{"code":0,"fileId":"f1"}"#]);
        let err = engine(&fake).finish_upload("sha").await.unwrap_err();
        assert_eq!(err.code(), SERVER_ERROR_CODE);
    }

    #[tokio::test]
    async fn small_file_upload_sends_whole_body() {
        let fake = FakeVod::new();
        fake.script("SmallFileUpload", &[FINISHED]);

        let done = engine(&fake)
            .small_file_upload("cover", "jpg", b"JPEGDATA".to_vec(), Some("f1"))
            .await
            .unwrap();
        assert_eq!(done.file_id, "f1");

        let req = &fake.requests("SmallFileUpload")[0];
        assert_eq!(param(req, "fileSha"), Some(sha1_hex(b"JPEGDATA")));
        assert_eq!(param(req, "fileSize").as_deref(), Some("8"));
        assert_eq!(param(req, "dataSize").as_deref(), Some("8"));
        assert_eq!(param(req, "extra.usage").as_deref(), Some("1"));
        assert_eq!(param(req, "extra.fileId").as_deref(), Some("f1"));
        assert_eq!(req.body, RequestBody::Bytes(b"JPEGDATA".to_vec()));
    }

    #[tokio::test]
    async fn small_file_upload_validates_input() {
        let fake = FakeVod::new();
        let e = engine(&fake);
        assert!(e.small_file_upload("a/b", "jpg", vec![1], None).await.is_err());
        assert!(e.small_file_upload("cover", " ", vec![1], None).await.is_err());
        assert!(e.small_file_upload("cover", "jpg", vec![], None).await.is_err());
        assert_eq!(fake.total(), 0);
    }

    #[tokio::test]
    async fn pull_upload_form_fields() {
        let fake = FakeVod::new();
        fake.script("MultiPullVodFile", &[r#"{"code":0}"#]);

        let list = vec![
            PullRequest {
                url: "http://media.example/a.mp4".into(),
                file_name: "a".into(),
                tags: vec!["x".into(), "y".into()],
                priority: Some(Priority::High),
                is_transcode: true,
                ..PullRequest::default()
            },
            PullRequest {
                url: "http://media.example/b.mp4".into(),
                file_name: "b".into(),
                file_md5: Some("abc".into()),
                class_id: Some(3),
                ..PullRequest::default()
            },
        ];
        engine(&fake).multi_pull_vod_file(&list).await.unwrap();

        let req = &fake.requests("MultiPullVodFile")[0];
        assert!(req.query.is_empty());
        assert_eq!(param(req, "pullset.1.url").as_deref(), Some("http://media.example/a.mp4"));
        assert_eq!(param(req, "pullset.1.tags").as_deref(), Some("x,y"));
        assert_eq!(param(req, "pullset.1.priority").as_deref(), Some("1"));
        assert_eq!(param(req, "pullset.1.isTranscode").as_deref(), Some("1"));
        assert_eq!(param(req, "pullset.2.fileMd5").as_deref(), Some("abc"));
        assert_eq!(param(req, "pullset.2.classId").as_deref(), Some("3"));
        assert_eq!(param(req, "pullset.2.tags"), None);
    }

    #[tokio::test]
    async fn pull_upload_errors() {
        let fake = FakeVod::new();
        assert_eq!(
            engine(&fake).multi_pull_vod_file(&[]).await.unwrap_err().code(),
            PARAM_ERROR_CODE
        );

        fake.script("MultiPullVodFile", &[r#"{"code":-5,"message":"quota"}"#]);
        let list = vec![PullRequest {
            url: "http://media.example/a.mp4".into(),
            file_name: "a".into(),
            ..PullRequest::default()
        }];
        let err = engine(&fake).multi_pull_vod_file(&list).await.unwrap_err();
        assert!(matches!(err, VodError::Server { code: -5, .. }));
    }
}
