fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use vodsdk_manage::{ClassNode, ClassSummary, FileInfo, PlayInfo};
    use vodsdk_protocol::constants::SERVER_ERROR_CODE;
    use vodsdk_protocol::response::{decode_ack, decode_init, decode_uploaded};
    use vodsdk_protocol::{ApiReply, InitResult, Reply};

    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Raw reply body as the service sends it.
    fn load_raw(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Decodes the array under `field` of a successful reply.
    fn list_of<T: serde::de::DeserializeOwned>(
        name: &str,
        field: &str,
    ) -> (Vec<T>, serde_json::Value) {
        let reply = ApiReply::parse(&load_raw(name)).unwrap().ensure_success().unwrap();
        let raw = reply
            .body
            .get(field)
            .cloned()
            .unwrap_or_else(|| panic!("{name} has no {field}"));
        let items = serde_json::from_value(raw.clone())
            .unwrap_or_else(|e| panic!("failed to decode {name}.{field}: {e}"));
        (items, raw)
    }

    /// Re-serializes decoded items and compares with the fixture's JSON.
    fn assert_roundtrip<T: serde::Serialize>(name: &str, items: &[T], raw: &serde_json::Value) {
        let again = serde_json::to_value(items).unwrap();
        assert_eq!(&again, raw, "roundtrip mismatch for {name}");
    }

    // --- Upload replies ---

    #[test]
    fn init_fresh() {
        assert_eq!(decode_init(&load_raw("init_fresh.json")).unwrap(), InitResult::FreshUpload);
    }

    #[test]
    fn init_resume() {
        match decode_init(&load_raw("init_resume.json")).unwrap() {
            InitResult::Resume { data_size, parts } => {
                assert_eq!(data_size, 1_048_576);
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[1].offset, 2_097_152);
                assert_eq!(parts[1].length, 1_048_576);
                assert_eq!(parts[0].md5, "b6d81b360a5672d80c27430f39153e2c");
            }
            other => panic!("expected resume, got {other:?}"),
        }
    }

    #[test]
    fn init_resume_without_parts() {
        assert_eq!(
            decode_init(&load_raw("init_resume_no_parts.json")).unwrap(),
            InitResult::Resume {
                data_size: 524_288,
                parts: Vec::new()
            }
        );
    }

    #[test]
    fn init_already_uploaded() {
        match decode_init(&load_raw("init_already_uploaded.json")).unwrap() {
            InitResult::AlreadyUploaded(done) => {
                assert_eq!(done.file_id, "14508071098244931831");
                assert!(done.url.ends_with("/f0.mp4"));
            }
            other => panic!("expected already uploaded, got {other:?}"),
        }
    }

    #[test]
    fn init_faults() {
        match decode_init(&load_raw("init_fault_retryable.json")).unwrap() {
            InitResult::Error(fault) => {
                assert_eq!(fault.code, -1);
                assert!(fault.can_retry);
            }
            other => panic!("expected fault, got {other:?}"),
        }
        match decode_init(&load_raw("init_fault_final.json")).unwrap() {
            InitResult::Error(fault) => {
                assert_eq!(fault.code, -20001);
                assert!(!fault.can_retry);
                assert_eq!(fault.message, "signature mismatch");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn part_replies() {
        assert!(matches!(decode_ack(&load_raw("part_ack.json")).unwrap(), Reply::Done(())));
        match decode_ack(&load_raw("part_fault.json")).unwrap() {
            Reply::Fault(fault) => {
                assert_eq!(fault.code, -20002);
                assert!(fault.can_retry, "boolean canRetry is accepted");
            }
            Reply::Done(()) => panic!("expected fault"),
        }
    }

    #[test]
    fn finish_and_small_file() {
        for name in ["finish_upload.json", "small_file_upload.json"] {
            match decode_uploaded(&load_raw(name)).unwrap() {
                Reply::Done(done) => {
                    assert!(done.file_id.starts_with("1450807109824493183"));
                    assert!(done.url.starts_with("http://200000000.vod2.myqcloud.com/"));
                }
                Reply::Fault(fault) => panic!("{name}: unexpected fault {fault:?}"),
            }
        }
    }

    // --- Category and media replies ---

    #[test]
    fn class_tree() {
        let (roots, raw): (Vec<ClassNode>, _) = list_of("describe_all_class.json", "data");
        assert_eq!(roots.len(), 2);
        let football = &roots[0].children[0];
        assert_eq!(football.info.name, "football");
        assert_eq!(football.info.parent_id, 1);
        assert_eq!(football.info.file_count, 3);
        assert_roundtrip("describe_all_class.json", &roots, &raw);
    }

    #[test]
    fn class_list() {
        let (list, raw): (Vec<ClassSummary>, _) = list_of("describe_class.json", "data");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].create_time.to_string(), "2016-05-10 10:22:01");
        assert_roundtrip("describe_class.json", &list, &raw);
    }

    #[test]
    fn play_urls() {
        let (set, raw): (Vec<PlayInfo>, _) = list_of("describe_vod_play_urls.json", "playSet");
        assert_eq!(set[0].bitrate, 1_524_000);
        assert_eq!(set[1].definition, 20);
        assert_eq!(set[1].width, 640);
        assert_roundtrip("describe_vod_play_urls.json", &set, &raw);
    }

    #[test]
    fn record_play_info() {
        let (files, raw): (Vec<FileInfo>, _) = list_of("describe_record_play_info.json", "fileSet");
        assert_eq!(files[0].duration, 3600);
        assert_eq!(files[0].image_url.as_deref(), Some("http://v/cover.jpg"));
        assert_eq!(files[0].play_set.len(), 1);
        assert_roundtrip("describe_record_play_info.json", &files, &raw);
    }

    // --- Error envelopes ---

    #[test]
    fn server_error_envelope() {
        let reply = ApiReply::parse(&load_raw("server_error.json")).unwrap();
        assert_eq!(reply.code_desc.as_deref(), Some("InvalidParameter"));
        let err = reply.ensure_success().unwrap_err();
        assert_eq!(err.code(), 4000);
        assert!(err.to_string().contains("class not found"));
    }

    #[test]
    fn reply_without_code_is_malformed() {
        let err = ApiReply::parse(&load_raw("missing_code.json")).unwrap_err();
        assert_eq!(err.code(), SERVER_ERROR_CODE);
        let err = decode_init(&load_raw("missing_code.json")).unwrap_err();
        assert_eq!(err.code(), SERVER_ERROR_CODE);
    }
}
