//! End-to-end exercise of the media intake pipeline against real
//! filesystem storage: validation, storage, rejection payload shape,
//! and the error view-models clients receive.

use forum_content::handlers::forms::SubmittedContent;
use forum_content::media::{MediaClass, MediaStore, UploadPart};
use forum_content::models::FormRejection;
use forum_content::services::{ModerationPolicy, PostMutationError, PostService};
use sqlx::postgres::PgPoolOptions;
use tempfile::tempdir;

fn part(name: &str, len: usize) -> UploadPart {
    UploadPart {
        original_name: name.to_string(),
        data: vec![7u8; len],
    }
}

#[test]
fn accepted_media_lands_in_class_directories() {
    let dir = tempdir().unwrap();
    let store = MediaStore::new(dir.path());

    let image = store
        .validate_and_store(Some(&part("cat.gif", 512)), MediaClass::Image)
        .unwrap()
        .expect("image stored");
    let video = store
        .validate_and_store(Some(&part("walk.webm", 2048)), MediaClass::Video)
        .unwrap()
        .expect("video stored");

    assert!(dir.path().join("images").join(&image).is_file());
    assert!(dir.path().join("videos").join(&video).is_file());
    assert_ne!(image, video);
}

#[test]
fn rejection_view_model_serializes_echoed_fields() {
    let dir = tempdir().unwrap();
    let store = MediaStore::new(dir.path());

    let err = store
        .validate_and_store(
            Some(&part("vacation.png", 20 * 1024 * 1024 + 1)),
            MediaClass::Image,
        )
        .unwrap_err();

    let mut rejection =
        FormRejection::with_fields(err.to_string(), "My trip", "We went places", &[2, 5]);
    rejection.filename = err.echoed_filename().map(str::to_string);

    let json = serde_json::to_value(&rejection).unwrap();
    assert_eq!(json["error"], true);
    assert_eq!(json["title"], "My trip");
    assert_eq!(json["tag_ids"], serde_json::json!([2, 5]));
    assert_eq!(json["filename"], "vacation.png");
    assert!(json["message"].as_str().unwrap().contains("20 MiB"));
}

#[test]
fn unsupported_format_rejection_omits_filename_field() {
    let dir = tempdir().unwrap();
    let store = MediaStore::new(dir.path());

    let err = store
        .validate_and_store(Some(&part("notes.txt", 16)), MediaClass::Image)
        .unwrap_err();

    let mut rejection = FormRejection::with_fields(err.to_string(), "t", "d", &[1]);
    rejection.filename = err.echoed_filename().map(str::to_string);

    let json = serde_json::to_value(&rejection).unwrap();
    assert!(json.get("filename").is_none());
    assert!(json["message"].as_str().unwrap().contains(".jpg"));
}

#[tokio::test]
async fn missing_fields_reject_before_any_file_is_written() {
    let dir = tempdir().unwrap();
    let store = MediaStore::new(dir.path());
    // Lazy pool: the rejection must fire before any database round-trip,
    // so no connection is ever attempted.
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unreachable")
        .unwrap();
    let service = PostService::new(pool, store, ModerationPolicy::new(false));

    let content = SubmittedContent {
        title: String::new(),
        description: "a body".to_string(),
        tag_ids: vec![1],
        image: Some(part("pic.png", 64)),
        video: None,
    };

    let err = service.create_post("ann", 0, content).await.unwrap_err();
    match err {
        PostMutationError::Rejected(rejection) => {
            assert_eq!(rejection.message, "Empty fields are not allowed");
        }
        PostMutationError::App(other) => panic!("expected a form rejection, got {other}"),
    }
    assert!(!dir.path().join("images").exists());
}

#[test]
fn nothing_is_written_for_rejected_uploads() {
    let dir = tempdir().unwrap();
    let store = MediaStore::new(dir.path());

    let _ = store.validate_and_store(Some(&part("huge.mp4", 101 * 1024 * 1024)), MediaClass::Video);
    let _ = store.validate_and_store(Some(&part("script.sh", 8)), MediaClass::Video);

    assert!(!dir.path().join("videos").exists());
}
