//! Litterbox client against an httpmock stand-in for the service.

mod common;

use std::io::Cursor;
use std::sync::Arc;

use catbox_cli::litterbox::{UploadFileOptions, UploadStreamOptions};
use catbox_cli::{Error, FileLifetime, FileNameLength, Litterbox, USER_AGENT};
use common::{field, field_name, sample_png, Recorder};
use httpmock::prelude::*;

const LITTER_PATH: &str = "/resources/internals/api.php";

fn client(server: &MockServer) -> Litterbox {
    Litterbox::with_endpoint(server.url(LITTER_PATH)).unwrap()
}

#[test]
fn test_upload_file_defaults() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(LITTER_PATH)
            .header("user-agent", USER_AGENT)
            .body_includes(field("reqtype", "fileupload"))
            .body_includes("name=\"fileToUpload\"; filename=\"sample.png\"")
            .body_includes(field("time", "1h"))
            .body_includes(field("fileNameLength", "6"))
            .body_excludes(field_name("userhash"));
        then.status(200).body("https://litter.catbox.moe/a1b2c3.png");
    });

    let url = client(&server).upload_file(UploadFileOptions::new(sample_png())).unwrap();

    mock.assert();
    assert_eq!(url, "https://litter.catbox.moe/a1b2c3.png");
}

#[test]
fn test_upload_file_every_duration() {
    let server = MockServer::start();
    let litterbox = client(&server);

    for duration in FileLifetime::ALL {
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(LITTER_PATH)
                .body_includes(field("time", duration.as_str()));
            then.status(200).body("https://litter.catbox.moe/xyz789.png");
        });

        let options = UploadFileOptions { duration, ..UploadFileOptions::new(sample_png()) };
        assert!(litterbox.upload_file(options).is_ok());
        mock.assert();
    }
}

#[test]
fn test_upload_file_long_name() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(LITTER_PATH)
            .body_includes(field("fileNameLength", "16"));
        then.status(200).body("https://litter.catbox.moe/0123456789abcdef.png");
    });

    let options = UploadFileOptions {
        file_name_length: FileNameLength::Sixteen,
        ..UploadFileOptions::new(sample_png())
    };
    let url = client(&server).upload_file(options).unwrap();

    mock.assert();
    assert_eq!(url.len(), 46);
}

#[test]
fn test_invalid_path_sends_nothing() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(LITTER_PATH);
        then.status(200).body("https://litter.catbox.moe/never.png");
    });

    let err = client(&server)
        .upload_file(UploadFileOptions::new("../../../should/not/exist.exe"))
        .unwrap_err();

    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("should/not/exist.exe"));
    mock.assert_calls(0);
}

#[test]
fn test_path_dot_segments_resolved_before_check() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(LITTER_PATH)
            .body_includes("name=\"fileToUpload\"; filename=\"sample.png\"");
        then.status(200).body("https://litter.catbox.moe/a1b2c3.png");
    });
    let litterbox = client(&server);
    let fixtures = sample_png().parent().unwrap().to_path_buf();

    let url = litterbox
        .upload_file(UploadFileOptions::new(fixtures.join("no_such_dir/../sample.png")))
        .unwrap();
    assert_eq!(url, "https://litter.catbox.moe/a1b2c3.png");
    mock.assert();

    let err = litterbox
        .upload_file(UploadFileOptions::new(fixtures.join("no_such_dir/../missing.png")))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Invalid file path \"{}\"", fixtures.join("missing.png").display())
    );
    mock.assert_calls(1);
}

#[test]
fn test_invalid_duration_rejected_at_parse() {
    // Durations arrive as text at the edges (prompts, config); nothing
    // outside the accepted set becomes a `FileLifetime`.
    for input in ["36h", "2h", "1 h", "72", "forever"] {
        let err = input.parse::<FileLifetime>().unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(
            err.to_string(),
            format!("Invalid duration \"{}\", accepted values are 1h, 12h, 24h, 72h", input)
        );
    }
}

#[test]
fn test_upload_stream() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(LITTER_PATH)
            .body_includes("name=\"fileToUpload\"; filename=\"log.txt\"")
            .body_includes("line one")
            .body_includes(field("time", "72h"));
        then.status(200).body("https://litter.catbox.moe/zzzzzz.txt");
    });

    let options = UploadStreamOptions {
        duration: FileLifetime::ThreeDays,
        ..UploadStreamOptions::new(Cursor::new(b"line one\nline two\n".to_vec()), "log.txt")
    };
    let url = client(&server).upload_stream(options).unwrap();

    mock.assert();
    assert_eq!(url, "https://litter.catbox.moe/zzzzzz.txt");
}

#[test]
fn test_rejected_body_is_the_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(LITTER_PATH);
        then.status(200).body("https://files.catbox.moe/wrong-host.png");
    });

    let err = client(&server).upload_file(UploadFileOptions::new(sample_png())).unwrap_err();
    assert!(matches!(&err, Error::Rejected(t) if t == "https://files.catbox.moe/wrong-host.png"));
}

#[test]
fn test_observer_event_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(LITTER_PATH);
        then.status(200).body("https://litter.catbox.moe/a1b2c3.png");
    });
    let recorder = Arc::new(Recorder::default());
    let litterbox = client(&server).with_observer(recorder.clone());

    litterbox.upload_file(UploadFileOptions::new(sample_png())).unwrap();
    litterbox
        .upload_stream(UploadStreamOptions::new(Cursor::new(vec![1u8, 2, 3]), "blob.bin"))
        .unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            "file:sample.png:1h",
            "request:fileupload",
            "response:200",
            "stream:blob.bin:1h",
            "request:fileupload",
            "response:200",
        ]
    );
    let requests = recorder.requests.lock().unwrap();
    let file = requests[0].file.as_ref().unwrap();
    assert_eq!(file.file_name, "sample.png");
    assert_eq!(file.mime, "image/png");
    assert_eq!(requests[0].field("time"), Some("1h"));
}

#[test]
fn test_panicking_observer_does_not_change_result() {
    struct Panics;
    impl catbox_cli::Observer for Panics {
        fn on_request(&self, _request: &catbox_cli::RequestSummary) {
            panic!("observer failure");
        }
    }

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(LITTER_PATH);
        then.status(200).body("https://litter.catbox.moe/a1b2c3.png");
    });

    let url = client(&server)
        .with_observer(Arc::new(Panics))
        .upload_file(UploadFileOptions::new(sample_png()))
        .unwrap();

    mock.assert();
    assert_eq!(url, "https://litter.catbox.moe/a1b2c3.png");
}
