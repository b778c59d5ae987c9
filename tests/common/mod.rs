#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use catbox_cli::observer::{Observer, RequestSummary, ResponseSummary};
use catbox_cli::FileLifetime;

pub const API_PATH: &str = "/user/api.php";

/// Multipart fragment of a text field as reqwest encodes it.
pub fn field(name: &str, value: &str) -> String {
    format!("name=\"{}\"\r\n\r\n{}\r\n", name, value)
}

/// Multipart fragment naming a field, whatever its value.
pub fn field_name(name: &str) -> String {
    format!("name=\"{}\"", name)
}

pub fn sample_png() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.png")
}

/// Records every notification, in order.
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<RequestSummary>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Observer for Recorder {
    fn on_request(&self, request: &RequestSummary) {
        self.events.lock().unwrap().push(format!("request:{}", request.reqtype));
        self.requests.lock().unwrap().push(request.clone());
    }

    fn on_response(&self, response: &ResponseSummary) {
        self.events.lock().unwrap().push(format!("response:{}", response.status));
    }

    fn on_uploading_file(&self, path: &std::path::Path, duration: FileLifetime) {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.events.lock().unwrap().push(format!("file:{}:{}", name, duration));
    }

    fn on_uploading_stream(&self, file_name: &str, duration: FileLifetime) {
        self.events.lock().unwrap().push(format!("stream:{}:{}", file_name, duration));
    }
}
