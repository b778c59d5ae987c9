//! Litterbox client: temporary uploads with a fixed retention window.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::observer::{self, Host, Observer};
use crate::request::{base_name, Expect, FileBody, RequestForm, Transport};

pub const LITTERBOX_API_ENDPOINT: &str = "https://litterbox.catbox.moe/resources/internals/api.php";
pub const LITTERBOX_FILE_URL_PREFIX: &str = "https://litter.catbox.moe/";

/// Wire codes of every [`FileLifetime`], shortest first.
pub const ACCEPTED_DURATIONS: [&str; 4] = ["1h", "12h", "24h", "72h"];

/// How long Litterbox keeps an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileLifetime {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "72h")]
    ThreeDays,
}

impl FileLifetime {
    pub const ALL: [FileLifetime; 4] = [
        FileLifetime::OneHour,
        FileLifetime::TwelveHours,
        FileLifetime::OneDay,
        FileLifetime::ThreeDays,
    ];

    /// Value of the `time` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            FileLifetime::OneHour => "1h",
            FileLifetime::TwelveHours => "12h",
            FileLifetime::OneDay => "24h",
            FileLifetime::ThreeDays => "72h",
        }
    }
}

impl fmt::Display for FileLifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileLifetime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| Error::InvalidDuration(s.to_string()))
    }
}

/// Length of the random name Litterbox assigns to an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileNameLength {
    #[default]
    Six,
    Sixteen,
}

impl FileNameLength {
    pub fn as_u8(self) -> u8 {
        match self {
            FileNameLength::Six => 6,
            FileNameLength::Sixteen => 16,
        }
    }
}

/// Options for [`Litterbox::upload_file`].
#[derive(Debug, Clone)]
pub struct UploadFileOptions {
    /// Path of the file to upload
    pub path: PathBuf,
    /// Retention before the file is deleted, one hour by default
    pub duration: FileLifetime,
    pub file_name_length: FileNameLength,
}

impl UploadFileOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            duration: FileLifetime::default(),
            file_name_length: FileNameLength::default(),
        }
    }
}

/// Options for [`Litterbox::upload_stream`].
pub struct UploadStreamOptions<R> {
    pub stream: R,
    /// Name the upload is sent under
    pub file_name: String,
    pub duration: FileLifetime,
    pub file_name_length: FileNameLength,
}

impl<R: Read> UploadStreamOptions<R> {
    pub fn new(stream: R, file_name: impl Into<String>) -> Self {
        Self {
            stream,
            file_name: file_name.into(),
            duration: FileLifetime::default(),
            file_name_length: FileNameLength::default(),
        }
    }
}

/// Litterbox API client. Anonymous only: no account, no deletion.
#[derive(Clone)]
pub struct Litterbox {
    transport: Transport,
}

impl Litterbox {
    /// Client for the public Litterbox endpoint.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(LITTERBOX_API_ENDPOINT)
    }

    /// Client for another endpoint (a mirror or a test stub).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self { transport: Transport::new(Host::Litterbox, endpoint)? })
    }

    /// Install a diagnostics observer.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.transport.set_observer(Some(observer));
        self
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Upload a file from disk. Returns the temporary file URL.
    #[instrument(skip_all, fields(path = %options.path.display(), duration = %options.duration))]
    pub fn upload_file(&self, options: UploadFileOptions) -> Result<String> {
        let (path, body) = FileBody::open(&options.path)?;
        let file_name = base_name(&path);
        let form = upload_form(file_name, body, options.duration, options.file_name_length);

        observer::notify(self.transport.observer(), |o| {
            o.on_uploading_file(&path, options.duration)
        });
        self.finish(form)
    }

    /// Upload everything `stream` yields under `file_name`.
    #[instrument(skip_all, fields(file_name = %options.file_name, duration = %options.duration))]
    pub fn upload_stream<R: Read>(&self, options: UploadStreamOptions<R>) -> Result<String> {
        let body = FileBody::read(options.stream)?;
        let form = upload_form(
            options.file_name.clone(),
            body,
            options.duration,
            options.file_name_length,
        );

        observer::notify(self.transport.observer(), |o| {
            o.on_uploading_stream(&options.file_name, options.duration)
        });
        self.finish(form)
    }

    fn finish(&self, form: RequestForm) -> Result<String> {
        let text = self.transport.send(form)?;
        let url = Expect::StartsWith(LITTERBOX_FILE_URL_PREFIX).check(text)?;
        info!(%url, "uploaded to litterbox");
        Ok(url)
    }
}

fn upload_form(
    file_name: String,
    body: FileBody,
    duration: FileLifetime,
    file_name_length: FileNameLength,
) -> RequestForm {
    RequestForm::new("fileupload")
        .file("fileToUpload", file_name, body)
        .text("time", duration.as_str())
        .text("fileNameLength", file_name_length.as_u8().to_string())
}
