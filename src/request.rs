//! Shared request plumbing for both hosts: build the multipart form, POST it
//! with the fixed user agent, hand back the whole body as text.
//!
//! Each call owns its form. Nothing here is written to during a request, so a
//! client can be shared across threads.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use reqwest::blocking::{multipart, Client};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::observer::{self, FileSummary, Host, Observer, RequestSummary, ResponseSummary};

/// Sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("catbox-cli/", env!("CARGO_PKG_VERSION"));

const USER_HASH_FIELD: &str = "userhash";

/// Upload payload: an open file on disk or a buffered caller stream.
#[derive(Debug)]
pub(crate) enum FileBody {
    Disk { file: File, len: u64 },
    Memory(Vec<u8>),
}

impl FileBody {
    /// Resolve `path` to an absolute path and open it if it names a regular
    /// file. Returns the absolute path alongside the body.
    pub(crate) fn open(path: &Path) -> Result<(PathBuf, Self)> {
        let path = resolve(path)?;
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                let file = File::open(&path)?;
                Ok((path, FileBody::Disk { file, len: meta.len() }))
            }
            _ => Err(Error::InvalidFilePath(path)),
        }
    }

    /// Drain a caller stream into memory.
    pub(crate) fn read<R: Read>(mut stream: R) -> Result<Self> {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(FileBody::Memory(buf))
    }

    fn len(&self) -> u64 {
        match self {
            FileBody::Disk { len, .. } => *len,
            FileBody::Memory(buf) => buf.len() as u64,
        }
    }
}

/// Absolute form of `path` with `.` and `..` folded away lexically, before
/// the filesystem sees it. `..` at the root stays at the root.
pub(crate) fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .map_err(|_| Error::InvalidFilePath(path.to_path_buf()))?;
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                resolved.push(component)
            }
        }
    }
    Ok(resolved)
}

/// Last component of `path`, used as the multipart file name.
pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug)]
struct FilePart {
    field: &'static str,
    file_name: String,
    mime: String,
    body: FileBody,
}

/// Form fields for one request, in insertion order.
#[derive(Debug)]
pub(crate) struct RequestForm {
    reqtype: &'static str,
    fields: Vec<(&'static str, String)>,
    file: Option<FilePart>,
}

impl RequestForm {
    pub(crate) fn new(reqtype: &'static str) -> Self {
        Self { reqtype, fields: Vec::new(), file: None }
    }

    /// Set a text field, replacing an earlier value of the same name.
    pub(crate) fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// Space-joined `files` field, only when there is at least one name.
    pub(crate) fn files_if_any(self, files: &[String]) -> Self {
        if files.is_empty() {
            self
        } else {
            self.text("files", files.join(" "))
        }
    }

    pub(crate) fn user_hash(self, user_hash: Option<&str>) -> Self {
        match user_hash {
            Some(hash) => self.text(USER_HASH_FIELD, hash),
            None => self,
        }
    }

    pub(crate) fn file(mut self, field: &'static str, file_name: impl Into<String>, body: FileBody) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        self.file = Some(FilePart { field, file_name, mime, body });
        self
    }

    #[cfg(test)]
    pub(crate) fn reqtype(&self) -> &'static str {
        self.reqtype
    }

    /// Value of a text field, `reqtype` included.
    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        if name == "reqtype" {
            return Some(self.reqtype);
        }
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub(crate) fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.file_name.as_str())
    }

    fn summary(&self, host: Host, endpoint: &str) -> RequestSummary {
        RequestSummary {
            host,
            endpoint: endpoint.to_string(),
            reqtype: self.reqtype,
            fields: self
                .fields
                .iter()
                .filter(|(n, _)| *n != USER_HASH_FIELD)
                .cloned()
                .collect(),
            file: self.file.as_ref().map(|f| FileSummary {
                field: f.field,
                file_name: f.file_name.clone(),
                mime: f.mime.clone(),
                len: f.body.len(),
            }),
            has_user_hash: self.get(USER_HASH_FIELD).is_some(),
        }
    }

    fn into_multipart(self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new().text("reqtype", self.reqtype);
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        if let Some(part) = self.file {
            let body = match part.body {
                FileBody::Disk { file, len } => multipart::Part::reader_with_length(file, len),
                FileBody::Memory(buf) => multipart::Part::bytes(buf),
            };
            let body = body.file_name(part.file_name).mime_str(&part.mime)?;
            form = form.part(part.field, body);
        }
        Ok(form)
    }
}

/// How a response body is judged.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Expect<'a> {
    StartsWith(&'a str),
    Equals(&'a str),
    Contains(&'a str),
    Empty,
}

impl Expect<'_> {
    /// Pass the body through on success; otherwise it becomes the error.
    pub(crate) fn check(self, text: String) -> Result<String> {
        let ok = match self {
            Expect::StartsWith(prefix) => text.starts_with(prefix),
            Expect::Equals(expected) => text == expected,
            Expect::Contains(needle) => text.contains(needle),
            Expect::Empty => text.is_empty(),
        };
        if ok {
            Ok(text)
        } else {
            warn!(expected = ?self, response = %text, "response rejected");
            Err(Error::Rejected(text))
        }
    }
}

/// Blocking HTTP transport bound to one endpoint.
#[derive(Clone)]
pub(crate) struct Transport {
    http: Client,
    host: Host,
    endpoint: String,
    observer: Option<Arc<dyn Observer>>,
}

impl Transport {
    pub(crate) fn new(host: Host, endpoint: impl Into<String>) -> Result<Self> {
        // No deadline: callers impose their own.
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None)
            .build()?;
        Ok(Self { http, host, endpoint: endpoint.into(), observer: None })
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn observer(&self) -> Option<&Arc<dyn Observer>> {
        self.observer.as_ref()
    }

    pub(crate) fn set_observer(&mut self, observer: Option<Arc<dyn Observer>>) {
        self.observer = observer;
    }

    /// POST the form and return the full body as text. No status-code branching.
    pub(crate) fn send(&self, form: RequestForm) -> Result<String> {
        let summary = form.summary(self.host, &self.endpoint);
        debug!(
            host = ?self.host,
            reqtype = summary.reqtype,
            fields = ?summary.fields.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
            file = summary.file.as_ref().map(|f| f.file_name.as_str()),
            "sending request"
        );
        observer::notify(self.observer.as_ref(), |o| o.on_request(&summary));

        let res = self
            .http
            .post(&self.endpoint)
            .multipart(form.into_multipart()?)
            .send()?;
        let status = res.status().as_u16();
        let text = res.text()?;

        debug!(status, len = text.len(), "response received");
        let response = ResponseSummary { host: self.host, status, body_len: text.len() };
        observer::notify(self.observer.as_ref(), |o| o.on_response(&response));
        Ok(text)
    }
}
