//! Advisory diagnostics hook.
//!
//! An [`Observer`] installed on a client is told about each outgoing request
//! and the response that came back. It cannot change the request, the result
//! or the control flow: notifications return nothing, and a panicking
//! observer is contained and logged.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::litterbox::FileLifetime;

/// Which service a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    Catbox,
    Litterbox,
}

/// Description of an outgoing request. The user hash value is never part of
/// it; only whether one was attached.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub host: Host,
    pub endpoint: String,
    pub reqtype: &'static str,
    /// Text fields in the order they were added, `reqtype` and `userhash` excluded.
    pub fields: Vec<(&'static str, String)>,
    pub file: Option<FileSummary>,
    pub has_user_hash: bool,
}

impl RequestSummary {
    /// Value of a text field, if the request carries it.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The binary part of an upload request.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub field: &'static str,
    pub file_name: String,
    pub mime: String,
    pub len: u64,
}

/// What came back, before classification.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseSummary {
    pub host: Host,
    pub status: u16,
    pub body_len: usize,
}

/// Side-channel notified around each request. Every method defaults to a no-op.
///
/// A panic inside a notification is caught and logged at warn level, and the
/// call carries on. The process panic hook still runs first, so the panic
/// message is printed to stderr unless the hook has been replaced.
pub trait Observer: Send + Sync {
    fn on_request(&self, _request: &RequestSummary) {}

    fn on_response(&self, _response: &ResponseSummary) {}

    /// Litterbox is about to upload a file from disk.
    fn on_uploading_file(&self, _path: &Path, _duration: FileLifetime) {}

    /// Litterbox is about to upload a caller-supplied stream.
    fn on_uploading_stream(&self, _file_name: &str, _duration: FileLifetime) {}
}

/// Run `f` against the observer, if any. Panics stay here.
pub(crate) fn notify<F>(observer: Option<&Arc<dyn Observer>>, f: F)
where
    F: FnOnce(&dyn Observer),
{
    let Some(observer) = observer else {
        return;
    };
    if panic::catch_unwind(AssertUnwindSafe(|| f(observer.as_ref()))).is_err() {
        tracing::warn!("observer panicked, notification dropped");
    }
}
