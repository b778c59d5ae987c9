// Library root
// -----------
// Client library for the Catbox and Litterbox file hosts. The binary
// (`main.rs`) drives these modules from an interactive menu.
//
// Module responsibilities:
// - `catbox`: permanent uploads, file deletion and album management.
// - `litterbox`: temporary uploads with a retention window.
// - `request`: the shared multipart POST and response classification.
// - `observer`: optional diagnostics hook notified around each request.
// - `config`: endpoints and user hash from the environment.
// - `ui`: terminal menu flows; a pure caller of the clients.
pub mod catbox;
pub mod config;
pub mod error;
pub mod litterbox;
pub mod observer;
mod request;
pub mod ui;

pub use catbox::Catbox;
pub use config::Config;
pub use error::{Error, Result};
pub use litterbox::{FileLifetime, FileNameLength, Litterbox};
pub use observer::{Observer, RequestSummary, ResponseSummary};
pub use request::USER_AGENT;
