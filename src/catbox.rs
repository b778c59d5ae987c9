//! Catbox client: permanent uploads, file deletion and albums.
//!
//! Uploads and album creation work anonymously. Deleting files and changing
//! albums need the account's user hash (see <https://catbox.moe/user/manage.php>).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::observer::{Host, Observer};
use crate::request::{base_name, Expect, FileBody, RequestForm, Transport};

pub const CATBOX_API_ENDPOINT: &str = "https://catbox.moe/user/api.php";
pub const CATBOX_FILE_URL_PREFIX: &str = "https://files.catbox.moe/";
pub const CATBOX_ALBUM_URL_PREFIX: &str = "https://catbox.moe/c/";

/// URL the service answers with for album `id`.
pub fn album_url(id: &str) -> String {
    format!("{}{}", CATBOX_ALBUM_URL_PREFIX, id)
}

/// Options for [`Catbox::upload_url`].
#[derive(Debug, Clone)]
pub struct UploadUrlOptions {
    /// Direct URL of the file to upload
    pub url: String,
}

/// Options for [`Catbox::upload_file`].
#[derive(Debug, Clone)]
pub struct UploadFileOptions {
    /// Path to the file to upload
    pub path: PathBuf,
}

/// Options for [`Catbox::upload_stream`].
pub struct UploadStreamOptions<R> {
    pub stream: R,
    pub file_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteFilesOptions {
    /// Names of existing files (with extension) to delete
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateAlbumOptions {
    pub title: String,
    pub description: String,
    /// Names of existing files the album should contain
    pub files: Vec<String>,
}

/// Full replacement of an album's title, description and files.
#[derive(Debug, Clone, Default)]
pub struct EditAlbumOptions {
    pub id: String,
    pub title: String,
    pub description: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AddFilesToAlbumOptions {
    pub id: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RemoveFilesFromAlbumOptions {
    pub id: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteAlbumOptions {
    pub id: String,
}

/// Catbox API client holding an optional user hash.
#[derive(Clone)]
pub struct Catbox {
    transport: Transport,
    user_hash: Option<String>,
}

impl Catbox {
    /// Client for the public Catbox endpoint.
    pub fn new(user_hash: Option<String>) -> Result<Self> {
        Self::with_endpoint(CATBOX_API_ENDPOINT, user_hash)
    }

    /// Client for another endpoint (a mirror or a test stub).
    pub fn with_endpoint(endpoint: impl Into<String>, user_hash: Option<String>) -> Result<Self> {
        let mut client = Self {
            transport: Transport::new(Host::Catbox, endpoint)?,
            user_hash: None,
        };
        if let Some(hash) = user_hash {
            client.set_user_hash(hash);
        }
        Ok(client)
    }

    /// Install a diagnostics observer.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.transport.set_observer(Some(observer));
        self
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// The user hash, if one is set.
    pub fn user_hash(&self) -> Option<&str> {
        self.user_hash.as_deref()
    }

    /// Use `user_hash` for subsequent calls. An empty string clears it.
    pub fn set_user_hash(&mut self, user_hash: impl Into<String>) {
        let user_hash = user_hash.into();
        self.user_hash = (!user_hash.is_empty()).then_some(user_hash);
    }

    /// Upload a remote file by URL. Returns the file URL.
    #[instrument(skip_all, fields(url = %options.url))]
    pub fn upload_url(&self, options: UploadUrlOptions) -> Result<String> {
        let form = self.upload_url_form(options);
        self.upload(form)
    }

    /// Upload a file from disk. Returns the file URL.
    #[instrument(skip_all, fields(path = %options.path.display()))]
    pub fn upload_file(&self, options: UploadFileOptions) -> Result<String> {
        let form = self.upload_file_form(&options.path)?;
        self.upload(form)
    }

    /// Upload everything `stream` yields under `file_name`. Returns the file URL.
    #[instrument(skip_all, fields(file_name = %options.file_name))]
    pub fn upload_stream<R: Read>(&self, options: UploadStreamOptions<R>) -> Result<String> {
        let body = FileBody::read(options.stream)?;
        let form = RequestForm::new("fileupload")
            .file("fileToUpload", options.file_name, body)
            .user_hash(self.user_hash());
        self.upload(form)
    }

    /// Delete files owned by the account. `Ok(true)` when the service confirms.
    #[instrument(skip_all, fields(count = options.files.len()))]
    pub fn delete_files(&self, options: DeleteFilesOptions) -> Result<bool> {
        let form = self.delete_files_form(&options)?;
        Expect::Contains("successfully").check(self.transport.send(form)?)?;
        info!("files deleted");
        Ok(true)
    }

    /// Create an album. Returns the album URL.
    #[instrument(skip_all, fields(title = %options.title))]
    pub fn create_album(&self, options: CreateAlbumOptions) -> Result<String> {
        let form = self.create_album_form(&options);
        let url = Expect::StartsWith(CATBOX_ALBUM_URL_PREFIX).check(self.transport.send(form)?)?;
        info!(%url, "album created");
        Ok(url)
    }

    /// Overwrite an album. Omitted values are cleared on the service side,
    /// so an empty description removes it; prefer the add/remove calls to
    /// only change the file list.
    #[instrument(skip_all, fields(id = %options.id))]
    pub fn edit_album(&self, options: EditAlbumOptions) -> Result<String> {
        let form = self.edit_album_form(&options)?;
        self.expect_album(&options.id, form)
    }

    #[instrument(skip_all, fields(id = %options.id, count = options.files.len()))]
    pub fn add_files_to_album(&self, options: AddFilesToAlbumOptions) -> Result<String> {
        let form = self.album_files_form("addtoalbum", &options.id, &options.files)?;
        self.expect_album(&options.id, form)
    }

    #[instrument(skip_all, fields(id = %options.id, count = options.files.len()))]
    pub fn remove_files_from_album(&self, options: RemoveFilesFromAlbumOptions) -> Result<String> {
        let form = self.album_files_form("removefromalbum", &options.id, &options.files)?;
        self.expect_album(&options.id, form)
    }

    /// Delete an album. `Ok(true)` also when the album didn't exist.
    #[instrument(skip_all, fields(id = %options.id))]
    pub fn delete_album(&self, options: DeleteAlbumOptions) -> Result<bool> {
        let form = RequestForm::new("deletealbum")
            .text("short", options.id)
            .user_hash(Some(self.require_user_hash()?));
        Expect::Empty.check(self.transport.send(form)?)?;
        info!("album deleted");
        Ok(true)
    }

    fn require_user_hash(&self) -> Result<&str> {
        self.user_hash().ok_or(Error::MissingUserHash)
    }

    fn upload(&self, form: RequestForm) -> Result<String> {
        let url = Expect::StartsWith(CATBOX_FILE_URL_PREFIX).check(self.transport.send(form)?)?;
        info!(%url, "uploaded to catbox");
        Ok(url)
    }

    fn expect_album(&self, id: &str, form: RequestForm) -> Result<String> {
        let expected = album_url(id);
        Expect::Equals(&expected).check(self.transport.send(form)?)
    }

    fn upload_url_form(&self, options: UploadUrlOptions) -> RequestForm {
        RequestForm::new("urlupload")
            .text("url", options.url)
            .user_hash(self.user_hash())
    }

    fn upload_file_form(&self, path: &Path) -> Result<RequestForm> {
        let (path, body) = FileBody::open(path)?;
        Ok(RequestForm::new("fileupload")
            .file("fileToUpload", base_name(&path), body)
            .user_hash(self.user_hash()))
    }

    fn delete_files_form(&self, options: &DeleteFilesOptions) -> Result<RequestForm> {
        Ok(RequestForm::new("deletefiles")
            .user_hash(Some(self.require_user_hash()?))
            .text("files", options.files.join(" ")))
    }

    fn create_album_form(&self, options: &CreateAlbumOptions) -> RequestForm {
        RequestForm::new("createalbum")
            .text("title", options.title.as_str())
            .text("desc", options.description.as_str())
            .files_if_any(&options.files)
            .user_hash(self.user_hash())
    }

    fn edit_album_form(&self, options: &EditAlbumOptions) -> Result<RequestForm> {
        let user_hash = self.require_user_hash()?;
        Ok(RequestForm::new("editalbum")
            .text("short", options.id.as_str())
            .text("title", options.title.as_str())
            .text("desc", options.description.as_str())
            .files_if_any(&options.files)
            .user_hash(Some(user_hash)))
    }

    fn album_files_form(&self, reqtype: &'static str, id: &str, files: &[String]) -> Result<RequestForm> {
        let user_hash = self.require_user_hash()?;
        Ok(RequestForm::new(reqtype)
            .text("short", id)
            .text("files", files.join(" "))
            .user_hash(Some(user_hash)))
    }
}
