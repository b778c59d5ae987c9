// UI layer: an interactive menu using `dialoguer`. Every flow collects its
// inputs, runs one client call behind a spinner and prints the outcome.
// Request failures are printed and the menu continues; prompt failures
// (closed terminal, ...) end the loop.

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::catbox::{
    AddFilesToAlbumOptions, Catbox, CreateAlbumOptions, DeleteAlbumOptions, DeleteFilesOptions,
    EditAlbumOptions, RemoveFilesFromAlbumOptions, UploadFileOptions, UploadUrlOptions,
};
use crate::config::Config;
use crate::litterbox::{self, FileLifetime, FileNameLength, Litterbox};
use crate::observer::{Observer, RequestSummary, ResponseSummary};

const SETTINGS_FILE: &str = ".catbox_cli.json";

/// Settings persisted between runs.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_hash: Option<String>,
}

/// Mirrors request/response summaries into the debug log as JSON.
struct TraceObserver;

impl Observer for TraceObserver {
    fn on_request(&self, request: &RequestSummary) {
        if let Ok(json) = serde_json::to_string(request) {
            tracing::debug!(request = %json, "outgoing");
        }
    }

    fn on_response(&self, response: &ResponseSummary) {
        tracing::debug!(status = response.status, len = response.body_len, "incoming");
    }
}

/// Main interactive menu. Runs until the user picks "Exit".
pub fn main_menu(config: Config) -> Result<()> {
    let observer: Arc<dyn Observer> = Arc::new(TraceObserver);
    let mut catbox = config
        .catbox()
        .context("Failed to build Catbox client")?
        .with_observer(observer.clone());
    let litterbox = config
        .litterbox()
        .context("Failed to build Litterbox client")?
        .with_observer(observer);

    if catbox.user_hash().is_none() {
        if let Some(hash) = load_settings().ok().and_then(|s| s.user_hash) {
            catbox.set_user_hash(hash);
        }
    }

    let items = [
        "Upload file (Catbox)",
        "Upload from URL (Catbox)",
        "Upload temporary file (Litterbox)",
        "Delete files",
        "Create album",
        "Edit album",
        "Add files to album",
        "Remove files from album",
        "Delete album",
        "Set user hash",
        "Exit",
    ];
    loop {
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_upload_file(&catbox)?,
            1 => handle_upload_url(&catbox)?,
            2 => handle_litterbox_upload(&litterbox)?,
            3 => handle_delete_files(&catbox)?,
            4 => handle_create_album(&catbox)?,
            5 => handle_edit_album(&catbox)?,
            6 => handle_add_files(&catbox)?,
            7 => handle_remove_files(&catbox)?,
            8 => handle_delete_album(&catbox)?,
            9 => handle_set_user_hash(&mut catbox)?,
            _ => break,
        }
    }
    Ok(())
}

/// Run `call` behind a spinner and print its outcome.
fn run<T, F>(message: &'static str, call: F)
where
    T: Display,
    F: FnOnce() -> crate::Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = call();
    spinner.finish_and_clear();

    match result {
        Ok(value) => println!("{}", value),
        Err(e) => println!("Failed: {}", e),
    }
}

/// Split user input into file names on whitespace and commas.
fn parse_names(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn prompt_names(prompt: &str) -> Result<Vec<String>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(parse_names(&input))
}

fn handle_upload_file(catbox: &Catbox) -> Result<()> {
    let path: String = Input::new().with_prompt("File path").interact_text()?;
    run("Uploading...", || catbox.upload_file(UploadFileOptions { path: PathBuf::from(path) }));
    Ok(())
}

fn handle_upload_url(catbox: &Catbox) -> Result<()> {
    let url: String = Input::new().with_prompt("File URL").interact_text()?;
    run("Uploading...", || catbox.upload_url(UploadUrlOptions { url }));
    Ok(())
}

fn handle_litterbox_upload(litterbox: &Litterbox) -> Result<()> {
    let path: String = Input::new().with_prompt("File path").interact_text()?;
    let duration: String = Input::new()
        .with_prompt(format!("Keep for ({})", litterbox::ACCEPTED_DURATIONS.join(", ")))
        .default(FileLifetime::default().to_string())
        .interact_text()?;
    let duration: FileLifetime = match duration.trim().parse() {
        Ok(d) => d,
        Err(e) => {
            println!("Failed: {}", e);
            return Ok(());
        }
    };
    let long_name = Confirm::new()
        .with_prompt("Use a 16 character file name?")
        .default(false)
        .interact()?;

    let options = litterbox::UploadFileOptions {
        path: PathBuf::from(path),
        duration,
        file_name_length: if long_name { FileNameLength::Sixteen } else { FileNameLength::Six },
    };
    run("Uploading...", || litterbox.upload_file(options));
    Ok(())
}

fn handle_delete_files(catbox: &Catbox) -> Result<()> {
    let files = prompt_names("File names to delete")?;
    run("Deleting...", || {
        catbox
            .delete_files(DeleteFilesOptions { files })
            .map(|_| "Files deleted")
    });
    Ok(())
}

fn handle_create_album(catbox: &Catbox) -> Result<()> {
    let title: String = Input::new().with_prompt("Title").interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description")
        .allow_empty(true)
        .interact_text()?;
    let files = prompt_names("File names (optional)")?;
    run("Creating album...", || {
        catbox.create_album(CreateAlbumOptions { title, description, files })
    });
    Ok(())
}

fn handle_edit_album(catbox: &Catbox) -> Result<()> {
    let id: String = Input::new().with_prompt("Album id").interact_text()?;
    let title: String = Input::new().with_prompt("Title").interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description (empty clears it)")
        .allow_empty(true)
        .interact_text()?;
    let files = prompt_names("File names (replaces the album's files)")?;
    run("Editing album...", || {
        catbox.edit_album(EditAlbumOptions { id, title, description, files })
    });
    Ok(())
}

fn handle_add_files(catbox: &Catbox) -> Result<()> {
    let id: String = Input::new().with_prompt("Album id").interact_text()?;
    let files = prompt_names("File names to add")?;
    run("Adding files...", || {
        catbox.add_files_to_album(AddFilesToAlbumOptions { id, files })
    });
    Ok(())
}

fn handle_remove_files(catbox: &Catbox) -> Result<()> {
    let id: String = Input::new().with_prompt("Album id").interact_text()?;
    let files = prompt_names("File names to remove")?;
    run("Removing files...", || {
        catbox.remove_files_from_album(RemoveFilesFromAlbumOptions { id, files })
    });
    Ok(())
}

fn handle_delete_album(catbox: &Catbox) -> Result<()> {
    let id: String = Input::new().with_prompt("Album id").interact_text()?;
    let sure = Confirm::new()
        .with_prompt(format!("Delete album {}?", id))
        .default(false)
        .interact()?;
    if sure {
        run("Deleting album...", || {
            catbox
                .delete_album(DeleteAlbumOptions { id })
                .map(|_| "Album deleted")
        });
    }
    Ok(())
}

/// Set the user hash on the client and optionally remember it.
fn handle_set_user_hash(catbox: &mut Catbox) -> Result<()> {
    // `Password` keeps the hash off the screen.
    let hash: String = Password::new()
        .with_prompt("User hash (empty to clear)")
        .allow_empty_password(true)
        .interact()?;
    catbox.set_user_hash(hash.trim());

    let remember = Confirm::new()
        .with_prompt("Remember for future runs?")
        .default(true)
        .interact()?;
    if remember {
        let settings = Settings { user_hash: catbox.user_hash().map(str::to_string) };
        save_settings(&settings)?;
    }
    Ok(())
}

fn settings_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(SETTINGS_FILE)
}

/// Persist settings into the user's home directory.
pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = settings_path();
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Load settings from the user's home directory.
pub fn load_settings() -> Result<Settings> {
    let data = std::fs::read_to_string(settings_path())?;
    let settings = serde_json::from_str(&data).context("Parsing settings json")?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_names("a.png b.png"), vec!["a.png", "b.png"]);
        assert_eq!(parse_names(" a.png,b.png ,, c.gif\t"), vec!["a.png", "b.png", "c.gif"]);
        assert!(parse_names("   ").is_empty());
    }

    #[test]
    fn test_settings_json() {
        let settings = Settings { user_hash: Some("abc".into()) };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"user_hash":"abc"}"#);
        assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), settings);

        assert_eq!(serde_json::to_string(&Settings::default()).unwrap(), "{}");
        assert_eq!(serde_json::from_str::<Settings>("{}").unwrap(), Settings::default());
    }
}
