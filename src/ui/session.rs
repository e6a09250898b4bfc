//! Client session state machine.
//!
//! The page script keeps exactly one session record with these transitions:
//!
//! ```text
//! Idle --select(image/*)--> FileSelected --generate--> Generating
//! Generating --ok--> ResultReady     Generating --err--> Failed
//! ResultReady | Failed --select--> FileSelected
//! any (except Generating) --clear--> Idle
//! ```
//!
//! Preview object-URLs are acquired through an [`ObjectUrlStore`] and
//! released when replaced, on clear, and when the session is dropped.

use crate::image::ProviderKind;
use crate::server::StylizeResponse;

/// Shown when a non-image file is picked or dropped.
pub const INVALID_FILE_MESSAGE: &str = "Please select a valid image file (JPEG, PNG, etc.)";
/// Shown when generate is pressed without a file.
pub const NO_FILE_MESSAGE: &str = "Please select an image first.";

/// Creates and revokes browser-local object-URLs.
pub trait ObjectUrlStore {
    /// Creates an object-URL for the named file.
    fn create(&mut self, file_name: &str) -> String;
    /// Releases a previously created object-URL.
    fn revoke(&mut self, url: &str);
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected.
    Idle,
    /// A file is selected and previewed.
    FileSelected,
    /// A request is in flight; controls are disabled.
    Generating,
    /// The last request returned an image.
    ResultReady,
    /// The last request failed; the error is shown inline.
    Failed,
}

/// Reasons a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The picked file is not `image/*`.
    #[error("Please select a valid image file (JPEG, PNG, etc.)")]
    InvalidFileType,
    /// Generate was pressed with nothing selected.
    #[error("Please select an image first.")]
    NoFile,
    /// A request is in flight.
    #[error("a generation is already in progress")]
    Busy,
}

/// A preview object-URL owned by the session.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    url: String,
}

impl PreviewHandle {
    /// The object-URL to use as the preview `src`.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The file currently selected for upload.
#[derive(Debug)]
pub struct SelectedFile {
    /// File name as reported by the browser.
    pub name: String,
    /// Declared MIME type, always `image/*`.
    pub media_type: String,
    /// Preview object-URL, released when the file is replaced or cleared.
    pub preview: PreviewHandle,
}

/// What the page sends to `/api/stylize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Sent as the `image` part.
    pub file_name: String,
    /// Sent as the `model` field.
    pub model: ProviderKind,
}

/// One user's UI session.
pub struct Session<S: ObjectUrlStore> {
    store: S,
    phase: Phase,
    file: Option<SelectedFile>,
    model: ProviderKind,
    dragging: bool,
    error: Option<String>,
    result_url: Option<String>,
    description: Option<String>,
    prompt: Option<String>,
}

impl<S: ObjectUrlStore> Session<S> {
    /// Creates an idle session.
    pub fn new(store: S) -> Self {
        Self {
            store,
            phase: Phase::Idle,
            file: None,
            model: ProviderKind::default(),
            dragging: false,
            error: None,
            result_url: None,
            description: None,
            prompt: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Inline error text, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The selected file.
    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Object-URL of the selected file's preview.
    pub fn preview_url(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.preview.url())
    }

    /// Provider for the next submission.
    pub fn model(&self) -> ProviderKind {
        self.model
    }

    /// Whether a drag is over the upload area.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// URL of the generated image.
    pub fn result_url(&self) -> Option<&str> {
        self.result_url.as_deref()
    }

    /// Vision description (Grok only).
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Prompt used for generation.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Whether the generate and clear buttons are enabled.
    pub fn controls_enabled(&self) -> bool {
        self.file.is_some() && self.phase != Phase::Generating
    }

    /// Handles a file from the picker or a drop.
    ///
    /// Non-image files set the inline error and leave the session as it was.
    pub fn select_file(&mut self, name: &str, media_type: &str) -> Result<(), SessionError> {
        if self.phase == Phase::Generating {
            return Err(SessionError::Busy);
        }
        if !media_type.starts_with("image/") {
            self.error = Some(INVALID_FILE_MESSAGE.to_string());
            return Err(SessionError::InvalidFileType);
        }

        let preview = PreviewHandle {
            url: self.store.create(name),
        };
        if let Some(old) = self.file.replace(SelectedFile {
            name: name.to_string(),
            media_type: media_type.to_string(),
            preview,
        }) {
            self.store.revoke(old.preview.url());
        }

        self.error = None;
        self.reset_result();
        self.phase = Phase::FileSelected;
        Ok(())
    }

    /// Changes the provider used for the next submission.
    pub fn select_model(&mut self, model: ProviderKind) -> Result<(), SessionError> {
        if self.phase == Phase::Generating {
            return Err(SessionError::Busy);
        }
        self.model = model;
        Ok(())
    }

    /// Highlights the upload area.
    pub fn drag_enter(&mut self) {
        self.dragging = true;
    }

    /// Removes the upload area highlight.
    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// Handles a drop on the upload area.
    pub fn drop_file(&mut self, name: &str, media_type: &str) -> Result<(), SessionError> {
        self.dragging = false;
        self.select_file(name, media_type)
    }

    /// Starts a generation, returning what to submit.
    pub fn begin_generate(&mut self) -> Result<Submission, SessionError> {
        if self.phase == Phase::Generating {
            return Err(SessionError::Busy);
        }
        let Some(file) = &self.file else {
            self.error = Some(NO_FILE_MESSAGE.to_string());
            return Err(SessionError::NoFile);
        };

        let submission = Submission {
            file_name: file.name.clone(),
            model: self.model,
        };
        self.error = None;
        self.reset_result();
        self.phase = Phase::Generating;
        Ok(submission)
    }

    /// Applies the server's answer to an in-flight generation.
    ///
    /// Ignored unless a generation is in flight.
    pub fn complete(&mut self, outcome: Result<StylizeResponse, String>) {
        if self.phase != Phase::Generating {
            return;
        }
        match outcome {
            Ok(response) if !response.url.is_empty() => {
                self.result_url = Some(response.url);
                self.description = response.description;
                self.prompt = Some(response.prompt).filter(|p| !p.is_empty());
                self.phase = Phase::ResultReady;
            }
            Ok(_) => self.fail("API did not return a valid image URL."),
            Err(message) if message.trim().is_empty() => {
                self.fail("Failed to generate image. Please try again.")
            }
            Err(message) => self.fail(&message),
        }
    }

    /// Drops the selected file and any result, releasing the preview.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        if self.phase == Phase::Generating {
            return Err(SessionError::Busy);
        }
        self.release_preview();
        self.error = None;
        self.reset_result();
        self.phase = Phase::Idle;
        Ok(())
    }

    fn fail(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.reset_result();
        self.phase = Phase::Failed;
    }

    fn reset_result(&mut self) {
        self.result_url = None;
        self.description = None;
        self.prompt = None;
    }

    fn release_preview(&mut self) {
        if let Some(file) = self.file.take() {
            self.store.revoke(file.preview.url());
        }
    }
}

impl<S: ObjectUrlStore> Drop for Session<S> {
    fn drop(&mut self) {
        self.release_preview();
    }
}
