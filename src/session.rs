//! Confirmation gate for pipeline invocation.
//!
//! The original upload/confirmation flow tracked a handful of ambient
//! mutable flags. Here it is an explicit state machine: a document must
//! be uploaded and the target language confirmed (or translation
//! explicitly declined) before processing may start, and uploading a
//! new document resets any prior confirmation.

use thiserror::Error;

use crate::translate;

/// Whether and how the pipeline translates cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationMode {
    /// Leave cell text untouched
    Disabled,
    /// Translate every cell into the given target language
    Enabled {
        /// Target language code (must be in the supported catalog)
        target_lang: String,
    },
}

/// States of the confirmation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No document uploaded yet
    Idle,
    /// Document uploaded; waiting for a language confirmation or an
    /// explicit opt-out
    AwaitingConfirmation {
        /// Whether the translation toggle is currently on
        translate: bool,
    },
    /// Gate passed; the pipeline may be invoked
    Ready(TranslationMode),
    /// Pipeline invocation in progress
    Processing(TranslationMode),
    /// Pipeline finished for the current document
    Done,
}

/// Events driving the confirmation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A (new) document was supplied
    FileUploaded,
    /// The translation toggle was switched
    TranslationToggled(bool),
    /// A target language was selected and explicitly confirmed
    LanguageConfirmed(String),
    /// The user chose to proceed without translation
    ProceedWithoutTranslation,
    /// The pipeline invocation completed
    ProcessingFinished,
}

/// Errors raised by illegal session transitions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("event {event} is not valid in state {state}")]
    InvalidTransition { state: String, event: String },

    #[error("unsupported target language: {0}")]
    UnsupportedLanguage(String),

    #[error("pipeline may only start from the Ready state")]
    NotReady,
}

/// The confirmation session.
///
/// Owned by the orchestration layer; the core pipeline never sees it.
/// It only receives the [`TranslationMode`] that [`Session::begin_processing`]
/// hands out.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl Session {
    /// Create a session in the Idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Feed an event into the state machine.
    pub fn handle(&mut self, event: SessionEvent) -> Result<&SessionState, SessionError> {
        use SessionEvent::*;
        use SessionState::*;

        let next = match (&self.state, &event) {
            // A new document resets any prior confirmation, from any state.
            (_, FileUploaded) => AwaitingConfirmation { translate: false },

            (AwaitingConfirmation { .. }, TranslationToggled(on)) => {
                AwaitingConfirmation { translate: *on }
            }

            (AwaitingConfirmation { translate: true }, LanguageConfirmed(code)) => {
                if !translate::is_supported(code) {
                    return Err(SessionError::UnsupportedLanguage(code.clone()));
                }
                Ready(TranslationMode::Enabled {
                    target_lang: code.clone(),
                })
            }

            (AwaitingConfirmation { translate: false }, ProceedWithoutTranslation) => {
                Ready(TranslationMode::Disabled)
            }

            (Processing(_), ProcessingFinished) => Done,

            (state, event) => {
                return Err(SessionError::InvalidTransition {
                    state: format!("{state:?}"),
                    event: format!("{event:?}"),
                })
            }
        };

        self.state = next;
        Ok(&self.state)
    }

    /// Pass the gate: move from Ready to Processing and hand the
    /// confirmed translation mode to the caller. Fails from any other
    /// state, so the pipeline cannot run without explicit confirmation.
    pub fn begin_processing(&mut self) -> Result<TranslationMode, SessionError> {
        match &self.state {
            SessionState::Ready(mode) => {
                let mode = mode.clone();
                self.state = SessionState::Processing(mode.clone());
                Ok(mode)
            }
            _ => Err(SessionError::NotReady),
        }
    }
}
