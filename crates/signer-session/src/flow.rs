//! Signer session flow
//!
//! `SigningFlow` drives one token redemption from link to saved
//! signatures:
//!
//! ```text
//! Validating ──check ok──▶ AwaitingEmail ──verified──▶ Ready ──saved──▶ Submitted
//!     │                        ▲    │                    │
//!     └──check failed──▶ TokenInvalid  └─failed (stays)   └─failed (stays Ready)
//! ```
//!
//! The flow is the only writer of its [`FieldStore`]. Failures are never
//! swallowed: each one is returned to the caller and also left in the
//! surfacing fields (`error`, `email_error`, `notice`) for the UI.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::SigningApi;
use crate::config::SessionConfig;
use crate::error::{Result, SigningError, INVALID_ACCESS_MESSAGE};
use crate::guard::{OperationGuard, OperationTicket};
use crate::model::{FieldContent, VerifiedSigner};
use crate::store::FieldStore;
use crate::submission::{SubmissionPipeline, SubmissionPlan, SubmissionReceipt};
use crate::summary::SigningSummary;
use crate::verifier::TokenVerifier;

pub const SUBMISSION_SAVED_MESSAGE: &str = "The signature was saved successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Token check pending
    Validating,
    /// Token missing or rejected
    TokenInvalid,
    /// Email prompt open
    AwaitingEmail,
    /// Document and fields loaded
    Ready,
    /// Signatures saved
    Submitted,
}

/// One-shot message for the signer, taken by the UI once shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Success(String),
}

#[derive(Debug)]
struct FlowState {
    phase: SessionPhase,
    store: Option<FieldStore>,
    error: Option<String>,
    email_error: Option<String>,
    notice: Option<Notice>,
}

impl FlowState {
    fn fail(&mut self, err: &SigningError) {
        let message = err.user_message();
        self.notice = Some(Notice::Error(message));
    }
}

pub struct SigningFlow<A> {
    api: A,
    config: SessionConfig,
    state: Mutex<FlowState>,
    guard: OperationGuard,
}

impl<A: SigningApi> SigningFlow<A> {
    /// Open a flow for the token taken from the signing link
    pub fn new(api: A, config: SessionConfig, token: Option<&str>) -> Self {
        let store = token.and_then(|t| FieldStore::new(t).ok());
        let state = match store {
            Some(store) => FlowState {
                phase: SessionPhase::Validating,
                store: Some(store),
                error: None,
                email_error: None,
                notice: None,
            },
            None => {
                warn!("Signing link carries no token");
                FlowState {
                    phase: SessionPhase::TokenInvalid,
                    store: None,
                    error: Some(INVALID_ACCESS_MESSAGE.to_string()),
                    email_error: None,
                    notice: None,
                }
            }
        };

        Self {
            api,
            config,
            state: Mutex::new(state),
            guard: OperationGuard::new(),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }

    /// `None` while the token check is pending
    pub async fn is_valid(&self) -> Option<bool> {
        match self.state.lock().await.phase {
            SessionPhase::Validating => None,
            SessionPhase::TokenInvalid => Some(false),
            _ => Some(true),
        }
    }

    pub async fn email_prompt_open(&self) -> bool {
        self.state.lock().await.phase == SessionPhase::AwaitingEmail
    }

    /// Page-level error message
    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    /// Error shown inside the email prompt
    pub async fn email_error(&self) -> Option<String> {
        self.state.lock().await.email_error.clone()
    }

    /// Take the pending notice, if any
    pub async fn take_notice(&self) -> Option<Notice> {
        self.state.lock().await.notice.take()
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    /// Read the store, if the flow has one
    pub async fn read<R>(&self, f: impl FnOnce(&FieldStore) -> R) -> Option<R> {
        self.state.lock().await.store.as_ref().map(f)
    }

    pub async fn summary(&self) -> Option<SigningSummary> {
        self.read(SigningSummary::from_store).await
    }

    /// Check the token; opens the email prompt on success
    pub async fn start(&self) -> Result<()> {
        let ticket = self.begin().await?;

        let token = {
            let mut state = self.state.lock().await;
            match state.phase {
                SessionPhase::Validating | SessionPhase::TokenInvalid => {}
                _ => return Ok(()),
            }
            match &state.store {
                Some(store) => store.token().to_string(),
                None => {
                    let err = SigningError::MissingToken;
                    state.error = Some(err.user_message());
                    state.fail(&err);
                    return Err(err);
                }
            }
        };

        let verifier = TokenVerifier::new(&self.api, self.config.step_timeout());
        let outcome = verifier.validate_token(&token).await;

        let mut state = self.state.lock().await;
        ticket.ensure_current()?;
        match outcome {
            Ok(()) => {
                state.phase = SessionPhase::AwaitingEmail;
                state.error = None;
                Ok(())
            }
            Err(err) => {
                state.phase = SessionPhase::TokenInvalid;
                state.error = Some(err.user_message());
                state.fail(&err);
                Err(err)
            }
        }
    }

    /// Verify the signer's email and load the document with its fields
    ///
    /// On any failure the store is returned to its pre-verification state
    /// and the email prompt stays open for another attempt.
    pub async fn submit_email(&self, email: &str) -> Result<VerifiedSigner> {
        let ticket = self.begin().await?;

        let token = {
            let mut state = self.state.lock().await;
            let out_of_phase = match state.phase {
                SessionPhase::AwaitingEmail => None,
                SessionPhase::Validating | SessionPhase::TokenInvalid => {
                    Some(SigningError::TokenNotValidated)
                }
                SessionPhase::Ready | SessionPhase::Submitted => Some(SigningError::AlreadyVerified),
            };
            if let Some(err) = out_of_phase {
                state.fail(&err);
                return Err(err);
            }
            match &state.store {
                Some(store) => store.token().to_string(),
                None => return Err(SigningError::MissingToken),
            }
        };

        let verifier = TokenVerifier::new(&self.api, self.config.step_timeout());
        let outcome = verifier.verify_email(&token, email).await;

        let mut state = self.state.lock().await;
        ticket.ensure_current()?;
        let FlowState {
            phase,
            store,
            email_error,
            notice,
            ..
        } = &mut *state;
        let store = store.as_mut().ok_or(SigningError::MissingToken)?;

        let committed = outcome.and_then(|verified| {
            store.set_signer_email(verified.email);
            store.apply_verification(verified.signer.clone());
            store.attach_document(verified.document)?;
            store.replace_fields(verified.fields);
            Ok(verified.signer)
        });

        match committed {
            Ok(signer) => {
                *phase = SessionPhase::Ready;
                *email_error = None;
                info!("Signing session ready for {}", signer.document_id);
                Ok(signer)
            }
            Err(err) => {
                store.reset_verification();
                let message = err.user_message();
                *email_error = Some(message.clone());
                *notice = Some(Notice::Error(message));
                Err(err)
            }
        }
    }

    pub async fn set_content(&self, index: usize, content: FieldContent) -> Result<()> {
        self.write(|store| store.set_content(index, content)).await
    }

    pub async fn clear_content(&self, index: usize) -> Result<()> {
        self.write(|store| store.clear_content(index)).await
    }

    pub async fn navigate_to(&self, page: u32) -> Result<()> {
        self.write(|store| store.navigate_to(page)).await
    }

    /// Upload the drawn signature (if any) and save every field
    pub async fn submit(&self) -> Result<SubmissionReceipt> {
        let ticket = self.begin().await?;

        let plan = {
            let mut state = self.state.lock().await;
            let prepared = state
                .store
                .as_ref()
                .ok_or(SigningError::NothingToSubmit)
                .and_then(SubmissionPlan::prepare);
            match prepared {
                Ok(plan) => plan,
                Err(err) => {
                    state.fail(&err);
                    return Err(err);
                }
            }
        };

        let pipeline = SubmissionPipeline::new(&self.api, self.config.step_timeout());
        let outcome = pipeline.run(plan).await;

        let mut state = self.state.lock().await;
        ticket.ensure_current()?;
        match outcome {
            Ok(receipt) => {
                state.phase = SessionPhase::Submitted;
                state.notice = Some(Notice::Success(SUBMISSION_SAVED_MESSAGE.to_string()));
                Ok(receipt)
            }
            Err(err) => {
                state.fail(&err);
                Err(err)
            }
        }
    }

    /// Return to the email prompt, discarding any in-flight result
    pub async fn reset(&self) {
        self.guard.invalidate();
        let mut state = self.state.lock().await;
        if let Some(store) = state.store.as_mut() {
            store.reset_verification();
        }
        state.phase = match state.phase {
            SessionPhase::Validating | SessionPhase::TokenInvalid => state.phase,
            _ => SessionPhase::AwaitingEmail,
        };
        state.email_error = None;
        state.notice = None;
        info!("Signing session reset");
    }

    /// Claim the operation guard, surfacing a rejected overlap to the signer
    async fn begin(&self) -> Result<OperationTicket<'_>> {
        match self.guard.begin() {
            Ok(ticket) => Ok(ticket),
            Err(err) => {
                warn!("Rejected overlapping operation");
                self.state.lock().await.fail(&err);
                Err(err)
            }
        }
    }

    async fn write<R>(&self, f: impl FnOnce(&mut FieldStore) -> Result<R>) -> Result<R> {
        let mut state = self.state.lock().await;
        match state.store.as_mut() {
            Some(store) => f(store),
            None => Err(SigningError::MissingToken),
        }
    }
}
