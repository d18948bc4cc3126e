//! Signer-side session logic for DocSign
//!
//! A recipient arrives through a single-use signing link, proves their
//! email, fills the signature fields placed for them and submits. This
//! crate holds the state machine and submission pipeline behind that page;
//! rendering and widgets live elsewhere and drive it through
//! [`SigningFlow`].
//!
//! # Example
//!
//! ```no_run
//! use signer_session::{FieldContent, SessionConfig, SigningApi, SigningFlow};
//!
//! # async fn example(api: impl SigningApi) -> signer_session::Result<()> {
//! let flow = SigningFlow::new(api, SessionConfig::default(), Some("link-token"));
//! flow.start().await?;
//! flow.submit_email("ada@example.com").await?;
//! flow.set_content(0, FieldContent::Text("Ada Lovelace".into())).await?;
//! let receipt = flow.submit().await?;
//! println!("saved {} fields", receipt.record_count);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod flow;
pub mod guard;
pub mod image;
pub mod model;
pub mod pages;
pub mod store;
pub mod submission;
pub mod summary;
pub mod verifier;

pub use api::SigningApi;
pub use config::{ApiConfig, SessionConfig, SignerConfig};
pub use error::{ApiError, Result, SigningError};
pub use flow::{Notice, SessionPhase, SigningFlow};
pub use image::{SignatureImage, SignatureUpload};
pub use model::{
    DocumentHandle, FieldContent, FieldKind, FieldRecord, Position, SignatureField,
    SignerSubmission, Size, SubmissionRecord, VerifiedSigner,
};
pub use pages::{PageGroupIndex, PageNavigator};
pub use store::FieldStore;
pub use submission::{SubmissionPipeline, SubmissionPlan, SubmissionReceipt};
pub use summary::SigningSummary;
pub use verifier::{TokenVerifier, VerifiedSession};
