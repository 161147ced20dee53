//! Inquiry Forms - Validation and Submission Pipeline
//!
//! # Ground Rules
//! 1. Schemas Are Contracts
//! 2. No Payload Without Full Validation
//! 3. Sections Are All-or-Nothing
//! 4. Rendering Is Deterministic
//! 5. Side Effects Live Behind Traits

pub mod catalog;
pub mod values;
pub mod schema;
pub mod validation;
pub mod forms;
pub mod hashing;
pub mod pipeline;
pub mod controller;
pub mod notification;
pub mod handlers;
pub mod config;
pub mod telemetry;

pub use catalog::{Catalogs, OptionCatalog, OptionItem};
pub use values::{FieldValue, FormValues};
pub use schema::{FieldDefinition, FieldKind, FormId, FormSchema, Rule, SchemaRegistry, SubSchema};
pub use validation::{FieldError, ValidationResult};
pub use forms::{
    AdminInquiry, InquiryRecord, MailContactRequest, MarketingInquiry, PublishingInquiry,
    Reassignment,
};
pub use pipeline::{PipelineError, SubmissionPayload, SubmissionPipeline};
pub use controller::{FormController, FormPhase};
pub use notification::{MailDraft, MailHandoff, Signature};
pub use handlers::{HandlerError, LogHandler, ReassignmentMailer, SubmitHandler};
pub use config::FormsConfig;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
