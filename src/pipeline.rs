//! Submission Pipeline - Single Entry Point
//!
//! CRITICAL: a payload only exists after full-form validation. No bypass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::forms::InquiryRecord;
use crate::handlers::{HandlerError, SubmitHandler};
use crate::hashing::payload_digest;
use crate::schema::{FormId, FormSchema, SchemaRegistry};
use crate::validation::{evaluate, validate_form, ValidationResult};
use crate::values::FormValues;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Form not found: {0}")]
    UnknownForm(String),

    #[error("Field not found: {0}")]
    UnknownField(String),

    #[error("Field {0} is not a multi-choice field")]
    NotMultiChoice(String),

    #[error("Validation failed: {}", .0.summary())]
    ValidationFailed(ValidationResult),

    #[error("Handler failed for submission {}: {source}", .payload.id)]
    Handler {
        payload: Box<SubmissionPayload>,
        #[source]
        source: HandlerError,
    },
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Payload belongs to form '{actual}', expected '{expected}'")]
    FormMismatch { expected: String, actual: String },

    #[error("Payload does not match record shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Validated, normalized data released to a handler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionPayload {
    pub id: Uuid,
    pub form: FormId,
    pub submitted_at: DateTime<Utc>,
    pub values: FormValues,
    pub digest: String,
}

impl SubmissionPayload {
    fn new(schema: &FormSchema, values: FormValues) -> Self {
        // string-keyed maps of strings always serialize
        let digest = payload_digest(&schema.id, &values).unwrap_or_default();
        Self {
            id: Uuid::new_v4(),
            form: schema.id.clone(),
            submitted_at: Utc::now(),
            values,
            digest,
        }
    }

    /// Narrow the payload to its form's typed record
    pub fn decode<T: InquiryRecord>(&self) -> Result<T, PayloadError> {
        if self.form != T::FORM_ID {
            return Err(PayloadError::FormMismatch {
                expected: T::FORM_ID.to_string(),
                actual: self.form.clone(),
            });
        }
        let value = serde_json::to_value(&self.values)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Validate the whole form and, if clean, produce the payload.
///
/// Inactive sections and blank optional fields are omitted.
pub fn submit(
    schema: &FormSchema,
    values: &FormValues,
) -> Result<SubmissionPayload, ValidationResult> {
    #[cfg(feature = "test-hooks")]
    VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

    debug!(form = %schema.id, "validating submission");
    match evaluate(schema, values) {
        Ok(normalized) => Ok(SubmissionPayload::new(schema, normalized)),
        Err(result) => {
            warn!(form = %schema.id, errors = result.errors.len(), "submission blocked");
            Err(result)
        }
    }
}

/// Hand a validated payload to its handler.
///
/// Handler failure is reported, never retried.
pub fn dispatch<H: SubmitHandler + ?Sized>(
    payload: SubmissionPayload,
    handler: &H,
) -> Result<SubmissionPayload, PipelineError> {
    match handler.handle(&payload) {
        Ok(()) => {
            info!(
                form = %payload.form,
                id = %payload.id,
                digest = %payload.digest,
                "submission accepted"
            );
            Ok(payload)
        }
        Err(source) => {
            warn!(
                form = %payload.form,
                id = %payload.id,
                error = %source,
                "submission handler failed"
            );
            Err(PipelineError::Handler { payload: Box::new(payload), source })
        }
    }
}

/// The submission pipeline over a set of registered forms
pub struct SubmissionPipeline {
    registry: SchemaRegistry,
}

impl SubmissionPipeline {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    /// List all available forms
    pub fn list_forms(&self) -> Vec<&FormSchema> {
        self.registry.list()
    }

    pub fn schema(&self, id: &str) -> Option<&FormSchema> {
        self.registry.get(id)
    }

    fn require(&self, id: &str) -> Result<&FormSchema, PipelineError> {
        self.registry
            .get(id)
            .ok_or_else(|| PipelineError::UnknownForm(id.to_string()))
    }

    /// Validate without producing a payload
    pub fn validate(
        &self,
        form_id: &str,
        values: &FormValues,
    ) -> Result<ValidationResult, PipelineError> {
        let schema = self.require(form_id)?;
        Ok(validate_form(schema, values))
    }

    pub fn submit(
        &self,
        form_id: &str,
        values: &FormValues,
    ) -> Result<SubmissionPayload, PipelineError> {
        let schema = self.require(form_id)?;
        submit(schema, values).map_err(PipelineError::ValidationFailed)
    }

    /// Validate, then invoke the handler with the payload
    pub fn submit_with<H: SubmitHandler + ?Sized>(
        &self,
        form_id: &str,
        values: &FormValues,
        handler: &H,
    ) -> Result<SubmissionPayload, PipelineError> {
        let payload = self.submit(form_id, values)?;
        dispatch(payload, handler)
    }
}

impl Default for SubmissionPipeline {
    fn default() -> Self {
        Self::new(SchemaRegistry::default())
    }
}
