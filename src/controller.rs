//! Form State Controller
//!
//! One controller per form instance. It owns the values, tracks which
//! paths the user touched, and keeps per-field errors current as input
//! changes.
//!
//! Phases: `Pristine -> Editing -> Submitting -> Submitted`, or back to
//! `Editing` when submit-time validation fails.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::handlers::SubmitHandler;
use crate::pipeline::{self, PipelineError, SubmissionPayload};
use crate::schema::{FieldKind, FormSchema};
use crate::validation::{validate_form, validate_path, FieldError, ValidationResult};
use crate::values::{FieldValue, FormValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    Pristine,
    Editing,
    Submitting,
    Submitted,
}

pub struct FormController {
    schema: FormSchema,
    defaults: FormValues,
    values: FormValues,
    touched: IndexSet<String>,
    errors: IndexMap<String, FieldError>,
    phase: FormPhase,
    reset_on_success: bool,
    last_submission: Option<SubmissionPayload>,
}

impl FormController {
    pub fn new(schema: FormSchema) -> Self {
        let defaults = schema.default_values();
        Self {
            values: defaults.clone(),
            defaults,
            schema,
            touched: IndexSet::new(),
            errors: IndexMap::new(),
            phase: FormPhase::Pristine,
            reset_on_success: false,
            last_submission: None,
        }
    }

    /// Restore defaults after a submission the handler accepted
    pub fn with_reset_on_success(mut self, reset: bool) -> Self {
        self.reset_on_success = reset;
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, path: &str) -> Option<&FieldValue> {
        self.values.get(path)
    }

    pub fn error(&self, path: &str) -> Option<&FieldError> {
        self.errors.get(path)
    }

    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.touched.contains(path)
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.defaults
    }

    /// Full-form validity of the current values
    pub fn validation(&self) -> ValidationResult {
        validate_form(&self.schema, &self.values)
    }

    pub fn is_valid(&self) -> bool {
        self.validation().valid
    }

    pub fn last_submission(&self) -> Option<&SubmissionPayload> {
        self.last_submission.as_ref()
    }

    pub fn set_value(
        &mut self,
        path: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), PipelineError> {
        self.ensure_field(path)?;
        self.values.set(path, value);
        self.touch(path);
        Ok(())
    }

    pub fn set_text(&mut self, path: &str, text: &str) -> Result<(), PipelineError> {
        self.set_value(path, FieldValue::text(text))
    }

    /// Blank the field: empty text, or an empty selection
    pub fn clear(&mut self, path: &str) -> Result<(), PipelineError> {
        let kind = self.ensure_field(path)?;
        let blank = match kind {
            FieldKind::MultiChoice => FieldValue::Choices(IndexSet::new()),
            _ => FieldValue::text(""),
        };
        self.set_value(path, blank)
    }

    /// Select (`checked`) or deselect one option of a multi-choice field
    pub fn set_choice(
        &mut self,
        path: &str,
        option: &str,
        checked: bool,
    ) -> Result<bool, PipelineError> {
        if self.ensure_field(path)? != FieldKind::MultiChoice {
            return Err(PipelineError::NotMultiChoice(path.to_string()));
        }
        let changed = self.values.set_choice(path, option, checked);
        self.touch(path);
        Ok(changed)
    }

    /// Flip one option; returns whether it is now selected
    pub fn toggle_choice(&mut self, path: &str, option: &str) -> Result<bool, PipelineError> {
        let selected = self
            .values
            .choices(path)
            .is_some_and(|set| set.contains(option));
        self.set_choice(path, option, !selected)?;
        Ok(!selected)
    }

    /// Validate the whole form and, on success, hand the payload to `handler`.
    ///
    /// A failed handler leaves the values in place even when
    /// reset-on-success is set.
    pub fn submit<H: SubmitHandler + ?Sized>(
        &mut self,
        handler: &H,
    ) -> Result<SubmissionPayload, PipelineError> {
        self.phase = FormPhase::Submitting;

        let payload = match pipeline::submit(&self.schema, &self.values) {
            Ok(payload) => payload,
            Err(result) => {
                self.errors = result
                    .errors
                    .iter()
                    .map(|e| (e.field.clone(), e.clone()))
                    .collect();
                self.touched.extend(result.errors.iter().map(|e| e.field.clone()));
                self.phase = FormPhase::Editing;
                return Err(PipelineError::ValidationFailed(result));
            }
        };

        self.errors.clear();
        self.phase = FormPhase::Submitted;
        let payload = pipeline::dispatch(payload, handler)?;

        if self.reset_on_success {
            self.values = self.defaults.clone();
            self.touched.clear();
        }
        self.last_submission = Some(payload.clone());
        Ok(payload)
    }

    /// Back to defaults and `Pristine`
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.touched.clear();
        self.errors.clear();
        self.phase = FormPhase::Pristine;
    }

    fn ensure_field(&self, path: &str) -> Result<FieldKind, PipelineError> {
        self.schema
            .locate(path)
            .map(|location| location.field.kind)
            .ok_or_else(|| PipelineError::UnknownField(path.to_string()))
    }

    fn touch(&mut self, path: &str) {
        self.touched.insert(path.to_string());
        self.phase = FormPhase::Editing;
        self.revalidate(path);
    }

    /// Re-check `path`; inside a section, re-check every touched sibling
    /// since the section may have switched between active and inactive.
    fn revalidate(&mut self, path: &str) {
        let section_paths = self
            .schema
            .locate(path)
            .and_then(|location| location.section)
            .map(|section| section.fields.iter().map(|f| section.path_of(f)).collect::<Vec<_>>());

        let paths = match section_paths {
            Some(paths) => paths
                .into_iter()
                .filter(|p| p == path || self.touched.contains(p))
                .collect(),
            None => vec![path.to_string()],
        };

        for p in paths {
            match validate_path(&self.schema, &self.values, &p) {
                Some(err) => {
                    debug!(form = %self.schema.id, field = %p, rule = %err.rule, "field invalid");
                    self.errors.insert(p, err);
                }
                None => {
                    self.errors.shift_remove(&p);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerError;
    use crate::schema::SchemaRegistry;

    fn controller(form: &str) -> FormController {
        let registry = SchemaRegistry::default();
        FormController::new(registry.get(form).unwrap().clone())
    }

    fn accept(_: &SubmissionPayload) -> Result<(), HandlerError> {
        Ok(())
    }

    fn fill_publishing(form: &mut FormController) {
        form.set_text("agentName", "Jo").unwrap();
        form.set_text("authorName", "Ann Lee").unwrap();
        form.set_text("bookTitle", "Dune").unwrap();
        form.set_text("package", "standard").unwrap();
        form.set_choice("concerns", "editing", true).unwrap();
    }

    #[test]
    fn test_phase_transitions() {
        let mut form = controller("publishing");
        assert_eq!(form.phase(), FormPhase::Pristine);
        assert!(!form.is_dirty());

        form.set_text("agentName", "Jo").unwrap();
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(form.is_dirty());

        let err = form.submit(&accept).unwrap_err();
        assert!(matches!(err, PipelineError::ValidationFailed(_)));
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(form.error("bookTitle").is_some());
        assert!(form.is_touched("bookTitle"));

        fill_publishing(&mut form);
        form.submit(&accept).unwrap();
        assert_eq!(form.phase(), FormPhase::Submitted);
        assert_eq!(form.errors().count(), 0);

        form.set_text("followUp", "Any update?").unwrap();
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn test_field_revalidates_on_change() {
        let mut form = controller("marketing");
        form.set_text("priorityReason", "short").unwrap();
        assert_eq!(
            form.error("priorityReason").map(|e| e.message.as_str()),
            Some("Please provide a reason for the priority")
        );
        form.set_text("priorityReason", "Launch date moved up").unwrap();
        assert!(form.error("priorityReason").is_none());
        // untouched fields stay quiet until submit
        assert!(form.error("agentName").is_none());
    }

    #[test]
    fn test_section_errors_follow_activation() {
        let mut form = controller("admin");
        form.set_text("reassignment.reason", "workload").unwrap();
        form.set_text("reassignment.newAssignee", "").unwrap();
        assert!(form.error("reassignment.newAssignee").is_some());

        form.clear("reassignment.reason").unwrap();
        assert!(form.error("reassignment.newAssignee").is_none());
        assert!(form.error("reassignment.reason").is_none());
    }

    #[test]
    fn test_toggle_choice() {
        let mut form = controller("publishing");
        assert!(form.toggle_choice("concerns", "editing").unwrap());
        assert!(form.error("concerns").is_none());
        assert!(!form.toggle_choice("concerns", "editing").unwrap());
        assert_eq!(
            form.error("concerns").map(|e| e.message.as_str()),
            Some("Select at least one concern")
        );
    }

    #[test]
    fn test_choice_ops_need_multi_choice_field() {
        let mut form = controller("publishing");
        form.set_text("bookTitle", "Dune").unwrap();

        let err = form.set_choice("bookTitle", "editing", true).unwrap_err();
        assert!(matches!(err, PipelineError::NotMultiChoice(path) if path == "bookTitle"));
        let err = form.toggle_choice("package", "standard").unwrap_err();
        assert!(matches!(err, PipelineError::NotMultiChoice(_)));

        assert_eq!(form.value("bookTitle"), Some(&FieldValue::text("Dune")));
        assert!(form.error("bookTitle").is_none());
    }

    #[test]
    fn test_is_valid_tracks_values() {
        let mut form = controller("publishing");
        assert!(!form.is_valid());
        fill_publishing(&mut form);
        assert!(form.is_valid());
        form.clear("concerns").unwrap();
        assert!(!form.is_valid());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut form = controller("publishing");
        let err = form.set_text("reassignment.reason", "workload").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownField(_)));
        assert_eq!(form.phase(), FormPhase::Pristine);
    }

    #[test]
    fn test_reset_on_success() {
        let mut form = controller("publishing").with_reset_on_success(true);
        fill_publishing(&mut form);
        let payload = form.submit(&accept).unwrap();

        assert!(!form.is_dirty());
        assert_eq!(form.last_submission().map(|p| p.id), Some(payload.id));
        assert_eq!(form.phase(), FormPhase::Submitted);
    }

    #[test]
    fn test_handler_failure_keeps_values() {
        let mut form = controller("publishing").with_reset_on_success(true);
        fill_publishing(&mut form);
        let reject = |_: &SubmissionPayload| -> Result<(), HandlerError> {
            Err(HandlerError::Rejected("offline".into()))
        };

        let err = form.submit(&reject).unwrap_err();
        assert!(matches!(err, PipelineError::Handler { .. }));
        assert!(form.is_dirty());
        assert_eq!(form.phase(), FormPhase::Submitted);
        assert!(form.last_submission().is_none());
    }

    #[test]
    fn test_reset_restores_pristine() {
        let mut form = controller("mail-contact");
        form.set_text("email", "not-an-email").unwrap();
        assert!(form.error("email").is_some());

        form.reset();
        assert_eq!(form.phase(), FormPhase::Pristine);
        assert_eq!(form.errors().count(), 0);
        assert_eq!(form.value("preferredCommunicationMethod"), Some(&FieldValue::text("email")));
    }
}
