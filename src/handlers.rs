//! Submission Handlers
//!
//! A handler runs only after validation succeeded. What it does with the
//! payload, and whether that works, is the caller's concern.

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::Catalogs;
use crate::forms::AdminInquiry;
use crate::notification::{render_reassignment, HandoffError, MailDraft, MailHandoff, Signature};
use crate::pipeline::{PayloadError, SubmissionPayload};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Mail handoff failed: {0}")]
    Handoff(#[from] HandoffError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait SubmitHandler {
    fn handle(&self, payload: &SubmissionPayload) -> Result<(), HandlerError>;
}

impl<F> SubmitHandler for F
where
    F: Fn(&SubmissionPayload) -> Result<(), HandlerError>,
{
    fn handle(&self, payload: &SubmissionPayload) -> Result<(), HandlerError> {
        self(payload)
    }
}

/// Runs the first handler, then the second; stops at the first failure
pub struct Chain<A, B>(pub A, pub B);

impl<A: SubmitHandler, B: SubmitHandler> SubmitHandler for Chain<A, B> {
    fn handle(&self, payload: &SubmissionPayload) -> Result<(), HandlerError> {
        self.0.handle(payload)?;
        self.1.handle(payload)
    }
}

/// Logs the submitted values as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

impl SubmitHandler for LogHandler {
    fn handle(&self, payload: &SubmissionPayload) -> Result<(), HandlerError> {
        let values = serde_json::to_string(&payload.values)?;
        info!(
            form = %payload.form,
            id = %payload.id,
            digest = %payload.digest,
            %values,
            "inquiry submitted"
        );
        Ok(())
    }
}

/// Admin handler: renders the reassignment notice and hands it off.
///
/// Admin submissions without a reassignment block pass through untouched.
pub struct ReassignmentMailer<M: MailHandoff> {
    handoff: M,
    catalogs: Catalogs,
    signature: Signature,
    date: Option<NaiveDate>,
}

impl<M: MailHandoff> ReassignmentMailer<M> {
    pub fn new(handoff: M, catalogs: Catalogs, signature: Signature) -> Self {
        Self {
            handoff,
            catalogs,
            signature,
            date: None,
        }
    }

    /// Pin the "original assigned date"; defaults to today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Draft for an admin payload, `None` when no reassignment was requested
    pub fn draft(&self, payload: &SubmissionPayload) -> Result<Option<MailDraft>, HandlerError> {
        let inquiry: AdminInquiry = payload.decode()?;
        let Some(reassignment) = inquiry.reassignment.as_ref() else {
            return Ok(None);
        };
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        Ok(Some(render_reassignment(
            &inquiry,
            reassignment,
            date,
            &self.catalogs,
            &self.signature,
        )))
    }
}

impl<M: MailHandoff> SubmitHandler for ReassignmentMailer<M> {
    fn handle(&self, payload: &SubmissionPayload) -> Result<(), HandlerError> {
        match self.draft(payload)? {
            Some(draft) => {
                self.handoff.compose(&draft.subject, &draft.body)?;
                info!(id = %payload.id, subject = %draft.subject, "reassignment notice handed off");
            }
            None => debug!(id = %payload.id, "no reassignment requested"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SubmissionPipeline;
    use crate::values::FormValues;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        drafts: RefCell<Vec<MailDraft>>,
    }

    impl MailHandoff for Recorder {
        fn compose(&self, subject: &str, body: &str) -> Result<(), HandoffError> {
            self.drafts.borrow_mut().push(MailDraft {
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }

    fn admin_values() -> FormValues {
        FormValues::new()
            .with("leadSource", "Referral")
            .with("leadDetails", "Met at the regional book fair")
            .with("assignedTo", "agent1")
            .with("priorityLevel", "high")
    }

    #[test]
    fn test_mailer_skips_without_reassignment() {
        let recorder = Recorder::default();
        let mailer = ReassignmentMailer::new(&recorder, Catalogs::default(), Signature::default());
        let pipeline = SubmissionPipeline::default();

        pipeline.submit_with("admin", &admin_values(), &mailer).unwrap();
        assert!(recorder.drafts.borrow().is_empty());
    }

    #[test]
    fn test_mailer_hands_off_reassignment() {
        let recorder = Recorder::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mailer = ReassignmentMailer::new(&recorder, Catalogs::default(), Signature::default())
            .with_date(date);
        let pipeline = SubmissionPipeline::default();

        let values = admin_values()
            .with("reassignment.newAssignee", "agent3")
            .with("reassignment.reason", "expertise")
            .with("reassignment.explanation", "Needs a genre specialist.");
        pipeline.submit_with("admin", &values, &Chain(LogHandler, mailer)).unwrap();

        let drafts = recorder.drafts.borrow();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].subject, "Lead Re-assignment Request - Referral");
        assert!(drafts[0].body.contains("* Proposed New Assignee: Mike Johnson"));
        assert!(drafts[0].body.contains("* Original Assigned Date: 1/15/2024"));
    }

    #[test]
    fn test_mailer_rejects_other_forms() {
        let recorder = Recorder::default();
        let mailer = ReassignmentMailer::new(&recorder, Catalogs::default(), Signature::default());
        let values = FormValues::new()
            .with("agentName", "Jo")
            .with("authorName", "Ann Lee")
            .with("bookTitle", "Dune")
            .with("package", "standard")
            .with("concerns", crate::values::FieldValue::choices(["editing"]));
        let payload = SubmissionPipeline::default().submit("publishing", &values).unwrap();

        let err = mailer.handle(&payload).unwrap_err();
        assert!(matches!(err, HandlerError::Payload(PayloadError::FormMismatch { .. })));
    }
}
