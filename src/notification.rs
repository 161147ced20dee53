//! Notification Rendering - Reassignment Mail Drafts
//!
//! Rendering is pure: same inquiry and date, same draft. Opening a mail
//! client is the job of a `MailHandoff`.

use std::cell::RefCell;
use std::io::Write;
use std::process::{Command, Stdio};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::EnumMessage;
use thiserror::Error;

use crate::catalog::Catalogs;
use crate::forms::{AdminInquiry, Reassignment};

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write mail draft: {0}")]
    Io(#[from] std::io::Error),
}

/// Sign-off block appended to every draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signature {
    pub name: String,
    pub department: String,
    pub contact: String,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            name: "[Your Name]".to_string(),
            department: "[Your Department]".to_string(),
            contact: "[Contact Information]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailDraft {
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    /// `mailto:` URI with no recipient, subject and body percent-encoded
    pub fn mailto_uri(&self) -> String {
        format!(
            "mailto:?subject={}&body={}",
            encode_uri_component(&self.subject),
            encode_uri_component(&self.body)
        )
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

pub fn render_reassignment(
    inquiry: &AdminInquiry,
    reassignment: &Reassignment,
    date: NaiveDate,
    catalogs: &Catalogs,
    signature: &Signature,
) -> MailDraft {
    let current = catalogs.agents.label_for(&inquiry.assigned_to);
    let proposed = catalogs.agents.label_for(&reassignment.new_assignee);
    let reason = reassignment
        .reason
        .get_message()
        .unwrap_or(reassignment.reason.as_ref());

    let subject = format!("Lead Re-assignment Request - {}", inquiry.lead_source);

    let body = format!(
        "Dear {current},

Lead Re-assignment Notification

Current Lead Details:
* Lead Source: {source}
* Original Assigned Date: {date}
* Current Assignee: {current}

Re-assignment Information:
* Proposed New Assignee: {proposed}
* Reason for Re-assignment: {reason}

Detailed Explanation:
{explanation}

Next Steps:
1. Review the re-assignment request
2. Provide any additional context about the lead
3. Confirm receipt of this re-assignment notification

Best regards,
{name}
{department}
{contact}
",
        source = inquiry.lead_source,
        date = date.format("%-m/%-d/%Y"),
        explanation = reassignment.explanation,
        name = signature.name,
        department = signature.department,
        contact = signature.contact,
    );

    MailDraft { subject, body }
}

/// Side-effect seam for handing a draft to a mail composer
pub trait MailHandoff {
    fn compose(&self, subject: &str, body: &str) -> Result<(), HandoffError>;
}

impl<M: MailHandoff + ?Sized> MailHandoff for &M {
    fn compose(&self, subject: &str, body: &str) -> Result<(), HandoffError> {
        (**self).compose(subject, body)
    }
}

/// Opens the platform's default mail handler with a `mailto:` URI
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMailHandoff;

impl SystemMailHandoff {
    fn opener(uri: &str) -> Command {
        #[cfg(target_os = "macos")]
        let command = {
            let mut c = Command::new("open");
            c.arg(uri);
            c
        };

        #[cfg(target_os = "windows")]
        let command = {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", uri]);
            c
        };

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let command = {
            let mut c = Command::new("xdg-open");
            c.arg(uri);
            c
        };

        command
    }
}

impl MailHandoff for SystemMailHandoff {
    fn compose(&self, subject: &str, body: &str) -> Result<(), HandoffError> {
        let draft = MailDraft { subject: subject.to_string(), body: body.to_string() };
        let mut command = Self::opener(&draft.mailto_uri());
        let program = command.get_program().to_string_lossy().into_owned();

        // fire-and-forget: the composer outlives us
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|source| HandoffError::Launch { program, source })
    }
}

/// Writes the `mailto:` URI, one per line
pub struct WriterHandoff<W: Write> {
    writer: RefCell<W>,
}

impl<W: Write> WriterHandoff<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: RefCell::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> MailHandoff for WriterHandoff<W> {
    fn compose(&self, subject: &str, body: &str) -> Result<(), HandoffError> {
        let draft = MailDraft { subject: subject.to_string(), body: body.to_string() };
        let mut writer = self.writer.borrow_mut();
        writeln!(writer, "{}", draft.mailto_uri())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{Priority, ReassignmentReason};

    fn inquiry() -> (AdminInquiry, Reassignment) {
        let reassignment = Reassignment {
            new_assignee: "agent2".to_string(),
            reason: ReassignmentReason::Workload,
            explanation: "Current agent is at capacity this quarter.".to_string(),
        };
        let inquiry = AdminInquiry {
            lead_source: "Referral".to_string(),
            lead_details: "Author met us at the book fair.".to_string(),
            assigned_to: "agent1".to_string(),
            priority_level: Priority::High,
            reassignment: Some(reassignment.clone()),
        };
        (inquiry, reassignment)
    }

    #[test]
    fn test_render_uses_labels_and_date() {
        let (inquiry, reassignment) = inquiry();
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let draft = render_reassignment(
            &inquiry,
            &reassignment,
            date,
            &Catalogs::default(),
            &Signature::default(),
        );

        assert_eq!(draft.subject, "Lead Re-assignment Request - Referral");
        assert!(draft.body.starts_with("Dear John Doe,\n"));
        assert!(draft.body.contains("* Original Assigned Date: 3/7/2024\n"));
        assert!(draft.body.contains("* Proposed New Assignee: Jane Smith\n"));
        assert!(draft.body.contains("* Reason for Re-assignment: Workload Distribution\n"));
        assert!(draft
            .body
            .contains("Detailed Explanation:\nCurrent agent is at capacity this quarter.\n"));
        assert!(draft.body.ends_with("[Your Name]\n[Your Department]\n[Contact Information]\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let (inquiry, reassignment) = inquiry();
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let catalogs = Catalogs::default();
        let a = render_reassignment(
            &inquiry,
            &reassignment,
            date,
            &catalogs,
            &Signature::default(),
        );
        let b = render_reassignment(
            &inquiry,
            &reassignment,
            date,
            &catalogs,
            &Signature::default(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(encode_uri_component("Re-assignment (1)!"), "Re-assignment%20(1)!");
        assert_eq!(encode_uri_component("line\nbreak"), "line%0Abreak");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_writer_handoff_writes_mailto() {
        let handoff = WriterHandoff::new(Vec::new());
        handoff.compose("Hi there", "Body\n").unwrap();
        let out = String::from_utf8(handoff.into_inner()).unwrap();
        assert_eq!(out, "mailto:?subject=Hi%20there&body=Body%0A\n");
    }
}
