//! Admin lead management form
//!
//! The reassignment block is a sub-schema: either every field is filled
//! and valid, or the whole block is left blank and dropped from the payload.

use serde::{Deserialize, Serialize};

use super::{InquiryRecord, Priority, ReassignmentReason};
use crate::catalog::Catalogs;
use crate::schema::{FieldDefinition, FormSchema, SubSchema};

pub const FORM_ID: &str = "admin";
pub const REASSIGNMENT: &str = "reassignment";

pub fn schema(catalogs: &Catalogs) -> FormSchema {
    FormSchema::new(
        FORM_ID,
        "Admin",
        vec![
            FieldDefinition::text("leadSource", "Lead Source", 2, "Lead source is required"),
            FieldDefinition::long_text(
                "leadDetails",
                "Lead Details",
                10,
                "Lead details are required",
            ),
            FieldDefinition::single_choice(
                "assignedTo",
                "Assigned To",
                &catalogs.agents,
                "Please select an agent",
            ),
            FieldDefinition::enumeration(
                "priorityLevel",
                "Priority Level",
                &catalogs.priorities,
                Priority::Medium.as_ref(),
            ),
        ],
    )
    .with_section(SubSchema::new(
        REASSIGNMENT,
        "Lead Re-assignment",
        vec![
            FieldDefinition::single_choice(
                "newAssignee",
                "New Assignee",
                &catalogs.agents,
                "Please select a new assignee",
            ),
            FieldDefinition::single_choice(
                "reason",
                "Reason for Re-assignment",
                &catalogs.reassignment_reasons,
                "Please select a reason for re-assignment",
            ),
            FieldDefinition::long_text(
                "explanation",
                "Detailed Explanation",
                10,
                "Please provide a detailed explanation for the re-assignment",
            ),
        ],
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInquiry {
    pub lead_source: String,
    pub lead_details: String,
    pub assigned_to: String,
    pub priority_level: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reassignment: Option<Reassignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reassignment {
    pub new_assignee: String,
    pub reason: ReassignmentReason,
    pub explanation: String,
}

impl InquiryRecord for AdminInquiry {
    const FORM_ID: &'static str = FORM_ID;
}
