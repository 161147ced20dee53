//! Marketing inquiry form

use serde::{Deserialize, Serialize};

use super::{InquiryRecord, Priority, RequestType};
use crate::catalog::Catalogs;
use crate::schema::{FieldDefinition, FormSchema};

pub const FORM_ID: &str = "marketing";

pub fn schema(catalogs: &Catalogs) -> FormSchema {
    FormSchema::new(
        FORM_ID,
        "Marketing Inquiry",
        vec![
            FieldDefinition::text("agentName", "Agent Name", 2, "Agent name is required"),
            FieldDefinition::text("authorName", "Author Name", 2, "Author name is required"),
            FieldDefinition::text("bookTitle", "Book Title", 2, "Book title is required"),
            FieldDefinition::text("service", "Service", 2, "Service is required"),
            FieldDefinition::enumeration(
                "requestType",
                "Request Type",
                &catalogs.request_types,
                RequestType::BookLaunch.as_ref(),
            ),
            FieldDefinition::enumeration(
                "priority",
                "Priority",
                &catalogs.priorities,
                Priority::Medium.as_ref(),
            ),
            FieldDefinition::long_text(
                "priorityReason",
                "Reason for Priority",
                10,
                "Please provide a reason for the priority",
            ),
        ],
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingInquiry {
    pub agent_name: String,
    pub author_name: String,
    pub book_title: String,
    pub service: String,
    pub request_type: RequestType,
    pub priority: Priority,
    pub priority_reason: String,
}

impl InquiryRecord for MarketingInquiry {
    const FORM_ID: &'static str = FORM_ID;
}
