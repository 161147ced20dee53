//! Publishing inquiry form

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::InquiryRecord;
use crate::catalog::Catalogs;
use crate::schema::{FieldDefinition, FormSchema};

pub const FORM_ID: &str = "publishing";

pub fn schema(catalogs: &Catalogs) -> FormSchema {
    FormSchema::new(
        FORM_ID,
        "Publishing Inquiry",
        vec![
            FieldDefinition::text("agentName", "Agent Name", 2, "Agent name is required"),
            FieldDefinition::text("authorName", "Author Name", 2, "Author name is required"),
            FieldDefinition::text("bookTitle", "Book Title", 2, "Book title is required"),
            FieldDefinition::single_choice(
                "package",
                "Package",
                &catalogs.packages,
                "Please select a package",
            ),
            FieldDefinition::multi_choice(
                "concerns",
                "Concerns",
                &catalogs.concerns,
                1,
                "Select at least one concern",
            ),
            FieldDefinition::free_text("followUp", "Questions / Follow-up"),
        ],
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishingInquiry {
    pub agent_name: String,
    pub author_name: String,
    pub book_title: String,
    pub package: String,
    pub concerns: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
}

impl InquiryRecord for PublishingInquiry {
    const FORM_ID: &'static str = FORM_ID;
}
