//! Mail-contact form
//!
//! Collects how and when an author wants to be reached.

use serde::{Deserialize, Serialize};

use super::{CommunicationMethod, InquiryRecord};
use crate::catalog::Catalogs;
use crate::schema::{FieldDefinition, FormSchema};

pub const FORM_ID: &str = "mail-contact";

pub const MIN_PHONE_DIGITS: usize = 10;

pub fn schema(catalogs: &Catalogs) -> FormSchema {
    FormSchema::new(
        FORM_ID,
        "Mail Contact",
        vec![
            FieldDefinition::text("authorName", "Author Name", 2, "Author name is required"),
            FieldDefinition::text("address", "Address", 5, "Address is required"),
            FieldDefinition::phone(
                "phoneNumber",
                "Phone Number",
                MIN_PHONE_DIGITS,
                "Valid phone number is required",
            ),
            FieldDefinition::email("email", "Email", "Valid email is required"),
            FieldDefinition::enumeration(
                "preferredCommunicationMethod",
                "Preferred Communication Method",
                &catalogs.communication_methods,
                CommunicationMethod::Email.as_ref(),
            ),
            FieldDefinition::time_of_day(
                "preferredContactTime",
                "Preferred Contact Time",
                "Preferred contact time is required",
            ),
        ],
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailContactRequest {
    pub author_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub preferred_communication_method: CommunicationMethod,
    /// `HH:MM`, 24-hour
    pub preferred_contact_time: String,
}

impl InquiryRecord for MailContactRequest {
    const FORM_ID: &'static str = FORM_ID;
}
