//! Inquiry Forms - Concrete Schemas and Typed Records
//!
//! Each form module exposes `FORM_ID`, `schema(&Catalogs)` and the typed
//! record its payload decodes into.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumMessage, EnumString, IntoEnumIterator};

use crate::catalog::{Catalogs, OptionCatalog, OptionItem};
use crate::schema::FormSchema;

pub mod admin;
pub mod mail_contact;
pub mod marketing;
pub mod publishing;

pub use admin::{AdminInquiry, Reassignment};
pub use mail_contact::MailContactRequest;
pub use marketing::MarketingInquiry;
pub use publishing::PublishingInquiry;

/// Typed record a submission payload decodes into
pub trait InquiryRecord: DeserializeOwned + Serialize {
    const FORM_ID: &'static str;
}

/// The four inquiry forms, in tab order
pub fn builtin_schemas(catalogs: &Catalogs) -> Vec<FormSchema> {
    vec![
        publishing::schema(catalogs),
        marketing::schema(catalogs),
        admin::schema(catalogs),
        mail_contact::schema(catalogs),
    ]
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumIter,
    EnumMessage, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Priority {
    #[strum(message = "High")]
    High,
    #[strum(message = "Medium")]
    Medium,
    #[strum(message = "Low")]
    Low,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumIter,
    EnumMessage, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RequestType {
    #[strum(message = "Book Launch")]
    BookLaunch,
    #[strum(message = "Social Media Campaign")]
    SocialMedia,
    #[strum(message = "Press Release")]
    PressRelease,
    #[strum(message = "Book Signing")]
    BookSigning,
    #[strum(message = "Media Outreach")]
    MediaOutreach,
    #[strum(message = "Others")]
    Others,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumIter,
    EnumMessage, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReassignmentReason {
    #[strum(message = "Performance Concerns")]
    Performance,
    #[strum(message = "Workload Distribution")]
    Workload,
    #[strum(message = "Specialized Expertise Required")]
    Expertise,
    #[strum(message = "Other")]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumIter,
    EnumMessage, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CommunicationMethod {
    #[strum(message = "Email")]
    Email,
    #[strum(message = "Phone")]
    Phone,
    #[strum(message = "Mail")]
    Mail,
}

/// Catalog whose options mirror an enum's variants
pub fn enum_catalog<E>(name: &str) -> OptionCatalog
where
    E: IntoEnumIterator + EnumMessage + AsRef<str>,
{
    OptionCatalog {
        name: name.to_string(),
        options: E::iter()
            .map(|variant| {
                let value = variant.as_ref();
                OptionItem::new(value, variant.get_message().unwrap_or(value))
            })
            .collect(),
    }
}
