//! Validation System - Rules Produce Field Errors
//!
//! Field rules are pure. Section policy (all-or-nothing) is applied on top.

use std::sync::LazyLock;

use chrono::NaiveTime;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::schema::{FieldDefinition, FormId, FormSchema, Rule, SubSchema};
use crate::values::{FieldValue, FormValues};

pub const RULE_REQUIRED: &str = "required";
pub const RULE_TYPE: &str = "type";

/// A single field failing its rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, rule: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub form: FormId,
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn success(schema: &FormSchema) -> Self {
        Self {
            form: schema.id.clone(),
            valid: true,
            errors: vec![],
        }
    }

    pub fn failure(schema: &FormSchema, errors: Vec<FieldError>) -> Self {
        Self {
            form: schema.id.clone(),
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error_for(&self, path: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == path)
    }

    /// Field path to message, in schema order
    pub fn messages(&self) -> IndexMap<&str, &str> {
        self.errors
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect()
    }

    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl FieldDefinition {
    /// Check a value against this field's own required flag.
    ///
    /// Returns the normalized value, `None` for a blank optional field.
    pub fn validate(&self, value: Option<&FieldValue>) -> Result<Option<FieldValue>, FieldError> {
        self.validate_at(&self.name, value, self.required)
    }

    pub fn error_for(&self, value: Option<&FieldValue>) -> Option<FieldError> {
        self.validate(value).err()
    }

    pub(crate) fn validate_at(
        &self,
        path: &str,
        value: Option<&FieldValue>,
        required: bool,
    ) -> Result<Option<FieldValue>, FieldError> {
        match value {
            Some(value) if !value.is_blank() => apply_rule(&self.rule, path, value).map(Some),
            _ if required => Err(FieldError::new(path, RULE_REQUIRED, self.rule.message())),
            _ => Ok(None),
        }
    }
}

fn apply_rule(rule: &Rule, path: &str, value: &FieldValue) -> Result<FieldValue, FieldError> {
    let fail = || FieldError::new(path, rule.name(), rule.message());

    let normalized = match rule {
        Rule::AnyOf { options, min_selected, .. } => {
            let selected = value.as_choices().ok_or_else(|| {
                FieldError::new(
                    path,
                    RULE_TYPE,
                    format!("Expected a list of options, got {}", value.kind_name()),
                )
            })?;
            let mut canonical = IndexSet::with_capacity(selected.len());
            for item in selected {
                let tag = options.canonical(item).ok_or_else(|| {
                    FieldError::new(path, rule.name(), format!("Unknown option '{}'", item))
                })?;
                canonical.insert(tag.to_string());
            }
            if canonical.len() < *min_selected {
                return Err(fail());
            }
            return Ok(FieldValue::Choices(canonical));
        }
        Rule::Unconstrained => expect_text(path, value)?.to_string(),
        Rule::MinLength { min, .. } => {
            let text = expect_text(path, value)?;
            if text.chars().count() < *min {
                return Err(fail());
            }
            text.to_string()
        }
        Rule::Email { .. } => {
            let text = expect_text(path, value)?;
            if !is_email(text) {
                return Err(fail());
            }
            text.to_string()
        }
        Rule::Phone { min_digits, .. } => {
            let text = expect_text(path, value)?;
            let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
            if digits < *min_digits || !text.chars().all(is_phone_char) {
                return Err(fail());
            }
            text.to_string()
        }
        Rule::TimeOfDay { .. } => {
            let text = expect_text(path, value)?;
            NaiveTime::parse_from_str(text, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
                .map_err(|_| fail())?
                .format("%H:%M")
                .to_string()
        }
        Rule::OneOf { options, .. } => {
            let text = expect_text(path, value)?;
            options.canonical(text).ok_or_else(fail)?.to_string()
        }
    };

    Ok(FieldValue::Text(normalized))
}

/// Trimmed text of a value, or a shape error
fn expect_text<'a>(path: &str, value: &'a FieldValue) -> Result<&'a str, FieldError> {
    value
        .as_text()
        .map(str::trim)
        .ok_or_else(|| {
            FieldError::new(
                path,
                RULE_TYPE,
                format!("Expected text, got {}", value.kind_name()),
            )
        })
}

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')' | '+')
}

/// Local part ends in a letter, digit or `_+-`; the TLD is letters only.
/// No lookaround in `regex`, so `is_email` rejects a leading dot and `..`.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("email pattern is valid")
});

/// `local@domain.tld` shape check
pub fn is_email(input: &str) -> bool {
    !input.starts_with('.') && !input.contains("..") && EMAIL_REGEX.is_match(input)
}

/// Section state derived from the current values
enum SectionInput<'a> {
    Inactive,
    Active(&'a FormValues),
    Malformed,
}

fn section_input<'a>(section: &SubSchema, values: &'a FormValues) -> SectionInput<'a> {
    match values.get(&section.name) {
        Some(FieldValue::Group(group)) if has_declared_input(section, group) => {
            SectionInput::Active(group)
        }
        Some(other) if !other.is_blank() && other.as_group().is_none() => SectionInput::Malformed,
        _ => SectionInput::Inactive,
    }
}

/// Keys the section does not declare never activate it
fn has_declared_input(section: &SubSchema, group: &FormValues) -> bool {
    section
        .fields
        .iter()
        .any(|f| group.get(&f.name).is_some_and(|v| !v.is_blank()))
}

/// Validate the whole form and build the normalized snapshot
pub fn evaluate(schema: &FormSchema, values: &FormValues) -> Result<FormValues, ValidationResult> {
    let mut errors = vec![];
    let mut normalized = FormValues::new();

    for field in &schema.fields {
        match field.validate_at(&field.name, values.get(&field.name), field.required) {
            Ok(Some(value)) => normalized.set(&field.name, value),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
    }

    for section in &schema.sections {
        match section_input(section, values) {
            SectionInput::Inactive => {}
            SectionInput::Malformed => errors.push(FieldError::new(
                &section.name,
                RULE_TYPE,
                format!("{} must be a group of fields", section.label),
            )),
            SectionInput::Active(group) => {
                let mut nested = FormValues::new();
                let before = errors.len();
                for field in &section.fields {
                    let path = section.path_of(field);
                    match field.validate_at(&path, group.get(&field.name), true) {
                        Ok(Some(value)) => nested.set(&field.name, value),
                        Ok(None) => {}
                        Err(err) => errors.push(err),
                    }
                }
                if errors.len() == before {
                    normalized.set(&section.name, FieldValue::Group(nested));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(ValidationResult::failure(schema, errors))
    }
}

pub fn validate_form(schema: &FormSchema, values: &FormValues) -> ValidationResult {
    match evaluate(schema, values) {
        Ok(_) => ValidationResult::success(schema),
        Err(result) => result,
    }
}

/// Re-validate one path in the context of the whole form.
///
/// Fields of an inactive section never report errors.
pub fn validate_path(schema: &FormSchema, values: &FormValues, path: &str) -> Option<FieldError> {
    let location = schema.locate(path)?;
    match location.section {
        None => location
            .field
            .validate_at(path, values.get(path), location.field.required)
            .err(),
        Some(section) => match section_input(section, values) {
            SectionInput::Inactive => None,
            SectionInput::Malformed => Some(FieldError::new(
                &section.name,
                RULE_TYPE,
                format!("{} must be a group of fields", section.label),
            )),
            SectionInput::Active(_) => {
                location.field.validate_at(path, values.get(path), true).err()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalogs;

    #[test]
    fn test_min_length_counts_trimmed_chars() {
        let field = FieldDefinition::text("agentName", "Agent Name", 2, "Agent name is required");
        assert!(field.error_for(Some(&FieldValue::text("Jo"))).is_none());

        let err = field.error_for(Some(&FieldValue::text(" J "))).unwrap();
        assert_eq!(err.rule, "min_length");
        assert_eq!(err.message, "Agent name is required");

        let err = field.error_for(None).unwrap();
        assert_eq!(err.rule, RULE_REQUIRED);
        assert_eq!(err.message, "Agent name is required");
    }

    #[test]
    fn test_text_is_trimmed() {
        let field = FieldDefinition::text("bookTitle", "Book Title", 2, "Book title is required");
        let value = field.validate(Some(&FieldValue::text("  Dune "))).unwrap();
        assert_eq!(value, Some(FieldValue::text("Dune")));
    }

    #[test]
    fn test_optional_blank_is_omitted() {
        let field = FieldDefinition::free_text("followUp", "Questions / Follow-up");
        assert_eq!(field.validate(Some(&FieldValue::text("  "))), Ok(None));
        assert_eq!(field.validate(None), Ok(None));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_email("ann@example.com"));
        assert!(is_email("ann.lee+books@mail.example.org"));
        assert!(!is_email("ann@example"));
        assert!(!is_email(".ann@example.com"));
        assert!(!is_email("ann..lee@example.com"));
        assert!(!is_email("ann@-example.com"));
        assert!(!is_email("ann@example.c0m"));
        assert!(!is_email("annexample.com"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ann'@example.com"));
        assert!(!is_email("ann.@example.com"));
        assert!(is_email("o'brien@example.ie"));
        assert!(is_email("ANN@EXAMPLE.COM"));
    }

    #[test]
    fn test_phone_counts_digits() {
        let field =
            FieldDefinition::phone("phoneNumber", "Phone", 10, "Valid phone number is required");
        assert!(field.error_for(Some(&FieldValue::text("(555) 123-4567"))).is_none());
        assert!(field.error_for(Some(&FieldValue::text("555-1234"))).is_some());
        assert!(field.error_for(Some(&FieldValue::text("555 123 456x"))).is_some());
    }

    #[test]
    fn test_time_of_day_normalizes() {
        let field = FieldDefinition::time_of_day(
            "preferredContactTime",
            "Time",
            "Preferred contact time is required",
        );
        assert_eq!(
            field.validate(Some(&FieldValue::text("9:05"))).unwrap(),
            Some(FieldValue::text("09:05"))
        );
        assert_eq!(
            field.validate(Some(&FieldValue::text("14:30:00"))).unwrap(),
            Some(FieldValue::text("14:30"))
        );
        assert!(field.error_for(Some(&FieldValue::text("25:00"))).is_some());
    }

    #[test]
    fn test_enum_coerced_to_canonical_tag() {
        let catalogs = Catalogs::default();
        let field =
            FieldDefinition::enumeration("priority", "Priority", &catalogs.priorities, "medium");
        assert_eq!(
            field.validate(Some(&FieldValue::text("High"))).unwrap(),
            Some(FieldValue::text("high"))
        );

        let err = field.error_for(Some(&FieldValue::text("urgent"))).unwrap();
        assert_eq!(err.rule, "one_of");
        assert_eq!(err.message, "Invalid option. Expected one of: high, medium, low");
    }

    #[test]
    fn test_multi_choice_rules() {
        let catalogs = Catalogs::default();
        let field = FieldDefinition::multi_choice(
            "concerns",
            "Concerns",
            &catalogs.concerns,
            1,
            "Select at least one concern",
        );

        let err = field.error_for(Some(&FieldValue::choices(Vec::<String>::new()))).unwrap();
        assert_eq!(err.rule, RULE_REQUIRED);
        assert_eq!(err.message, "Select at least one concern");

        let err = field.error_for(Some(&FieldValue::choices(["ghostwriting"]))).unwrap();
        assert_eq!(err.message, "Unknown option 'ghostwriting'");

        let value = field
            .validate(Some(&FieldValue::choices(["Editing", "editing", "cover-design"])))
            .unwrap();
        assert_eq!(value, Some(FieldValue::choices(["editing", "cover-design"])));
    }

    #[test]
    fn test_shape_mismatch_reports_type() {
        let field = FieldDefinition::text("bookTitle", "Book Title", 2, "Book title is required");
        let err = field.error_for(Some(&FieldValue::choices(["Dune"]))).unwrap();
        assert_eq!(err.rule, RULE_TYPE);
    }

    #[test]
    fn test_messages_follow_schema_order() {
        let registry = crate::schema::SchemaRegistry::default();
        let admin = registry.get("admin").unwrap();
        let values = FormValues::new()
            .with("leadSource", "Referral")
            .with("reassignment.reason", "workload");

        let result = validate_form(admin, &values);
        let paths: Vec<&str> = result.messages().keys().copied().collect();
        assert_eq!(
            paths,
            vec![
                "leadDetails",
                "assignedTo",
                "priorityLevel",
                "reassignment.newAssignee",
                "reassignment.explanation",
            ]
        );
        assert_eq!(result.messages()["assignedTo"], "Please select an agent");
    }
}
