//! Field Schema - Declarative Form Contracts
//!
//! A schema is immutable once built. Validation reads it, never writes it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalogs, OptionCatalog};
use crate::values::{FieldValue, FormValues, PATH_SEPARATOR};

pub type FormId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    LongText,
    SingleChoice,
    MultiChoice,
    Enum,
}

/// Tagged validation rule, evaluated by a pure function per field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    Unconstrained,
    MinLength {
        min: usize,
        message: String,
    },
    Email {
        message: String,
    },
    Phone {
        min_digits: usize,
        message: String,
    },
    TimeOfDay {
        message: String,
    },
    OneOf {
        options: OptionCatalog,
        message: String,
    },
    AnyOf {
        options: OptionCatalog,
        min_selected: usize,
        message: String,
    },
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Unconstrained => "unconstrained",
            Rule::MinLength { .. } => "min_length",
            Rule::Email { .. } => "email",
            Rule::Phone { .. } => "phone",
            Rule::TimeOfDay { .. } => "time_of_day",
            Rule::OneOf { .. } => "one_of",
            Rule::AnyOf { .. } => "any_of",
        }
    }

    /// Message shown when the rule fails, or when a required value is blank
    pub fn message(&self) -> &str {
        match self {
            Rule::Unconstrained => "This field is required",
            Rule::MinLength { message, .. }
            | Rule::Email { message }
            | Rule::Phone { message, .. }
            | Rule::TimeOfDay { message }
            | Rule::OneOf { message, .. }
            | Rule::AnyOf { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub required: bool,
    pub rule: Rule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

fn default_true() -> bool {
    true
}

impl FieldDefinition {
    fn new(name: &str, label: &str, kind: FieldKind, rule: Rule) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: true,
            rule,
            default: None,
        }
    }

    pub fn text(name: &str, label: &str, min: usize, message: &str) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Text,
            Rule::MinLength { min, message: message.to_string() },
        )
    }

    pub fn long_text(name: &str, label: &str, min: usize, message: &str) -> Self {
        Self::new(
            name,
            label,
            FieldKind::LongText,
            Rule::MinLength { min, message: message.to_string() },
        )
    }

    pub fn email(name: &str, label: &str, message: &str) -> Self {
        Self::new(name, label, FieldKind::Text, Rule::Email { message: message.to_string() })
    }

    pub fn phone(name: &str, label: &str, min_digits: usize, message: &str) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Text,
            Rule::Phone { min_digits, message: message.to_string() },
        )
    }

    pub fn time_of_day(name: &str, label: &str, message: &str) -> Self {
        Self::new(name, label, FieldKind::Text, Rule::TimeOfDay { message: message.to_string() })
    }

    /// Select-style choice over a catalog
    pub fn single_choice(name: &str, label: &str, options: &OptionCatalog, message: &str) -> Self {
        Self::new(
            name,
            label,
            FieldKind::SingleChoice,
            Rule::OneOf { options: options.clone(), message: message.to_string() },
        )
    }

    /// Radio-style choice with a preselected default
    pub fn enumeration(name: &str, label: &str, options: &OptionCatalog, default: &str) -> Self {
        let message = format!(
            "Invalid option. Expected one of: {}",
            options.values().collect::<Vec<_>>().join(", ")
        );
        Self::new(name, label, FieldKind::Enum, Rule::OneOf { options: options.clone(), message })
            .with_default(FieldValue::text(default))
    }

    pub fn multi_choice(
        name: &str,
        label: &str,
        options: &OptionCatalog,
        min_selected: usize,
        message: &str,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::MultiChoice,
            Rule::AnyOf { options: options.clone(), min_selected, message: message.to_string() },
        )
        .with_default(FieldValue::Choices(Default::default()))
    }

    pub fn free_text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::LongText, Rule::Unconstrained).optional()
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Value a fresh form starts with
    pub fn initial_value(&self) -> FieldValue {
        match &self.default {
            Some(value) => value.clone(),
            None if self.kind == FieldKind::MultiChoice => FieldValue::Choices(Default::default()),
            None => FieldValue::text(""),
        }
    }
}

/// Conditionally-required nested group, validated all-or-nothing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubSchema {
    pub name: String,
    pub label: String,
    pub fields: Vec<FieldDefinition>,
}

impl SubSchema {
    pub fn new(name: &str, label: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn path_of(&self, field: &FieldDefinition) -> String {
        format!("{}{}{}", self.name, PATH_SEPARATOR, field.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormSchema {
    pub id: FormId,
    pub title: String,
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SubSchema>,
}

/// Where a dotted path lands inside a schema
#[derive(Debug, Clone, Copy)]
pub struct FieldLocation<'a> {
    pub field: &'a FieldDefinition,
    pub section: Option<&'a SubSchema>,
}

impl FormSchema {
    pub fn new(id: &str, title: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            fields,
            sections: vec![],
        }
    }

    pub fn with_section(mut self, section: SubSchema) -> Self {
        self.sections.push(section);
        self
    }

    pub fn section(&self, name: &str) -> Option<&SubSchema> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn locate(&self, path: &str) -> Option<FieldLocation<'_>> {
        match path.split_once(PATH_SEPARATOR) {
            None => self
                .fields
                .iter()
                .find(|f| f.name == path)
                .map(|field| FieldLocation { field, section: None }),
            Some((head, rest)) => {
                let section = self.section(head)?;
                section
                    .field(rest)
                    .map(|field| FieldLocation { field, section: Some(section) })
            }
        }
    }

    /// Every addressable path in declaration order
    pub fn paths(&self) -> Vec<String> {
        let top = self.fields.iter().map(|f| f.name.clone());
        let nested = self
            .sections
            .iter()
            .flat_map(|s| s.fields.iter().map(move |f| s.path_of(f)));
        top.chain(nested).collect()
    }

    /// Values a fresh form starts with.
    ///
    /// Sections start blank so they are inactive until the user types.
    pub fn default_values(&self) -> FormValues {
        let mut values = FormValues::new();
        for field in &self.fields {
            values.set(&field.name, field.initial_value());
        }
        for section in &self.sections {
            for field in &section.fields {
                values.set(&section.path_of(field), field.initial_value());
            }
        }
        values
    }
}

/// Schema registry - holds the forms a pipeline can submit
pub struct SchemaRegistry {
    schemas: IndexMap<FormId, FormSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self { schemas: IndexMap::new() }
    }

    /// Registry preloaded with the four inquiry forms
    pub fn builtin(catalogs: &Catalogs) -> Self {
        let mut registry = Self::new();
        for schema in crate::forms::builtin_schemas(catalogs) {
            registry.register(schema);
        }
        registry
    }

    pub fn get(&self, id: &str) -> Option<&FormSchema> {
        self.schemas.get(id)
    }

    pub fn list(&self) -> Vec<&FormSchema> {
        self.schemas.values().collect()
    }

    pub fn register(&mut self, schema: FormSchema) {
        self.schemas.insert(schema.id.clone(), schema);
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin(&Catalogs::default())
    }
}
