//! Form schema definitions shared with the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    ShortAnswer,
    Paragraph,
    Email,
    Phone,
    Number,
    Date,
    Url,
    Dropdown,
    MultipleChoice,
    Checkboxes,
    LinearScale,
}

impl FieldType {
    /// Cycle to the next type (used by the form builder)
    pub fn next(&self) -> Self {
        match self {
            Self::ShortAnswer => Self::Paragraph,
            Self::Paragraph => Self::Email,
            Self::Email => Self::Phone,
            Self::Phone => Self::Number,
            Self::Number => Self::Date,
            Self::Date => Self::Url,
            Self::Url => Self::Dropdown,
            Self::Dropdown => Self::MultipleChoice,
            Self::MultipleChoice => Self::Checkboxes,
            Self::Checkboxes => Self::LinearScale,
            Self::LinearScale => Self::ShortAnswer,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ShortAnswer => "Short answer",
            Self::Paragraph => "Paragraph",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Number => "Number",
            Self::Date => "Date",
            Self::Url => "URL",
            Self::Dropdown => "Dropdown",
            Self::MultipleChoice => "Multiple choice",
            Self::Checkboxes => "Checkboxes",
            Self::LinearScale => "Linear scale",
        }
    }

    /// Whether this type carries an options list
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Dropdown | Self::MultipleChoice | Self::Checkboxes)
    }
}

/// Validation rules attached to a field descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Regex enforced server-side; carried for round-tripping only
    pub pattern: Option<String>,
}

/// Schema entry describing a single form input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    pub scale_min: Option<i64>,
    pub scale_max: Option<i64>,
    pub scale_min_label: Option<String>,
    pub scale_max_label: Option<String>,
    #[serde(default)]
    pub validation: ValidationRule,
    #[serde(default)]
    pub order: u32,
}

impl FieldDescriptor {
    /// Minimal descriptor used by the builder and tests
    pub fn new(name: &str, field_type: FieldType, label: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            label: label.to_string(),
            description: None,
            placeholder: None,
            options: Vec::new(),
            scale_min: None,
            scale_max: None,
            scale_min_label: None,
            scale_max_label: None,
            validation: ValidationRule::default(),
            order: 0,
        }
    }

    #[allow(dead_code)]
    pub fn required(mut self) -> Self {
        self.validation.required = true;
        self
    }

    /// Hint shown while the field is still empty
    pub fn hint(&self) -> Option<String> {
        if let Some(placeholder) = &self.placeholder {
            return Some(placeholder.clone());
        }
        match self.field_type {
            FieldType::LinearScale => {
                let min = self.scale_min?;
                let max = self.scale_max?;
                let min_label = self.scale_min_label.as_deref().unwrap_or("lowest");
                let max_label = self.scale_max_label.as_deref().unwrap_or("highest");
                Some(format!("{min} ({min_label}) – {max} ({max_label})"))
            }
            _ if self.field_type.has_options() => Some(self.options.join(" / ")),
            _ => self.description.clone(),
        }
    }

    #[allow(dead_code)]
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    /// Check a locally edited value against the descriptor's rules.
    /// Returns the first violation, or None when the value passes.
    /// The backend re-validates everything; this only catches the obvious.
    pub fn check_value(&self, value: &str) -> Option<String> {
        let v = value.trim();

        if v.is_empty() {
            if self.validation.required {
                return Some(format!("{} is required", self.label));
            }
            return None;
        }

        if let Some(min) = self.validation.min_length {
            if v.chars().count() < min {
                return Some(format!("{} must be at least {min} characters", self.label));
            }
        }
        if let Some(max) = self.validation.max_length {
            if v.chars().count() > max {
                return Some(format!("{} must be at most {max} characters", self.label));
            }
        }

        match self.field_type {
            FieldType::Email => {
                let (local, domain) = match v.split_once('@') {
                    Some(parts) => parts,
                    None => return Some("Email must contain an @".to_string()),
                };
                if local.is_empty() || !domain.contains('.') {
                    return Some("Email must look like name@domain.com".to_string());
                }
            }
            FieldType::Phone => {
                let digits = v.chars().filter(|c| c.is_ascii_digit()).count();
                if digits < 7 {
                    return Some("Phone number must have at least 7 digits".to_string());
                }
                if digits > 15 {
                    return Some("Phone number is too long".to_string());
                }
            }
            FieldType::Number | FieldType::LinearScale => {
                let parsed: f64 = match v.parse() {
                    Ok(n) => n,
                    Err(_) => return Some(format!("{} must be a number", self.label)),
                };
                let min = self
                    .validation
                    .min_value
                    .or(self.scale_min.map(|n| n as f64));
                let max = self
                    .validation
                    .max_value
                    .or(self.scale_max.map(|n| n as f64));
                if let Some(min) = min {
                    if parsed < min {
                        return Some(format!("{} must be >= {min}", self.label));
                    }
                }
                if let Some(max) = max {
                    if parsed > max {
                        return Some(format!("{} must be <= {max}", self.label));
                    }
                }
            }
            FieldType::Dropdown | FieldType::MultipleChoice => {
                if !self.options.iter().any(|o| o == v) {
                    return Some(format!("Choose one of: {}", self.options.join(", ")));
                }
            }
            FieldType::Url => {
                if !v.starts_with("http://") && !v.starts_with("https://") {
                    return Some("URL must start with http:// or https://".to_string());
                }
            }
            _ => {}
        }

        None
    }
}

/// Complete form definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default = "default_confirmation")]
    pub confirmation_message: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_confirmation() -> String {
    "Thank you for your response!".to_string()
}

impl FormSchema {
    pub fn new(title: &str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            id: String::new(),
            title: title.to_string(),
            description: None,
            fields,
            confirmation_message: default_confirmation(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields in display order
    pub fn ordered_fields(&self) -> Vec<&FieldDescriptor> {
        let mut fields: Vec<&FieldDescriptor> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    /// Field name uniqueness is the one schema invariant.
    /// Returns the first duplicate name found, if any.
    pub fn duplicate_field_name(&self) -> Option<&str> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Some(&field.name);
            }
        }
        None
    }
}

/// Lightweight entry in the forms list view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub field_count: u32,
    #[serde(default)]
    pub response_count: u32,
}
