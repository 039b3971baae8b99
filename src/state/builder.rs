//! Form builder state

use super::input::EntryField;
use super::schema::{FieldDescriptor, FormSchema};

/// Indices of the builder's entries; the buttons row sits after the last one
const TITLE: usize = 0;
const DESCRIPTION: usize = 1;
const FIELD_NAME: usize = 2;
const FIELD_LABEL: usize = 3;
const FIELD_TYPE: usize = 4;
const FIELD_OPTIONS: usize = 5;
const FIELD_REQUIRED: usize = 6;
pub const BUTTONS_ROW: usize = 7;

/// State behind the create-form view: form-level entries, the field entry
/// currently being composed, and the descriptors added so far.
#[derive(Debug, Clone)]
pub struct BuilderForm {
    pub title: EntryField,
    pub description: EntryField,
    pub field_name: EntryField,
    pub field_label: EntryField,
    pub field_type: EntryField,
    pub field_options: EntryField,
    pub field_required: EntryField,
    pub added: Vec<FieldDescriptor>,
    pub active_entry_index: usize,
    /// Which button is selected on the buttons row (0=Cancel, 1=Add Field, 2=Save)
    pub selected_button: usize,
}

impl BuilderForm {
    pub fn new() -> Self {
        Self {
            title: EntryField::text("title", "Form Title", false),
            description: EntryField::text("description", "Description", true),
            field_name: EntryField::text("field_name", "Field Name", false),
            field_label: EntryField::text("field_label", "Field Label", false),
            field_type: EntryField::type_pick("field_type", "Field Type (Enter cycles)"),
            field_options: EntryField::text("field_options", "Options (comma separated)", false),
            field_required: EntryField::toggle("field_required", "Required (space toggles)", false),
            added: Vec::new(),
            active_entry_index: 0,
            selected_button: 2, // Default to "Save"
        }
    }

    pub fn entry_count(&self) -> usize {
        BUTTONS_ROW + 1
    }

    pub fn is_buttons_row_active(&self) -> bool {
        self.active_entry_index == BUTTONS_ROW
    }

    pub fn next_entry(&mut self) {
        self.active_entry_index = (self.active_entry_index + 1) % self.entry_count();
    }

    pub fn prev_entry(&mut self) {
        if self.active_entry_index == 0 {
            self.active_entry_index = self.entry_count() - 1;
        } else {
            self.active_entry_index -= 1;
        }
    }

    pub fn next_button(&mut self) {
        self.selected_button = (self.selected_button + 1) % 3;
    }

    pub fn prev_button(&mut self) {
        if self.selected_button == 0 {
            self.selected_button = 2;
        } else {
            self.selected_button -= 1;
        }
    }

    pub fn active_entry_mut(&mut self) -> Option<&mut EntryField> {
        match self.active_entry_index {
            TITLE => Some(&mut self.title),
            DESCRIPTION => Some(&mut self.description),
            FIELD_NAME => Some(&mut self.field_name),
            FIELD_LABEL => Some(&mut self.field_label),
            FIELD_TYPE => Some(&mut self.field_type),
            FIELD_OPTIONS => Some(&mut self.field_options),
            FIELD_REQUIRED => Some(&mut self.field_required),
            _ => None,
        }
    }

    pub fn entry(&self, index: usize) -> Option<&EntryField> {
        match index {
            TITLE => Some(&self.title),
            DESCRIPTION => Some(&self.description),
            FIELD_NAME => Some(&self.field_name),
            FIELD_LABEL => Some(&self.field_label),
            FIELD_TYPE => Some(&self.field_type),
            FIELD_OPTIONS => Some(&self.field_options),
            FIELD_REQUIRED => Some(&self.field_required),
            _ => None,
        }
    }

    /// Move the composed field entry into `added`. Enforces the one schema
    /// invariant: field names are unique within a form.
    pub fn add_current_field(&mut self) -> Result<(), String> {
        let name = self.field_name.as_text().trim().to_string();
        if name.is_empty() {
            return Err("Field name is required".to_string());
        }
        if self.added.iter().any(|f| f.name == name) {
            return Err(format!("Field name '{name}' is already used"));
        }

        let field_type = self.field_type.picked_type();
        let options: Vec<String> = self
            .field_options
            .as_text()
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if field_type.has_options() && options.is_empty() {
            return Err(format!("{} fields need options", field_type.label()));
        }

        let label = match self.field_label.as_text().trim() {
            "" => name.clone(),
            label => label.to_string(),
        };

        let mut descriptor = FieldDescriptor::new(&name, field_type, &label);
        descriptor.options = options;
        descriptor.validation.required = self.field_required.is_on();
        descriptor.order = self.added.len() as u32 + 1;
        self.added.push(descriptor);

        // Reset the field entry for the next one
        self.field_name.clear();
        self.field_label.clear();
        self.field_type.clear();
        self.field_options.clear();
        self.field_required.clear();
        self.active_entry_index = FIELD_NAME;

        Ok(())
    }

    /// Assemble the schema for saving
    pub fn build_schema(&self) -> Result<FormSchema, String> {
        let title = self.title.as_text().trim();
        if title.is_empty() {
            return Err("Form title is required".to_string());
        }
        if self.added.is_empty() {
            return Err("Add at least one field".to_string());
        }

        let mut schema = FormSchema::new(title, self.added.clone());
        let description = self.description.as_text().trim();
        if !description.is_empty() {
            schema.description = Some(description.to_string());
        }
        Ok(schema)
    }
}

impl Default for BuilderForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::schema::FieldType;

    fn type_text(field: &mut EntryField, text: &str) {
        for c in text.chars() {
            field.push_char(c);
        }
    }

    #[test]
    fn test_new_starts_on_title() {
        let form = BuilderForm::new();
        assert_eq!(form.active_entry_index, 0);
        assert_eq!(form.selected_button, 2);
        assert!(form.added.is_empty());
    }

    #[test]
    fn test_entry_navigation_wraps() {
        let mut form = BuilderForm::new();
        for _ in 0..form.entry_count() {
            form.next_entry();
        }
        assert_eq!(form.active_entry_index, 0);
        form.prev_entry();
        assert_eq!(form.active_entry_index, BUTTONS_ROW);
        assert!(form.is_buttons_row_active());
    }

    #[test]
    fn test_add_field_requires_name() {
        let mut form = BuilderForm::new();
        assert!(form.add_current_field().is_err());
    }

    #[test]
    fn test_add_field_and_reset() {
        let mut form = BuilderForm::new();
        type_text(&mut form.field_name, "email");
        type_text(&mut form.field_label, "Email Address");
        form.field_required.advance();

        form.add_current_field().unwrap();

        assert_eq!(form.added.len(), 1);
        assert_eq!(form.added[0].name, "email");
        assert_eq!(form.added[0].label, "Email Address");
        assert!(form.added[0].validation.required);
        assert_eq!(form.added[0].order, 1);
        assert_eq!(form.field_name.as_text(), "");
    }

    #[test]
    fn test_duplicate_field_name_rejected() {
        let mut form = BuilderForm::new();
        type_text(&mut form.field_name, "email");
        form.add_current_field().unwrap();

        type_text(&mut form.field_name, "email");
        let err = form.add_current_field().unwrap_err();
        assert!(err.contains("already used"));
    }

    #[test]
    fn test_label_defaults_to_name() {
        let mut form = BuilderForm::new();
        type_text(&mut form.field_name, "phone");
        form.add_current_field().unwrap();
        assert_eq!(form.added[0].label, "phone");
    }

    #[test]
    fn test_choice_type_needs_options() {
        let mut form = BuilderForm::new();
        type_text(&mut form.field_name, "program");
        while form.field_type.picked_type() != FieldType::Dropdown {
            form.field_type.advance();
        }

        assert!(form.add_current_field().is_err());

        type_text(&mut form.field_options, "CS, Arts, ");
        form.add_current_field().unwrap();
        assert_eq!(form.added[0].options, vec!["CS", "Arts"]);
    }

    #[test]
    fn test_build_schema_requires_title_and_fields() {
        let mut form = BuilderForm::new();
        assert!(form.build_schema().is_err());

        type_text(&mut form.title, "Survey");
        assert!(form.build_schema().is_err());

        type_text(&mut form.field_name, "q1");
        form.add_current_field().unwrap();
        let schema = form.build_schema().unwrap();
        assert_eq!(schema.title, "Survey");
        assert_eq!(schema.fields.len(), 1);
        assert!(schema.duplicate_field_name().is_none());
    }
}
