//! Editable entry fields for the form builder

use super::schema::FieldType;

/// Type-safe entry values
#[derive(Debug, Clone)]
pub enum EntryValue {
    Text(String),
    Toggle(bool),
    TypePick(FieldType),
}

impl Default for EntryValue {
    fn default() -> Self {
        EntryValue::Text(String::new())
    }
}

/// A single editable entry in the builder
#[derive(Debug, Clone)]
pub struct EntryField {
    pub name: String,
    pub label: String,
    pub value: EntryValue,
    pub is_multiline: bool,
}

impl EntryField {
    /// Create a new text entry
    pub fn text(name: &str, label: &str, is_multiline: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: EntryValue::Text(String::new()),
            is_multiline,
        }
    }

    /// Create a new toggle entry
    pub fn toggle(name: &str, label: &str, on: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: EntryValue::Toggle(on),
            is_multiline: false,
        }
    }

    /// Create a new field-type picker entry
    pub fn type_pick(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: EntryValue::TypePick(FieldType::default()),
            is_multiline: false,
        }
    }

    /// Get the text value (empty for non-text entries)
    pub fn as_text(&self) -> &str {
        match &self.value {
            EntryValue::Text(s) => s,
            _ => "",
        }
    }

    /// Get the toggle value (false for non-toggle entries)
    pub fn is_on(&self) -> bool {
        matches!(self.value, EntryValue::Toggle(true))
    }

    /// Get the picked field type
    pub fn picked_type(&self) -> FieldType {
        match &self.value {
            EntryValue::TypePick(t) => *t,
            _ => FieldType::default(),
        }
    }

    /// Push a character into a text entry; space flips a toggle
    pub fn push_char(&mut self, c: char) {
        match &mut self.value {
            EntryValue::Text(s) => s.push(c),
            EntryValue::Toggle(on) => {
                if c == ' ' {
                    *on = !*on;
                }
            }
            EntryValue::TypePick(_) => {}
        }
    }

    /// Remove the last character from a text entry
    pub fn pop_char(&mut self) {
        if let EntryValue::Text(s) = &mut self.value {
            s.pop();
        }
    }

    /// Advance: cycles the type picker, flips a toggle, no-op on text
    pub fn advance(&mut self) {
        match &mut self.value {
            EntryValue::TypePick(t) => *t = t.next(),
            EntryValue::Toggle(on) => *on = !*on,
            EntryValue::Text(_) => {}
        }
    }

    /// Clear back to the default value
    pub fn clear(&mut self) {
        match &mut self.value {
            EntryValue::Text(s) => s.clear(),
            EntryValue::Toggle(on) => *on = false,
            EntryValue::TypePick(t) => *t = FieldType::default(),
        }
    }

    /// Display value for rendering
    pub fn display_value(&self) -> String {
        match &self.value {
            EntryValue::Text(s) => s.clone(),
            EntryValue::Toggle(on) => if *on { "[x]" } else { "[ ]" }.to_string(),
            EntryValue::TypePick(t) => t.label().to_string(),
        }
    }
}
