use schemars::JsonSchema;
use serde::Serialize;

/// One selectable field with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Choice {
    pub field: String,
    pub label: String,
}

impl Choice {
    /// Choice labelled by the field name with its first letter capitalized.
    pub fn field(field: &str) -> Self {
        Self {
            field: field.to_string(),
            label: capitalize_first(field),
        }
    }

    pub fn labelled(label: &str, field: &str) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
        }
    }
}

/// Outcome of resolving a user choice against a fixed option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Selection {
    pub field: String,
    pub label: String,
    /// Explains a fallback to the first option, if one happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// A fixed, ordered set of options for one picker on a page.
#[derive(Debug, Clone)]
pub struct ChoiceSet {
    name: &'static str,
    choices: Vec<Choice>,
}

impl ChoiceSet {
    /// `choices` must not be empty.
    pub fn new(name: &'static str, choices: Vec<Choice>) -> Self {
        debug_assert!(!choices.is_empty(), "choice set '{name}' has no options");
        Self { name, choices }
    }

    pub fn from_fields(name: &'static str, fields: &[&str]) -> Self {
        Self::new(name, fields.iter().map(|field| Choice::field(field)).collect())
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Match `requested` against field names and labels, case-insensitively.
    ///
    /// Unknown or empty requests fall back to the first option and carry a
    /// notice saying so.
    pub fn select(&self, requested: Option<&str>) -> Selection {
        let requested = requested.map(str::trim).filter(|value| !value.is_empty());
        let matched = requested.and_then(|wanted| {
            self.choices.iter().find(|choice| {
                choice.field.eq_ignore_ascii_case(wanted)
                    || choice.label.eq_ignore_ascii_case(wanted)
            })
        });

        if let Some(choice) = matched {
            return Selection {
                field: choice.field.clone(),
                label: choice.label.clone(),
                notice: None,
            };
        }

        let first = &self.choices[0];
        let notice = requested.map(|wanted| {
            format!(
                "unknown {} '{wanted}'; showing '{}' instead",
                self.name, first.label
            )
        });
        if let Some(notice) = &notice {
            tracing::warn!(event = "selection_fallback", picker = self.name, %notice);
        }
        Selection {
            field: first.field.clone(),
            label: first.label.clone(),
            notice,
        }
    }
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
