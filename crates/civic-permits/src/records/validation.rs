use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of string values accepted by an enum-like field.
pub trait Choice: Copy + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|choice| choice.label().eq_ignore_ascii_case(value))
    }

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|choice| choice.label()).collect()
    }
}

/// Field-keyed validation messages, rendered as the `errors` object of a 422 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Merge errors collected for a nested value under `prefix.`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for (field, messages) in other.fields {
            let key = format!("{prefix}.{field}");
            self.fields.entry(key).or_default().extend(messages);
        }
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn require_text(&mut self, field: &str, value: &str, max_len: usize) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, format!("The {} field is required.", humanize(field)));
        } else if trimmed.chars().count() > max_len {
            self.add(
                field,
                format!(
                    "The {} may not be greater than {max_len} characters.",
                    humanize(field)
                ),
            );
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if let Some(value) = value {
            if value.trim().chars().count() > max_len {
                self.add(
                    field,
                    format!(
                        "The {} may not be greater than {max_len} characters.",
                        humanize(field)
                    ),
                );
            }
        }
    }

    /// Parse an enum-like field, recording an error when the value is not one of the choices.
    pub fn choice<T: Choice>(&mut self, field: &str, value: &str) -> Option<T> {
        let parsed = T::parse(value);
        if parsed.is_none() {
            self.add(
                field,
                format!(
                    "The selected {} is invalid. Expected one of: {}.",
                    humanize(field),
                    T::labels().join(", ")
                ),
            );
        }
        parsed
    }

    /// Like [`Self::choice`] but treats a missing or blank value as "no filter".
    pub fn optional_choice<T: Choice>(&mut self, field: &str, value: Option<&str>) -> Option<T> {
        match value.map(str::trim) {
            Some(raw) if !raw.is_empty() => self.choice::<T>(field, raw),
            _ => None,
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_email(value) {
            self.add(
                field,
                format!("The {} must be a valid email address.", humanize(field)),
            );
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fields.values().flatten().next() {
            Some(first) => write!(f, "{first}"),
            None => write!(f, "The given data was invalid."),
        }
    }
}

/// Patch field that can be cleared: a missing key stays `None`, an explicit
/// `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim an optional text field, treating blank input as absent.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn humanize(field: &str) -> String {
    field.rsplit('.').next().unwrap_or(field).replace('_', " ")
}

fn is_email(value: &str) -> bool {
    let value = value.trim();
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_requires_single_at_with_both_parts() {
        assert!(is_email("clerk@city.gov.ph"));
        assert!(!is_email("clerk@"));
        assert!(!is_email("@city.gov"));
        assert!(!is_email("a@b@c"));
        assert!(!is_email("juan dela cruz@city.gov"));
    }

    #[test]
    fn messages_name_the_field() {
        let mut errors = ValidationErrors::new();
        errors.require_text("applicant_name", "   ", 255);
        assert_eq!(
            errors.to_string(),
            "The applicant name field is required."
        );
        assert!(errors.contains("applicant_name"));
    }

    #[test]
    fn nested_errors_are_prefixed() {
        let mut outer = ValidationErrors::new();
        outer.extend_prefixed("members.0", ValidationErrors::single("age", "too old"));
        assert!(outer.contains("members.0.age"));
        assert!(outer.into_result().is_err());
    }
}
