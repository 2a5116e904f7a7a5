use crate::errors::{ValidationError, DomainResult, DomainError};

/// A trait that request payloads should implement for validation.
pub trait Validate {
    /// Validates the value and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self
    where T: Default + PartialEq {
        if self.value.is_none() || self.value == Some(T::default()) {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    pub fn validate(self) -> DomainResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(error) => Err(DomainError::Validation(error)),
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    pub fn not_blank(mut self) -> Self {
        if let Some(value) = &self.value {
            if value.trim().is_empty() {
                self.errors.push(ValidationError::required(&self.field_name));
            }
        }
        self
    }
}

/// Lowercase extension of a path or URI, ignoring any query or fragment.
pub fn file_extension(location: &str) -> Option<String> {
    let without_suffix = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    let file_name = without_suffix.rsplit('/').next().unwrap_or(without_suffix);
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}
