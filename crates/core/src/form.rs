//! Controlled form state with schema-driven validation.
//!
//! A [`FormState`] owns the current values, per-field error messages and touched flags of one
//! form. Validation is driven by a [`FormSchema`] mapping field names to [`FieldRule`]s.
//!
//! # Rule evaluation
//!
//! For each field the rules run in a fixed order and the first failure wins:
//!
//! 1. required-presence
//! 2. minimum length, maximum length, pattern (only when a value is present)
//! 3. the custom validator (only when a value is present), which sees all form values
//!
//! A value is *present* unless it is missing, `null`, `false`, `0`, or an empty string.
//! Lengths count characters of strings and elements of arrays; other values have no length.
//!
//! # Submission
//!
//! [`FormState::handle_submit`] validates first. An invalid form marks every field touched so
//! that hidden errors become visible, and nothing is submitted. A failing submit callback is
//! logged and reported as [`SubmitOutcome::Failed`]; it is never propagated as an error, so
//! callers surface failures through their own state.

use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

pub type FormValues = BTreeMap<String, Value>;
pub type FormErrors = BTreeMap<String, String>;

static NULL: Value = Value::Null;

type CustomValidator = Arc<dyn Fn(&Value, &FormValues) -> Option<String> + Send + Sync>;

/// Validation rules for a single field.
#[derive(Clone, Default)]
pub struct FieldRule {
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    validate: Option<CustomValidator>,
    message: Option<String>,
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("required", &self.required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("validate", &self.validate.is_some())
            .field("message", &self.message)
            .finish()
    }
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Custom check run last. Returning `Some(message)` fails the field with that message.
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &FormValues) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }

    /// Replaces the generated message of the built-in rules.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn fail(&self, default: impl FnOnce() -> String) -> Option<String> {
        Some(self.message.clone().unwrap_or_else(default))
    }

    /// Returns the first failing rule's message, or `None` if the value passes.
    pub fn check(&self, field: &str, value: &Value, all_values: &FormValues) -> Option<String> {
        if !is_present(value) {
            if self.required {
                return self.fail(|| format!("{field} is required"));
            }
            return None;
        }

        let length = value_length(value);

        if let (Some(min), Some(len)) = (self.min_length, length) {
            if len < min {
                return self.fail(|| format!("{field} must be at least {min} characters"));
            }
        }

        if let (Some(max), Some(len)) = (self.max_length, length) {
            if len > max {
                return self.fail(|| format!("{field} must be at most {max} characters"));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&value_text(value)) {
                return self.fail(|| format!("{field} is invalid"));
            }
        }

        if let Some(validate) = &self.validate {
            if let Some(message) = validate(value, all_values) {
                return Some(message);
            }
        }

        None
    }
}

/// Field name to rule mapping. Iteration order is field-name order.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    rules: BTreeMap<String, FieldRule>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

/// JavaScript-style truthiness of a form value.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; every field is now touched and nothing was submitted.
    Invalid,
    Submitted,
    /// The submit callback returned an error, which has been logged.
    Failed,
}

/// Value and visible error for binding a single input.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProps {
    pub name: String,
    pub value: Value,
    /// Only set once the field has been touched.
    pub error: Option<String>,
}

/// Holds `is_submitting` up for as long as it lives.
struct SubmittingFlag<'a>(&'a mut bool);

impl<'a> SubmittingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for SubmittingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    initial_values: FormValues,
    values: FormValues,
    errors: FormErrors,
    touched: BTreeSet<String>,
    is_submitting: bool,
    schema: Option<FormSchema>,
}

impl FormState {
    pub fn new(initial_values: FormValues, schema: Option<FormSchema>) -> Self {
        Self {
            values: initial_values.clone(),
            initial_values,
            errors: FormErrors::new(),
            touched: BTreeSet::new(),
            is_submitting: false,
            schema,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL)
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Sets a value and clears the field's existing error.
    pub fn handle_change(&mut self, field: &str, value: impl Into<Value>) {
        self.values.insert(field.to_owned(), value.into());
        self.errors.remove(field);
    }

    /// Marks the field touched and re-validates it if the schema has a rule for it.
    pub fn handle_blur(&mut self, field: &str) {
        self.touched.insert(field.to_owned());
        let has_rule = self
            .schema
            .as_ref()
            .is_some_and(|schema| schema.rule(field).is_some());
        if has_rule {
            let value = self.value(field).clone();
            self.validate_field(field, &value);
        }
    }

    /// Validates `value` against the field's rule in isolation. Fields without a rule pass.
    pub fn validate_field(&mut self, field: &str, value: &Value) -> bool {
        let Some(rule) = self.schema.as_ref().and_then(|s| s.rule(field)) else {
            return true;
        };

        match rule.check(field, value, &self.values) {
            Some(message) => {
                self.errors.insert(field.to_owned(), message);
                false
            }
            None => {
                self.errors.remove(field);
                true
            }
        }
    }

    /// Validates every field in the schema, replacing the error map wholesale.
    pub fn validate_form(&mut self) -> bool {
        let Some(schema) = &self.schema else {
            return true;
        };

        let errors: FormErrors = schema
            .rules
            .iter()
            .filter_map(|(field, rule)| {
                let value = self.values.get(field).unwrap_or(&NULL);
                rule.check(field, value, &self.values)
                    .map(|message| (field.clone(), message))
            })
            .collect();

        let valid = errors.is_empty();
        self.errors = errors;
        valid
    }

    fn touch_all(&mut self) {
        let schema_fields = self
            .schema
            .iter()
            .flat_map(|schema| schema.fields().map(str::to_owned));
        let value_fields = self.values.keys().cloned();
        self.touched.extend(schema_fields.chain(value_fields).collect::<Vec<_>>());
    }

    /// Validates, then hands a snapshot of the values to `on_submit`.
    ///
    /// `is_submitting` is true for the duration of the callback. It is lowered when the
    /// callback finishes, panics, or the returned future is dropped mid-flight.
    pub async fn handle_submit<F, Fut, E>(&mut self, on_submit: F) -> SubmitOutcome
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        if !self.validate_form() {
            self.touch_all();
            return SubmitOutcome::Invalid;
        }

        let values = self.values.clone();
        let result = {
            let _submitting = SubmittingFlag::raise(&mut self.is_submitting);
            on_submit(values).await
        };

        match result {
            Ok(()) => SubmitOutcome::Submitted,
            Err(e) => {
                tracing::error!("form submission error: {}", e);
                SubmitOutcome::Failed
            }
        }
    }

    /// Restores the initial values and clears errors, touched flags and the submitting flag.
    pub fn reset_form(&mut self) {
        self.values = self.initial_values.clone();
        self.errors.clear();
        self.touched.clear();
        self.is_submitting = false;
    }

    pub fn set_values(&mut self, values: FormValues) {
        self.values.extend(values);
    }

    /// Merges externally produced errors, such as server-side validation results.
    pub fn set_errors(&mut self, errors: FormErrors) {
        self.errors.extend(errors);
    }

    pub fn field_props(&self, field: &str) -> FieldProps {
        let value = match self.value(field) {
            Value::Null => Value::String(String::new()),
            other => other.clone(),
        };
        FieldProps {
            name: field.to_owned(),
            value,
            error: self
                .is_touched(field)
                .then(|| self.errors.get(field).cloned())
                .flatten(),
        }
    }
}
