//! Field rules for student payloads.
//!
//! Inbound JSON is checked field by field so every violation is reported in one response, using
//! the `{"loc": [...], "msg": ..., "type": ...}` entries that API clients already parse.

use crate::students::id::encode_id;
use email_address::{EmailAddress, Options as EmailOptions};
use mongodb::bson::{Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Highest grade point average a student record may carry.
pub const MAX_GPA: f64 = 4.0;

/// Single constraint violation, located by JSON path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Path of the offending value, starting at `"body"`.
    pub loc: Vec<String>,
    /// Human readable description of the violation.
    pub msg: String,
    /// Machine readable violation category.
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn field(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

/// Every violation found in a student payload.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("student payload failed validation ({count} error(s))", count = .errors.len())]
pub struct ValidationErrors {
    /// Violations in field order.
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Violation that concerns the body as a whole (unparseable JSON, wrong top-level type).
    pub fn body(msg: impl Into<String>, kind: &str) -> Self {
        Self {
            errors: vec![FieldError {
                loc: vec!["body".to_string()],
                msg: msg.into(),
                kind: kind.to_string(),
            }],
        }
    }

    /// Whether any violation points at `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors
            .iter()
            .any(|error| error.loc.last().is_some_and(|loc| loc == field))
    }
}

/// Validated student that has not been persisted yet. Serialized as-is into MongoDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    /// Full name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Enrolled course.
    pub course: String,
    /// Grade point average, never above [`MAX_GPA`].
    pub gpa: f64,
}

/// Student document as read back from the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStudent {
    /// Identifier assigned by the database on insert.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Full name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Enrolled course.
    pub course: String,
    /// Grade point average.
    pub gpa: f64,
}

impl StoredStudent {
    /// Attach a database identifier to a validated student.
    pub fn new(id: ObjectId, student: NewStudent) -> Self {
        let NewStudent {
            name,
            email,
            course,
            gpa,
        } = student;
        Self {
            id,
            name,
            email,
            course,
            gpa,
        }
    }
}

/// Student as returned by the HTTP API, with the identifier in string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Hex encoded identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Enrolled course.
    pub course: String,
    /// Grade point average.
    pub gpa: f64,
}

impl From<StoredStudent> for Student {
    fn from(stored: StoredStudent) -> Self {
        Self {
            id: encode_id(&stored.id),
            name: stored.name,
            email: stored.email,
            course: stored.course,
            gpa: stored.gpa,
        }
    }
}

/// Partial update: only the fields present are meant to change.
///
/// Not exposed over HTTP yet; the rules match [`validate_new_student`] for every field that is
/// supplied, and `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateStudent {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement course.
    pub course: Option<String>,
    /// Replacement grade point average.
    pub gpa: Option<f64>,
}

impl UpdateStudent {
    /// Validate a partial update payload.
    pub fn from_json(payload: &Value) -> Result<Self, ValidationErrors> {
        let body = as_object(payload)?;
        let mut errors = Vec::new();
        let update = Self {
            name: optional(body, "name", check_text, &mut errors),
            email: optional(body, "email", check_email, &mut errors),
            course: optional(body, "course", check_text, &mut errors),
            gpa: optional(body, "gpa", check_gpa, &mut errors),
        };

        if errors.is_empty() {
            Ok(update)
        } else {
            Err(ValidationErrors { errors })
        }
    }

    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.course.is_none() && self.gpa.is_none()
    }

    /// MongoDB `$set` document touching only the supplied fields, or `None` for an empty update.
    pub fn to_set_document(&self) -> Option<Document> {
        if self.is_empty() {
            return None;
        }

        let mut fields = Document::new();
        if let Some(name) = &self.name {
            fields.insert("name", name.as_str());
        }
        if let Some(email) = &self.email {
            fields.insert("email", email.as_str());
        }
        if let Some(course) = &self.course {
            fields.insert("course", course.as_str());
        }
        if let Some(gpa) = self.gpa {
            fields.insert("gpa", gpa);
        }
        Some(doc! { "$set": fields })
    }
}

/// Validate a create payload. Any `id`/`_id` member is ignored; the database assigns ids.
pub fn validate_new_student(payload: &Value) -> Result<NewStudent, ValidationErrors> {
    let body = as_object(payload)?;
    let mut errors = Vec::new();
    let name = required(body, "name", check_text, &mut errors);
    let email = required(body, "email", check_email, &mut errors);
    let course = required(body, "course", check_text, &mut errors);
    let gpa = required(body, "gpa", check_gpa, &mut errors);

    match (name, email, course, gpa) {
        (Some(name), Some(email), Some(course), Some(gpa)) => Ok(NewStudent {
            name,
            email,
            course,
            gpa,
        }),
        _ => Err(ValidationErrors { errors }),
    }
}

type Check<T> = fn(&str, &Value) -> Result<T, FieldError>;

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    payload
        .as_object()
        .ok_or_else(|| ValidationErrors::body("Input should be a valid dictionary", "dict_type"))
}

fn required<T>(
    body: &Map<String, Value>,
    field: &str,
    check: Check<T>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let outcome = match body.get(field) {
        Some(value) => check(field, value),
        None => Err(FieldError::field(field, "Field required", "missing")),
    };
    outcome.map_err(|error| errors.push(error)).ok()
}

fn optional<T>(
    body: &Map<String, Value>,
    field: &str,
    check: Check<T>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => check(field, value).map_err(|error| errors.push(error)).ok(),
    }
}

fn check_text(field: &str, value: &Value) -> Result<String, FieldError> {
    match value {
        Value::String(text) if text.is_empty() => Err(FieldError::field(
            field,
            "String should have at least 1 character",
            "string_too_short",
        )),
        Value::String(text) => Ok(text.clone()),
        _ => Err(FieldError::field(
            field,
            "Input should be a valid string",
            "string_type",
        )),
    }
}

fn check_email(field: &str, value: &Value) -> Result<String, FieldError> {
    let text = check_text(field, value)?;
    let options = EmailOptions {
        minimum_sub_domains: 2,
        allow_domain_literal: false,
        allow_display_text: false,
    };
    if text.trim() != text {
        return Err(FieldError::field(
            field,
            "value is not a valid email address: surrounding whitespace is not allowed",
            "value_error",
        ));
    }
    match EmailAddress::parse_with_options(&text, options) {
        Ok(_) => Ok(text),
        Err(err) => Err(FieldError::field(
            field,
            format!("value is not a valid email address: {err}"),
            "value_error",
        )),
    }
}

fn check_gpa(field: &str, value: &Value) -> Result<f64, FieldError> {
    let Some(gpa) = value.as_f64() else {
        return Err(FieldError::field(
            field,
            "Input should be a valid number",
            "float_type",
        ));
    };
    if gpa > MAX_GPA {
        return Err(FieldError::field(
            field,
            "Input should be less than or equal to 4",
            "less_than_equal",
        ));
    }
    Ok(gpa)
}
