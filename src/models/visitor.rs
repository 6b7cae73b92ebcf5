//! Visitor model

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

/// Number of digits a mobile number must reduce to
pub const MOBILE_DIGITS: usize = 10;

/// Visitor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    /// Ten digits, separators removed
    pub mobile_number: String,
    pub purpose: String,
    /// Person or desk being visited
    pub reference: String,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    /// Calendar day of the check-in, used as the listing filter key
    pub log_date: NaiveDate,
}

/// Lifecycle state, derived from `check_out_time`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    Active,
    CheckedOut,
}

impl Visitor {
    pub fn status(&self) -> VisitorStatus {
        match self.check_out_time {
            Some(_) => VisitorStatus::CheckedOut,
            None => VisitorStatus::Active,
        }
    }
}

/// Visitor as returned by the API, with its derived status
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VisitorView {
    #[serde(flatten)]
    pub visitor: Visitor,
    pub status: VisitorStatus,
}

impl From<Visitor> for VisitorView {
    fn from(visitor: Visitor) -> Self {
        let status = visitor.status();
        Self { visitor, status }
    }
}

/// Register visitor request
///
/// `mobile` is accepted as an alias of `mobileNumber`; any other unknown key
/// is rejected. Missing keys are read as empty strings so that validation can
/// name them.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CreateVisitor {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub address: String,
    #[serde(alias = "mobile")]
    #[validate(custom(function = "ten_digit_mobile"))]
    pub mobile_number: String,
    #[validate(custom(function = "not_blank"))]
    pub purpose: String,
    #[validate(custom(function = "not_blank"))]
    pub reference: String,
}

/// Field names in declaration order, paired with their wire names
const CREATE_FIELDS: [(&str, &str); 5] = [
    ("name", "name"),
    ("address", "address"),
    ("mobile_number", "mobileNumber"),
    ("purpose", "purpose"),
    ("reference", "reference"),
];

/// Accepted body keys, paired with the wire name reported on errors
const BODY_KEYS: [(&str, &str); 6] = [
    ("name", "name"),
    ("address", "address"),
    ("mobileNumber", "mobileNumber"),
    ("mobile", "mobileNumber"),
    ("purpose", "purpose"),
    ("reference", "reference"),
];

impl CreateVisitor {
    /// Read a request body. `null` counts as a missing value and any other
    /// non-text value is a validation error on that field.
    pub fn from_json(body: Value) -> Result<Self, AppError> {
        let Value::Object(mut fields) = body else {
            return Err(AppError::BadRequest(
                "Request body must be a JSON object".to_string(),
            ));
        };

        for (key, wire) in BODY_KEYS {
            match fields.get(key) {
                None | Some(Value::String(_)) => {}
                Some(Value::Null) => {
                    fields.remove(key);
                }
                Some(_) => {
                    return Err(AppError::validation(wire, format!("{} must be text", wire)));
                }
            }
        }

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }

    /// Validate the request, reporting the first offending field
    pub fn check(&self) -> Result<(), AppError> {
        self.validate().map_err(|errors| first_violation(&errors))
    }

    /// Build a fresh, active record from a validated request
    pub fn into_visitor(self, id: Uuid, now: DateTime<Utc>, offset: &FixedOffset) -> Visitor {
        Visitor {
            id,
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            mobile_number: normalize_mobile(&self.mobile_number),
            purpose: self.purpose.trim().to_string(),
            reference: self.reference.trim().to_string(),
            check_in_time: now,
            check_out_time: None,
            log_date: log_date_of(now, offset),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn ten_digit_mobile(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if normalize_mobile(value).len() != MOBILE_DIGITS {
        let mut error = ValidationError::new("mobile_digits");
        error.message = Some(Cow::from("Please enter a valid 10-digit mobile number"));
        return Err(error);
    }
    Ok(())
}

fn first_violation(errors: &ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    for (field, wire) in CREATE_FIELDS {
        let found = field_errors.get(field).or_else(|| field_errors.get(wire));
        if let Some(error) = found.and_then(|errs| errs.first()) {
            let message = match (&*error.code, error.message.as_deref()) {
                ("required", _) => format!("{} is required", wire),
                (_, Some(message)) => message.to_string(),
                (code, None) => format!("{} is invalid ({})", wire, code),
            };
            return AppError::validation(wire, message);
        }
    }
    AppError::BadRequest(errors.to_string())
}

/// Strip every non-digit character
pub fn normalize_mobile(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Calendar day of an instant in the log timezone
pub fn log_date_of(instant: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    instant.with_timezone(offset).date_naive()
}

/// Parse a zero-padded `YYYY-MM-DD` day
pub fn parse_log_date(raw: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::validation("date", "Invalid date format, expected YYYY-MM-DD");
    let raw = raw.trim();
    if raw.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

/// Query parameters for visitor listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct VisitorQuery {
    /// Log date (YYYY-MM-DD)
    pub date: Option<String>,
}

impl VisitorQuery {
    pub fn log_date(&self) -> Result<Option<NaiveDate>, AppError> {
        match self.date.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => parse_log_date(raw).map(Some),
        }
    }
}

/// Result of a date-filtered listing
#[derive(Debug, Clone, PartialEq)]
pub enum VisitorListing {
    /// Matching records, most recent check-in first
    Records(Vec<Visitor>),
    /// Nothing matched the filter
    NoRecords { date: Option<NaiveDate> },
}

impl VisitorListing {
    pub fn from_records(records: Vec<Visitor>, date: Option<NaiveDate>) -> Self {
        if records.is_empty() {
            VisitorListing::NoRecords { date }
        } else {
            VisitorListing::Records(records)
        }
    }
}

/// Counters for one log date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSummary {
    pub date: NaiveDate,
    pub total: usize,
    pub active: usize,
    pub checked_out: usize,
}

impl VisitorSummary {
    pub fn tally(date: NaiveDate, records: &[Visitor]) -> Self {
        let active = records
            .iter()
            .filter(|v| v.status() == VisitorStatus::Active)
            .count();
        Self {
            date,
            total: records.len(),
            active,
            checked_out: records.len() - active,
        }
    }
}

/// Outcome of a conditional checkout update
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    Updated(Visitor),
    /// The record was already checked out and was left untouched
    AlreadyCheckedOut(Visitor),
    NotFound,
}
