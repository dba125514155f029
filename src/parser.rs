// 🏗️ Report Parser
// Normalizes a raw JSON credit report into a typed CreditReport
//
// Only the top-level shape is validated (bureau + accounts). Everything
// nested is coerced to safe defaults instead of rejected.

use crate::report::{
    Account, AccountStatus, AccountType, Bureau, CreditReport, Inquiry, InquiryType,
    PaymentStatus, PublicRecord, PublicRecordType,
};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid credit report JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid credit report format: expected a JSON object")]
    NotAnObject,

    #[error("Invalid credit report format: missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid credit report format: field '{field}' {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// ReportParser - seam for report formats
///
/// The JSON parser is the only implementation today; the trait keeps the
/// case store independent of the wire format and records which parser
/// version produced a stored report.
pub trait ReportParser: Send + Sync {
    /// Parse report text into a normalized report
    fn parse_str(&self, text: &str) -> Result<CreditReport, ParseError>;

    /// Read a file and parse its contents
    fn parse_file(&self, path: &Path) -> anyhow::Result<CreditReport> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credit report: {}", path.display()))?;

        let report = self
            .parse_str(&text)
            .with_context(|| format!("Failed to parse credit report: {}", path.display()))?;

        Ok(report)
    }

    /// Parser version (for provenance tracking)
    fn version(&self) -> &str {
        "1.0.0"
    }
}

/// Parser for the JSON payload produced by the upload form
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReportParser;

impl JsonReportParser {
    pub fn new() -> Self {
        JsonReportParser
    }
}

impl ReportParser for JsonReportParser {
    fn parse_str(&self, text: &str) -> Result<CreditReport, ParseError> {
        parse_credit_report(text)
    }

    fn version(&self) -> &str {
        "json-1.0.0"
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse raw text into a normalized credit report
///
/// Fails when the text is not JSON, is not an object, or lacks a truthy
/// `bureau` or `accounts` value.
pub fn parse_credit_report(text: &str) -> Result<CreditReport, ParseError> {
    let root: Value = serde_json::from_str(text)?;

    if !root.is_object() {
        warn!("rejected credit report: root is not an object");
        return Err(ParseError::NotAnObject);
    }

    let bureau_value = root.get("bureau");
    if !is_truthy(bureau_value) {
        warn!("rejected credit report: missing bureau");
        return Err(ParseError::MissingField("bureau"));
    }

    let accounts_value = root.get("accounts");
    if !is_truthy(accounts_value) {
        warn!("rejected credit report: missing accounts");
        return Err(ParseError::MissingField("accounts"));
    }

    let accounts = accounts_value
        .and_then(Value::as_array)
        .ok_or(ParseError::InvalidField {
            field: "accounts",
            reason: "must be an array",
        })?;

    let bureau_raw = coerce_string(bureau_value).ok_or(ParseError::InvalidField {
        field: "bureau",
        reason: "must be a string",
    })?;
    if bureau_raw.is_empty() {
        warn!("rejected credit report: blank bureau");
        return Err(ParseError::MissingField("bureau"));
    }
    let bureau = Bureau::from_raw(&bureau_raw);

    let report = CreditReport {
        bureau,
        report_date: coerce_date(root.get("reportDate")),
        score: coerce_count(root.get("score")),
        accounts: accounts.iter().map(parse_account).collect(),
        inquiries: array_items(root.get("inquiries"))
            .iter()
            .map(parse_inquiry)
            .collect(),
        public_records: array_items(root.get("publicRecords"))
            .iter()
            .map(parse_public_record)
            .collect(),
    };

    debug!(
        bureau = %report.bureau,
        accounts = report.accounts.len(),
        inquiries = report.inquiries.len(),
        public_records = report.public_records.len(),
        "parsed credit report"
    );

    Ok(report)
}

fn parse_account(item: &Value) -> Account {
    Account {
        creditor_name: coerce_string(item.get("creditorName")).unwrap_or_default(),
        account_number: coerce_string(item.get("accountNumber")).unwrap_or_default(),
        account_type: coerce_string(item.get("accountType"))
            .map(|t| AccountType::from_raw(&t))
            .unwrap_or_default(),
        status: coerce_string(item.get("status"))
            .map(|s| AccountStatus::from_raw(&s))
            .unwrap_or_default(),
        balance: coerce_number(item.get("balance")),
        limit: coerce_number(item.get("limit")),
        payment_status: coerce_string(item.get("paymentStatus"))
            .map(|s| PaymentStatus::from_raw(&s))
            .unwrap_or_default(),
        late_payments: coerce_occurrences(item.get("latePayments")),
        disputed: is_truthy(item.get("disputed")),
    }
}

fn parse_inquiry(item: &Value) -> Inquiry {
    Inquiry {
        inquirer_name: coerce_string(item.get("inquirerName")).unwrap_or_default(),
        inquiry_date: coerce_date(item.get("inquiryDate")),
        inquiry_type: coerce_string(item.get("inquiryType"))
            .map(|t| InquiryType::from_raw(&t))
            .unwrap_or_default(),
    }
}

fn parse_public_record(item: &Value) -> PublicRecord {
    PublicRecord {
        record_type: coerce_string(item.get("recordType"))
            .map(|t| PublicRecordType::from_raw(&t))
            .unwrap_or_default(),
        case_number: coerce_string(item.get("caseNumber")).filter(|c| !c.is_empty()),
        filing_date: coerce_date(item.get("filingDate")),
    }
}

// ============================================================================
// COERCION HELPERS
// ============================================================================

/// Array contents, or an empty slice when absent / not an array
fn array_items(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// Truthiness of a dynamic value (absent, null, false, 0, "" are false)
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Number coercion; anything that is not a finite number becomes 0
fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Array(_)) | Some(Value::Object(_)) => 0.0,
    };

    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Non-negative whole number, truncated (scores)
fn coerce_count(value: Option<&Value>) -> u32 {
    clamp_to_u32(coerce_number(value).trunc())
}

/// Non-negative whole number, rounded up so any positive value stays positive
fn coerce_occurrences(value: Option<&Value>) -> u32 {
    clamp_to_u32(coerce_number(value).ceil())
}

fn clamp_to_u32(n: f64) -> u32 {
    if n <= 0.0 {
        0
    } else if n >= u32::MAX as f64 {
        u32::MAX
    } else {
        n as u32
    }
}

fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts RFC 3339, YYYY-MM-DD, MM/DD/YYYY, or epoch milliseconds
fn coerce_date(value: Option<&Value>) -> Option<NaiveDate> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.date_naive())
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
                .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
                .ok()
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
