// 📄 Credit Report Model
// Normalized, typed view of an imported bureau report

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalize an enumeration token: "charge-off" / "Charge Off" → "CHARGE_OFF"
pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

// ============================================================================
// BUREAU
// ============================================================================

/// Credit reporting agency that produced the report
///
/// Unknown agencies are kept verbatim (upper-cased) instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Bureau {
    Experian,
    Equifax,
    TransUnion,
    Other(String),
}

impl Bureau {
    pub fn from_raw(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "EXPERIAN" => Bureau::Experian,
            "EQUIFAX" => Bureau::Equifax,
            "TRANSUNION" | "TRANS_UNION" => Bureau::TransUnion,
            other => Bureau::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Bureau::Experian => "EXPERIAN",
            Bureau::Equifax => "EQUIFAX",
            Bureau::TransUnion => "TRANSUNION",
            Bureau::Other(name) => name,
        }
    }
}

impl From<String> for Bureau {
    fn from(raw: String) -> Self {
        Bureau::from_raw(&raw)
    }
}

impl From<Bureau> for String {
    fn from(bureau: Bureau) -> Self {
        bureau.as_str().to_string()
    }
}

impl fmt::Display for Bureau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ACCOUNT ENUMERATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Credit cards and other open-ended lines
    Revolving,
    /// Fixed-term loans (auto, personal)
    Installment,
    Mortgage,
    StudentLoan,
    /// Debt placed with a collection agency
    Collection,
    ChargeOff,
    #[default]
    Unknown,
}

impl AccountType {
    pub fn from_raw(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "REVOLVING" | "CREDIT_CARD" => AccountType::Revolving,
            "INSTALLMENT" => AccountType::Installment,
            "MORTGAGE" => AccountType::Mortgage,
            "STUDENT_LOAN" => AccountType::StudentLoan,
            "COLLECTION" => AccountType::Collection,
            "CHARGE_OFF" | "CHARGEOFF" => AccountType::ChargeOff,
            _ => AccountType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Revolving => "REVOLVING",
            AccountType::Installment => "INSTALLMENT",
            AccountType::Mortgage => "MORTGAGE",
            AccountType::StudentLoan => "STUDENT_LOAN",
            AccountType::Collection => "COLLECTION",
            AccountType::ChargeOff => "CHARGE_OFF",
            AccountType::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Open,
    Closed,
    Paid,
    Collection,
    ChargeOff,
    Delinquent,
    #[default]
    Unknown,
}

impl AccountStatus {
    pub fn from_raw(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "OPEN" => AccountStatus::Open,
            "CLOSED" => AccountStatus::Closed,
            "PAID" => AccountStatus::Paid,
            "COLLECTION" => AccountStatus::Collection,
            "CHARGE_OFF" | "CHARGEOFF" => AccountStatus::ChargeOff,
            "DELINQUENT" => AccountStatus::Delinquent,
            _ => AccountStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Open => "OPEN",
            AccountStatus::Closed => "CLOSED",
            AccountStatus::Paid => "PAID",
            AccountStatus::Collection => "COLLECTION",
            AccountStatus::ChargeOff => "CHARGE_OFF",
            AccountStatus::Delinquent => "DELINQUENT",
            AccountStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Current,
    Late,
    #[default]
    Unknown,
}

impl PaymentStatus {
    pub fn from_raw(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "CURRENT" | "ON_TIME" => PaymentStatus::Current,
            "LATE" => PaymentStatus::Late,
            _ => PaymentStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Current => "CURRENT",
            PaymentStatus::Late => "LATE",
            PaymentStatus::Unknown => "UNKNOWN",
        }
    }
}

// ============================================================================
// INQUIRY / PUBLIC RECORD ENUMERATIONS
// ============================================================================

/// Only an explicit HARD inquiry counts as hard; anything else is soft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryType {
    Hard,
    #[default]
    Soft,
}

impl InquiryType {
    pub fn from_raw(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "HARD" => InquiryType::Hard,
            _ => InquiryType::Soft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryType::Hard => "HARD",
            InquiryType::Soft => "SOFT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicRecordType {
    Bankruptcy,
    Judgment,
    Lien,
    Collection,
    #[default]
    Unknown,
}

impl PublicRecordType {
    pub fn from_raw(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "BANKRUPTCY" => PublicRecordType::Bankruptcy,
            "JUDGMENT" | "JUDGEMENT" => PublicRecordType::Judgment,
            "LIEN" | "TAX_LIEN" => PublicRecordType::Lien,
            "COLLECTION" => PublicRecordType::Collection,
            _ => PublicRecordType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PublicRecordType::Bankruptcy => "BANKRUPTCY",
            PublicRecordType::Judgment => "JUDGMENT",
            PublicRecordType::Lien => "LIEN",
            PublicRecordType::Collection => "COLLECTION",
            PublicRecordType::Unknown => "UNKNOWN",
        }
    }
}

// ============================================================================
// REPORT ITEMS
// ============================================================================

/// Tradeline reported by a creditor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub creditor_name: String,
    pub account_number: String,
    pub account_type: AccountType,
    pub status: AccountStatus,
    pub balance: f64,

    /// Credit limit; 0 when not reported (loans, collections)
    pub limit: f64,

    pub payment_status: PaymentStatus,
    /// Late payments on record, rounded up when reported fractionally
    pub late_payments: u32,

    /// Consumer already has an open dispute with the bureau
    pub disputed: bool,
}

impl Account {
    /// Natural key used to reference this account from a dispute
    pub fn natural_key(&self) -> String {
        format!("{} #{}", self.creditor_name, self.account_number)
    }

    pub fn has_late_history(&self) -> bool {
        self.late_payments > 0 || self.payment_status == PaymentStatus::Late
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub inquirer_name: String,
    pub inquiry_date: Option<NaiveDate>,
    pub inquiry_type: InquiryType,
}

impl Inquiry {
    pub fn is_hard(&self) -> bool {
        self.inquiry_type == InquiryType::Hard
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRecord {
    pub record_type: PublicRecordType,
    pub case_number: Option<String>,
    pub filing_date: Option<NaiveDate>,
}

// ============================================================================
// CREDIT REPORT
// ============================================================================

/// Normalized credit report
///
/// Built once by the parser and treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditReport {
    pub bureau: Bureau,
    pub report_date: Option<NaiveDate>,
    pub score: u32,
    pub accounts: Vec<Account>,
    pub inquiries: Vec<Inquiry>,
    pub public_records: Vec<PublicRecord>,
}

impl CreditReport {
    /// Empty report for a bureau (no items, score 0)
    pub fn new(bureau: Bureau) -> Self {
        CreditReport {
            bureau,
            report_date: None,
            score: 0,
            accounts: Vec::new(),
            inquiries: Vec::new(),
            public_records: Vec::new(),
        }
    }

    pub fn hard_inquiry_count(&self) -> usize {
        self.inquiries.iter().filter(|i| i.is_hard()).count()
    }

    pub fn total_balance(&self) -> f64 {
        self.accounts.iter().map(|a| a.balance).sum()
    }
}

// ============================================================================
// TESTS
// ============================================================================
