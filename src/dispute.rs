// ⚖️ Suggested Disputes
// Output values of the analyzer: what to challenge, why, and how urgently

use crate::report::{Account, Bureau, Inquiry, PublicRecord, PublicRecordType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// DISPUTE TYPE & PRIORITY
// ============================================================================

/// Reason category sent to the bureau
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeType {
    /// Debt validation request for a collection account
    FraudulentActivity,
    IncorrectStatus,
    LatePayment,
    UnauthorizedInquiry,
    PublicRecord,
}

impl DisputeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeType::FraudulentActivity => "FRAUDULENT_ACTIVITY",
            DisputeType::IncorrectStatus => "INCORRECT_STATUS",
            DisputeType::LatePayment => "LATE_PAYMENT",
            DisputeType::UnauthorizedInquiry => "UNAUTHORIZED_INQUIRY",
            DisputeType::PublicRecord => "PUBLIC_RECORD",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FRAUDULENT_ACTIVITY" => Some(DisputeType::FraudulentActivity),
            "INCORRECT_STATUS" => Some(DisputeType::IncorrectStatus),
            "LATE_PAYMENT" => Some(DisputeType::LatePayment),
            "UNAUTHORIZED_INQUIRY" => Some(DisputeType::UnauthorizedInquiry),
            "PUBLIC_RECORD" => Some(DisputeType::PublicRecord),
            _ => None,
        }
    }
}

impl fmt::Display for DisputeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered: Low < Medium < High < Urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            "URGENT" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ORIGINATING ITEM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Account,
    Inquiry,
    PublicRecord,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Account => "ACCOUNT",
            ItemType::Inquiry => "INQUIRY",
            ItemType::PublicRecord => "PUBLIC_RECORD",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ACCOUNT" => Some(ItemType::Account),
            "INQUIRY" => Some(ItemType::Inquiry),
            "PUBLIC_RECORD" => Some(ItemType::PublicRecord),
            _ => None,
        }
    }
}

/// Report item a dispute points at, by natural key
///
/// The variant is the item type, so a dispute can only ever reference one
/// item of the matching kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "itemType",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum DisputeItem {
    Account {
        creditor_name: String,
        account_number: String,
    },
    Inquiry {
        inquirer_name: String,
        inquiry_date: Option<NaiveDate>,
    },
    PublicRecord {
        record_type: PublicRecordType,
        case_number: Option<String>,
    },
}

impl DisputeItem {
    pub fn item_type(&self) -> ItemType {
        match self {
            DisputeItem::Account { .. } => ItemType::Account,
            DisputeItem::Inquiry { .. } => ItemType::Inquiry,
            DisputeItem::PublicRecord { .. } => ItemType::PublicRecord,
        }
    }

    /// Natural key as a single display string
    pub fn key(&self) -> String {
        match self {
            DisputeItem::Account {
                creditor_name,
                account_number,
            } => format!("{} #{}", creditor_name, account_number),
            DisputeItem::Inquiry {
                inquirer_name,
                inquiry_date: Some(date),
            } => format!("{} @ {}", inquirer_name, date),
            DisputeItem::Inquiry { inquirer_name, .. } => inquirer_name.clone(),
            DisputeItem::PublicRecord {
                record_type,
                case_number: Some(case),
            } => format!("{} {}", record_type.as_str(), case),
            DisputeItem::PublicRecord { record_type, .. } => record_type.as_str().to_string(),
        }
    }
}

impl From<&Account> for DisputeItem {
    fn from(account: &Account) -> Self {
        DisputeItem::Account {
            creditor_name: account.creditor_name.clone(),
            account_number: account.account_number.clone(),
        }
    }
}

impl From<&Inquiry> for DisputeItem {
    fn from(inquiry: &Inquiry) -> Self {
        DisputeItem::Inquiry {
            inquirer_name: inquiry.inquirer_name.clone(),
            inquiry_date: inquiry.inquiry_date,
        }
    }
}

impl From<&PublicRecord> for DisputeItem {
    fn from(record: &PublicRecord) -> Self {
        DisputeItem::PublicRecord {
            record_type: record.record_type,
            case_number: record.case_number.clone(),
        }
    }
}

// ============================================================================
// SUGGESTED DISPUTE
// ============================================================================

/// Derived, stateless dispute suggestion (IDs are assigned on persistence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedDispute {
    pub dispute_type: DisputeType,
    pub reason: String,
    pub priority: Priority,
    pub bureau: Bureau,
    #[serde(flatten)]
    pub item: DisputeItem,
    pub detail: String,
}

impl SuggestedDispute {
    pub fn item_type(&self) -> ItemType {
        self.item.item_type()
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Aggregate view over a list of disputes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisputeSummary {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub urgent: usize,
    pub highest_priority: Option<Priority>,
}

impl DisputeSummary {
    pub fn from_disputes(disputes: &[SuggestedDispute]) -> Self {
        let mut summary = DisputeSummary {
            total: disputes.len(),
            ..Default::default()
        };

        for dispute in disputes {
            match dispute.priority {
                Priority::Low => summary.low += 1,
                Priority::Medium => summary.medium += 1,
                Priority::High => summary.high += 1,
                Priority::Urgent => summary.urgent += 1,
            }
        }

        summary.highest_priority = disputes.iter().map(|d| d.priority).max();
        summary
    }

    pub fn count(&self, priority: Priority) -> usize {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
            Priority::Urgent => self.urgent,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} disputes ({} urgent, {} high, {} medium, {} low)",
            self.total, self.urgent, self.high, self.medium, self.low
        )
    }
}
