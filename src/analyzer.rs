// 🔎 Dispute Analyzer - Rules as Data
// Fixed rule table over a normalized report → ordered dispute suggestions
//
// Rules are evaluated independently per item. An account may match several
// rules and produce several disputes; nothing is merged or suppressed.

use crate::dispute::{DisputeItem, DisputeType, Priority, SuggestedDispute};
use crate::report::{Account, AccountStatus, Bureau, CreditReport, Inquiry, PublicRecord};
use tracing::debug;

// ============================================================================
// ACCOUNT RULES
// ============================================================================

/// One row of the account rule table
pub struct AccountRule {
    /// Rule ID for tracing
    pub id: &'static str,
    pub dispute_type: DisputeType,
    pub priority: Priority,
    pub reason: &'static str,
    matches: fn(&Account) -> bool,
    detail: fn(&Account) -> String,
}

impl AccountRule {
    pub fn matches(&self, account: &Account) -> bool {
        (self.matches)(account)
    }

    fn apply(&self, account: &Account, bureau: &Bureau) -> SuggestedDispute {
        SuggestedDispute {
            dispute_type: self.dispute_type,
            reason: self.reason.to_string(),
            priority: self.priority,
            bureau: bureau.clone(),
            item: DisputeItem::from(account),
            detail: (self.detail)(account),
        }
    }
}

/// Account rules in evaluation order
pub const ACCOUNT_RULES: &[AccountRule] = &[
    AccountRule {
        id: "collection-validation",
        dispute_type: DisputeType::FraudulentActivity,
        priority: Priority::High,
        reason: "Request validation of collection account",
        matches: is_collection,
        detail: collection_detail,
    },
    AccountRule {
        id: "charge-off-status",
        dispute_type: DisputeType::IncorrectStatus,
        priority: Priority::High,
        reason: "Challenge charge-off status",
        matches: is_charge_off,
        detail: charge_off_detail,
    },
    AccountRule {
        id: "late-payment-removal",
        dispute_type: DisputeType::LatePayment,
        priority: Priority::Medium,
        reason: "Request removal of late payment history",
        matches: has_late_payments,
        detail: late_payment_detail,
    },
];

fn is_collection(account: &Account) -> bool {
    account.status == AccountStatus::Collection
}

fn is_charge_off(account: &Account) -> bool {
    account.status == AccountStatus::ChargeOff
}

fn has_late_payments(account: &Account) -> bool {
    account.has_late_history()
}

fn collection_detail(account: &Account) -> String {
    format!(
        "Collection account from {} (#{}) with balance ${:.2}. Request the collector validate the debt and remove it if it cannot be verified.",
        account.creditor_name, account.account_number, account.balance
    )
}

fn charge_off_detail(account: &Account) -> String {
    format!(
        "Account with {} (#{}) is reported as charged off with balance ${:.2}. Challenge the accuracy of the reported status.",
        account.creditor_name, account.account_number, account.balance
    )
}

fn late_payment_detail(account: &Account) -> String {
    if account.late_payments > 0 {
        format!(
            "{} late payment(s) reported by {} (#{}). Request removal or goodwill adjustment.",
            account.late_payments, account.creditor_name, account.account_number
        )
    } else {
        format!(
            "Account with {} (#{}) is reported as late. Request removal or goodwill adjustment.",
            account.creditor_name, account.account_number
        )
    }
}

// ============================================================================
// INQUIRY / PUBLIC RECORD RULES
// ============================================================================

fn inquiry_dispute(inquiry: &Inquiry, bureau: &Bureau) -> SuggestedDispute {
    let when = inquiry
        .inquiry_date
        .map(|d| format!(" on {}", d))
        .unwrap_or_default();

    SuggestedDispute {
        dispute_type: DisputeType::UnauthorizedInquiry,
        reason: "Request removal of unauthorized hard inquiry".to_string(),
        priority: Priority::Low,
        bureau: bureau.clone(),
        item: DisputeItem::from(inquiry),
        detail: format!(
            "Hard inquiry by {}{}. Request removal if the inquiry was not authorized.",
            inquiry.inquirer_name, when
        ),
    }
}

fn public_record_dispute(record: &PublicRecord, bureau: &Bureau) -> SuggestedDispute {
    let case = record
        .case_number
        .as_deref()
        .map(|c| format!(" (case {})", c))
        .unwrap_or_default();

    SuggestedDispute {
        dispute_type: DisputeType::PublicRecord,
        reason: "Request removal of public record".to_string(),
        priority: Priority::Urgent,
        bureau: bureau.clone(),
        item: DisputeItem::from(record),
        detail: format!(
            "Public record {}{} is on file. Verify accuracy and request removal.",
            record.record_type.as_str().to_lowercase(),
            case
        ),
    }
}

// ============================================================================
// ANALYZER
// ============================================================================

/// Pure analyzer over a borrowed report
pub struct DisputeAnalyzer<'a> {
    report: &'a CreditReport,
}

impl<'a> DisputeAnalyzer<'a> {
    pub fn new(report: &'a CreditReport) -> Self {
        DisputeAnalyzer { report }
    }

    /// Suggested disputes: accounts, then inquiries, then public records,
    /// each in input order
    pub fn analyze(&self) -> Vec<SuggestedDispute> {
        let bureau = &self.report.bureau;
        let mut disputes = Vec::new();

        for account in &self.report.accounts {
            for rule in ACCOUNT_RULES.iter().filter(|r| r.matches(account)) {
                debug!(rule = rule.id, account = %account.natural_key(), "account rule matched");
                disputes.push(rule.apply(account, bureau));
            }
        }

        disputes.extend(
            self.report
                .inquiries
                .iter()
                .filter(|i| i.is_hard())
                .map(|i| inquiry_dispute(i, bureau)),
        );

        disputes.extend(
            self.report
                .public_records
                .iter()
                .map(|r| public_record_dispute(r, bureau)),
        );

        debug!(count = disputes.len(), bureau = %bureau, "analysis complete");
        disputes
    }
}

/// Convenience wrapper around `DisputeAnalyzer`
pub fn analyze_report(report: &CreditReport) -> Vec<SuggestedDispute> {
    DisputeAnalyzer::new(report).analyze()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispute::ItemType;
    use crate::report::{AccountType, InquiryType, PaymentStatus, PublicRecordType};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn account(name: &str, status: AccountStatus, late_payments: u32) -> Account {
        Account {
            creditor_name: name.to_string(),
            account_number: format!("{}-001", name.to_uppercase()),
            account_type: AccountType::Revolving,
            status,
            balance: 500.0,
            limit: 0.0,
            payment_status: PaymentStatus::Current,
            late_payments,
            disputed: false,
        }
    }

    fn inquiry(name: &str, inquiry_type: InquiryType) -> Inquiry {
        Inquiry {
            inquirer_name: name.to_string(),
            inquiry_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            inquiry_type,
        }
    }

    fn record(record_type: PublicRecordType, case_number: Option<&str>) -> PublicRecord {
        PublicRecord {
            record_type,
            case_number: case_number.map(str::to_string),
            filing_date: None,
        }
    }

    #[test]
    fn test_clean_report_has_no_disputes() {
        let mut report = CreditReport::new(Bureau::Experian);
        report.accounts.push(account("chase", AccountStatus::Open, 0));
        report.inquiries.push(inquiry("promo", InquiryType::Soft));

        assert!(analyze_report(&report).is_empty());
    }

    #[test]
    fn test_collection_account() {
        let mut report = CreditReport::new(Bureau::Equifax);
        report.accounts.push(account("midland", AccountStatus::Collection, 0));

        let disputes = analyze_report(&report);

        assert_eq!(disputes.len(), 1);
        let dispute = &disputes[0];
        assert_eq!(dispute.dispute_type, DisputeType::FraudulentActivity);
        assert_eq!(dispute.priority, Priority::High);
        assert_eq!(dispute.bureau, Bureau::Equifax);
        assert_eq!(dispute.item_type(), ItemType::Account);
        assert_eq!(dispute.item, DisputeItem::from(&report.accounts[0]));
        assert!(dispute.detail.contains("$500.00"));
    }

    #[test]
    fn test_charge_off_with_late_payments_emits_two() {
        let mut report = CreditReport::new(Bureau::TransUnion);
        report.accounts.push(account("synchrony", AccountStatus::ChargeOff, 2));

        let disputes = analyze_report(&report);

        assert_eq!(disputes.len(), 2);
        assert_eq!(disputes[0].dispute_type, DisputeType::IncorrectStatus);
        assert_eq!(disputes[0].priority, Priority::High);
        assert_eq!(disputes[1].dispute_type, DisputeType::LatePayment);
        assert_eq!(disputes[1].priority, Priority::Medium);
        assert_eq!(disputes[0].item, disputes[1].item);
        assert!(disputes[1].detail.starts_with("2 late payment(s)"));
    }

    #[test]
    fn test_late_payment_status_without_count() {
        let mut late = account("discover", AccountStatus::Open, 0);
        late.payment_status = PaymentStatus::Late;

        let mut report = CreditReport::new(Bureau::Experian);
        report.accounts.push(late);

        let disputes = analyze_report(&report);
        assert_eq!(disputes.len(), 1);
        assert_eq!(disputes[0].dispute_type, DisputeType::LatePayment);
        assert!(disputes[0].detail.contains("reported as late"));
    }

    #[test]
    fn test_fractional_late_payments_trigger_late_payment_dispute() {
        let report = crate::parser::parse_credit_report(
            r#"{"bureau": "EXPERIAN", "accounts": [{"status": "OPEN", "latePayments": 0.5}]}"#,
        )
        .unwrap();

        let disputes = analyze_report(&report);

        assert_eq!(disputes.len(), 1);
        assert_eq!(disputes[0].dispute_type, DisputeType::LatePayment);
        assert_eq!(disputes[0].priority, Priority::Medium);
        assert!(disputes[0].detail.starts_with("1 late payment(s)"));
    }

    #[test]
    fn test_collection_with_late_history_is_not_deduplicated() {
        let mut report = CreditReport::new(Bureau::Experian);
        report.accounts.push(account("portfolio", AccountStatus::Collection, 5));

        let types: Vec<DisputeType> = analyze_report(&report)
            .iter()
            .map(|d| d.dispute_type)
            .collect();

        assert_eq!(
            types,
            vec![DisputeType::FraudulentActivity, DisputeType::LatePayment]
        );
    }

    #[test]
    fn test_only_hard_inquiries_are_disputed() {
        let mut report = CreditReport::new(Bureau::Experian);
        report.inquiries.push(inquiry("ally", InquiryType::Hard));
        report.inquiries.push(inquiry("promo", InquiryType::Soft));
        report.inquiries.push(inquiry("capital one", InquiryType::Hard));

        let disputes = analyze_report(&report);

        assert_eq!(disputes.len(), 2);
        assert!(disputes.iter().all(|d| d.priority == Priority::Low));
        assert!(disputes
            .iter()
            .all(|d| d.dispute_type == DisputeType::UnauthorizedInquiry));
        assert_eq!(disputes[0].item, DisputeItem::from(&report.inquiries[0]));
        assert_eq!(disputes[1].item, DisputeItem::from(&report.inquiries[2]));
    }

    #[test]
    fn test_every_public_record_is_urgent() {
        let mut report = CreditReport::new(Bureau::Equifax);
        report.public_records.push(record(PublicRecordType::Bankruptcy, Some("19-1")));
        report.public_records.push(record(PublicRecordType::Lien, None));
        report.public_records.push(record(PublicRecordType::Unknown, None));

        let disputes = analyze_report(&report);
        let record_disputes: Vec<_> = disputes
            .iter()
            .filter(|d| d.item_type() == ItemType::PublicRecord)
            .collect();

        assert_eq!(record_disputes.len(), report.public_records.len());
        assert!(record_disputes.iter().all(|d| d.priority == Priority::Urgent));
        assert!(record_disputes[0].detail.contains("(case 19-1)"));
    }

    #[test]
    fn test_output_order() {
        let mut report = CreditReport::new(Bureau::Experian);
        report.public_records.push(record(PublicRecordType::Judgment, None));
        report.inquiries.push(inquiry("ally", InquiryType::Hard));
        report.accounts.push(account("first", AccountStatus::Collection, 0));
        report.accounts.push(account("second", AccountStatus::ChargeOff, 0));

        let order: Vec<(ItemType, String)> = analyze_report(&report)
            .iter()
            .map(|d| (d.item_type(), d.item.key()))
            .collect();

        assert_eq!(
            order,
            vec![
                (ItemType::Account, "first #FIRST-001".to_string()),
                (ItemType::Account, "second #SECOND-001".to_string()),
                (ItemType::Inquiry, "ally @ 2024-01-10".to_string()),
                (ItemType::PublicRecord, "JUDGMENT".to_string()),
            ]
        );
    }

    #[test]
    fn test_rule_table_order() {
        let ids: Vec<&str> = ACCOUNT_RULES.iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec!["collection-validation", "charge-off-status", "late-payment-removal"]
        );
    }

    #[test]
    fn test_parsed_report_end_to_end() {
        let report = crate::parser::parse_credit_report(
            r#"{
                "bureau": "EXPERIAN",
                "accounts": [
                    {"creditorName": "LVNV", "accountNumber": "9", "status": "COLLECTION"},
                    {"creditorName": "Citi", "accountNumber": "7", "status": "CHARGE_OFF", "latePayments": 2}
                ],
                "inquiries": [{"inquirerName": "Ally", "inquiryType": "HARD"}],
                "publicRecords": [{"recordType": "JUDGMENT"}]
            }"#,
        )
        .unwrap();

        let disputes = analyze_report(&report);
        let priorities: Vec<Priority> = disputes.iter().map(|d| d.priority).collect();

        assert_eq!(
            priorities,
            vec![
                Priority::High,
                Priority::High,
                Priority::Medium,
                Priority::Low,
                Priority::Urgent
            ]
        );
    }
}
