// Credit Dispute - Core Library
// Report parsing, dispute analysis, case store and export

pub mod report;
pub mod parser;
pub mod dispute;
pub mod analyzer;
pub mod db;
pub mod export;

// Re-export commonly used types
pub use report::{
    Account, AccountStatus, AccountType, Bureau, CreditReport,
    Inquiry, InquiryType, PaymentStatus, PublicRecord, PublicRecordType,
};
pub use parser::{
    JsonReportParser, ParseError, ReportParser,
    parse_credit_report,
};
pub use dispute::{
    DisputeItem, DisputeSummary, DisputeType, ItemType, Priority, SuggestedDispute,
};
pub use analyzer::{
    AccountRule, DisputeAnalyzer, ACCOUNT_RULES,
    analyze_report,
};
pub use db::{
    CaseSummary, Event, ImportOutcome, StoredDispute,
    setup_database, import_report, list_cases, case_exists, get_case_disputes,
    count_disputes, insert_event, get_events_for_entity, report_content_hash,
};
pub use export::{export_disputes_csv, write_disputes_csv};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
