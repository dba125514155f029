// 🗄️ Case Store - SQLite + WAL
// Persists imported reports, opens a case per report, stores its disputes

use crate::analyzer::analyze_report;
use crate::dispute::{DisputeItem, DisputeSummary, DisputeType, Priority, SuggestedDispute};
use crate::report::{Bureau, CreditReport};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

pub const CASE_STATUS_OPEN: &str = "OPEN";
pub const DISPUTE_STATUS_PENDING: &str = "PENDING";

// ============================================================================
// RECORD TYPES
// ============================================================================

/// Result of importing a report
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// New report stored, case opened, disputes stored
    Created {
        case_id: String,
        report_id: String,
        dispute_ids: Vec<String>,
        summary: DisputeSummary,
    },
    /// Identical report already has a case for this client; nothing written
    Duplicate { report_id: String },
}

/// Dispute row read back from the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDispute {
    pub id: String,
    pub case_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub dispute: SuggestedDispute,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummary {
    pub case_id: String,
    pub report_id: String,
    pub client_ref: String,
    pub bureau: String,
    pub status: String,
    pub opened_at: DateTime<Utc>,
    pub dispute_count: i64,
}

/// Event for audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

/// SHA-256 over the normalized report, used to detect re-imports
pub fn report_content_hash(report: &CreditReport) -> Result<String> {
    let canonical = serde_json::to_string(report).context("Failed to serialize report")?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid timestamp in store: {}", raw))?
        .with_timezone(&Utc))
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery; in-memory databases silently keep "memory"
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS credit_reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            report_uuid TEXT UNIQUE NOT NULL,
            content_hash TEXT UNIQUE NOT NULL,
            bureau TEXT NOT NULL,
            report_date TEXT,
            score INTEGER NOT NULL,
            account_count INTEGER NOT NULL,
            normalized_json TEXT NOT NULL,
            parser_version TEXT NOT NULL,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS cases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            case_uuid TEXT UNIQUE NOT NULL,
            report_uuid TEXT NOT NULL REFERENCES credit_reports(report_uuid),
            client_ref TEXT NOT NULL,
            status TEXT NOT NULL,
            opened_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS disputes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dispute_uuid TEXT UNIQUE NOT NULL,
            case_uuid TEXT NOT NULL REFERENCES cases(case_uuid),
            dispute_type TEXT NOT NULL,
            reason TEXT NOT NULL,
            priority TEXT NOT NULL,
            bureau TEXT NOT NULL,
            item_type TEXT NOT NULL,
            item_key TEXT NOT NULL,
            item_json TEXT NOT NULL,
            detail TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL
        )",
        [],
    )?;

    // One case per (report, client)
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_cases_report_client
         ON cases(report_uuid, client_ref)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_disputes_case ON disputes(case_uuid)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// IMPORT
// ============================================================================

/// Store a report, open a case and store its suggested disputes
///
/// Runs in a single SQL transaction. Reports are stored once per content
/// hash and cases once per (report, client): re-importing an identical
/// report for a new client reuses the stored report and opens a new case,
/// while re-importing it for the same client is reported as `Duplicate`
/// and leaves the store untouched.
pub fn import_report(
    conn: &mut Connection,
    report: &CreditReport,
    client_ref: &str,
    parser_version: &str,
) -> Result<ImportOutcome> {
    let hash = report_content_hash(report)?;
    let now = Utc::now().to_rfc3339();
    let new_report_id = uuid::Uuid::new_v4().to_string();
    let normalized_json = serde_json::to_string(report)?;

    let tx = conn.transaction()?;

    let inserted = tx.execute(
        "INSERT INTO credit_reports (
            report_uuid, content_hash, bureau, report_date, score,
            account_count, normalized_json, parser_version, imported_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            new_report_id,
            hash,
            report.bureau.as_str(),
            report.report_date.map(|d| d.to_string()),
            report.score,
            report.accounts.len() as i64,
            normalized_json,
            parser_version,
            now,
        ],
    );

    let (report_id, report_is_new) = match inserted {
        Ok(_) => (new_report_id, true),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            let existing: String = tx.query_row(
                "SELECT report_uuid FROM credit_reports WHERE content_hash = ?1",
                [&hash],
                |row| row.get(0),
            )?;

            let existing_case: Option<String> = tx
                .query_row(
                    "SELECT case_uuid FROM cases WHERE report_uuid = ?1 AND client_ref = ?2",
                    params![existing, client_ref],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(case_id) = existing_case {
                info!(report_id = %existing, case_id = %case_id, client_ref, "report already imported for client, skipping");
                return Ok(ImportOutcome::Duplicate {
                    report_id: existing,
                });
            }

            debug!(report_id = %existing, client_ref, "report already stored, opening case for new client");
            (existing, false)
        }
        Err(e) => return Err(e.into()),
    };

    let case_id = uuid::Uuid::new_v4().to_string();
    tx.execute(
        "INSERT INTO cases (case_uuid, report_uuid, client_ref, status, opened_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![case_id, report_id, client_ref, CASE_STATUS_OPEN, now],
    )?;

    let disputes = analyze_report(report);
    let mut dispute_ids = Vec::with_capacity(disputes.len());

    for dispute in &disputes {
        let dispute_id = uuid::Uuid::new_v4().to_string();
        let item_json = serde_json::to_string(&dispute.item)?;

        tx.execute(
            "INSERT INTO disputes (
                dispute_uuid, case_uuid, dispute_type, reason, priority, bureau,
                item_type, item_key, item_json, detail, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                dispute_id,
                case_id,
                dispute.dispute_type.as_str(),
                dispute.reason,
                dispute.priority.as_str(),
                dispute.bureau.as_str(),
                dispute.item_type().as_str(),
                dispute.item.key(),
                item_json,
                dispute.detail,
                DISPUTE_STATUS_PENDING,
                now,
            ],
        )?;

        debug!(dispute_id = %dispute_id, dispute_type = %dispute.dispute_type, "stored dispute");
        dispute_ids.push(dispute_id);
    }

    let summary = DisputeSummary::from_disputes(&disputes);

    if report_is_new {
        insert_event(
            &tx,
            &Event::new(
                "report_imported",
                "credit_report",
                &report_id,
                serde_json::json!({
                    "bureau": report.bureau.as_str(),
                    "content_hash": hash,
                    "parser_version": parser_version,
                }),
                "report_importer",
            ),
        )?;
    }

    insert_event(
        &tx,
        &Event::new(
            "case_opened",
            "case",
            &case_id,
            serde_json::json!({
                "client_ref": client_ref,
                "report_id": report_id,
                "disputes": summary.total,
            }),
            "report_importer",
        ),
    )?;

    tx.commit()?;

    info!(
        case_id = %case_id,
        report_id = %report_id,
        disputes = summary.total,
        "report imported"
    );

    Ok(ImportOutcome::Created {
        case_id,
        report_id,
        dispute_ids,
        summary,
    })
}

// ============================================================================
// QUERIES
// ============================================================================

pub fn list_cases(conn: &Connection) -> Result<Vec<CaseSummary>> {
    let mut stmt = conn.prepare(
        "SELECT c.case_uuid, c.report_uuid, c.client_ref, r.bureau, c.status, c.opened_at,
                (SELECT COUNT(*) FROM disputes d WHERE d.case_uuid = c.case_uuid)
         FROM cases c
         JOIN credit_reports r ON r.report_uuid = c.report_uuid
         ORDER BY c.id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(
            |(case_id, report_id, client_ref, bureau, status, opened_at, dispute_count)| -> Result<CaseSummary> {
                Ok(CaseSummary {
                    case_id,
                    report_id,
                    client_ref,
                    bureau,
                    status,
                    opened_at: parse_timestamp(&opened_at)?,
                    dispute_count,
                })
            },
        )
        .collect()
}

pub fn case_exists(conn: &Connection, case_id: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM cases WHERE case_uuid = ?1",
            [case_id],
            |_| Ok(()),
        )
        .optional()?;

    Ok(found.is_some())
}

/// Stored disputes for a case, in the order they were generated
pub fn get_case_disputes(conn: &Connection, case_id: &str) -> Result<Vec<StoredDispute>> {
    let mut stmt = conn.prepare(
        "SELECT dispute_uuid, case_uuid, dispute_type, reason, priority, bureau,
                item_json, detail, status, created_at
         FROM disputes
         WHERE case_uuid = ?1
         ORDER BY id",
    )?;

    let rows = stmt
        .query_map([case_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(
            |(id, case_id, dispute_type, reason, priority, bureau, item_json, detail, status, created_at)| -> Result<StoredDispute> {
                let item: DisputeItem = serde_json::from_str(&item_json)
                    .with_context(|| format!("Invalid item reference for dispute {}", id))?;

                let dispute = SuggestedDispute {
                    dispute_type: DisputeType::from_code(&dispute_type)
                        .ok_or_else(|| anyhow!("Unknown dispute type: {}", dispute_type))?,
                    reason,
                    priority: Priority::from_code(&priority)
                        .ok_or_else(|| anyhow!("Unknown priority: {}", priority))?,
                    bureau: Bureau::from_raw(&bureau),
                    item,
                    detail,
                };

                Ok(StoredDispute {
                    id,
                    case_id,
                    status,
                    created_at: parse_timestamp(&created_at)?,
                    dispute,
                })
            },
        )
        .collect()
}

pub fn count_disputes(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM disputes", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// AUDIT TRAIL
// ============================================================================

pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let rows = stmt
        .query_map(params![entity_type, entity_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(
            |(event_id, timestamp, event_type, entity_type, entity_id, data, actor)| -> Result<Event> {
                Ok(Event {
                    event_id,
                    timestamp: parse_timestamp(&timestamp)?,
                    event_type,
                    entity_type,
                    entity_id,
                    data: serde_json::from_str(&data)
                        .context("Invalid event payload in store")?,
                    actor,
                })
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispute::ItemType;
    use crate::parser::parse_credit_report;

    fn sample_report() -> CreditReport {
        parse_credit_report(
            r#"{
                "bureau": "EQUIFAX",
                "score": 580,
                "reportDate": "2024-06-01",
                "accounts": [
                    {"creditorName": "Midland", "accountNumber": "M-1", "status": "COLLECTION", "balance": 900},
                    {"creditorName": "Citi", "accountNumber": "C-2", "status": "CHARGE_OFF", "latePayments": 2}
                ],
                "inquiries": [{"inquirerName": "Ally", "inquiryType": "HARD"}],
                "publicRecords": [{"recordType": "LIEN", "caseNumber": "L-77"}]
            }"#,
        )
        .unwrap()
    }

    fn open_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_import_creates_case_and_disputes() {
        let mut conn = open_store();
        let report = sample_report();

        let outcome = import_report(&mut conn, &report, "client-42", "json-1.0.0").unwrap();

        let (case_id, dispute_ids, summary) = match outcome {
            ImportOutcome::Created {
                case_id,
                dispute_ids,
                summary,
                ..
            } => (case_id, dispute_ids, summary),
            other => panic!("expected Created, got {:?}", other),
        };

        assert_eq!(dispute_ids.len(), 5);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.urgent, 1);
        assert_eq!(count_disputes(&conn).unwrap(), 5);

        let stored = get_case_disputes(&conn, &case_id).unwrap();
        let expected = analyze_report(&report);
        assert_eq!(stored.len(), expected.len());
        for (row, dispute) in stored.iter().zip(expected.iter()) {
            assert_eq!(&row.dispute, dispute);
            assert_eq!(row.status, DISPUTE_STATUS_PENDING);
            assert_eq!(row.case_id, case_id);
        }
        assert_eq!(stored[4].dispute.item_type(), ItemType::PublicRecord);

        let cases = list_cases(&conn).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].client_ref, "client-42");
        assert_eq!(cases[0].bureau, "EQUIFAX");
        assert_eq!(cases[0].status, CASE_STATUS_OPEN);
        assert_eq!(cases[0].dispute_count, 5);
    }

    #[test]
    fn test_import_twice_is_idempotent() {
        let mut conn = open_store();
        let report = sample_report();

        let first = import_report(&mut conn, &report, "client-42", "json-1.0.0").unwrap();
        let second = import_report(&mut conn, &report, "client-42", "json-1.0.0").unwrap();

        let first_report_id = match first {
            ImportOutcome::Created { report_id, .. } => report_id,
            other => panic!("expected Created, got {:?}", other),
        };

        assert_eq!(
            second,
            ImportOutcome::Duplicate {
                report_id: first_report_id
            }
        );
        assert_eq!(list_cases(&conn).unwrap().len(), 1);
        assert_eq!(count_disputes(&conn).unwrap(), 5);
    }

    #[test]
    fn test_same_report_for_two_clients_opens_two_cases() {
        let mut conn = open_store();
        let report = sample_report();

        let (case_a, report_a) =
            match import_report(&mut conn, &report, "client-A", "json-1.0.0").unwrap() {
                ImportOutcome::Created {
                    case_id, report_id, ..
                } => (case_id, report_id),
                other => panic!("expected Created, got {:?}", other),
            };
        let (case_b, report_b) =
            match import_report(&mut conn, &report, "client-B", "json-1.0.0").unwrap() {
                ImportOutcome::Created {
                    case_id, report_id, ..
                } => (case_id, report_id),
                other => panic!("expected Created, got {:?}", other),
            };

        assert_ne!(case_a, case_b);
        assert_eq!(report_a, report_b, "report row is shared between clients");

        let clients: Vec<String> = list_cases(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.client_ref)
            .collect();
        assert_eq!(clients, vec!["client-A", "client-B"]);
        assert_eq!(get_case_disputes(&conn, &case_b).unwrap().len(), 5);
        assert_eq!(count_disputes(&conn).unwrap(), 10);

        let report_events = get_events_for_entity(&conn, "credit_report", &report_a).unwrap();
        assert_eq!(report_events.len(), 1);

        let again = import_report(&mut conn, &report, "client-B", "json-1.0.0").unwrap();
        assert_eq!(again, ImportOutcome::Duplicate { report_id: report_a });
        assert_eq!(list_cases(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_case_exists() {
        let mut conn = open_store();

        let case_id = match import_report(&mut conn, &sample_report(), "client-1", "json-1.0.0")
            .unwrap()
        {
            ImportOutcome::Created { case_id, .. } => case_id,
            other => panic!("expected Created, got {:?}", other),
        };

        assert!(case_exists(&conn, &case_id).unwrap());
        assert!(!case_exists(&conn, "no-such-case").unwrap());
    }

    #[test]
    fn test_clean_report_opens_empty_case() {
        let mut conn = open_store();
        let report = CreditReport::new(Bureau::Experian);

        let outcome = import_report(&mut conn, &report, "client-1", "json-1.0.0").unwrap();

        match outcome {
            ImportOutcome::Created {
                case_id,
                dispute_ids,
                ..
            } => {
                assert!(dispute_ids.is_empty());
                assert!(get_case_disputes(&conn, &case_id).unwrap().is_empty());
            }
            other => panic!("expected Created, got {:?}", other),
        }
    }

    #[test]
    fn test_import_records_events() {
        let mut conn = open_store();
        let report = sample_report();

        let case_id = match import_report(&mut conn, &report, "client-7", "json-1.0.0").unwrap() {
            ImportOutcome::Created { case_id, .. } => case_id,
            other => panic!("expected Created, got {:?}", other),
        };

        let events = get_events_for_entity(&conn, "case", &case_id).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "case_opened");
        assert_eq!(events[0].data["client_ref"], "client-7");
        assert_eq!(events[0].data["disputes"], 5);
    }

    #[test]
    fn test_content_hash_is_stable() {
        let report = sample_report();
        let hash1 = report_content_hash(&report).unwrap();
        let hash2 = report_content_hash(&report).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64, "SHA-256 hash should be 64 hex characters");

        let other = CreditReport::new(Bureau::Experian);
        assert_ne!(hash1, report_content_hash(&other).unwrap());
    }

    #[test]
    fn test_event_log() {
        let conn = open_store();

        let event = Event::new(
            "test_event",
            "case",
            "case-123",
            serde_json::json!({"test": "data"}),
            "test_actor",
        );

        insert_event(&conn, &event).unwrap();

        let events = get_events_for_entity(&conn, "case", "case-123").unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "test_event");
        assert_eq!(events[0].actor, "test_actor");
    }
}
