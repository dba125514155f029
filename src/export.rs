// 📤 Dispute Export
// CSV worksheet of disputes for preparing bureau letters

use crate::dispute::SuggestedDispute;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One CSV row per dispute
#[derive(Debug, Serialize)]
struct DisputeRow<'a> {
    dispute_type: &'static str,
    priority: &'static str,
    bureau: &'a str,
    item_type: &'static str,
    item_key: String,
    reason: &'a str,
    detail: &'a str,
}

impl<'a> From<&'a SuggestedDispute> for DisputeRow<'a> {
    fn from(dispute: &'a SuggestedDispute) -> Self {
        DisputeRow {
            dispute_type: dispute.dispute_type.as_str(),
            priority: dispute.priority.as_str(),
            bureau: dispute.bureau.as_str(),
            item_type: dispute.item_type().as_str(),
            item_key: dispute.item.key(),
            reason: &dispute.reason,
            detail: &dispute.detail,
        }
    }
}

/// Write disputes as CSV (header + one row each); returns rows written
pub fn write_disputes_csv<'a, W, I>(writer: W, disputes: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a SuggestedDispute>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut written = 0;

    for dispute in disputes {
        csv_writer
            .serialize(DisputeRow::from(dispute))
            .context("Failed to write dispute row")?;
        written += 1;
    }

    // Header-only output for an empty list
    if written == 0 {
        csv_writer.write_record([
            "dispute_type",
            "priority",
            "bureau",
            "item_type",
            "item_key",
            "reason",
            "detail",
        ])?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(written)
}

pub fn export_disputes_csv<'a, I>(path: &Path, disputes: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a SuggestedDispute>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;

    write_disputes_csv(file, disputes)
}
