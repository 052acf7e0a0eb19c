use chrono::NaiveDate;

use crate::error::ServiceError;
use crate::store::SequenceStore;

/// Formats `<prefix>-<YYYYMMDD>-<sequence>`, the sequence zero-padded to four digits.
pub fn format_number(prefix: &str, date: NaiveDate, sequence: u32) -> String {
    format!("{prefix}-{}-{sequence:04}", date.format("%Y%m%d"))
}

/// Draws the next number for `prefix` on `date`; each day restarts at 0001.
pub fn next_number(
    sequences: &dyn SequenceStore,
    prefix: &str,
    date: NaiveDate,
) -> Result<String, ServiceError> {
    let key = format!("{prefix}-{}", date.format("%Y%m%d"));
    let sequence = sequences.next_value(&key)?;
    Ok(format_number(prefix, date, sequence))
}
