use serde::Serialize;

use super::domain::Transaction;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Flush(String),
    #[error("csv output is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const HEADER: [&str; 8] = [
    "number", "date", "kind", "status", "partner", "lines", "units", "total",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    number: &'a str,
    date: String,
    kind: &'static str,
    status: &'static str,
    partner: &'a str,
    lines: usize,
    units: u64,
    total: String,
}

/// Renders transactions as CSV. The header row is written even when there are no rows.
pub fn transactions_csv(transactions: &[Transaction]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for transaction in transactions {
        writer.serialize(ExportRow {
            number: &transaction.number,
            date: transaction.date.format("%Y-%m-%d").to_string(),
            kind: transaction.kind.label(),
            status: transaction.status.label(),
            partner: &transaction.partner,
            lines: transaction.lines.len(),
            units: transaction
                .lines
                .iter()
                .map(|line| u64::from(line.quantity))
                .sum(),
            total: transaction.total.to_string(),
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Money, OrderStatus, ProductId, TransactionId};
    use crate::transactions::{TransactionKind, TransactionLine};
    use chrono::{NaiveDate, Utc};

    #[test]
    fn export_writes_header_and_quotes_partner_names() {
        let transaction = Transaction {
            id: TransactionId(1),
            number: "SAL-20261018-0001".to_string(),
            kind: TransactionKind::Sale,
            partner: "Baker, Smith & Co".to_string(),
            supplier_id: None,
            purchase_order_id: None,
            status: OrderStatus::Confirmed,
            lines: vec![TransactionLine {
                product_id: ProductId(3),
                product_name: "Hinge".to_string(),
                quantity: 4,
                unit_price: Money(250),
            }],
            total: Money(1000),
            date: NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"),
            notes: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let csv = transactions_csv(&[transaction]).expect("exports");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("number,date,kind,status,partner,lines,units,total")
        );
        assert_eq!(
            lines.next(),
            Some("SAL-20261018-0001,2026-10-18,SALE,CONFIRMED,\"Baker, Smith & Co\",1,4,10.00")
        );
    }

    #[test]
    fn empty_export_keeps_the_header() {
        assert_eq!(
            transactions_csv(&[]).expect("exports"),
            "number,date,kind,status,partner,lines,units,total\n"
        );
    }
}
