use std::collections::{BTreeMap, HashMap};

use super::views::{MonthlyEntry, Overview, PartnerEntry, ProductEntry, StatisticsQuery};
use crate::domain::{Money, ProductId};
use crate::transactions::{Transaction, TransactionKind};

/// Committed transactions inside the query's date window.
pub(crate) fn counted<'a>(
    transactions: &'a [Transaction],
    query: &'a StatisticsQuery,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions.iter().filter(move |transaction| {
        transaction.status.is_committed()
            && query.from.map_or(true, |from| transaction.date >= from)
            && query.to.map_or(true, |to| transaction.date <= to)
    })
}

pub fn overview(transactions: &[Transaction], query: &StatisticsQuery) -> Overview {
    let mut overview = counted(transactions, query).fold(Overview::default(), |mut acc, tx| {
        match tx.kind {
            TransactionKind::Sale => {
                acc.sales_total += tx.total;
                acc.sales_count += 1;
            }
            TransactionKind::Purchase => {
                acc.purchase_total += tx.total;
                acc.purchase_count += 1;
            }
        }
        acc
    });

    overview.gross_margin = overview.sales_total - overview.purchase_total;
    if overview.sales_count > 0 {
        overview.average_sale = Money(overview.sales_total.cents() / overview.sales_count as i64);
    }
    overview
}

/// Per calendar month, oldest first.
pub fn monthly(transactions: &[Transaction], query: &StatisticsQuery) -> Vec<MonthlyEntry> {
    let mut months: BTreeMap<String, MonthlyEntry> = BTreeMap::new();
    for tx in counted(transactions, query) {
        let month = tx.date.format("%Y-%m").to_string();
        let entry = months
            .entry(month.clone())
            .or_insert_with(|| MonthlyEntry {
                month,
                sales: Money::ZERO,
                purchases: Money::ZERO,
                net: Money::ZERO,
                transactions: 0,
            });
        match tx.kind {
            TransactionKind::Sale => entry.sales += tx.total,
            TransactionKind::Purchase => entry.purchases += tx.total,
        }
        entry.net = entry.sales - entry.purchases;
        entry.transactions += 1;
    }
    months.into_values().collect()
}

/// Per trading partner, largest total first.
pub fn partners(transactions: &[Transaction], query: &StatisticsQuery) -> Vec<PartnerEntry> {
    let mut partners: HashMap<(TransactionKind, String), PartnerEntry> = HashMap::new();
    for tx in counted(transactions, query) {
        let entry = partners
            .entry((tx.kind, tx.partner.to_lowercase()))
            .or_insert_with(|| PartnerEntry {
                partner: tx.partner.clone(),
                kind: tx.kind,
                total: Money::ZERO,
                count: 0,
            });
        entry.total += tx.total;
        entry.count += 1;
    }

    let mut entries: Vec<PartnerEntry> = partners.into_values().collect();
    entries.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.partner.cmp(&b.partner))
    });
    entries.truncate(query.limit());
    entries
}

/// Per product, highest revenue first.
pub fn products(transactions: &[Transaction], query: &StatisticsQuery) -> Vec<ProductEntry> {
    let mut products: HashMap<ProductId, ProductEntry> = HashMap::new();
    for tx in counted(transactions, query) {
        for line in &tx.lines {
            let entry = products
                .entry(line.product_id)
                .or_insert_with(|| ProductEntry {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    quantity_sold: 0,
                    revenue: Money::ZERO,
                    quantity_purchased: 0,
                    spend: Money::ZERO,
                });
            match tx.kind {
                TransactionKind::Sale => {
                    entry.quantity_sold += u64::from(line.quantity);
                    entry.revenue += line.amount();
                }
                TransactionKind::Purchase => {
                    entry.quantity_purchased += u64::from(line.quantity);
                    entry.spend += line.amount();
                }
            }
        }
    }

    let mut entries: Vec<ProductEntry> = products.into_values().collect();
    entries.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| b.quantity_sold.cmp(&a.quantity_sold))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    entries.truncate(query.limit());
    entries
}
