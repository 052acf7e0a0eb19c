use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use shopledger::catalog::{NewProduct, NewSupplier, Product, Supplier};
use shopledger::config::AuthConfig;
use shopledger::domain::{Money, OrderStatus, SupplierId};
use shopledger::error::AppError;
use shopledger::ledger::Ledger;
use shopledger::purchasing::{NewOrderLine, NewPurchaseOrder};
use shopledger::statistics::{
    Dashboard, MonthlyEntry, Overview, PartnerEntry, ProductEntry, StatisticsQuery,
};
use shopledger::transactions::{NewTransaction, NewTransactionLine, TransactionKind};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DemoReport {
    pub(crate) today: NaiveDate,
    pub(crate) overview: Overview,
    pub(crate) monthly: Vec<MonthlyEntry>,
    pub(crate) partners: Vec<PartnerEntry>,
    pub(crate) products: Vec<ProductEntry>,
    pub(crate) dashboard: Dashboard,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let ledger = seed_demo_ledger(today)?;
    let report = build_report(&ledger, today)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_report(&report);
    }
    Ok(())
}

/// A small hardware shop: two suppliers, four products, one delivered and one open
/// purchase order, and a couple of months of counter sales in mixed states.
pub(crate) fn seed_demo_ledger(today: NaiveDate) -> Result<Ledger, AppError> {
    let ledger = Ledger::in_memory(&AuthConfig {
        secret: AuthConfig::ephemeral_secret(),
        token_ttl_minutes: 60,
        bootstrap_admin: None,
    });

    let timber = supplier(&ledger, "Northwind Timber", "Ada Park")?;
    let fasteners = supplier(&ledger, "Harbor Fasteners", "Luis Ortega")?;

    let plank = product(
        &ledger,
        ("PLK-2X4", "Pine plank 2x4", "Lumber"),
        (899, 520),
        (40, 10),
        timber.id,
    )?;
    let beam = product(
        &ledger,
        ("BEAM-4X4", "Oak beam 4x4", "Lumber"),
        (2_450, 1_600),
        (8, 5),
        timber.id,
    )?;
    let screws = product(
        &ledger,
        ("SCR-100", "Wood screws, box of 100", "Fasteners"),
        (1_299, 700),
        (60, 15),
        fasteners.id,
    )?;
    let hinge = product(
        &ledger,
        ("HNG-3IN", "Steel hinge 3in", "Fasteners"),
        (450, 210),
        (12, 10),
        fasteners.id,
    )?;

    let restock = ledger.purchasing.create(
        NewPurchaseOrder {
            supplier_id: timber.id,
            expected_on: Some(today),
            notes: Some("Monthly lumber restock".to_string()),
            lines: vec![order_line(plank.id, 30), order_line(beam.id, 6)],
        },
        None,
    )?;
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        ledger.purchasing.update_status(restock.id, status, None)?;
    }
    ledger.purchasing.create(
        NewPurchaseOrder {
            supplier_id: fasteners.id,
            expected_on: Some(today + chrono::Duration::days(7)),
            notes: None,
            lines: vec![order_line(hinge.id, 40), order_line(screws.id, 20)],
        },
        None,
    )?;

    let sales = [
        (
            60,
            "Riverside Builders",
            vec![(plank.id, 12), (screws.id, 10)],
            OrderStatus::Delivered,
        ),
        (
            35,
            "Oak Street Cafe",
            vec![(hinge.id, 4), (beam.id, 2)],
            OrderStatus::Shipped,
        ),
        (
            20,
            "Riverside Builders",
            vec![(plank.id, 8), (beam.id, 1)],
            OrderStatus::Confirmed,
        ),
        (7, "Walk-in", vec![(screws.id, 5)], OrderStatus::Cancelled),
        (
            1,
            "Walk-in",
            vec![(hinge.id, 3), (screws.id, 2)],
            OrderStatus::Confirmed,
        ),
        (0, "Oak Street Cafe", vec![(plank.id, 6)], OrderStatus::Pending),
    ];
    for (days_ago, partner, lines, target) in sales {
        let sale = ledger.transactions.create(
            NewTransaction {
                kind: TransactionKind::Sale,
                partner: Some(partner.to_string()),
                supplier_id: None,
                date: Some(today - chrono::Duration::days(days_ago)),
                notes: None,
                lines: lines
                    .into_iter()
                    .map(|(product_id, quantity)| NewTransactionLine {
                        product_id,
                        quantity,
                        unit_price: None,
                    })
                    .collect(),
            },
            None,
        )?;
        for status in path_to(target) {
            ledger.transactions.update_status(sale.id, *status, None)?;
        }
    }

    Ok(ledger)
}

pub(crate) fn build_report(ledger: &Ledger, today: NaiveDate) -> Result<DemoReport, AppError> {
    let query = StatisticsQuery::default();
    Ok(DemoReport {
        today,
        overview: ledger.statistics.overview(&query)?,
        monthly: ledger.statistics.monthly(&query)?,
        partners: ledger.statistics.partners(&query)?,
        products: ledger.statistics.products(&query)?,
        dashboard: ledger.statistics.dashboard_on(today)?,
    })
}

/// Statuses to walk through, in order, to reach `target` from PENDING.
fn path_to(target: OrderStatus) -> &'static [OrderStatus] {
    match target {
        OrderStatus::Pending => &[],
        OrderStatus::Confirmed => &[OrderStatus::Confirmed],
        OrderStatus::Shipped => &[OrderStatus::Confirmed, OrderStatus::Shipped],
        OrderStatus::Delivered => &[
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ],
        OrderStatus::Cancelled => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
    }
}

fn supplier(ledger: &Ledger, name: &str, contact: &str) -> Result<Supplier, AppError> {
    Ok(ledger.catalog.create_supplier(NewSupplier {
        name: name.to_string(),
        contact_name: Some(contact.to_string()),
        email: None,
        phone: None,
        address: None,
    })?)
}

fn product(
    ledger: &Ledger,
    (sku, name, category): (&str, &str, &str),
    (unit_price, cost_price): (i64, i64),
    (initial_quantity, reorder_level): (i64, i64),
    supplier_id: SupplierId,
) -> Result<Product, AppError> {
    Ok(ledger.catalog.create_product(
        NewProduct {
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            category: Some(category.to_string()),
            unit_price: Money(unit_price),
            cost_price: Money(cost_price),
            initial_quantity,
            reorder_level,
            supplier_id: Some(supplier_id),
        },
        None,
    )?)
}

fn order_line(product_id: shopledger::domain::ProductId, quantity: u32) -> NewOrderLine {
    NewOrderLine {
        product_id,
        quantity,
        unit_cost: None,
    }
}

fn render_report(report: &DemoReport) {
    let overview = &report.overview;
    println!("Shop ledger report for {}", report.today);
    println!(
        "  Sales: {} across {} transactions (average {})",
        overview.sales_total, overview.sales_count, overview.average_sale
    );
    println!(
        "  Purchases: {} across {} transactions",
        overview.purchase_total, overview.purchase_count
    );
    println!("  Gross margin: {}", overview.gross_margin);

    println!("\nMonthly");
    for entry in &report.monthly {
        println!(
            "  {}  sales {:>10}  purchases {:>10}  net {:>10}  ({} transactions)",
            entry.month, entry.sales, entry.purchases, entry.net, entry.transactions
        );
    }

    println!("\nTop partners");
    for entry in &report.partners {
        println!(
            "  {:<8} {:<24} {:>10} ({} transactions)",
            entry.kind.label(),
            entry.partner,
            entry.total,
            entry.count
        );
    }

    println!("\nTop products");
    for entry in &report.products {
        println!(
            "  {:<28} sold {:>4} for {:>10}  bought {:>4} for {:>10}",
            entry.product_name,
            entry.quantity_sold,
            entry.revenue,
            entry.quantity_purchased,
            entry.spend
        );
    }

    let dashboard = &report.dashboard;
    println!("\nToday");
    println!("  Sales today: {}", dashboard.sales_today);
    println!(
        "  Products: {} ({} active, {} low on stock)",
        dashboard.products, dashboard.active_products, dashboard.low_stock
    );
    println!(
        "  Open work: {} purchase orders, {} transactions pending",
        dashboard.pending_purchase_orders, dashboard.pending_transactions
    );
    println!(
        "  Inventory: {} units at cost {} / retail {}",
        dashboard.inventory.units_on_hand,
        dashboard.inventory.cost_value,
        dashboard.inventory.retail_value
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
    }

    #[test]
    fn demo_ledger_counts_only_committed_sales() {
        let ledger = seed_demo_ledger(today()).expect("demo seeds");
        let report = build_report(&ledger, today()).expect("report builds");

        // Delivered, shipped and two confirmed sales; the cancelled and pending ones are excluded.
        assert_eq!(report.overview.sales_count, 4);
        assert_eq!(report.overview.purchase_count, 1);
        assert_eq!(report.dashboard.pending_purchase_orders, 1);
        assert_eq!(report.dashboard.pending_transactions, 1);
        assert_eq!(report.dashboard.sales_today, Money::ZERO);
        assert!(!report.monthly.is_empty());
        assert_eq!(report.products[0].product_name, "Pine plank 2x4");
    }

    #[test]
    fn demo_stock_reflects_sales_and_the_delivered_order() {
        let ledger = seed_demo_ledger(today()).expect("demo seeds");
        let products = ledger
            .catalog
            .products(&Default::default(), &Default::default())
            .expect("products listed");
        let plank = products
            .items
            .iter()
            .find(|product| product.sku == "PLK-2X4")
            .expect("plank seeded");
        assert_eq!(plank.quantity, 40 + 30 - 12 - 8);

        let screws = products
            .items
            .iter()
            .find(|product| product.sku == "SCR-100")
            .expect("screws seeded");
        assert_eq!(screws.quantity, 60 - 10 - 2);
    }

    #[test]
    fn json_report_serializes() {
        let ledger = seed_demo_ledger(today()).expect("demo seeds");
        let report = build_report(&ledger, today()).expect("report builds");
        let value = serde_json::to_value(&report).expect("serializes");
        assert_eq!(value["today"], "2026-10-18");
        assert!(value["dashboard"]["recent_transactions"].is_array());
    }
}
