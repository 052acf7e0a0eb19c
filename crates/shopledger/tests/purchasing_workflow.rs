//! Purchase orders from creation through delivery.

mod common;

use shopledger::domain::{Money, OrderStatus, PageRequest};
use shopledger::error::ServiceError;
use shopledger::inventory::{MovementFilter, MovementKind};
use shopledger::purchasing::{NewOrderLine, NewPurchaseOrder, PurchaseOrderFilter, PurchaseOrderUpdate};
use shopledger::transactions::{TransactionFilter, TransactionKind};

use common::{ledger, product, supplier};

#[test]
fn delivery_receives_stock_and_books_a_purchase() {
    let ledger = ledger();
    let timber = supplier(&ledger, "Timber Co");
    let plank = product(&ledger, "PLK-01", Some(timber.id), 900, 500, 2);
    let beam = product(&ledger, "BEAM-01", Some(timber.id), 4_000, 2_500, 0);

    let order = ledger
        .purchasing
        .create(
            NewPurchaseOrder {
                supplier_id: timber.id,
                expected_on: None,
                notes: Some("rush".to_string()),
                lines: vec![
                    NewOrderLine {
                        product_id: plank.id,
                        quantity: 20,
                        unit_cost: None,
                    },
                    NewOrderLine {
                        product_id: beam.id,
                        quantity: 3,
                        unit_cost: Some(Money(2_300)),
                    },
                ],
            },
            None,
        )
        .expect("order created");
    assert!(order.number.starts_with("PO-"));
    assert!(order.number.ends_with("-0001"));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Money(20 * 500 + 3 * 2_300));

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        ledger
            .purchasing
            .update_status(order.id, status, None)
            .expect("status advances");
    }

    let delivered = ledger.purchasing.get(order.id).expect("order present");
    assert_eq!(delivered.status, OrderStatus::Delivered);
    let transaction_id = delivered.transaction_id.expect("purchase booked");

    let plank = ledger.catalog.product(plank.id).expect("plank present");
    let beam = ledger.catalog.product(beam.id).expect("beam present");
    assert_eq!(plank.quantity, 22);
    assert_eq!(beam.quantity, 3);

    let purchase = ledger.transactions.get(transaction_id).expect("purchase present");
    assert_eq!(purchase.kind, TransactionKind::Purchase);
    assert_eq!(purchase.status, OrderStatus::Delivered);
    assert_eq!(purchase.partner, "Timber Co");
    assert_eq!(purchase.total, delivered.total);
    assert!(purchase.number.starts_with("PUR-"));

    let receipts = ledger
        .inventory
        .movements(
            &MovementFilter {
                product_id: None,
                kind: Some(MovementKind::Receipt),
            },
            &PageRequest::default(),
        )
        .expect("movements listed");
    assert_eq!(receipts.total, 2);
    assert!(receipts
        .items
        .iter()
        .all(|movement| movement.reference.as_deref() == Some(delivered.number.as_str())));
}

#[test]
fn skipping_a_step_is_rejected_without_side_effects() {
    let ledger = ledger();
    let timber = supplier(&ledger, "Timber Co");
    let plank = product(&ledger, "PLK-01", Some(timber.id), 900, 500, 0);
    let order = ledger
        .purchasing
        .create(
            NewPurchaseOrder {
                supplier_id: timber.id,
                expected_on: None,
                notes: None,
                lines: vec![NewOrderLine {
                    product_id: plank.id,
                    quantity: 4,
                    unit_cost: None,
                }],
            },
            None,
        )
        .expect("order created");

    match ledger
        .purchasing
        .update_status(order.id, OrderStatus::Delivered, None)
    {
        Err(ServiceError::InvalidTransition { from, to }) => {
            assert_eq!(from, OrderStatus::Pending);
            assert_eq!(to, OrderStatus::Delivered);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
    assert_eq!(ledger.catalog.product(plank.id).expect("present").quantity, 0);
    assert!(ledger
        .transactions
        .list(&TransactionFilter::default())
        .expect("listed")
        .is_empty());
}

#[test]
fn only_pending_orders_can_be_edited_or_deleted() {
    let ledger = ledger();
    let timber = supplier(&ledger, "Timber Co");
    let plank = product(&ledger, "PLK-01", Some(timber.id), 900, 500, 0);
    let order = ledger
        .purchasing
        .create(
            NewPurchaseOrder {
                supplier_id: timber.id,
                expected_on: None,
                notes: None,
                lines: vec![NewOrderLine {
                    product_id: plank.id,
                    quantity: 4,
                    unit_cost: None,
                }],
            },
            None,
        )
        .expect("order created");

    let edited = ledger
        .purchasing
        .update(
            order.id,
            PurchaseOrderUpdate {
                lines: Some(vec![NewOrderLine {
                    product_id: plank.id,
                    quantity: 10,
                    unit_cost: Some(Money(450)),
                }]),
                ..PurchaseOrderUpdate::default()
            },
        )
        .expect("pending order edited");
    assert_eq!(edited.total, Money(4_500));

    ledger
        .purchasing
        .update_status(order.id, OrderStatus::Confirmed, None)
        .expect("confirmed");
    assert!(matches!(
        ledger.purchasing.update(order.id, PurchaseOrderUpdate::default()),
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        ledger.purchasing.delete(order.id),
        Err(ServiceError::Conflict(_))
    ));

    ledger
        .purchasing
        .update_status(order.id, OrderStatus::Cancelled, None)
        .expect("cancelled");
    ledger.purchasing.delete(order.id).expect("cancelled order deleted");

    let remaining = ledger
        .purchasing
        .list(&PurchaseOrderFilter::default(), &PageRequest::default())
        .expect("listed");
    assert_eq!(remaining.total, 0);
}

#[test]
fn inactive_suppliers_and_empty_orders_are_refused() {
    let ledger = ledger();
    let timber = supplier(&ledger, "Timber Co");
    let plank = product(&ledger, "PLK-01", Some(timber.id), 900, 500, 0);

    let empty = ledger.purchasing.create(
        NewPurchaseOrder {
            supplier_id: timber.id,
            expected_on: None,
            notes: None,
            lines: Vec::new(),
        },
        None,
    );
    assert!(matches!(empty, Err(ServiceError::Validation(_))));

    ledger
        .catalog
        .update_supplier(
            timber.id,
            shopledger::catalog::SupplierUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .expect("deactivated");
    let inactive = ledger.purchasing.create(
        NewPurchaseOrder {
            supplier_id: timber.id,
            expected_on: None,
            notes: None,
            lines: vec![NewOrderLine {
                product_id: plank.id,
                quantity: 1,
                unit_cost: None,
            }],
        },
        None,
    );
    assert!(matches!(inactive, Err(ServiceError::Validation(_))));
}

#[test]
fn failed_receipt_leaves_the_order_shipped_and_unbooked() {
    let ledger = ledger();
    let timber = supplier(&ledger, "Timber Co");
    let plank = product(&ledger, "PLK-01", Some(timber.id), 900, 500, i64::MAX - 5);
    let order = ledger
        .purchasing
        .create(
            NewPurchaseOrder {
                supplier_id: timber.id,
                expected_on: None,
                notes: None,
                lines: vec![NewOrderLine {
                    product_id: plank.id,
                    quantity: 10,
                    unit_cost: None,
                }],
            },
            None,
        )
        .expect("order created");
    for status in [OrderStatus::Confirmed, OrderStatus::Shipped] {
        ledger
            .purchasing
            .update_status(order.id, status, None)
            .expect("status advances");
    }

    let delivery = ledger
        .purchasing
        .update_status(order.id, OrderStatus::Delivered, None);
    assert!(matches!(delivery, Err(ServiceError::Validation(_))));

    let order = ledger.purchasing.get(order.id).expect("order present");
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.transaction_id, None);
    assert_eq!(
        ledger.catalog.product(plank.id).expect("present").quantity,
        i64::MAX - 5
    );
    assert!(ledger
        .transactions
        .list(&TransactionFilter::default())
        .expect("listed")
        .is_empty());
}
