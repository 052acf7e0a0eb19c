use shopledger::catalog::{NewProduct, NewSupplier, Product, Supplier};
use shopledger::config::AuthConfig;
use shopledger::domain::{Money, SupplierId};
use shopledger::ledger::Ledger;

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret: b"integration-secret-integration-secret".to_vec(),
        token_ttl_minutes: 60,
        bootstrap_admin: None,
    }
}

pub fn ledger() -> Ledger {
    Ledger::in_memory(&auth_config())
}

pub fn supplier(ledger: &Ledger, name: &str) -> Supplier {
    ledger
        .catalog
        .create_supplier(NewSupplier {
            name: name.to_string(),
            contact_name: Some("Dana".to_string()),
            email: Some(format!("orders@{}.example", name.to_lowercase().replace(' ', "-"))),
            phone: None,
            address: None,
        })
        .expect("supplier created")
}

pub fn product(
    ledger: &Ledger,
    sku: &str,
    supplier_id: Option<SupplierId>,
    unit_price: i64,
    cost_price: i64,
    initial_quantity: i64,
) -> Product {
    ledger
        .catalog
        .create_product(
            NewProduct {
                sku: sku.to_string(),
                name: format!("Item {sku}"),
                description: None,
                category: Some("Hardware".to_string()),
                unit_price: Money(unit_price),
                cost_price: Money(cost_price),
                initial_quantity,
                reorder_level: 5,
                supplier_id,
            },
            None,
        )
        .expect("product created")
}
