use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use shopledger::auth::Permission;
use shopledger::catalog::{
    NewProduct, NewSupplier, Product, ProductFilter, ProductUpdate, Supplier, SupplierFilter,
    SupplierUpdate,
};
use shopledger::domain::{Page, ProductId, SupplierId};
use shopledger::error::AppError;

use crate::extract::{Json, Path, Query};
use crate::infra::{ApiContext, CurrentUser, PageParams};

pub(crate) fn router() -> Router<ApiContext> {
    Router::new()
        .route("/api/v1/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/api/v1/suppliers/:id",
            get(get_supplier)
                .patch(update_supplier)
                .delete(delete_supplier),
        )
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/categories", get(categories))
        .route(
            "/api/v1/products/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

#[derive(Debug, Default, Deserialize)]
struct SupplierQuery {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductQuery {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    supplier_id: Option<SupplierId>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    low_stock: bool,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

async fn list_suppliers(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<SupplierQuery>,
) -> Result<Json<Page<Supplier>>, AppError> {
    current.require(Permission::ViewRecords)?;
    let page = context.page(&PageParams {
        page: query.page,
        per_page: query.per_page,
    });
    let filter = SupplierFilter {
        search: query.search,
        active: query.active,
    };
    Ok(Json(context.ledger.catalog.suppliers(&filter, &page)?))
}

async fn create_supplier(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Json(new_supplier): Json<NewSupplier>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    current.require(Permission::ManageCatalog)?;
    let supplier = context.ledger.catalog.create_supplier(new_supplier)?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn get_supplier(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> Result<Json<Supplier>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.catalog.supplier(SupplierId(id))?))
}

async fn update_supplier(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
    Json(update): Json<SupplierUpdate>,
) -> Result<Json<Supplier>, AppError> {
    current.require(Permission::ManageCatalog)?;
    Ok(Json(
        context.ledger.catalog.update_supplier(SupplierId(id), update)?,
    ))
}

async fn delete_supplier(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    current.require(Permission::ManageCatalog)?;
    context.ledger.catalog.delete_supplier(SupplierId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_products(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Page<Product>>, AppError> {
    current.require(Permission::ViewRecords)?;
    let page = context.page(&PageParams {
        page: query.page,
        per_page: query.per_page,
    });
    let filter = ProductFilter {
        search: query.search,
        category: query.category,
        supplier_id: query.supplier_id,
        active: query.active,
        low_stock: query.low_stock,
    };
    Ok(Json(context.ledger.catalog.products(&filter, &page)?))
}

async fn categories(
    State(context): State<ApiContext>,
    current: CurrentUser,
) -> Result<Json<Vec<String>>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.catalog.categories()?))
}

async fn create_product(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Json(new_product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let actor = current.require(Permission::ManageCatalog)?.id;
    let product = context.ledger.catalog.create_product(new_product, Some(actor))?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> Result<Json<Product>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.catalog.product(ProductId(id))?))
}

async fn update_product(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, AppError> {
    current.require(Permission::ManageCatalog)?;
    Ok(Json(
        context.ledger.catalog.update_product(ProductId(id), update)?,
    ))
}

async fn delete_product(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    current.require(Permission::ManageCatalog)?;
    context.ledger.catalog.delete_product(ProductId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
