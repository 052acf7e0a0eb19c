use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use shopledger::auth::Permission;
use shopledger::catalog::Product;
use shopledger::domain::{Page, ProductId};
use shopledger::error::AppError;
use shopledger::inventory::{
    InventoryValuation, MovementFilter, MovementKind, StockAdjustment, StockMovement,
};

use crate::extract::{Json, Query};
use crate::infra::{ApiContext, CurrentUser, PageParams};

pub(crate) fn router() -> Router<ApiContext> {
    Router::new()
        .route("/api/v1/inventory/low-stock", get(low_stock))
        .route("/api/v1/inventory/valuation", get(valuation))
        .route("/api/v1/inventory/movements", get(movements))
        .route("/api/v1/inventory/adjustments", post(adjust))
}

#[derive(Debug, Default, Deserialize)]
struct MovementQuery {
    #[serde(default)]
    product_id: Option<ProductId>,
    #[serde(default)]
    kind: Option<MovementKind>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

async fn low_stock(
    State(context): State<ApiContext>,
    current: CurrentUser,
) -> Result<Json<Vec<Product>>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.inventory.low_stock()?))
}

async fn valuation(
    State(context): State<ApiContext>,
    current: CurrentUser,
) -> Result<Json<InventoryValuation>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.inventory.valuation()?))
}

async fn movements(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<MovementQuery>,
) -> Result<Json<Page<StockMovement>>, AppError> {
    current.require(Permission::ViewRecords)?;
    let page = context.page(&PageParams {
        page: query.page,
        per_page: query.per_page,
    });
    let filter = MovementFilter {
        product_id: query.product_id,
        kind: query.kind,
    };
    Ok(Json(context.ledger.inventory.movements(&filter, &page)?))
}

async fn adjust(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Json(adjustment): Json<StockAdjustment>,
) -> Result<(StatusCode, Json<StockMovement>), AppError> {
    let actor = current.require(Permission::AdjustInventory)?.id;
    let movement = context.ledger.inventory.adjust(adjustment, Some(actor))?;
    Ok((StatusCode::CREATED, Json(movement)))
}
