use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use shopledger::auth::Permission;
use shopledger::domain::{OrderStatus, Page, PurchaseOrderId, SupplierId};
use shopledger::error::AppError;
use shopledger::purchasing::{
    NewPurchaseOrder, PurchaseOrder, PurchaseOrderFilter, PurchaseOrderUpdate,
};

use super::StatusChange;
use crate::extract::{Json, Path, Query};
use crate::infra::{ApiContext, CurrentUser, PageParams};

pub(crate) fn router() -> Router<ApiContext> {
    Router::new()
        .route("/api/v1/purchase-orders", get(list_orders).post(create_order))
        .route(
            "/api/v1/purchase-orders/:id",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .route("/api/v1/purchase-orders/:id/status", post(change_status))
}

#[derive(Debug, Default, Deserialize)]
struct OrderQuery {
    #[serde(default)]
    status: Option<OrderStatus>,
    #[serde(default)]
    supplier_id: Option<SupplierId>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

async fn list_orders(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Page<PurchaseOrder>>, AppError> {
    current.require(Permission::ViewRecords)?;
    let page = context.page(&PageParams {
        page: query.page,
        per_page: query.per_page,
    });
    let filter = PurchaseOrderFilter {
        status: query.status,
        supplier_id: query.supplier_id,
    };
    Ok(Json(context.ledger.purchasing.list(&filter, &page)?))
}

async fn create_order(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Json(new_order): Json<NewPurchaseOrder>,
) -> Result<(StatusCode, Json<PurchaseOrder>), AppError> {
    let actor = current.require(Permission::ManageOrders)?.id;
    let order = context.ledger.purchasing.create(new_order, Some(actor))?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> Result<Json<PurchaseOrder>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.purchasing.get(PurchaseOrderId(id))?))
}

async fn update_order(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
    Json(update): Json<PurchaseOrderUpdate>,
) -> Result<Json<PurchaseOrder>, AppError> {
    current.require(Permission::ManageOrders)?;
    Ok(Json(
        context.ledger.purchasing.update(PurchaseOrderId(id), update)?,
    ))
}

async fn delete_order(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    current.require(Permission::ManageOrders)?;
    context.ledger.purchasing.delete(PurchaseOrderId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_status(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
    Json(change): Json<StatusChange>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let actor = current.require(Permission::ManageOrders)?.id;
    Ok(Json(context.ledger.purchasing.update_status(
        PurchaseOrderId(id),
        change.status,
        Some(actor),
    )?))
}
