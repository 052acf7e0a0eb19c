use axum::extract::State;
use axum::routing::get;
use axum::Router;
use shopledger::auth::Permission;
use shopledger::error::AppError;
use shopledger::statistics::{
    Dashboard, MonthlyEntry, Overview, PartnerEntry, ProductEntry, StatisticsQuery,
};

use crate::extract::{Json, Query};
use crate::infra::{ApiContext, CurrentUser};

pub(crate) fn router() -> Router<ApiContext> {
    Router::new()
        .route("/api/v1/statistics/overview", get(overview))
        .route("/api/v1/statistics/monthly", get(monthly))
        .route("/api/v1/statistics/partners", get(partners))
        .route("/api/v1/statistics/products", get(products))
        .route("/api/v1/statistics/dashboard", get(dashboard))
}

async fn overview(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Overview>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.statistics.overview(&query)?))
}

async fn monthly(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Vec<MonthlyEntry>>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.statistics.monthly(&query)?))
}

async fn partners(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Vec<PartnerEntry>>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.statistics.partners(&query)?))
}

async fn products(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Vec<ProductEntry>>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.statistics.products(&query)?))
}

async fn dashboard(
    State(context): State<ApiContext>,
    current: CurrentUser,
) -> Result<Json<Dashboard>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.statistics.dashboard()?))
}
