//! Customer route handlers.
//!
//! Every handler runs a [`CustomerService`] as the signed-in user, so
//! permission checks happen in one place.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bizdesk_core::{CustomerId, Permission};

use crate::components::{
    CustomerListQuery, CustomerListView, DataTableConfig, customers_table_config,
};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{Customer, CustomerChanges, NewCustomer};
use crate::services::{BulkOutcome, CustomerService};
use crate::state::AppState;

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(index).post(create))
        .route("/api/customers/table", get(table))
        .route("/api/customers/next-id", get(next_id))
        .route(
            "/api/customers/{id}",
            get(show).patch(update).delete(destroy),
        )
        .route("/api/customers/{id}/archive", post(archive))
        .route("/api/customers/{id}/unarchive", post(unarchive))
        .route("/api/customers/bulk/archive", post(bulk_archive))
        .route("/api/customers/bulk/unarchive", post(bulk_unarchive))
        .route("/api/customers/bulk/delete", post(bulk_delete))
}

/// Customer listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListResponse {
    /// Rows after filter, search and sort.
    pub customers: Vec<Customer>,
    /// Number of rows.
    pub total: usize,
    /// Vehicle types across all customers, for the filter.
    pub vehicle_types: Vec<String>,
}

/// List customers.
///
/// GET /api/customers?q=&vehicle=&archived=&sort=&dir=
#[instrument(skip(state, user))]
async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<CustomerListQuery>,
) -> Result<Json<CustomerListResponse>, AppError> {
    let records = CustomerService::new(state.store(), state.permissions(), &user)
        .list()
        .await?;

    let mut view = CustomerListView::new(records);
    query.apply(&mut view);

    let customers: Vec<Customer> = view.visible().into_iter().cloned().collect();
    Ok(Json(CustomerListResponse {
        total: customers.len(),
        customers,
        vehicle_types: view.vehicle_type_options(),
    }))
}

/// Table options query.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    pub archived: bool,
}

/// Table configuration for the current user and view.
///
/// GET /api/customers/table?archived=
async fn table(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<TableQuery>,
) -> Result<Json<DataTableConfig>, AppError> {
    let service = CustomerService::new(state.store(), state.permissions(), &user);
    let view = CustomerListView::new(service.list().await?);

    Ok(Json(customers_table_config(
        &view.vehicle_type_options(),
        query.archived,
        |permission: Permission| service.can(permission),
    )))
}

/// Next customer code.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextIdResponse {
    pub customer_id: String,
}

/// Preview the code the next customer will get.
///
/// GET /api/customers/next-id
async fn next_id(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<NextIdResponse>, AppError> {
    let code = CustomerService::new(state.store(), state.permissions(), &user)
        .next_code()
        .await?;
    Ok(Json(NextIdResponse {
        customer_id: code.to_string(),
    }))
}

/// Create a customer.
///
/// POST /api/customers
#[instrument(skip(state, user, input))]
async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer = CustomerService::new(state.store(), state.permissions(), &user)
        .create(input)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// One customer.
///
/// GET /api/customers/{id}
async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>, AppError> {
    let customer = CustomerService::new(state.store(), state.permissions(), &user)
        .get(&id)
        .await?;
    Ok(Json(customer))
}

/// Update a customer's details.
///
/// PATCH /api/customers/{id}
#[instrument(skip(state, user, changes))]
async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CustomerId>,
    Json(changes): Json<CustomerChanges>,
) -> Result<Json<Customer>, AppError> {
    let customer = CustomerService::new(state.store(), state.permissions(), &user)
        .update(&id, changes)
        .await?;
    Ok(Json(customer))
}

/// Archive a customer.
///
/// POST /api/customers/{id}/archive
#[instrument(skip(state, user))]
async fn archive(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>, AppError> {
    let customer = CustomerService::new(state.store(), state.permissions(), &user)
        .archive(&id)
        .await?;
    Ok(Json(customer))
}

/// Restore an archived customer.
///
/// POST /api/customers/{id}/unarchive
#[instrument(skip(state, user))]
async fn unarchive(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>, AppError> {
    let customer = CustomerService::new(state.store(), state.permissions(), &user)
        .unarchive(&id)
        .await?;
    Ok(Json(customer))
}

/// Permanently delete an archived customer.
///
/// DELETE /api/customers/{id}
#[instrument(skip(state, user))]
async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CustomerId>,
) -> Result<StatusCode, AppError> {
    CustomerService::new(state.store(), state.permissions(), &user)
        .delete(&id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BulkRequest {
    /// Selected customer IDs.
    pub ids: Vec<CustomerId>,
    /// Prompts the user accepted (bulk delete needs two).
    pub confirmations: u8,
}

/// Archive the selection.
///
/// POST /api/customers/bulk/archive
async fn bulk_archive(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<BulkRequest>,
) -> Result<Json<BulkOutcome>, AppError> {
    let outcome = CustomerService::new(state.store(), state.permissions(), &user)
        .bulk_archive(&body.ids)
        .await?;
    Ok(Json(outcome))
}

/// Restore the selection.
///
/// POST /api/customers/bulk/unarchive
async fn bulk_unarchive(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<BulkRequest>,
) -> Result<Json<BulkOutcome>, AppError> {
    let outcome = CustomerService::new(state.store(), state.permissions(), &user)
        .bulk_unarchive(&body.ids)
        .await?;
    Ok(Json(outcome))
}

/// Permanently delete the selection.
///
/// POST /api/customers/bulk/delete
async fn bulk_delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<BulkRequest>,
) -> Result<Json<BulkOutcome>, AppError> {
    let outcome = CustomerService::new(state.store(), state.permissions(), &user)
        .bulk_delete(&body.ids, body.confirmations)
        .await?;
    Ok(Json(outcome))
}
