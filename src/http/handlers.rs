//! Route handlers

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::response::{self, ApiResponse, CREATED};
use super::AppState;
use crate::core::GrantError;

type ApiResult = Result<Response, GrantError>;

#[derive(Debug, Deserialize)]
pub struct DistributorRequest {
    pub distributor: String,
}

#[derive(Debug, Deserialize)]
pub struct RegionRequest {
    pub distributor: String,
    pub region: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub distributor: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PermissionsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn required(field: &str, value: Option<&str>) -> Result<String, Response> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(response::bad_request(format!("{} is required", field))),
    }
}

pub async fn add_distributor(
    State(state): State<AppState>,
    payload: Result<Json<DistributorRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return Ok(response::bad_request(rejection.body_text())),
    };
    let distributor = match required("distributor", Some(req.distributor.as_str())) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    state.service.add_distributor(&distributor)?;
    Ok(ApiResponse::<()>::success(CREATED, None).with_status(StatusCode::CREATED))
}

pub async fn remove_distributor(
    State(state): State<AppState>,
    Path(distributor): Path<String>,
) -> ApiResult {
    state.service.remove_distributor(&distributor)?;
    Ok(response::ok_code(response::SUCCESS))
}

pub async fn list_distributors(State(state): State<AppState>) -> Response {
    response::ok(json!({ "distributors": state.service.list_distributors() }))
}

pub async fn check_permission(
    State(state): State<AppState>,
    query: Result<Query<CheckQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return Ok(response::bad_request(rejection.body_text())),
    };
    let (distributor, region) = match (
        required("distributor", query.distributor.as_deref()),
        required("region", query.region.as_deref()),
    ) {
        (Ok(d), Ok(r)) => (d, r),
        (Err(resp), _) | (_, Err(resp)) => return Ok(resp),
    };
    let verdict = state.service.check(&distributor, &region)?;
    Ok(response::ok_code(verdict.as_str()))
}

pub async fn allow_region(
    State(state): State<AppState>,
    payload: Result<Json<RegionRequest>, JsonRejection>,
) -> ApiResult {
    mark_region(state, payload, true)
}

pub async fn disallow_region(
    State(state): State<AppState>,
    payload: Result<Json<RegionRequest>, JsonRejection>,
) -> ApiResult {
    mark_region(state, payload, false)
}

fn mark_region(
    state: AppState,
    payload: Result<Json<RegionRequest>, JsonRejection>,
    allow: bool,
) -> ApiResult {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return Ok(response::bad_request(rejection.body_text())),
    };
    let (distributor, region) = match (
        required("distributor", Some(req.distributor.as_str())),
        required("region", Some(req.region.as_str())),
    ) {
        (Ok(d), Ok(r)) => (d, r),
        (Err(resp), _) | (_, Err(resp)) => return Ok(resp),
    };
    if allow {
        state.service.allow(&distributor, &region)?;
    } else {
        state.service.disallow(&distributor, &region)?;
    }
    Ok(response::ok_code(response::SUCCESS))
}

pub async fn apply_contract(State(state): State<AppState>, body: String) -> ApiResult {
    state.service.apply_contract_text(&body)?;
    Ok(response::ok_code(response::SUCCESS))
}

pub async fn get_permissions(
    State(state): State<AppState>,
    Path(distributor): Path<String>,
    Query(query): Query<PermissionsQuery>,
) -> ApiResult {
    let kind = query.kind.unwrap_or_default();
    if kind.eq_ignore_ascii_case("json") {
        let report = state.service.permissions(&distributor)?;
        return Ok(response::ok(report));
    }
    let text = state.service.permissions_text(&distributor)?;
    Ok((StatusCode::OK, text).into_response())
}

pub async fn list_countries(State(state): State<AppState>) -> Response {
    response::ok(json!({ "countries": state.service.countries() }))
}

pub async fn list_provinces(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> ApiResult {
    let provinces = state.service.provinces(&country)?;
    Ok(response::ok(json!({ "provinces": provinces })))
}

pub async fn list_cities(
    State(state): State<AppState>,
    Path((country, province)): Path<(String, String)>,
) -> ApiResult {
    let cities = state.service.cities(&country, &province)?;
    Ok(response::ok(json!({ "cities": cities })))
}
