//! HTTP handler functions for the theft map API.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde_json::Value;
use theft_map_analytics::{AnalyticsError, points, report, views};
use theft_map_analytics_models::ReportParams;
use theft_map_database::TheftStore;
use theft_map_database::filter::{compile, parse_list};
use theft_map_database_models::{Predicate, TheftDocument};
use theft_map_server_models::{
    ApiData, ApiError, ApiHealth, ApiMessage, ApiTotalThefts, FilterQueryParams,
};

use crate::{AppState, heatmap};

/// Compiles the shared filter parameters into a predicate.
fn predicate_of(params: &FilterQueryParams) -> Predicate {
    compile(&params.to_filter(parse_list))
}

/// Maps an analytics failure onto its HTTP response.
fn error_response(action: &str, err: &AnalyticsError) -> HttpResponse {
    match err {
        AnalyticsError::NoData { message } => HttpResponse::NotFound().json(ApiMessage {
            message: message.clone(),
        }),
        AnalyticsError::InvalidRange { message } => HttpResponse::BadRequest().json(ApiMessage {
            message: message.clone(),
        }),
        AnalyticsError::Store(e) => {
            log::error!("Failed to {action}: {e:?}");
            HttpResponse::InternalServerError().json(ApiError {
                error: format!("Failed to {action}"),
                detail: e.to_string(),
            })
        }
    }
}

/// Runs `view` against the store on the blocking pool.
async fn run_blocking<T, F>(state: &AppState, action: &str, view: F) -> Result<T, HttpResponse>
where
    T: Send + 'static,
    F: FnOnce(&dyn TheftStore) -> Result<T, AnalyticsError> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    match web::block(move || view(store.as_ref())).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(error_response(action, &e)),
        Err(e) => {
            log::error!("Failed to {action}: {e}");
            Err(HttpResponse::InternalServerError().json(ApiError {
                error: format!("Failed to {action}"),
                detail: e.to_string(),
            }))
        }
    }
}

/// Runs a filtered view: compiles `params` and hands the predicate to
/// `view`.
async fn run_view<T, F>(
    state: &AppState,
    params: &FilterQueryParams,
    action: &str,
    view: F,
) -> Result<T, HttpResponse>
where
    T: Send + 'static,
    F: FnOnce(&dyn TheftStore, &Predicate) -> Result<T, AnalyticsError> + Send + 'static,
{
    let predicate = predicate_of(params);
    run_blocking(state, action, move |store| view(store, &predicate)).await
}

/// `GET /`
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ApiMessage {
        message: "Backend running!".to_string(),
    })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/total-thefts`
pub async fn total_thefts(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "count thefts", views::total_thefts).await {
        Ok(total_thefts) => HttpResponse::Ok().json(ApiTotalThefts { total_thefts }),
        Err(resp) => resp,
    }
}

/// `GET /api/higest-police-station`
///
/// The misspelled path is what the dashboard calls.
pub async fn highest_station(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "find top station", views::highest_station).await {
        Ok(top) => HttpResponse::Ok().json(top),
        Err(resp) => resp,
    }
}

/// `GET /api/most-model`
pub async fn most_model(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "find top models", views::top_models).await {
        Ok(models) => HttpResponse::Ok().json(ApiData::from(models)),
        Err(resp) => resp,
    }
}

/// `GET /api/peak-time`
pub async fn peak_time(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "find peak time", views::peak_time).await {
        Ok(peak) => HttpResponse::Ok().json(peak),
        Err(resp) => resp,
    }
}

/// `GET /api/thefts-by-ps`
pub async fn thefts_by_station(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "count thefts by station", views::thefts_by_station).await {
        Ok(rows) => HttpResponse::Ok().json(ApiData::from(rows)),
        Err(resp) => resp,
    }
}

/// `GET /api/Time_slot-by-company`
pub async fn time_slots_by_company(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(
        &state,
        &params,
        "pivot time slots by company",
        views::time_slots_by_company,
    )
    .await
    {
        Ok(rows) => HttpResponse::Ok().json(ApiData::from(rows)),
        Err(resp) => resp,
    }
}

/// `GET /api/thefts-company`
pub async fn thefts_by_company(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "count thefts by company", views::thefts_by_company).await {
        Ok(rows) => HttpResponse::Ok().json(ApiData::from(rows)),
        Err(resp) => resp,
    }
}

/// `GET /api/theft-trends`
pub async fn theft_trends(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "count thefts per day", views::theft_trends).await {
        Ok(rows) => HttpResponse::Ok().json(ApiData::from(rows)),
        Err(resp) => resp,
    }
}

/// `GET /api/theft-data`
pub async fn theft_data(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "list thefts", views::theft_data).await {
        Ok(docs) => {
            let rows: Vec<Value> = docs
                .into_iter()
                .map(|doc| Value::Object(TheftDocument::into_map(doc)))
                .collect();
            HttpResponse::Ok().json(ApiData::from(rows))
        }
        Err(resp) => resp,
    }
}

/// `GET /api/thefts-heatmap`
///
/// Returns an HTML page rather than JSON.
pub async fn heatmap(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    match run_view(&state, &params, "build heat map", points::heatmap_points).await {
        Ok(data) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(heatmap::render(&data)),
        Err(resp) => resp,
    }
}

/// Query parameters win over body fields; the dashboard sends only the
/// query string.
fn merge_report_params(query: ReportParams, body: Option<ReportParams>) -> ReportParams {
    let body = body.unwrap_or_default();
    ReportParams {
        police_station: query.police_station.or(body.police_station),
        start_date: query.start_date.or(body.start_date),
        end_date: query.end_date.or(body.end_date),
    }
}

/// `POST /api/generate-report`
///
/// Accepts `police_station`, `start_date` and `end_date` in the query string
/// or a JSON body.
pub async fn generate_report(
    state: web::Data<AppState>,
    query: web::Query<ReportParams>,
    body: Option<web::Json<ReportParams>>,
) -> HttpResponse {
    let params = merge_report_params(query.into_inner(), body.map(web::Json::into_inner));
    let now = chrono::Local::now().naive_local();

    match run_blocking(&state, "generate report", move |store| {
        report::generate_report(store, &params, now)
    })
    .await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(resp) => resp,
    }
}
