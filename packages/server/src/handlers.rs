//! HTTP handler functions for the accident dashboard API.

use std::sync::Arc;

use accident_dash_accident_models::WeatherMetric;
use accident_dash_analytics::options::{filter_options, resolve_filter};
use accident_dash_analytics::{AnalyticsError, dashboard, weather};
use accident_dash_analytics_models::{DashboardFilter, FilterOptions};
use accident_dash_dataset::{CleanedDataset, DatasetError};
use accident_dash_server_models::{
    ApiDataset, ApiError, ApiHealth, ApiInvalidated, ApiOptions, FilterQueryParams,
    QueryParamError,
};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use thiserror::Error;

use crate::AppState;

/// Any failure a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error(transparent)]
    Dataset(#[from] Arc<DatasetError>),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Query(#[from] QueryParamError),
}

impl ApiFailure {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Dataset(_) => "dataUnavailable",
            Self::Analytics(AnalyticsError::EmptyResult) => "emptyResult",
            Self::Analytics(AnalyticsError::MetricCleaningEmpty { .. }) => "metricCleaningEmpty",
            Self::Analytics(AnalyticsError::MetricUnavailable { .. }) => "metricUnavailable",
            Self::Analytics(AnalyticsError::InvalidFilter { .. }) => "invalidFilter",
            Self::Query(_) => "badQuery",
        }
    }
}

impl ResponseError for ApiFailure {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Dataset(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Analytics(AnalyticsError::EmptyResult) => StatusCode::NOT_FOUND,
            Self::Analytics(
                AnalyticsError::MetricCleaningEmpty { .. }
                | AnalyticsError::MetricUnavailable { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Analytics(AnalyticsError::InvalidFilter { .. }) | Self::Query(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("Rejected request: {self}");
        }
        HttpResponse::build(status).json(ApiError {
            error: self.kind().to_string(),
            message: self.to_string(),
        })
    }
}

/// Answers malformed query strings with the same JSON error body as every
/// other failure.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let body = ApiError {
            error: "badQuery".to_string(),
            message: err.to_string(),
        };
        actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
            .into()
    })
}

/// A resolved request: the dataset, the complete filter and the metric.
struct Selection {
    dataset: Arc<CleanedDataset>,
    filter: DashboardFilter,
    metric: WeatherMetric,
}

fn default_metric(options: &FilterOptions) -> WeatherMetric {
    options
        .metrics
        .first()
        .copied()
        .unwrap_or(WeatherMetric::Visibility)
}

async fn select(state: &AppState, params: &FilterQueryParams) -> Result<Selection, ApiFailure> {
    let selection = params.selection()?;
    let metric = params.metric()?;

    let dataset = state.dataset().await?;
    let options = filter_options(&dataset.table, &state.dashboard.default_region);
    let filter = resolve_filter(&options, &selection)?;

    Ok(Selection {
        metric: metric.unwrap_or_else(|| default_metric(&options)),
        dataset,
        filter,
    })
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        dataset_loaded: state.cache.get(&state.dataset_key()).await.is_some(),
    })
}

/// `GET /api/options`
///
/// Returns the filter choices and defaults for the loaded dataset.
pub async fn options(state: web::Data<AppState>) -> Result<HttpResponse, ApiFailure> {
    let dataset = state.dataset().await?;
    let options = filter_options(&dataset.table, &state.dashboard.default_region);

    Ok(HttpResponse::Ok().json(ApiOptions {
        dataset: ApiDataset {
            id: dataset.key.id.clone(),
            version: dataset.key.version.clone(),
            records: dataset.table.len() as u64,
            schema: dataset.table.schema.clone(),
            stats: dataset.table.stats,
        },
        default_metric: default_metric(&options),
        options,
    }))
}

/// `GET /api/dashboard`
///
/// Builds every chart for the selected filters.
pub async fn dashboard(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> Result<HttpResponse, ApiFailure> {
    let Selection {
        dataset,
        filter,
        metric,
    } = select(&state, &params).await?;

    let view = dashboard::build_view(&dataset.table, &filter, metric, &state.dashboard)?;
    Ok(HttpResponse::Ok().json(view))
}

/// `GET /api/weather/frequency`
///
/// Frequency of rounded metric values plus the monthly weather means.
pub async fn weather_frequency(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> Result<HttpResponse, ApiFailure> {
    let Selection {
        dataset,
        filter,
        metric,
    } = select(&state, &params).await?;

    let records = dashboard::filtered(&dataset.table, &filter)?;
    let panel = dashboard::weather_panel(&records, metric, &state.dashboard)?;
    Ok(HttpResponse::Ok().json(panel))
}

/// `GET /api/weather/monthly`
pub async fn weather_monthly(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> Result<HttpResponse, ApiFailure> {
    let Selection {
        dataset, filter, ..
    } = select(&state, &params).await?;

    let records = dashboard::filtered(&dataset.table, &filter)?;
    Ok(HttpResponse::Ok().json(weather::monthly_weather(&records)))
}

/// `GET /api/weather/visibility-ranges`
pub async fn visibility_ranges(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> Result<HttpResponse, ApiFailure> {
    let Selection {
        dataset, filter, ..
    } = select(&state, &params).await?;

    let records = dashboard::filtered(&dataset.table, &filter)?;
    Ok(HttpResponse::Ok().json(weather::visibility_ranges(&records)))
}

/// `POST /api/cache/invalidate`
///
/// Drops every cached dataset; the next request reloads from the source.
pub async fn invalidate_cache(state: web::Data<AppState>) -> HttpResponse {
    let invalidated = state.cache.invalidate_all().await;
    HttpResponse::Ok().json(ApiInvalidated { invalidated })
}
