use crate::cpf;
use crate::errors::{AppError, ResultExt};
use crate::export::{self, ExportFormat};
use crate::identity::PersonGenerator;
use crate::models::*;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Smallest batch accepted by the batch and export endpoints.
pub const MIN_BATCH: i64 = 1;

/// Largest batch accepted by the batch and export endpoints.
pub const MAX_BATCH: i64 = 100;

/// Prefix of downloaded export files.
const DOWNLOAD_PREFIX: &str = "dados_pessoais";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Person generator wired to the configured address lookup.
    pub generator: PersonGenerator,
}

/// Generation, export and validation routes, without state applied.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/gerar-pessoa", post(generate_person))
        .route("/api/gerar-multiplas", post(generate_batch))
        .route("/api/exportar-excel", post(export_excel))
        .route("/api/exportar-csv", post(export_csv))
        .route("/api/validar-cpf", post(validate_cpf))
}

/// API routes plus the health check, without rate limiting or tracing layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(api_routes())
        .with_state(state)
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "gerador-dados-br",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Checks a requested batch size before any generation happens.
pub fn validate_quantity(quantity: i64) -> Result<usize, AppError> {
    if !(MIN_BATCH..=MAX_BATCH).contains(&quantity) {
        return Err(AppError::BadRequest(format!(
            "Quantidade deve estar entre {} e {}",
            MIN_BATCH, MAX_BATCH
        )));
    }
    Ok(quantity as usize)
}

fn requested_quantity(
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<usize, AppError> {
    let Json(request) = payload?;
    validate_quantity(request.quantidade)
}

/// Generates and flattens a whole batch. Any failure discards the batch.
async fn flat_batch(state: &AppState, quantity: usize) -> Result<Vec<Map<String, Value>>, AppError> {
    state
        .generator
        .generate_many(quantity)
        .await
        .iter()
        .map(|person| person.to_flat_row().map_err(AppError::from))
        .collect()
}

/// POST /api/gerar-pessoa
///
/// Generates one person and returns the nested record.
pub async fn generate_person(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    tracing::info!("POST /api/gerar-pessoa");

    let person = state.generator.generate().await;
    let data = person.to_json().context("Failed to generate person")?;

    Ok(Json(json!({
        "success": true,
        "data": data,
    })))
}

/// POST /api/gerar-multiplas
///
/// Body: `{"quantidade": n}` with `n` in 1..=100. Returns flattened rows.
pub async fn generate_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let quantity = requested_quantity(payload)?;
    tracing::info!("POST /api/gerar-multiplas - quantidade: {}", quantity);

    let rows = flat_batch(&state, quantity).await?;

    Ok(Json(json!({
        "success": true,
        "count": rows.len(),
        "data": rows,
    })))
}

/// POST /api/exportar-excel
///
/// Same body as the batch endpoint; answers with an XLSX attachment.
pub async fn export_excel(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let quantity = requested_quantity(payload)?;
    tracing::info!("POST /api/exportar-excel - quantidade: {}", quantity);

    export_download(&state, quantity, ExportFormat::Xlsx).await
}

/// POST /api/exportar-csv
///
/// Same body as the batch endpoint; answers with a UTF-8 (BOM) CSV attachment.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let quantity = requested_quantity(payload)?;
    tracing::info!("POST /api/exportar-csv - quantidade: {}", quantity);

    export_download(&state, quantity, ExportFormat::Csv).await
}

async fn export_download(
    state: &AppState,
    quantity: usize,
    format: ExportFormat,
) -> Result<Response, AppError> {
    let rows = flat_batch(state, quantity).await?;
    let bytes = format
        .render(&rows)
        .with_context(|| format!("Failed to export {} rows", rows.len()))?;

    let filename =
        export::timestamped_filename(DOWNLOAD_PREFIX, format, &chrono::Local::now());
    tracing::info!("Export ready: {} ({} bytes)", filename, bytes.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// POST /api/validar-cpf
///
/// Body: `{"cpf": "..."}`. An invalid CPF is a successful call with
/// `valido: false` and the reason in `mensagem`.
pub async fn validate_cpf(
    payload: Result<Json<CpfValidationRequest>, JsonRejection>,
) -> Result<Json<CpfValidationResponse>, AppError> {
    let Json(request) = payload?;

    let response = match cpf::validate(&request.cpf) {
        Ok(_) => CpfValidationResponse {
            success: true,
            valido: true,
            mensagem: "CPF válido".to_string(),
        },
        Err(reason) => {
            tracing::debug!("CPF rejected: {:?}", reason);
            CpfValidationResponse {
                success: true,
                valido: false,
                mensagem: reason.to_string(),
            }
        }
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
        assert!(validate_quantity(101).is_err());
        assert_eq!(validate_quantity(1).unwrap(), 1);
        assert_eq!(validate_quantity(100).unwrap(), 100);
    }

    #[test]
    fn test_quantity_error_message() {
        let err = validate_quantity(101).unwrap_err();
        assert_eq!(err.to_string(), "Quantidade deve estar entre 1 e 100");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
