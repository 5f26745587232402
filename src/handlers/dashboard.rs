// src/handlers/dashboard.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    // Importamos os models para referenciar no Swagger
    models::dashboard::{PageData, PagePayload, WidgetPayload},
};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Páginas ativas do carrossel, em ordem de exibição", body = Vec<PagePayload>)
    )
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let pages = app_state.page_service.build_dashboard().await?;
    Ok((StatusCode::OK, Json(pages)))
}

// GET /api/dashboard/data
#[utoipa::path(
    get,
    path = "/api/dashboard/data",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dados brutos de todas as páginas ativas (sem cores/HTML)", body = Vec<PageData>)
    )
)]
pub async fn get_all_data(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let pages = app_state.page_service.build_all_data().await?;
    Ok((StatusCode::OK, Json(pages)))
}

// GET /api/dashboard/pages/{page_id}
#[utoipa::path(
    get,
    path = "/api/dashboard/pages/{page_id}",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Payload de uma página ativa", body = PagePayload),
        (status = 404, description = "Página inexistente, inativa ou com ficheiro ausente")
    ),
    params(
        ("page_id" = String, Path, description = "Id da página")
    )
)]
pub async fn get_page(
    State(app_state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.page_service.get_page(&page_id).await?;
    Ok((StatusCode::OK, Json(page)))
}

// GET /api/dashboard/pages/{page_id}/widgets/{widget_id}
#[utoipa::path(
    get,
    path = "/api/dashboard/pages/{page_id}/widgets/{widget_id}",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Payload de um widget ativo", body = WidgetPayload),
        (status = 404, description = "Página ou widget não encontrado")
    ),
    params(
        ("page_id" = String, Path, description = "Id da página"),
        ("widget_id" = String, Path, description = "Id do widget")
    )
)]
pub async fn get_widget(
    State(app_state): State<AppState>,
    Path((page_id, widget_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let widget = app_state
        .page_service
        .get_widget(&page_id, &widget_id)
        .await?;
    Ok((StatusCode::OK, Json(widget)))
}
