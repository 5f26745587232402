// src/handlers/admin.rs
//
// Backoffice do painel: gestão das páginas (criar, ativar, reordenar)
// e dos ficheiros de dados (upload, listagem, remoção).

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::FileInfo,
    models::page::PageConfig,
};

// Só os formatos que o painel sabe consumir.
const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "md", "png", "jpg", "jpeg", "gif", "svg"];

// =============================================================================
//  ÁREA 1: PÁGINAS
// =============================================================================

// GET /api/admin/pages
#[utoipa::path(
    get,
    path = "/api/admin/pages",
    tag = "Admin",
    responses(
        (status = 200, description = "Todas as páginas (ativas e inativas), em ordem normalizada", body = Vec<PageConfig>)
    )
)]
pub async fn list_pages(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pages = app_state.page_service.list_pages().await?;
    Ok((StatusCode::OK, Json(pages)))
}

// POST /api/admin/pages
#[utoipa::path(
    post,
    path = "/api/admin/pages",
    tag = "Admin",
    request_body = PageConfig,
    responses(
        (status = 201, description = "Página criada", body = PageConfig),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe uma página com este id")
    )
)]
pub async fn create_page(
    State(app_state): State<AppState>,
    Json(payload): Json<PageConfig>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state.page_service.create_page(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// POST /api/admin/pages/{page_id}/toggle
#[utoipa::path(
    post,
    path = "/api/admin/pages/{page_id}/toggle",
    tag = "Admin",
    responses(
        (status = 200, description = "Página com o flag `active` invertido", body = PageConfig),
        (status = 404, description = "Página não encontrada")
    ),
    params(
        ("page_id" = String, Path, description = "Id da página")
    )
)]
pub async fn toggle_page(
    State(app_state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.page_service.toggle_page(&page_id).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/admin/pages/reorder
#[utoipa::path(
    post,
    path = "/api/admin/pages/reorder",
    tag = "Admin",
    request_body = Vec<String>,
    responses(
        (status = 200, description = "Páginas na nova ordem (1..N)", body = Vec<PageConfig>)
    )
)]
pub async fn reorder_pages(
    State(app_state): State<AppState>,
    Json(ids): Json<Vec<String>>,
) -> Result<impl IntoResponse, AppError> {
    let pages = app_state.page_service.reorder_pages(&ids).await?;
    Ok((StatusCode::OK, Json(pages)))
}

// =============================================================================
//  ÁREA 2: FICHEIROS DE DADOS
// =============================================================================

// GET /api/admin/files
#[utoipa::path(
    get,
    path = "/api/admin/files",
    tag = "Admin",
    responses(
        (status = 200, description = "Ficheiros do diretório de dados", body = Vec<FileInfo>)
    )
)]
pub async fn list_files(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(&app_state.data_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        files.push(FileInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((StatusCode::OK, Json(files)))
}

// POST /api/admin/files
#[utoipa::path(
    post,
    path = "/api/admin/files",
    tag = "Admin",
    responses(
        (status = 201, description = "Ficheiro gravado no diretório de dados", body = FileInfo),
        (status = 400, description = "Upload vazio ou nome/extensão inválidos")
    )
)]
pub async fn upload_file(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut saved: Option<FileInfo> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue; // campo sem ficheiro (ex.: texto do formulário)
        };
        let file_name = sanitize_file_name(&file_name)?;
        let bytes = field.bytes().await?;
        tokio::fs::write(app_state.data_dir.join(&file_name), &bytes).await?;
        tracing::info!("Arquivo '{}' recebido ({} bytes)", file_name, bytes.len());
        saved = Some(FileInfo {
            name: file_name,
            size: bytes.len() as u64,
            modified: Some(Utc::now()),
        });
    }

    let info = saved.ok_or(AppError::MissingFile)?;
    Ok((StatusCode::CREATED, Json(info)))
}

// DELETE /api/admin/files/{file_name}
#[utoipa::path(
    delete,
    path = "/api/admin/files/{file_name}",
    tag = "Admin",
    responses(
        (status = 204, description = "Ficheiro removido"),
        (status = 404, description = "Ficheiro não encontrado")
    ),
    params(
        ("file_name" = String, Path, description = "Nome do ficheiro no diretório de dados")
    )
)]
pub async fn delete_file(
    State(app_state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let file_name = sanitize_file_name(&file_name)?;
    match tokio::fs::remove_file(app_state.data_dir.join(&file_name)).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::FileNotFound(file_name))
        }
        Err(e) => Err(e.into()),
    }
}

/// Nome de ficheiro sem caminho (nada de separadores ou "..") e com
/// extensão da lista permitida.
fn sanitize_file_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
    {
        return Err(AppError::InvalidFileName);
    }
    let extension = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::InvalidFileName);
    }
    Ok(name.to_string())
}
