use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Página não encontrada")]
    PageNotFound,

    #[error("Widget não encontrado")]
    WidgetNotFound,

    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Planilha não encontrada: {0}")]
    SpreadsheetMissing(String),

    #[error("Aba não encontrada na planilha: {0}")]
    WorksheetMissing(String),

    #[error("Falha ao ler a planilha: {0}")]
    SpreadsheetRead(String),

    #[error("Já existe uma página com este id")]
    PageAlreadyExists,

    #[error("Nome de arquivo inválido")]
    InvalidFileName,

    #[error("Nenhum arquivo enviado")]
    MissingFile,

    #[error("Configuração de página inválida")]
    InvalidPageConfig(#[from] serde_json::Error),

    #[error("Erro no upload do arquivo")]
    UploadError(#[from] axum::extract::multipart::MultipartError),

    // Variante para erros de banco de dados (espelho sqlite)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de E/S")]
    IoError(#[from] std::io::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::PageNotFound => (StatusCode::NOT_FOUND, "Página não encontrada.".to_string()),
            AppError::WidgetNotFound => (StatusCode::NOT_FOUND, "Widget não encontrado.".to_string()),
            AppError::FileNotFound(name) => {
                (StatusCode::NOT_FOUND, format!("Arquivo não encontrado: {}.", name))
            }
            AppError::SpreadsheetMissing(name) => {
                (StatusCode::NOT_FOUND, format!("Planilha não encontrada: {}.", name))
            }
            AppError::WorksheetMissing(name) => {
                (StatusCode::NOT_FOUND, format!("Aba não encontrada na planilha: {}.", name))
            }
            AppError::PageAlreadyExists => {
                (StatusCode::CONFLICT, "Já existe uma página com este id.".to_string())
            }
            AppError::InvalidFileName => {
                (StatusCode::BAD_REQUEST, "Nome de arquivo inválido.".to_string())
            }
            AppError::MissingFile => {
                (StatusCode::BAD_REQUEST, "Nenhum arquivo enviado.".to_string())
            }
            AppError::UploadError(e) => {
                (StatusCode::BAD_REQUEST, format!("Falha no upload: {}.", e))
            }

            // Todos os outros erros (DatabaseError, IoError, InternalServerError...) viram 500.
            // O `#[from]` cuidou da conversão, agora só precisamos tratar o que fazer com eles.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
