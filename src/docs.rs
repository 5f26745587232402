// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::get_all_data,
        handlers::dashboard::get_page,
        handlers::dashboard::get_widget,

        // --- Admin ---
        handlers::admin::list_pages,
        handlers::admin::create_page,
        handlers::admin::toggle_page,
        handlers::admin::reorder_pages,
        handlers::admin::list_files,
        handlers::admin::upload_file,
        handlers::admin::delete_file,
    ),
    components(
        schemas(
            // --- Configuração ---
            models::page::PageConfig,
            models::page::PageKind,
            models::page::WidgetConfig,

            // --- Payloads do painel ---
            models::dashboard::PagePayload,
            models::dashboard::PageContent,
            models::dashboard::GridWidgetPayload,
            models::dashboard::DualSeriesPayload,
            models::dashboard::CardPayload,
            models::dashboard::WidgetPayload,

            // --- API de dados brutos ---
            models::dashboard::PageData,
            models::dashboard::PageDataContent,
            models::dashboard::GridWidgetData,
            models::dashboard::CardData,

            // --- Backoffice ---
            models::dashboard::FileInfo,
        )
    ),
    tags(
        (name = "Dashboard", description = "Páginas e widgets do carrossel"),
        (name = "Admin", description = "Backoffice: páginas e ficheiros de dados")
    )
)]
pub struct ApiDoc;
