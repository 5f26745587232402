//src/main.rs

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

// Importações principais
use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Lida com o Result retornado por AppState::new()
    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização (tabela-espelho `pages`)
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas do painel (leitura)
    let dashboard_routes = Router::new()
        .route("/", get(handlers::dashboard::get_dashboard))
        .route("/data", get(handlers::dashboard::get_all_data))
        .route("/pages/{page_id}", get(handlers::dashboard::get_page))
        .route(
            "/pages/{page_id}/widgets/{widget_id}",
            get(handlers::dashboard::get_widget),
        );

    // Rotas do backoffice
    let admin_routes = Router::new()
        .route(
            "/pages",
            get(handlers::admin::list_pages).post(handlers::admin::create_page),
        )
        .route("/pages/reorder", post(handlers::admin::reorder_pages))
        .route("/pages/{page_id}/toggle", post(handlers::admin::toggle_page))
        .route(
            "/files",
            get(handlers::admin::list_files).post(handlers::admin::upload_file),
        )
        .route("/files/{file_name}", delete(handlers::admin::delete_file));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/admin", admin_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
