// src/config.rs

use std::{env, path::PathBuf, time::Duration};

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::{
    db::{PageRepository, PageStore},
    services::{PageService, WidgetService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    /// Diretório dos ficheiros de dados (planilhas, markdown, imagens).
    pub data_dir: PathBuf,
    pub page_service: PageService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://dashboard.db?mode=rwc".to_string());
        let pages_dir = PathBuf::from(
            env::var("PAGES_DIR").unwrap_or_else(|_| "config/pages".to_string()),
        );
        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        // Conecta ao banco (espelho de descoberta), usando '?' para propagar erros
        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        tokio::fs::create_dir_all(&pages_dir).await?;
        tokio::fs::create_dir_all(&data_dir).await?;

        // --- Monta o gráfico de dependências ---
        let page_store = PageStore::new(pages_dir);
        let page_repo = PageRepository::new(db_pool.clone());
        let widget_service = WidgetService::new(data_dir.clone());
        let page_service = PageService::new(page_store, page_repo, widget_service);

        Ok(Self {
            db_pool,
            data_dir,
            page_service,
        })
    }
}
