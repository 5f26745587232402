// src/services/page_service.rs

use crate::{
    common::error::AppError,
    db::{PageRepository, PageStore},
    models::dashboard::{PageData, PagePayload, WidgetPayload},
    models::page::PageConfig,
    services::WidgetService,
};

#[derive(Clone)]
pub struct PageService {
    store: PageStore,
    repo: PageRepository,
    widgets: WidgetService,
}

impl PageService {
    pub fn new(store: PageStore, repo: PageRepository, widgets: WidgetService) -> Self {
        Self {
            store,
            repo,
            widgets,
        }
    }

    /// O carrossel completo: páginas ativas em ordem normalizada.
    /// Uma página com ficheiro ausente (ou qualquer outra falha de
    /// montagem) é pulada com warn — não derruba o resto do painel.
    pub async fn build_dashboard(&self) -> Result<Vec<PagePayload>, AppError> {
        let pages = self.store.list().await?;
        let mut payloads = Vec::new();
        for page in pages.iter().filter(|p| p.active) {
            match self.widgets.build_page(page) {
                Ok(payload) => payloads.push(payload),
                Err(e) => tracing::warn!("Página '{}' ignorada: {}", page.id, e),
            }
        }
        Ok(payloads)
    }

    /// Mesma agregação, emitindo os dados brutos para a API.
    pub async fn build_all_data(&self) -> Result<Vec<PageData>, AppError> {
        let pages = self.store.list().await?;
        let mut payloads = Vec::new();
        for page in pages.iter().filter(|p| p.active) {
            match self.widgets.build_page_data(page) {
                Ok(payload) => payloads.push(payload),
                Err(e) => tracing::warn!("Página '{}' ignorada: {}", page.id, e),
            }
        }
        Ok(payloads)
    }

    /// Uma página ativa pelo id. Ausência (ou página inativa) é
    /// not-found, nunca payload vazio.
    pub async fn get_page(&self, id: &str) -> Result<PagePayload, AppError> {
        let page = self.find_active(id).await?;
        self.widgets.build_page(&page)
    }

    /// Um widget ativo de uma página ativa.
    pub async fn get_widget(&self, page_id: &str, widget_id: &str) -> Result<WidgetPayload, AppError> {
        let page = self.find_active(page_id).await?;
        self.widgets.build_widget(&page, widget_id)
    }

    async fn find_active(&self, id: &str) -> Result<PageConfig, AppError> {
        self.store
            .list()
            .await?
            .into_iter()
            .filter(|p| p.active)
            .find(|p| p.id == id)
            .ok_or(AppError::PageNotFound)
    }

    // --- Backoffice ---

    /// Todas as páginas (ativas ou não), com o espelho sincronizado.
    pub async fn list_pages(&self) -> Result<Vec<PageConfig>, AppError> {
        let pages = self.store.list().await?;
        self.repo.sync(&pages).await?;
        Ok(pages)
    }

    pub async fn create_page(&self, page: PageConfig) -> Result<PageConfig, AppError> {
        let created = self.store.create(page).await?;
        self.sync_registry().await?;
        Ok(created)
    }

    pub async fn toggle_page(&self, id: &str) -> Result<PageConfig, AppError> {
        let page = self.store.toggle(id).await?;
        self.sync_registry().await?;
        Ok(page)
    }

    pub async fn reorder_pages(&self, ids: &[String]) -> Result<Vec<PageConfig>, AppError> {
        self.store.reorder(ids).await?;
        self.list_pages().await
    }

    async fn sync_registry(&self) -> Result<(), AppError> {
        let pages = self.store.list().await?;
        self.repo.sync(&pages).await
    }
}
