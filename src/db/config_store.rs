// src/db/config_store.rs
//
// A loja de configuração das páginas: um ficheiro JSON por página em
// PAGES_DIR. Todo acesso a disco passa por aqui — nenhum handler lê ou
// escreve ficheiro de página diretamente. Os ficheiros são a fonte de
// verdade; não há cache, cada leitura volta ao disco.

use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{common::error::AppError, models::page::PageConfig};

#[derive(Clone)]
pub struct PageStore {
    dir: PathBuf,
    // Escritas no ficheiro de uma página são serializadas por este
    // mutex por id; escritas concorrentes em páginas diferentes não se
    // bloqueiam.
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl PageStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn page_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id.to_string()).or_default().clone()
    }

    /// Lista todas as páginas com a ordem normalizada para 1..N
    /// (ordem ascendente, empate pelo título). Ficheiros cuja ordem
    /// gravada divergiu da sequência densa são reescritos; um diretório
    /// já normalizado não sofre nenhuma escrita na leitura.
    pub async fn list(&self) -> Result<Vec<PageConfig>, AppError> {
        let mut pages = self.read_all().await?;
        pages.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.title.cmp(&b.title)));
        for (idx, page) in pages.iter_mut().enumerate() {
            let expected = (idx + 1) as i64;
            if page.order != expected {
                page.order = expected;
                self.save(page).await?;
            }
        }
        Ok(pages)
    }

    /// Cria a configuração de uma página nova. Falha se já existir um
    /// ficheiro para este id.
    pub async fn create(&self, page: PageConfig) -> Result<PageConfig, AppError> {
        let lock = self.lock_for(&page.id).await;
        let _guard = lock.lock().await;
        match tokio::fs::metadata(self.page_path(&page.id)).await {
            Ok(_) => return Err(AppError::PageAlreadyExists),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.write_page(&page).await?;
        Ok(page)
    }

    /// Inverte o flag `active` da página.
    pub async fn toggle(&self, id: &str) -> Result<PageConfig, AppError> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;
        let mut page = self.read_page(id).await?;
        page.active = !page.active;
        self.write_page(&page).await?;
        Ok(page)
    }

    /// Reordena as páginas: os ids listados recebem 1..N na ordem do
    /// pedido; páginas existentes fora da lista continuam depois, na
    /// ordem relativa que já tinham. Ids desconhecidos são ignorados.
    pub async fn reorder(&self, ids: &[String]) -> Result<(), AppError> {
        let current = self.list().await?;
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(current.len());
        for id in ids {
            if let Some(page) = current.iter().find(|p| &p.id == id) {
                if seen.insert(page.id.clone()) {
                    ordered.push(page.clone());
                }
            }
        }
        for page in &current {
            if !seen.contains(&page.id) {
                ordered.push(page.clone());
            }
        }
        for (idx, mut page) in ordered.into_iter().enumerate() {
            page.order = (idx + 1) as i64;
            self.save(&page).await?;
        }
        Ok(())
    }

    async fn save(&self, page: &PageConfig) -> Result<(), AppError> {
        let lock = self.lock_for(&page.id).await;
        let _guard = lock.lock().await;
        self.write_page(page).await
    }

    async fn write_page(&self, page: &PageConfig) -> Result<(), AppError> {
        let body = serde_json::to_string_pretty(page)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.page_path(&page.id), body).await?;
        Ok(())
    }

    async fn read_page(&self, id: &str) -> Result<PageConfig, AppError> {
        let raw = tokio::fs::read_to_string(self.page_path(id))
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    AppError::PageNotFound
                } else {
                    AppError::from(e)
                }
            })?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn read_all(&self) -> Result<Vec<PageConfig>, AppError> {
        let mut pages = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Diretório ainda não criado = nenhuma página.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(pages),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<PageConfig>(&raw) {
                Ok(page) => pages.push(page),
                // Um ficheiro corrompido não derruba o painel inteiro.
                Err(e) => {
                    tracing::warn!("Configuração ilegível em {}: {}", path.display(), e);
                }
            }
        }
        Ok(pages)
    }
}
