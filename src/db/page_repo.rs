// src/db/page_repo.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{common::error::AppError, models::page::PageConfig};

// O espelho de descoberta: mantém a tabela `pages` alinhada com os
// ficheiros JSON. O diretório é a fonte de verdade; a tabela só guarda
// o registro para consulta externa.
#[derive(Clone)]
pub struct PageRepository {
    pool: SqlitePool,
}

impl PageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Sincroniza a tabela com o estado atual do diretório: upsert de
    /// cada página e remoção das linhas cujo ficheiro sumiu.
    pub async fn sync(&self, pages: &[PageConfig]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();

        for page in pages {
            sqlx::query(
                r#"
                INSERT INTO pages (id, title, page_type, active, order_num, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    page_type = excluded.page_type,
                    active = excluded.active,
                    order_num = excluded.order_num,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&page.id)
            .bind(&page.title)
            .bind(page.kind.type_name())
            .bind(page.active)
            .bind(page.order)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        let known: Vec<String> = sqlx::query_scalar("SELECT id FROM pages")
            .fetch_all(&mut *tx)
            .await?;
        for id in known {
            if !pages.iter().any(|p| p.id == id) {
                sqlx::query("DELETE FROM pages WHERE id = ?1")
                    .bind(&id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
