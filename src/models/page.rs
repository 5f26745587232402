// src/models/page.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

// Nomes de coluna usados quando a configuração não define um override.
// O resolvedor ainda cai para a posição fixa se o cabeçalho não bater.
pub const DEFAULT_COLUMN_MONTH: &str = "Mês";
pub const DEFAULT_COLUMN_TOTAL: &str = "Total";
pub const DEFAULT_COLUMN_TARGET: &str = "Meta";
pub const DEFAULT_COLUMN_REAL: &str = "Real";
pub const DEFAULT_COLUMN_FCT: &str = "Previsão";
pub const DEFAULT_COLUMN_BGT: &str = "Orçamento";
pub const DEFAULT_COLUMN_TITLE: &str = "Título";
pub const DEFAULT_COLUMN_VALUE: &str = "Valor";
pub const DEFAULT_COLUMN_ICON: &str = "Ícone";

/// Configuração de uma página do painel, tal como persistida em
/// `PAGES_DIR/<id>.json`. O campo `type` do JSON seleciona a variante
/// de `PageKind`; as chaves ficam em snake_case por compatibilidade
/// com os ficheiros já existentes no disco.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PageConfig {
    #[validate(
        length(min = 1, max = 64, message = "O id deve ter entre 1 e 64 caracteres"),
        custom(function = validate_page_id)
    )]
    #[schema(example = "producao-mensal")]
    pub id: String,

    #[validate(length(min = 1, message = "O título não pode ser vazio"))]
    #[schema(example = "Produção Mensal por Família")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "factory")]
    pub icon: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    // Não precisa ser único em repouso: a leitura normaliza para 1..N.
    #[serde(default)]
    pub order: i64,

    #[serde(flatten)]
    pub kind: PageKind,
}

fn default_active() -> bool {
    true
}

fn validate_page_id(id: &str) -> Result<(), ValidationError> {
    let ok = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("page_id");
        err.message = Some("O id deve conter apenas letras, números, '-' ou '_'".into());
        Err(err)
    }
}

/// Variantes por tipo de página. Cada tipo carrega só os campos que usa,
/// então os ramos de montagem ficam exaustivos em compile time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageKind {
    /// Grade de widgets de tendência (um KPI por widget).
    Grid {
        xlsx_file: String,
        #[serde(default)]
        widgets: Vec<WidgetConfig>,
    },
    /// Grade de cards (até 4 linhas de uma aba).
    Cards {
        xlsx_file: String,
        sheet: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_icon: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_target: Option<String>,
    },
    /// Gráfico de série dupla: real-ou-previsão contra orçamento.
    Graph {
        xlsx_file: String,
        #[serde(default)]
        widgets: Vec<WidgetConfig>,
    },
    /// Texto em Markdown convertido para HTML.
    Text {
        md_file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_size: Option<String>,
    },
    /// Imagem estática.
    Image { image_file: String },
}

impl PageKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PageKind::Grid { .. } => "grid",
            PageKind::Cards { .. } => "cards",
            PageKind::Graph { .. } => "graph",
            PageKind::Text { .. } => "text",
            PageKind::Image { .. } => "image",
        }
    }
}

/// Um widget dentro de uma página `grid` ou `graph`, preso a uma aba
/// da planilha da página. Imutável durante a requisição.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WidgetConfig {
    #[schema(example = "familia-a")]
    pub id: String,

    #[schema(example = "Equipamentos A")]
    pub name: String,

    /// Nome da aba na planilha da página.
    pub sheet: String,

    #[serde(default = "default_column_month")]
    pub column_month: String,

    // Overrides de coluna por tipo de widget; `None` usa o default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_total: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_real: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_fct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_bgt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_target: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Dica de tipo de gráfico para o renderizador ("bar", "line"...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
}

fn default_column_month() -> String {
    DEFAULT_COLUMN_MONTH.to_string()
}
