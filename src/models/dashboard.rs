// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

// 1. Widget de tendência (páginas `grid`)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridWidgetPayload {
    pub id: String,
    pub name: String,
    /// Último valor da série (bruto, sem arredondamento).
    pub value: f64,
    /// Último valor da coluna de meta.
    pub target: f64,
    /// Variação entre os dois últimos valores, arredondada a 1 decimal.
    pub percent_change: f64,
    #[schema(example = "▲")]
    pub trend: String,
    #[schema(example = "green")]
    pub trend_color: String,
    pub labels: Vec<String>,
    pub chart_data: Vec<Option<f64>>,
    #[schema(example = "#0bda5b")]
    pub value_color: String,
}

// 2. Gráfico de série dupla (páginas `graph`) — sem tendência:
// variação percentual só faz sentido para série única.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DualSeriesPayload {
    pub title: String,
    #[serde(rename = "type")]
    #[schema(example = "line")]
    pub chart_type: String,
    pub labels: Vec<String>,
    /// Valor realizado por período (exclusivo com `fct`).
    pub real: Vec<Option<f64>>,
    /// Previsão por período (exclusivo com `real`).
    pub fct: Vec<Option<f64>>,
    /// Orçamento, registrado independente de real/previsão.
    pub bgt: Vec<Option<f64>>,
    /// "real" | "fct" | null, por período.
    pub real_or_fct_type: Vec<Option<String>>,
}

// 3. Card (páginas `cards`)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardPayload {
    pub title: String,
    pub value: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "#0bda5b")]
    pub value_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "▲")]
    pub arrow: Option<String>,
}

// 4. Uma página pronta para exibição no carrossel
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PagePayload {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub page_type: String,
    pub order: i64,
    #[serde(flatten)]
    pub content: PageContent,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PageContent {
    Grid {
        widgets: Vec<GridWidgetPayload>,
    },
    Cards {
        cards: Vec<CardPayload>,
    },
    Graph {
        graphs: Vec<DualSeriesPayload>,
    },
    Text {
        html: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        font_size: Option<String>,
    },
    Image {
        image_file: String,
    },
}

/// Payload de um widget isolado (endpoint de widget único).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum WidgetPayload {
    Grid(GridWidgetPayload),
    Graph(DualSeriesPayload),
}

// --- API de dados brutos (/api/dashboard/data) ---
// Mesma agregação, sem cor/símbolo/HTML amarrado a um renderizador.

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridWidgetData {
    pub id: String,
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub targets: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardData {
    pub title: String,
    pub value: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageData {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub page_type: String,
    #[serde(flatten)]
    pub content: PageDataContent,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PageDataContent {
    Grid { widgets: Vec<GridWidgetData> },
    Cards { cards: Vec<CardData> },
    Graph { graphs: Vec<DualSeriesPayload> },
    Text { md_file: String, content: String },
    Image { image_file: String },
}

// --- Backoffice: listagem de arquivos de dados ---
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileInfo {
    #[schema(example = "producao.xlsx")]
    pub name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}
