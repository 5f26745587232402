// src/services/widget_service.rs
//
// Montagem dos widgets: para cada tipo de página, resolve as colunas,
// extrai a série e produz o payload pronto para exibição (ou a versão
// bruta para a API de dados).

use std::path::PathBuf;

use calamine::{Data, Range};
use comrak::{markdown_to_html, Options};

use crate::{
    common::error::AppError,
    models::dashboard::{
        CardData, CardPayload, DualSeriesPayload, GridWidgetData, GridWidgetPayload, PageContent,
        PageData, PageDataContent, PagePayload, WidgetPayload,
    },
    models::page::{
        PageConfig, PageKind, WidgetConfig, DEFAULT_COLUMN_BGT, DEFAULT_COLUMN_FCT,
        DEFAULT_COLUMN_ICON, DEFAULT_COLUMN_REAL, DEFAULT_COLUMN_TARGET, DEFAULT_COLUMN_TITLE,
        DEFAULT_COLUMN_TOTAL, DEFAULT_COLUMN_VALUE,
    },
    services::{spreadsheet, trend},
};

use spreadsheet::{
    BUDGET_FALLBACK_IDX, FCT_FALLBACK_IDX, MONTH_FALLBACK_IDX, TARGET_FALLBACK_IDX,
    VALUE_FALLBACK_IDX,
};

const DEFAULT_CHART_TYPE: &str = "line";

#[derive(Clone)]
pub struct WidgetService {
    data_dir: PathBuf,
}

impl WidgetService {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn data_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Monta o payload de exibição de uma página.
    pub fn build_page(&self, page: &PageConfig) -> Result<PagePayload, AppError> {
        let content = match &page.kind {
            PageKind::Grid { xlsx_file, widgets } => PageContent::Grid {
                widgets: self.build_grid_widgets(xlsx_file, widgets)?,
            },
            PageKind::Cards {
                xlsx_file,
                sheet,
                column_title,
                column_value,
                column_icon,
                column_target,
            } => PageContent::Cards {
                cards: self
                    .card_rows(xlsx_file, sheet, column_title, column_value, column_icon, column_target)?
                    .into_iter()
                    .map(card_payload)
                    .collect(),
            },
            PageKind::Graph { xlsx_file, widgets } => PageContent::Graph {
                graphs: self.build_graphs(xlsx_file, widgets)?,
            },
            PageKind::Text { md_file, font_size } => PageContent::Text {
                html: self.render_markdown(md_file),
                font_size: font_size.clone(),
            },
            PageKind::Image { image_file } => PageContent::Image {
                image_file: image_file.clone(),
            },
        };

        Ok(PagePayload {
            id: page.id.clone(),
            title: page.title.clone(),
            description: page.description.clone(),
            icon: page.icon.clone(),
            page_type: page.kind.type_name().to_string(),
            order: page.order,
            content,
        })
    }

    /// Versão bruta da página para a API de dados: mesmas séries, sem
    /// cor, símbolo ou HTML.
    pub fn build_page_data(&self, page: &PageConfig) -> Result<PageData, AppError> {
        let content = match &page.kind {
            PageKind::Grid { xlsx_file, widgets } => PageDataContent::Grid {
                widgets: self.build_grid_data(xlsx_file, widgets)?,
            },
            PageKind::Cards {
                xlsx_file,
                sheet,
                column_title,
                column_value,
                column_icon,
                column_target,
            } => PageDataContent::Cards {
                cards: self
                    .card_rows(xlsx_file, sheet, column_title, column_value, column_icon, column_target)?
                    .into_iter()
                    .map(|row| CardData {
                        title: row.title,
                        value: row.value,
                        icon: row.icon,
                        target: row.target,
                    })
                    .collect(),
            },
            PageKind::Graph { xlsx_file, widgets } => PageDataContent::Graph {
                graphs: self.build_graphs(xlsx_file, widgets)?,
            },
            PageKind::Text { md_file, .. } => PageDataContent::Text {
                md_file: md_file.clone(),
                content: std::fs::read_to_string(self.data_path(md_file)).unwrap_or_default(),
            },
            PageKind::Image { image_file } => PageDataContent::Image {
                image_file: image_file.clone(),
            },
        };

        Ok(PageData {
            id: page.id.clone(),
            title: page.title.clone(),
            page_type: page.kind.type_name().to_string(),
            content,
        })
    }

    /// Monta um único widget de uma página `grid` ou `graph`.
    pub fn build_widget(&self, page: &PageConfig, widget_id: &str) -> Result<WidgetPayload, AppError> {
        match &page.kind {
            PageKind::Grid { xlsx_file, widgets } => {
                let widget = find_active_widget(widgets, widget_id)?;
                let mut workbook =
                    spreadsheet::open_workbook_at(&self.data_path(xlsx_file), xlsx_file)?;
                Ok(WidgetPayload::Grid(grid_widget(&mut workbook, widget)?))
            }
            PageKind::Graph { xlsx_file, widgets } => {
                let widget = find_active_widget(widgets, widget_id)?;
                let mut workbook =
                    spreadsheet::open_workbook_at(&self.data_path(xlsx_file), xlsx_file)?;
                Ok(WidgetPayload::Graph(graph_widget(&mut workbook, widget)?))
            }
            _ => Err(AppError::WidgetNotFound),
        }
    }

    fn build_grid_widgets(
        &self,
        xlsx_file: &str,
        widgets: &[WidgetConfig],
    ) -> Result<Vec<GridWidgetPayload>, AppError> {
        let mut workbook = spreadsheet::open_workbook_at(&self.data_path(xlsx_file), xlsx_file)?;
        let mut out = Vec::new();
        for widget in widgets.iter().filter(|w| w.active) {
            match grid_widget(&mut workbook, widget) {
                Ok(payload) => out.push(payload),
                Err(AppError::WorksheetMissing(sheet)) => {
                    tracing::warn!(
                        "Widget '{}' ignorado: aba '{}' inexistente em {}",
                        widget.id,
                        sheet,
                        xlsx_file
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    fn build_grid_data(
        &self,
        xlsx_file: &str,
        widgets: &[WidgetConfig],
    ) -> Result<Vec<GridWidgetData>, AppError> {
        let mut workbook = spreadsheet::open_workbook_at(&self.data_path(xlsx_file), xlsx_file)?;
        let mut out = Vec::new();
        for widget in widgets.iter().filter(|w| w.active) {
            let range = match spreadsheet::worksheet(&mut workbook, &widget.sheet) {
                Ok(range) => range,
                Err(AppError::WorksheetMissing(sheet)) => {
                    tracing::warn!(
                        "Widget '{}' ignorado: aba '{}' inexistente em {}",
                        widget.id,
                        sheet,
                        xlsx_file
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            let series = grid_series(&range, widget);
            out.push(GridWidgetData {
                id: widget.id.clone(),
                name: widget.name.clone(),
                labels: series.labels,
                values: series.values,
                targets: series.targets,
            });
        }
        Ok(out)
    }

    fn build_graphs(
        &self,
        xlsx_file: &str,
        widgets: &[WidgetConfig],
    ) -> Result<Vec<DualSeriesPayload>, AppError> {
        let mut workbook = spreadsheet::open_workbook_at(&self.data_path(xlsx_file), xlsx_file)?;
        let mut out = Vec::new();
        for widget in widgets.iter().filter(|w| w.active) {
            match graph_widget(&mut workbook, widget) {
                Ok(payload) => out.push(payload),
                Err(AppError::WorksheetMissing(sheet)) => {
                    tracing::warn!(
                        "Widget '{}' ignorado: aba '{}' inexistente em {}",
                        widget.id,
                        sheet,
                        xlsx_file
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    fn card_rows(
        &self,
        xlsx_file: &str,
        sheet: &str,
        column_title: &Option<String>,
        column_value: &Option<String>,
        column_icon: &Option<String>,
        column_target: &Option<String>,
    ) -> Result<Vec<spreadsheet::CardRow>, AppError> {
        let mut workbook = spreadsheet::open_workbook_at(&self.data_path(xlsx_file), xlsx_file)?;
        let range = spreadsheet::worksheet(&mut workbook, sheet)?;

        let title_idx = spreadsheet::resolve_column(
            &range,
            sheet,
            column_title.as_deref().unwrap_or(DEFAULT_COLUMN_TITLE),
            0,
        );
        let value_idx = spreadsheet::resolve_column(
            &range,
            sheet,
            column_value.as_deref().unwrap_or(DEFAULT_COLUMN_VALUE),
            1,
        );
        let icon_idx = spreadsheet::resolve_column(
            &range,
            sheet,
            column_icon.as_deref().unwrap_or(DEFAULT_COLUMN_ICON),
            2,
        );
        // A comparação com a meta só existe se a coluna foi configurada.
        let target_idx = column_target
            .as_deref()
            .map(|name| spreadsheet::resolve_column(&range, sheet, name, TARGET_FALLBACK_IDX));

        Ok(spreadsheet::extract_cards(
            &range, title_idx, value_idx, icon_idx, target_idx,
        ))
    }

    fn render_markdown(&self, md_file: &str) -> String {
        let source = match std::fs::read_to_string(self.data_path(md_file)) {
            Ok(source) => source,
            Err(_) => {
                tracing::warn!("Markdown '{}' não encontrado; usando placeholder", md_file);
                return format!("<p><em>Conteúdo indisponível: {}</em></p>", md_file);
            }
        };
        let mut options = Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.footnotes = true;
        options.extension.header_ids = Some(String::new());
        markdown_to_html(&source, &options)
    }
}

fn find_active_widget<'a>(
    widgets: &'a [WidgetConfig],
    widget_id: &str,
) -> Result<&'a WidgetConfig, AppError> {
    widgets
        .iter()
        .find(|w| w.active && w.id == widget_id)
        .ok_or(AppError::WidgetNotFound)
}

fn grid_series(range: &Range<Data>, widget: &WidgetConfig) -> spreadsheet::PairedSeries {
    let month_idx =
        spreadsheet::resolve_column(range, &widget.sheet, &widget.column_month, MONTH_FALLBACK_IDX);
    let value_idx = spreadsheet::resolve_column(
        range,
        &widget.sheet,
        widget.column_total.as_deref().unwrap_or(DEFAULT_COLUMN_TOTAL),
        VALUE_FALLBACK_IDX,
    );
    let target_idx = spreadsheet::resolve_column(
        range,
        &widget.sheet,
        widget.column_target.as_deref().unwrap_or(DEFAULT_COLUMN_TARGET),
        TARGET_FALLBACK_IDX,
    );
    spreadsheet::extract_paired(range, month_idx, value_idx, target_idx)
}

fn grid_widget(
    workbook: &mut spreadsheet::Workbook,
    widget: &WidgetConfig,
) -> Result<GridWidgetPayload, AppError> {
    let range = spreadsheet::worksheet(workbook, &widget.sheet)?;
    let series = grid_series(&range, widget);
    let trend = trend::compute(&series.values, &series.targets);

    Ok(GridWidgetPayload {
        id: widget.id.clone(),
        name: widget.name.clone(),
        value: trend.value,
        target: trend.target,
        percent_change: trend.percent_change,
        trend: trend.symbol.to_string(),
        trend_color: trend.color.to_string(),
        labels: series.labels,
        chart_data: series.values,
        value_color: trend::value_color(trend.value, trend.target).to_string(),
    })
}

fn graph_widget(
    workbook: &mut spreadsheet::Workbook,
    widget: &WidgetConfig,
) -> Result<DualSeriesPayload, AppError> {
    let range = spreadsheet::worksheet(workbook, &widget.sheet)?;
    let month_idx =
        spreadsheet::resolve_column(&range, &widget.sheet, &widget.column_month, MONTH_FALLBACK_IDX);
    let real_idx = spreadsheet::resolve_column(
        &range,
        &widget.sheet,
        widget.column_real.as_deref().unwrap_or(DEFAULT_COLUMN_REAL),
        VALUE_FALLBACK_IDX,
    );
    let fct_idx = spreadsheet::resolve_column(
        &range,
        &widget.sheet,
        widget.column_fct.as_deref().unwrap_or(DEFAULT_COLUMN_FCT),
        FCT_FALLBACK_IDX,
    );
    let bgt_idx = spreadsheet::resolve_column(
        &range,
        &widget.sheet,
        widget.column_bgt.as_deref().unwrap_or(DEFAULT_COLUMN_BGT),
        BUDGET_FALLBACK_IDX,
    );
    let series = spreadsheet::extract_period_gated(&range, month_idx, real_idx, fct_idx, bgt_idx);

    Ok(DualSeriesPayload {
        title: widget.name.clone(),
        chart_type: widget
            .chart_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CHART_TYPE.to_string()),
        labels: series.labels,
        real: series.real,
        fct: series.fct,
        bgt: series.bgt,
        real_or_fct_type: series.kind,
    })
}

fn card_payload(row: spreadsheet::CardRow) -> CardPayload {
    // Falha de parse não é erro: a comparação simplesmente não aparece.
    let comparison = row.target.as_ref().and_then(|target| {
        let value: f64 = row.value.trim().parse().ok()?;
        let target: f64 = target.trim().parse().ok()?;
        Some((value, target))
    });
    let (value_color, arrow) = match comparison {
        Some((value, target)) if value >= target => {
            (Some(trend::COLOR_ON_TARGET), Some(trend::TREND_UP))
        }
        Some(_) => (Some(trend::COLOR_BELOW_TARGET), Some(trend::TREND_DOWN)),
        None => (None, None),
    };

    CardPayload {
        title: row.title,
        value: row.value,
        icon: row.icon,
        target: row.target,
        value_color: value_color.map(str::to_string),
        arrow: arrow.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::page::PageKind;
    use rust_xlsxwriter::Workbook as FixtureWorkbook;
    use std::path::Path;

    fn write_grid_fixture(path: &Path) {
        let mut workbook = FixtureWorkbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Vendas").unwrap();
        sheet.write_string(0, 0, "Mês").unwrap();
        sheet.write_string(0, 1, "Total").unwrap();
        sheet.write_string(0, 2, "Meta").unwrap();
        sheet.write_string(1, 0, "Jan").unwrap();
        sheet.write_number(1, 1, 100.0).unwrap();
        sheet.write_number(1, 2, 90.0).unwrap();
        sheet.write_string(2, 0, "Fev").unwrap();
        sheet.write_number(2, 1, 150.0).unwrap();
        sheet.write_number(2, 2, 140.0).unwrap();
        workbook.save(path).unwrap();
    }

    fn grid_widget_config(id: &str, active: bool) -> WidgetConfig {
        WidgetConfig {
            id: id.to_string(),
            name: format!("Widget {}", id),
            sheet: "Vendas".to_string(),
            column_month: "Mês".to_string(),
            column_total: None,
            column_real: None,
            column_fct: None,
            column_bgt: None,
            column_target: None,
            active,
            chart_type: None,
        }
    }

    fn grid_page(xlsx_file: &str, widgets: Vec<WidgetConfig>) -> PageConfig {
        PageConfig {
            id: "producao".to_string(),
            title: "Produção".to_string(),
            description: None,
            icon: None,
            active: true,
            order: 1,
            kind: PageKind::Grid {
                xlsx_file: xlsx_file.to_string(),
                widgets,
            },
        }
    }

    #[test]
    fn pagina_grid_monta_widget_completo() {
        let dir = tempfile::tempdir().unwrap();
        write_grid_fixture(&dir.path().join("producao.xlsx"));
        let service = WidgetService::new(dir.path().to_path_buf());

        let page = grid_page("producao.xlsx", vec![grid_widget_config("familia-a", true)]);
        let payload = service.build_page(&page).unwrap();

        let PageContent::Grid { widgets } = payload.content else {
            panic!("esperava conteúdo de grid");
        };
        assert_eq!(widgets.len(), 1);
        let widget = &widgets[0];
        assert_eq!(widget.value, 150.0);
        assert_eq!(widget.target, 140.0);
        assert_eq!(widget.percent_change, 50.0);
        assert_eq!(widget.trend, "▲");
        assert_eq!(widget.trend_color, "green");
        assert_eq!(widget.value_color, "#0bda5b");
        assert_eq!(widget.labels, vec!["Jan", "Fev"]);
        assert_eq!(widget.chart_data, vec![Some(100.0), Some(150.0)]);
    }

    #[test]
    fn widget_inativo_fica_de_fora() {
        let dir = tempfile::tempdir().unwrap();
        write_grid_fixture(&dir.path().join("producao.xlsx"));
        let service = WidgetService::new(dir.path().to_path_buf());

        let page = grid_page(
            "producao.xlsx",
            vec![
                grid_widget_config("ativo", true),
                grid_widget_config("inativo", false),
            ],
        );
        let payload = service.build_page(&page).unwrap();

        let PageContent::Grid { widgets } = payload.content else {
            panic!("esperava conteúdo de grid");
        };
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].id, "ativo");
    }

    #[test]
    fn planilha_ausente_vira_erro_de_nao_encontrado() {
        let dir = tempfile::tempdir().unwrap();
        let service = WidgetService::new(dir.path().to_path_buf());

        let page = grid_page("nao-existe.xlsx", vec![grid_widget_config("a", true)]);
        match service.build_page(&page) {
            Err(AppError::SpreadsheetMissing(name)) => assert_eq!(name, "nao-existe.xlsx"),
            other => panic!("esperava SpreadsheetMissing, veio {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn cards_comparam_com_meta_e_engolem_parse_invalido() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.xlsx");
        let mut workbook = FixtureWorkbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Resumo").unwrap();
        sheet.write_string(0, 0, "Título").unwrap();
        sheet.write_string(0, 1, "Valor").unwrap();
        sheet.write_string(0, 2, "Ícone").unwrap();
        sheet.write_string(0, 3, "Meta").unwrap();
        sheet.write_string(1, 0, "Produção").unwrap();
        sheet.write_number(1, 1, 1250.0).unwrap();
        sheet.write_string(1, 2, "factory").unwrap();
        sheet.write_number(1, 3, 1200.0).unwrap();
        sheet.write_string(2, 0, "Turno").unwrap();
        sheet.write_string(2, 1, "noite").unwrap(); // não numérico
        sheet.write_string(2, 2, "moon").unwrap();
        sheet.write_number(2, 3, 10.0).unwrap();
        workbook.save(&path).unwrap();

        let service = WidgetService::new(dir.path().to_path_buf());
        let page = PageConfig {
            id: "resumo".to_string(),
            title: "Resumo".to_string(),
            description: None,
            icon: None,
            active: true,
            order: 1,
            kind: PageKind::Cards {
                xlsx_file: "cards.xlsx".to_string(),
                sheet: "Resumo".to_string(),
                column_title: None,
                column_value: None,
                column_icon: None,
                column_target: Some("Meta".to_string()),
            },
        };
        let payload = service.build_page(&page).unwrap();

        let PageContent::Cards { cards } = payload.content else {
            panic!("esperava conteúdo de cards");
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].value_color.as_deref(), Some("#0bda5b"));
        assert_eq!(cards[0].arrow.as_deref(), Some("▲"));
        // Parse inválido: comparação omitida, sem erro.
        assert_eq!(cards[1].value_color, None);
        assert_eq!(cards[1].arrow, None);
        assert_eq!(cards[1].target.as_deref(), Some("10"));
    }

    #[test]
    fn pagina_graph_monta_series_real_ou_previsao() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valores.xlsx");
        let mut workbook = FixtureWorkbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Valores").unwrap();
        sheet.write_string(0, 0, "Mês").unwrap();
        sheet.write_string(0, 1, "Real").unwrap();
        sheet.write_string(0, 2, "Previsão").unwrap();
        sheet.write_string(0, 3, "Orçamento").unwrap();
        sheet.write_string(1, 0, "Jan").unwrap();
        sheet.write_number(1, 1, 1250.0).unwrap();
        sheet.write_number(1, 3, 1200.0).unwrap();
        sheet.write_string(2, 0, "Fev").unwrap();
        sheet.write_number(2, 2, 1100.0).unwrap();
        sheet.write_number(2, 3, 1150.0).unwrap();
        workbook.save(&path).unwrap();

        let mut widget = grid_widget_config("valor-total", true);
        widget.sheet = "Valores".to_string();
        widget.chart_type = Some("bar".to_string());
        let service = WidgetService::new(dir.path().to_path_buf());
        let page = PageConfig {
            id: "valor-total".to_string(),
            title: "Valor Total".to_string(),
            description: None,
            icon: None,
            active: true,
            order: 1,
            kind: PageKind::Graph {
                xlsx_file: "valores.xlsx".to_string(),
                widgets: vec![widget],
            },
        };
        let payload = service.build_page(&page).unwrap();

        let PageContent::Graph { graphs } = payload.content else {
            panic!("esperava conteúdo de graph");
        };
        assert_eq!(graphs.len(), 1);
        let graph = &graphs[0];
        assert_eq!(graph.chart_type, "bar");
        assert_eq!(graph.labels, vec!["Jan", "Fev"]);
        assert_eq!(graph.real, vec![Some(1250.0), None]);
        assert_eq!(graph.fct, vec![None, Some(1100.0)]);
        assert_eq!(graph.bgt, vec![Some(1200.0), Some(1150.0)]);
        assert_eq!(
            graph.real_or_fct_type,
            vec![Some("real".to_string()), Some("fct".to_string())]
        );
    }

    #[test]
    fn markdown_renderiza_extensoes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("aviso.md"),
            "## Resumo\n\n~~antigo~~\n\nVer nota[^1].\n\n| A | B |\n| - | - |\n| 1 | 2 |\n\n[^1]: atualizado em agosto.\n",
        )
        .unwrap();
        let service = WidgetService::new(dir.path().to_path_buf());

        let html = service.render_markdown("aviso.md");
        assert!(html.contains("<table>"), "tabela ausente: {}", html);
        assert!(html.contains("<del>"), "strikethrough ausente: {}", html);
        assert!(html.contains("id=\"resumo\""), "âncora ausente: {}", html);
        assert!(html.contains("footnote"), "rodapé ausente: {}", html);
    }

    #[test]
    fn markdown_ausente_vira_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let service = WidgetService::new(dir.path().to_path_buf());

        let html = service.render_markdown("nao-existe.md");
        assert!(html.contains("nao-existe.md"));
        assert!(html.starts_with("<p>"));
    }
}
