// src/services/spreadsheet.rs
//
// Leitura de planilhas: resolução de colunas pelo cabeçalho e extração
// das séries por linha. A primeira linha da aba é sempre o cabeçalho;
// as demais são dados, na ordem da planilha (a ordem das linhas É o
// eixo do tempo, nada aqui reordena).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};

use crate::common::error::AppError;

/// Posições usadas quando o nome configurado não aparece no cabeçalho.
pub const MONTH_FALLBACK_IDX: usize = 0;
pub const VALUE_FALLBACK_IDX: usize = 1;
pub const TARGET_FALLBACK_IDX: usize = 2;
// Layout da aba de série dupla: mês, real, previsão, orçamento.
pub const FCT_FALLBACK_IDX: usize = 2;
pub const BUDGET_FALLBACK_IDX: usize = 3;

pub type Workbook = Xlsx<BufReader<File>>;

/// Abre o workbook no caminho dado. `display_name` é o nome configurado
/// do ficheiro, usado nas mensagens de erro (o caminho completo não
/// interessa ao cliente).
pub fn open_workbook_at(path: &Path, display_name: &str) -> Result<Workbook, AppError> {
    if !path.is_file() {
        return Err(AppError::SpreadsheetMissing(display_name.to_string()));
    }
    open_workbook(path).map_err(|e: calamine::XlsxError| AppError::SpreadsheetRead(e.to_string()))
}

/// Valores calculados (não fórmulas) de uma aba.
pub fn worksheet(workbook: &mut Workbook, sheet: &str) -> Result<Range<Data>, AppError> {
    workbook.worksheet_range(sheet).map_err(|e| match e {
        calamine::XlsxError::WorksheetNotFound(name) => AppError::WorksheetMissing(name),
        e => AppError::SpreadsheetRead(e.to_string()),
    })
}

/// Resolve o índice (base 0) da coluna cujo cabeçalho bate exatamente
/// com `name`. Sem correspondência, cai em silêncio para a posição
/// `fallback` — comportamento herdado do sistema original; o warn fica
/// de diagnóstico porque um cabeçalho renomeado passa a ler a coluna
/// errada sem nenhum erro.
pub fn resolve_column(range: &Range<Data>, sheet: &str, name: &str, fallback: usize) -> usize {
    if let Some(header) = range.rows().next() {
        for (idx, cell) in header.iter().enumerate() {
            if cell_to_string(cell) == name {
                return idx;
            }
        }
    }
    tracing::warn!(
        "Coluna '{}' não encontrada no cabeçalho da aba '{}'; usando a posição {}",
        name,
        sheet,
        fallback
    );
    fallback
}

/// Converte uma célula para texto de exibição. Floats inteiros viram
/// "150" em vez de "150.0" para rótulos e cards.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_owned(),
        Data::Float(f) => {
            if *f == f.floor() && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

/// Valor numérico da célula, ou `None` quando vazia/não numérica.
pub fn cell_to_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_at(row: &[Data], idx: usize) -> Option<&Data> {
    row.get(idx)
}

fn string_at(row: &[Data], idx: usize) -> String {
    cell_at(row, idx).map(cell_to_string).unwrap_or_default()
}

fn f64_at(row: &[Data], idx: usize) -> Option<f64> {
    cell_at(row, idx).and_then(cell_to_f64)
}

/// Série extraída com a política "par obrigatório": a linha só entra
/// quando valor E meta são numéricos. Arrays paralelos, alinhados por
/// índice com a ordem das linhas.
#[derive(Debug, Clone, Default)]
pub struct PairedSeries {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub targets: Vec<Option<f64>>,
}

pub fn extract_paired(
    range: &Range<Data>,
    month_idx: usize,
    value_idx: usize,
    target_idx: usize,
) -> PairedSeries {
    let mut series = PairedSeries::default();
    for row in range.rows().skip(1) {
        let value = f64_at(row, value_idx);
        let target = f64_at(row, target_idx);
        let (Some(value), Some(target)) = (value, target) else {
            continue;
        };
        series.labels.push(string_at(row, month_idx));
        series.values.push(Some(value));
        series.targets.push(Some(target));
    }
    series
}

/// Série extraída com a política "período presente": a linha entra
/// sempre que a célula de mês não está vazia. Por linha, no máximo um
/// de real/previsão fica preenchido (real tem prioridade quando ambos
/// existem); o orçamento é registrado de forma independente.
#[derive(Debug, Clone, Default)]
pub struct DualSeries {
    pub labels: Vec<String>,
    pub real: Vec<Option<f64>>,
    pub fct: Vec<Option<f64>>,
    pub bgt: Vec<Option<f64>>,
    pub kind: Vec<Option<String>>,
}

pub fn extract_period_gated(
    range: &Range<Data>,
    month_idx: usize,
    real_idx: usize,
    fct_idx: usize,
    bgt_idx: usize,
) -> DualSeries {
    let mut series = DualSeries::default();
    for row in range.rows().skip(1) {
        let month = string_at(row, month_idx);
        if month.is_empty() {
            continue;
        }
        let (real, fct, kind) = match (f64_at(row, real_idx), f64_at(row, fct_idx)) {
            (Some(r), _) => (Some(r), None, Some("real".to_string())),
            (None, Some(f)) => (None, Some(f), Some("fct".to_string())),
            (None, None) => (None, None, None),
        };
        series.labels.push(month);
        series.real.push(real);
        series.fct.push(fct);
        series.bgt.push(f64_at(row, bgt_idx));
        series.kind.push(kind);
    }
    series
}

/// Linha bruta de um card: textos como estão na planilha. A comparação
/// numérica com a meta acontece na montagem do widget.
#[derive(Debug, Clone)]
pub struct CardRow {
    pub title: String,
    pub value: String,
    pub icon: String,
    pub target: Option<String>,
}

/// Lê no máximo 4 linhas de cards. Uma linha com título, valor e ícone
/// todos vazios é descartada sem contar para o limite.
pub fn extract_cards(
    range: &Range<Data>,
    title_idx: usize,
    value_idx: usize,
    icon_idx: usize,
    target_idx: Option<usize>,
) -> Vec<CardRow> {
    let mut cards = Vec::new();
    for row in range.rows().skip(1) {
        if cards.len() == 4 {
            break;
        }
        let title = string_at(row, title_idx);
        let value = string_at(row, value_idx);
        let icon = string_at(row, icon_idx);
        if title.is_empty() && value.is_empty() && icon.is_empty() {
            continue;
        }
        let target = target_idx
            .map(|idx| string_at(row, idx))
            .filter(|s| !s.is_empty());
        cards.push(CardRow {
            title,
            value,
            icon,
            target,
        });
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: Vec<Vec<Data>>) -> Range<Data> {
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(1);
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, cols as u32 - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn n(value: f64) -> Data {
        Data::Float(value)
    }

    #[test]
    fn resolve_column_encontra_cabecalho_em_qualquer_posicao() {
        let range = sheet(vec![vec![s("Família"), s("Meta"), s("Total")]]);
        assert_eq!(resolve_column(&range, "t", "Total", VALUE_FALLBACK_IDX), 2);
        assert_eq!(resolve_column(&range, "t", "Meta", TARGET_FALLBACK_IDX), 1);
    }

    #[test]
    fn resolve_column_cai_para_posicao_default() {
        let range = sheet(vec![vec![s("A"), s("B"), s("C")]]);
        assert_eq!(resolve_column(&range, "t", "Mês", MONTH_FALLBACK_IDX), 0);
        assert_eq!(resolve_column(&range, "t", "Total", VALUE_FALLBACK_IDX), 1);
        assert_eq!(resolve_column(&range, "t", "Meta", TARGET_FALLBACK_IDX), 2);
    }

    #[test]
    fn extract_paired_exige_valor_e_meta() {
        let range = sheet(vec![
            vec![s("Mês"), s("Total"), s("Meta")],
            vec![s("Jan"), n(100.0), n(90.0)],
            vec![s("Fev"), n(150.0), Data::Empty], // sem meta, fora
            vec![s("Mar"), Data::Empty, n(120.0)], // sem valor, fora
            vec![s("Abr"), n(130.0), n(125.0)],
        ]);
        let series = extract_paired(&range, 0, 1, 2);
        assert_eq!(series.labels, vec!["Jan", "Abr"]);
        assert_eq!(series.values, vec![Some(100.0), Some(130.0)]);
        assert_eq!(series.targets, vec![Some(90.0), Some(125.0)]);
    }

    #[test]
    fn extract_paired_aceita_numero_em_texto() {
        let range = sheet(vec![
            vec![s("Mês"), s("Total"), s("Meta")],
            vec![s("Jan"), s("100"), n(90.0)],
        ]);
        let series = extract_paired(&range, 0, 1, 2);
        assert_eq!(series.values, vec![Some(100.0)]);
    }

    #[test]
    fn extract_period_gated_entra_com_mes_preenchido() {
        let range = sheet(vec![
            vec![s("Mês"), s("Real"), s("Previsão"), s("Orçamento")],
            vec![s("Jan"), n(100.0), Data::Empty, n(95.0)],
            vec![s("Fev"), Data::Empty, n(110.0), n(105.0)],
            vec![Data::Empty, n(999.0), n(999.0), n(999.0)], // sem mês, fora
            vec![s("Mar"), Data::Empty, Data::Empty, n(115.0)],
        ]);
        let series = extract_period_gated(&range, 0, 1, 2, 3);
        assert_eq!(series.labels, vec!["Jan", "Fev", "Mar"]);
        assert_eq!(series.real, vec![Some(100.0), None, None]);
        assert_eq!(series.fct, vec![None, Some(110.0), None]);
        assert_eq!(series.bgt, vec![Some(95.0), Some(105.0), Some(115.0)]);
        assert_eq!(
            series.kind,
            vec![Some("real".to_string()), Some("fct".to_string()), None]
        );
    }

    #[test]
    fn extract_period_gated_real_tem_prioridade_sobre_previsao() {
        let range = sheet(vec![
            vec![s("Mês"), s("Real"), s("Previsão"), s("Orçamento")],
            vec![s("Jan"), n(100.0), n(110.0), n(95.0)],
        ]);
        let series = extract_period_gated(&range, 0, 1, 2, 3);
        assert_eq!(series.real, vec![Some(100.0)]);
        assert_eq!(series.fct, vec![None]);
        assert_eq!(series.kind, vec![Some("real".to_string())]);
    }

    #[test]
    fn extract_cards_descarta_linha_toda_vazia_e_limita_a_quatro() {
        let range = sheet(vec![
            vec![s("Título"), s("Valor"), s("Ícone")],
            vec![s("Produção"), n(1250.0), s("factory")],
            vec![Data::Empty, Data::Empty, Data::Empty], // toda vazia, fora
            vec![s("Entregas"), n(98.0), s("truck")],
            vec![s("Refugo"), n(3.0), s("trash")],
            vec![s("Paradas"), n(2.0), s("clock")],
            vec![s("Excedente"), n(1.0), s("plus")], // quinta linha válida, fora
        ]);
        let cards = extract_cards(&range, 0, 1, 2, None);
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].title, "Produção");
        assert_eq!(cards[0].value, "1250");
        assert_eq!(cards[3].title, "Paradas");
    }

    #[test]
    fn extract_cards_le_meta_quando_configurada() {
        let range = sheet(vec![
            vec![s("Título"), s("Valor"), s("Ícone"), s("Meta")],
            vec![s("Produção"), n(1250.0), s("factory"), n(1200.0)],
            vec![s("Entregas"), n(98.0), s("truck"), Data::Empty],
        ]);
        let cards = extract_cards(&range, 0, 1, 2, Some(3));
        assert_eq!(cards[0].target.as_deref(), Some("1200"));
        assert_eq!(cards[1].target, None);
    }
}
