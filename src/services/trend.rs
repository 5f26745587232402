// src/services/trend.rs
//
// Cálculo de tendência sobre uma série já extraída: valor atual, meta,
// variação percentual entre os dois últimos períodos e o indicador
// direcional. Formatação numérica (separador de milhar etc.) é
// responsabilidade do renderizador, não daqui.

pub const TREND_UP: &str = "▲";
pub const TREND_DOWN: &str = "▼";
pub const TREND_FLAT: &str = "→";
pub const TREND_NONE: &str = "";

pub const TREND_GREEN: &str = "green";
pub const TREND_RED: &str = "red";
pub const TREND_GRAY: &str = "gray";

/// Cor do valor contra a meta, sobre os valores brutos.
pub const COLOR_ON_TARGET: &str = "#0bda5b";
pub const COLOR_BELOW_TARGET: &str = "#ff8c42";

#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub value: f64,
    pub target: f64,
    pub percent_change: f64,
    pub symbol: &'static str,
    pub color: &'static str,
}

/// Variação entre os dois últimos valores da série.
///
/// Com menos de 2 valores não há tendência: valor e meta viram o último
/// disponível (ou 0), variação 0, indicador vazio. Com 2 ou mais, a
/// variação é `(curr - prev) / prev * 100` arredondada a 1 decimal;
/// `prev == 0` ou qualquer nulo no par final neutraliza o indicador em
/// vez de dividir por zero.
pub fn compute(values: &[Option<f64>], targets: &[Option<f64>]) -> Trend {
    let value = values.last().copied().flatten().unwrap_or(0.0);
    let target = targets.last().copied().flatten().unwrap_or(0.0);

    let neutral = Trend {
        value,
        target,
        percent_change: 0.0,
        symbol: TREND_NONE,
        color: TREND_GRAY,
    };

    if values.len() < 2 {
        return neutral;
    }
    let (Some(prev), Some(curr)) = (values[values.len() - 2], values[values.len() - 1]) else {
        return neutral;
    };
    if prev == 0.0 {
        return neutral;
    }

    let percent_change = round1((curr - prev) / prev * 100.0);
    let (symbol, color) = if percent_change > 0.0 {
        (TREND_UP, TREND_GREEN)
    } else if percent_change < 0.0 {
        (TREND_DOWN, TREND_RED)
    } else {
        (TREND_FLAT, TREND_GRAY)
    };

    Trend {
        value,
        target,
        percent_change,
        symbol,
        color,
    }
}

/// Verde quando o valor alcança a meta, laranja quando fica abaixo.
pub fn value_color(value: f64, target: f64) -> &'static str {
    if value >= target {
        COLOR_ON_TARGET
    } else {
        COLOR_BELOW_TARGET
    }
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
