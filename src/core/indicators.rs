//! Pure technical-indicator computation over a windowed daily series.
//!
//! Every function returns one value per input bar, `None` while the
//! indicator's warm-up window is not yet satisfied. Series shorter than a
//! warm-up window produce all-`None` columns rather than errors.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::types::{IndicatorConfig, IndicatorKind, IndicatorParams, StockDataPoint};

/// Simple moving average; defined from index `period - 1`.
#[must_use]
pub fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    let mut window_sum: f64 = closes[..period].iter().sum();
    out[period - 1] = Some(window_sum / period as f64);
    for i in period..closes.len() {
        window_sum += closes[i] - closes[i - period];
        out[i] = Some(window_sum / period as f64);
    }
    out
}

/// Exponential moving average seeded with `SMA(period)`; defined from
/// index `period - 1`.
#[must_use]
pub fn ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);

    let mut previous = seed;
    for i in period..closes.len() {
        previous = closes[i] * k + previous * (1.0 - k);
        out[i] = Some(previous);
    }
    out
}

/// Triple EMA: `3*EMA1 - 3*EMA2 + EMA3`, where each layer is an EMA of the
/// previous one. Defined once all three layers are.
#[must_use]
pub fn tema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let ema1 = ema(closes, period);
    let ema2 = ema_over(&ema1, period);
    let ema3 = ema_over(&ema2, period);

    ema1.iter()
        .zip(ema2.iter())
        .zip(ema3.iter())
        .map(|((first, second), third)| match (first, second, third) {
            (Some(a), Some(b), Some(c)) => Some(3.0 * a - 3.0 * b + c),
            _ => None,
        })
        .collect()
}

/// Relative Strength Index with Wilder smoothing; defined from index `period`.
///
/// The seed averages are simple means of the first `period` gains/losses; a
/// zero average loss clamps RSI to 100.
#[must_use]
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let period_f = period as f64;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..=period {
        let delta = closes[i] - closes[i - 1];
        gain_sum += delta.max(0.0);
        loss_sum += (-delta).max(0.0);
    }

    let mut avg_gain = gain_sum / period_f;
    let mut avg_loss = loss_sum / period_f;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for i in period + 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        avg_gain = (avg_gain * (period_f - 1.0) + delta.max(0.0)) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + (-delta).max(0.0)) / period_f;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Bollinger Bands around `SMA(period)` using population standard deviation.
/// Returns `(upper, lower)`, each defined from index `period - 1`.
#[must_use]
pub fn bollinger_bands(
    closes: &[f64],
    period: usize,
    multiplier: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut upper = vec![None; closes.len()];
    let mut lower = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return (upper, lower);
    }

    for i in period - 1..closes.len() {
        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance =
            window.iter().map(|close| (close - mean).powi(2)).sum::<f64>() / period as f64;
        let deviation = multiplier * variance.sqrt();
        upper[i] = Some(mean + deviation);
        lower[i] = Some(mean - deviation);
    }
    (upper, lower)
}

/// MACD line, signal line, and histogram. The line is defined where both the
/// fast and slow EMAs are; the signal is an EMA of the defined line region.
#[must_use]
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(fast_value, slow_value)| match (fast_value, slow_value) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal_line = ema_over(&line, signal);
    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(signal_line.iter())
        .map(|(line_value, signal_value)| match (line_value, signal_value) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    (line, signal_line, histogram)
}

/// Parabolic SAR in the standard Wilder formulation.
///
/// Trend is seeded from the first two closes; SAR is clamped so it never
/// penetrates the prior two bars' range; a reversal resets the acceleration
/// factor and restarts SAR from the prior extreme point. The first bar has no
/// SAR.
#[must_use]
pub fn parabolic_sar(points: &[StockDataPoint], step: f64, max_step: f64) -> Vec<Option<f64>> {
    let mut out = vec![None; points.len()];
    if points.len() < 2 {
        return out;
    }

    let mut uptrend = points[1].close > points[0].close;
    let mut sar = if uptrend {
        points[0].low
    } else {
        points[0].high
    };
    let mut extreme = if uptrend {
        points[0].high.max(points[1].high)
    } else {
        points[0].low.min(points[1].low)
    };
    let mut af = step;
    out[1] = Some(sar);

    for i in 2..points.len() {
        sar += af * (extreme - sar);

        // SAR may not penetrate the prior two bars' range.
        if uptrend {
            sar = sar.min(points[i - 1].low).min(points[i - 2].low);
        } else {
            sar = sar.max(points[i - 1].high).max(points[i - 2].high);
        }

        let reversed = if uptrend {
            points[i].low < sar
        } else {
            points[i].high > sar
        };

        if reversed {
            uptrend = !uptrend;
            sar = extreme;
            extreme = if uptrend {
                points[i].high
            } else {
                points[i].low
            };
            af = step;
        } else if uptrend && points[i].high > extreme {
            extreme = points[i].high;
            af = (af + step).min(max_step);
        } else if !uptrend && points[i].low < extreme {
            extreme = points[i].low;
            af = (af + step).min(max_step);
        }

        out[i] = Some(sar);
    }
    out
}

/// EMA over an already-partially-defined column.
///
/// Input columns produced by this module are `None` for a leading warm-up
/// prefix and defined contiguously afterwards; the EMA is computed over the
/// defined suffix and re-aligned to the original indices.
fn ema_over(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let Some(first_defined) = values.iter().position(Option::is_some) else {
        return out;
    };

    let defined: Vec<f64> = values[first_defined..]
        .iter()
        .take_while(|value| value.is_some())
        .flatten()
        .copied()
        .collect();

    for (offset, value) in ema(&defined, period).into_iter().enumerate() {
        out[first_defined + offset] = value;
    }
    out
}

/// All derived columns for one window, aligned index-for-index with it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnrichedWindow {
    pub sma: Vec<Option<f64>>,
    pub ema: Vec<Option<f64>>,
    pub tema: Vec<Option<f64>>,
    pub bollinger_upper: Vec<Option<f64>>,
    pub bollinger_lower: Vec<Option<f64>>,
    pub psar: Vec<Option<f64>>,
    pub macd_line: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
}

impl EnrichedWindow {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }
}

/// Derives every indicator column for `window`, honoring provider precedence:
/// a finite value already present on a bar is kept verbatim, the engine only
/// fills gaps.
#[must_use]
pub fn enrich(window: &[StockDataPoint], config: &IndicatorConfig) -> EnrichedWindow {
    let closes: Vec<f64> = window.iter().map(|point| point.close).collect();

    let sma_period = window_period(config, IndicatorKind::Sma);
    let ema_period = window_period(config, IndicatorKind::Ema);
    let tema_period = window_period(config, IndicatorKind::Tema);
    let rsi_period = window_period(config, IndicatorKind::Rsi);
    let (bollinger_period, bollinger_multiplier) =
        match config.params(IndicatorKind::BollingerBands) {
            IndicatorParams::Bollinger { period, multiplier } => (period, multiplier),
            _ => (20, 2.0),
        };
    let (macd_fast, macd_slow, macd_signal_period) = match config.params(IndicatorKind::Macd) {
        IndicatorParams::Macd { fast, slow, signal } => (fast, slow, signal),
        _ => (12, 26, 9),
    };
    let (psar_step, psar_max) = match config.params(IndicatorKind::ParabolicSar) {
        IndicatorParams::ParabolicSar { step, max_step } => (step, max_step),
        _ => (0.02, 0.2),
    };

    let (bollinger_upper, bollinger_lower) =
        bollinger_bands(&closes, bollinger_period, bollinger_multiplier);
    let (macd_line, macd_signal, macd_histogram) =
        macd(&closes, macd_fast, macd_slow, macd_signal_period);

    trace!(bars = window.len(), "enriched indicator window");

    EnrichedWindow {
        sma: merge_supplied(window, |point| point.sma, sma(&closes, sma_period)),
        ema: merge_supplied(window, |point| point.ema, ema(&closes, ema_period)),
        tema: merge_supplied(window, |point| point.tema, tema(&closes, tema_period)),
        bollinger_upper: merge_supplied(window, |point| point.bollinger_upper, bollinger_upper),
        bollinger_lower: merge_supplied(window, |point| point.bollinger_lower, bollinger_lower),
        psar: merge_supplied(
            window,
            |point| point.psar,
            parabolic_sar(window, psar_step, psar_max),
        ),
        macd_line: merge_supplied(window, |point| point.macd_macd, macd_line),
        macd_signal: merge_supplied(window, |point| point.macd_signal, macd_signal),
        macd_histogram: merge_supplied(window, |point| point.macd_histogram, macd_histogram),
        rsi: merge_supplied(window, |point| point.rsi, rsi(&closes, rsi_period)),
    }
}

fn window_period(config: &IndicatorConfig, kind: IndicatorKind) -> usize {
    match config.params(kind) {
        IndicatorParams::Window { period } => period,
        _ => match IndicatorParams::default_for(kind) {
            IndicatorParams::Window { period } => period,
            _ => 14,
        },
    }
}

/// Provider precedence for one column: keep finite supplied values verbatim,
/// fall back to the computed value otherwise.
fn merge_supplied(
    window: &[StockDataPoint],
    supplied: impl Fn(&StockDataPoint) -> Option<f64>,
    computed: Vec<Option<f64>>,
) -> Vec<Option<f64>> {
    window
        .iter()
        .zip(computed)
        .map(|(point, derived)| match supplied(point) {
            Some(value) if value.is_finite() => Some(value),
            _ => derived,
        })
        .collect()
}
