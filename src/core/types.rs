use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// One trading day of OHLCV data plus any indicator values the data provider
/// already computed.
///
/// Supplied indicator fields take precedence over engine-derived values;
/// `None` means "derive it". Non-finite supplied values are treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockDataPoint {
    pub time: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,

    #[serde(default)]
    pub macd_macd: Option<f64>,
    #[serde(default)]
    pub macd_signal: Option<f64>,
    #[serde(default)]
    pub macd_histogram: Option<f64>,
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub sma: Option<f64>,
    #[serde(default)]
    pub ema: Option<f64>,
    #[serde(default)]
    pub tema: Option<f64>,
    #[serde(default)]
    pub bollinger_upper: Option<f64>,
    #[serde(default)]
    pub bollinger_lower: Option<f64>,
    #[serde(default)]
    pub psar: Option<f64>,
}

impl StockDataPoint {
    #[must_use]
    pub fn new(time: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            macd_macd: None,
            macd_signal: None,
            macd_histogram: None,
            rsi: None,
            sma: None,
            ema: None,
            tema: None,
            bollinger_upper: None,
            bollinger_lower: None,
            psar: None,
        }
    }

    /// Builds a bar from decimal prices as delivered by a data provider.
    pub fn from_decimal_prices(
        time: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> ChartResult<Self> {
        Ok(Self::new(
            time,
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            volume,
        ))
    }

    #[must_use]
    pub fn has_valid_prices(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite();
        finite
            && self.low > 0.0
            && self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
    }
}

/// Indicator identity used for configuration, toggling, and dataset labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Tema,
    BollingerBands,
    ParabolicSar,
    Macd,
    Rsi,
}

impl IndicatorKind {
    pub const ALL: [Self; 7] = [
        Self::Sma,
        Self::Ema,
        Self::Tema,
        Self::BollingerBands,
        Self::ParabolicSar,
        Self::Macd,
        Self::Rsi,
    ];

    /// Indicators that can be toggled as price-panel overlays.
    /// MACD and RSI live on dedicated panels and are always drawn there.
    #[must_use]
    pub const fn is_overlay(self) -> bool {
        matches!(
            self,
            Self::Sma | Self::Ema | Self::Tema | Self::BollingerBands | Self::ParabolicSar
        )
    }
}

/// Parameters for one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorParams {
    /// Single lookback window (SMA, EMA, TEMA, RSI).
    Window { period: usize },
    Bollinger { period: usize, multiplier: f64 },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    ParabolicSar { step: f64, max_step: f64 },
}

impl IndicatorParams {
    /// Conventional defaults: 25-day moving averages, RSI 14, Bollinger 20/2,
    /// MACD 12/26/9, PSAR 0.02/0.2.
    #[must_use]
    pub const fn default_for(kind: IndicatorKind) -> Self {
        match kind {
            IndicatorKind::Sma | IndicatorKind::Ema | IndicatorKind::Tema => {
                Self::Window { period: 25 }
            }
            IndicatorKind::Rsi => Self::Window { period: 14 },
            IndicatorKind::BollingerBands => Self::Bollinger {
                period: 20,
                multiplier: 2.0,
            },
            IndicatorKind::Macd => Self::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            IndicatorKind::ParabolicSar => Self::ParabolicSar {
                step: 0.02,
                max_step: 0.2,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub enabled: bool,
    pub params: IndicatorParams,
}

/// Per-indicator enablement and parameters.
///
/// All toggleable overlays start disabled; MACD/RSI panel indicators carry
/// parameters here but are not subject to the enabled flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    entries: IndexMap<IndicatorKind, IndicatorSettings>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        let mut entries = IndexMap::with_capacity(IndicatorKind::ALL.len());
        for kind in IndicatorKind::ALL {
            entries.insert(
                kind,
                IndicatorSettings {
                    enabled: false,
                    params: IndicatorParams::default_for(kind),
                },
            );
        }
        Self { entries }
    }
}

impl IndicatorConfig {
    #[must_use]
    pub fn enabled(&self, kind: IndicatorKind) -> bool {
        self.entries.get(&kind).is_some_and(|entry| entry.enabled)
    }

    pub fn set_enabled(&mut self, kind: IndicatorKind, enabled: bool) {
        self.entry_mut(kind).enabled = enabled;
    }

    #[must_use]
    pub fn params(&self, kind: IndicatorKind) -> IndicatorParams {
        self.entries
            .get(&kind)
            .map_or_else(|| IndicatorParams::default_for(kind), |entry| entry.params)
    }

    pub fn set_params(&mut self, kind: IndicatorKind, params: IndicatorParams) {
        self.entry_mut(kind).params = params;
    }

    /// Enabled overlay indicators in configuration order.
    pub fn enabled_overlays(&self) -> impl Iterator<Item = IndicatorKind> + '_ {
        self.entries
            .iter()
            .filter(|(kind, entry)| kind.is_overlay() && entry.enabled)
            .map(|(kind, _)| *kind)
    }

    fn entry_mut(&mut self, kind: IndicatorKind) -> &mut IndicatorSettings {
        self.entries.entry(kind).or_insert(IndicatorSettings {
            enabled: false,
            params: IndicatorParams::default_for(kind),
        })
    }
}
