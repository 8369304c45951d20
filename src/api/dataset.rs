use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::indicators::{self, EnrichedWindow};
use crate::core::types::{IndicatorConfig, IndicatorKind, StockDataPoint};
use crate::error::{ChartError, ChartResult};

/// One of the three chart surfaces. Redraw cycles always touch panels in
/// `Panel::ALL` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Price,
    Macd,
    Rsi,
}

impl Panel {
    pub const ALL: [Self; 3] = [Self::Price, Self::Macd, Self::Rsi];
}

/// Identity of one emitted series within a panel dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Close,
    Sma,
    Ema,
    Tema,
    BollingerUpper,
    BollingerLower,
    ParabolicSar,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    Rsi,
    RsiOversold,
    RsiOverbought,
}

impl SeriesKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Tema => "tema",
            Self::BollingerUpper => "bollinger_upper",
            Self::BollingerLower => "bollinger_lower",
            Self::ParabolicSar => "psar",
            Self::MacdLine => "macd",
            Self::MacdSignal => "macd_signal",
            Self::MacdHistogram => "macd_histogram",
            Self::Rsi => "rsi",
            Self::RsiOversold => "rsi_oversold",
            Self::RsiOverbought => "rsi_overbought",
        }
    }
}

/// Visual channel a series is drawn through. Concrete styling is the
/// rendering backend's concern; the channel only classifies the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesChannel {
    Line,
    Band,
    Marker,
    Histogram,
    Threshold,
}

/// Vertical axis a series is scaled against. `Right` is reserved for
/// ratio-denominated series; the options descriptor declares a secondary axis
/// when any emitted series uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueAxis {
    Left,
    Right,
}

/// One aligned series: exactly one value (possibly `None`) per time label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub kind: SeriesKind,
    pub channel: SeriesChannel,
    pub axis: ValueAxis,
    pub values: Vec<Option<f64>>,
}

impl SeriesSpec {
    fn line(kind: SeriesKind, values: Vec<Option<f64>>) -> Self {
        Self {
            kind,
            channel: SeriesChannel::Line,
            axis: ValueAxis::Left,
            values,
        }
    }
}

/// Raw candlestick values for the price panel, one per time label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub time: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&StockDataPoint> for OhlcBar {
    fn from(point: &StockDataPoint) -> Self {
        Self {
            time: point.time,
            open: point.open,
            high: point.high,
            low: point.low,
            close: point.close,
        }
    }
}

/// Declarative per-panel dataset handed to the rendering backend.
///
/// Every series carries exactly one value per entry of `labels`, so the
/// backend can overlay them without re-indexing. The price panel additionally
/// carries one OHLC bar per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub panel: Panel,
    pub labels: Vec<NaiveDate>,
    pub bars: Vec<OhlcBar>,
    pub series: Vec<SeriesSpec>,
}

impl Dataset {
    /// Builds the dataset for `panel` from a windowed series, enriching the
    /// window on the fly. Prefer [`Dataset::build_with`] when the enriched
    /// columns are shared across panels.
    #[must_use]
    pub fn build(panel: Panel, window: &[StockDataPoint], config: &IndicatorConfig) -> Self {
        let enriched = indicators::enrich(window, config);
        Self::build_with(panel, window, &enriched, config)
    }

    /// Builds the dataset for `panel` from an already-enriched window.
    #[must_use]
    pub fn build_with(
        panel: Panel,
        window: &[StockDataPoint],
        enriched: &EnrichedWindow,
        config: &IndicatorConfig,
    ) -> Self {
        let labels: Vec<NaiveDate> = window.iter().map(|point| point.time).collect();

        match panel {
            Panel::Price => {
                let bars: Vec<OhlcBar> = window.iter().map(OhlcBar::from).collect();
                let mut series = vec![SeriesSpec::line(
                    SeriesKind::Close,
                    window.iter().map(|point| Some(point.close)).collect(),
                )];

                for kind in config.enabled_overlays() {
                    match kind {
                        IndicatorKind::Sma => {
                            series.push(SeriesSpec::line(SeriesKind::Sma, enriched.sma.clone()));
                        }
                        IndicatorKind::Ema => {
                            series.push(SeriesSpec::line(SeriesKind::Ema, enriched.ema.clone()));
                        }
                        IndicatorKind::Tema => {
                            series.push(SeriesSpec::line(SeriesKind::Tema, enriched.tema.clone()));
                        }
                        IndicatorKind::BollingerBands => {
                            series.push(SeriesSpec {
                                kind: SeriesKind::BollingerUpper,
                                channel: SeriesChannel::Band,
                                axis: ValueAxis::Left,
                                values: enriched.bollinger_upper.clone(),
                            });
                            series.push(SeriesSpec {
                                kind: SeriesKind::BollingerLower,
                                channel: SeriesChannel::Band,
                                axis: ValueAxis::Left,
                                values: enriched.bollinger_lower.clone(),
                            });
                        }
                        IndicatorKind::ParabolicSar => {
                            series.push(SeriesSpec {
                                kind: SeriesKind::ParabolicSar,
                                channel: SeriesChannel::Marker,
                                axis: ValueAxis::Left,
                                values: enriched.psar.clone(),
                            });
                        }
                        // Not overlays; filtered out by enabled_overlays.
                        IndicatorKind::Macd | IndicatorKind::Rsi => {}
                    }
                }

                Self {
                    panel,
                    labels,
                    bars,
                    series,
                }
            }
            Panel::Macd => Self {
                panel,
                labels,
                bars: Vec::new(),
                series: vec![
                    SeriesSpec::line(SeriesKind::MacdLine, enriched.macd_line.clone()),
                    SeriesSpec::line(SeriesKind::MacdSignal, enriched.macd_signal.clone()),
                    SeriesSpec {
                        kind: SeriesKind::MacdHistogram,
                        channel: SeriesChannel::Histogram,
                        axis: ValueAxis::Left,
                        values: enriched.macd_histogram.clone(),
                    },
                ],
            },
            Panel::Rsi => {
                let len = labels.len();
                Self {
                    panel,
                    labels,
                    bars: Vec::new(),
                    series: vec![
                        SeriesSpec::line(SeriesKind::Rsi, enriched.rsi.clone()),
                        threshold(SeriesKind::RsiOversold, 30.0, len),
                        threshold(SeriesKind::RsiOverbought, 70.0, len),
                    ],
                }
            }
        }
    }

    /// Checks the alignment invariant: one value per label in every series,
    /// and one bar per label on the price panel.
    pub fn validate(&self) -> ChartResult<()> {
        let expected = self.labels.len();
        if self.panel == Panel::Price && self.bars.len() != expected {
            return Err(ChartError::InvalidData(format!(
                "price panel has {} bars for {} labels",
                self.bars.len(),
                expected
            )));
        }
        for series in &self.series {
            if series.values.len() != expected {
                return Err(ChartError::InvalidData(format!(
                    "series {} has {} values for {} labels",
                    series.kind.label(),
                    series.values.len(),
                    expected
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn series_of(&self, kind: SeriesKind) -> Option<&SeriesSpec> {
        self.series.iter().find(|series| series.kind == kind)
    }

    /// Whether any emitted series is scaled against the secondary axis.
    #[must_use]
    pub fn uses_secondary_axis(&self) -> bool {
        self.series
            .iter()
            .any(|series| series.axis == ValueAxis::Right)
    }
}

fn threshold(kind: SeriesKind, level: f64, len: usize) -> SeriesSpec {
    SeriesSpec {
        kind,
        channel: SeriesChannel::Threshold,
        axis: ValueAxis::Left,
        values: vec![Some(level); len],
    }
}
