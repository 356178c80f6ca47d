// =============================================================================
// Chart Renderer — price table + indicator selection → Plotly figure
// =============================================================================
//
// `render` is pure: one line trace per selected indicator, in selection order,
// all sharing the same x axis (the series' trading dates). The output
// serializes straight into the `{ data, layout }` shape Plotly.js expects, so
// the page hands it to `Plotly.react` untouched.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::market_data::PriceSeries;
use crate::types::Indicator;

pub const CHART_TITLE: &str = "Stock Analysis and Visualization Suite:";
pub const X_AXIS_TITLE: &str = "Date";
pub const Y_AXIS_TITLE: &str = "Price";

// =============================================================================
// Figure model
// =============================================================================

/// One plotted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
    pub xaxis: String,
    pub yaxis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<AxisTitle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<AxisTitle>,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

/// A complete figure: traces plus layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    /// Bare figure with no traces and no titles.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    pub fn trace_names(&self) -> Vec<&str> {
        self.data.iter().map(|t| t.name.as_str()).collect()
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Build the figure for `series` with one trace per entry of `indicators`.
///
/// Neither an empty selection nor an empty series is an error: the result is
/// still a titled figure, with no traces or with traces of zero points.
pub fn render(series: &PriceSeries, indicators: &[Indicator]) -> ChartSpec {
    let dates = series.dates();

    let data = indicators
        .iter()
        .map(|&indicator| Trace {
            kind: "scatter".to_string(),
            mode: "lines".to_string(),
            name: indicator.to_string(),
            x: dates.clone(),
            y: series.column(indicator),
            xaxis: "x".to_string(),
            yaxis: "y".to_string(),
        })
        .collect();

    ChartSpec {
        data,
        layout: Layout {
            title: Some(AxisTitle {
                text: CHART_TITLE.to_string(),
            }),
            xaxis: Axis {
                title: Some(AxisTitle {
                    text: X_AXIS_TITLE.to_string(),
                }),
            },
            yaxis: Axis {
                title: Some(AxisTitle {
                    text: Y_AXIS_TITLE.to_string(),
                }),
            },
        },
    }
}
