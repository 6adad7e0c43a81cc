use super::{Measure, SeriesTable};
use crate::error::DashboardError;
use crate::utils::{min_and_max, padded_range, suitable_xfmt};
use crate::view::{to_long, LongRow};
use log::info;
use plotly::common::{Mode, Title};
use plotly::layout::{Axis, HoverMode, Layout, Legend};
use plotly::{Plot, Scatter};
use plotters::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const XKCD_FONT: &str = "Comic Sans MS";
const XKCD_BACKGROUND: RGBColor = RGBColor(253, 250, 240);
const XKCD_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Interactive,
    Static,
}

impl ChartStyle {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartStyle::Interactive => "html",
            ChartStyle::Static => "svg",
        }
    }

    pub fn renderer(&self) -> Box<dyn ChartRenderer> {
        match self {
            ChartStyle::Interactive => Box::new(PlotlyRenderer),
            ChartStyle::Static => Box::new(XkcdRenderer),
        }
    }
}

impl fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChartStyle::Interactive => write!(f, "interactive"),
            ChartStyle::Static => write!(f, "static"),
        }
    }
}

impl FromStr for ChartStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interactive" | "plotly" => Ok(ChartStyle::Interactive),
            "static" | "xkcd" => Ok(ChartStyle::Static),
            other => Err(format!("unknown chart style: {}", other)),
        }
    }
}

/// Draw the selected measures of a (filtered, possibly normalized) table to a file.
/// Measures whose column is absent are skipped.
pub trait ChartRenderer {
    fn render(
        &self,
        table: &SeriesTable,
        measures: &[Measure],
        normalized: bool,
        fout: &Path,
    ) -> Result<(), DashboardError>;
}

pub fn y_label(normalized: bool) -> &'static str {
    if normalized {
        "Indice (base 100)"
    } else {
        "Taux / Prix (€)"
    }
}

pub fn chart_path(outdir: &Path, stem: &str, style: ChartStyle) -> PathBuf {
    outdir.join(format!("{}.{}", stem, style.extension()))
}

/// Self-contained html with one line+marker trace per measure.
pub struct PlotlyRenderer;

/// Build the plotly figure from the long layout of the table.
pub fn interactive_plot(table: &SeriesTable, measures: &[Measure], normalized: bool) -> Plot {
    let long: Vec<LongRow> = to_long(table, measures, normalized);
    let mut plot = Plot::new();
    for m in measures.iter() {
        let (x, y): (Vec<String>, Vec<f64>) = long
            .iter()
            .filter(|r| r.series == m.label())
            .map(|r| (r.date.format("%Y-%m-%d").to_string(), r.value))
            .unzip();
        if x.is_empty() {
            continue;
        }
        let trace = Scatter::new(x, y)
            .name(m.label())
            .mode(Mode::LinesMarkers);
        plot.add_trace(trace);
    }
    let title = if normalized {
        "Évolution des indices et du SP95 (base 100)"
    } else {
        "Évolution des indices et du SP95"
    };
    let layout = Layout::new()
        .title(Title::new(title))
        .x_axis(Axis::new().title(Title::new("Date")))
        .y_axis(Axis::new().title(Title::new(y_label(normalized))))
        .legend(Legend::new().title(Title::new("Courbes")))
        .hover_mode(HoverMode::XUnified);
    plot.set_layout(layout);
    plot
}

impl ChartRenderer for PlotlyRenderer {
    fn render(
        &self,
        table: &SeriesTable,
        measures: &[Measure],
        normalized: bool,
        fout: &Path,
    ) -> Result<(), DashboardError> {
        let plot = interactive_plot(table, measures, normalized);
        std::fs::write(fout, plot.to_html()).map_err(|e| DashboardError::render(fout, e))?;
        info!("interactive chart written to {:?}", fout);
        Ok(())
    }
}

/// Svg line chart with a hand-drawn look, plotted straight from the wide table.
pub struct XkcdRenderer;

/// The columns the static chart draws, in selection order.
pub fn static_series<'a>(
    table: &'a SeriesTable,
    measures: &[Measure],
    normalized: bool,
) -> Vec<(Measure, &'a [f64])> {
    measures
        .iter()
        .filter_map(|m| table.column(&m.plot_column(normalized)).map(|v| (*m, v)))
        .collect()
}

impl ChartRenderer for XkcdRenderer {
    fn render(
        &self,
        table: &SeriesTable,
        measures: &[Measure],
        normalized: bool,
        fout: &Path,
    ) -> Result<(), DashboardError> {
        let series = static_series(table, measures, normalized);
        let yrange = min_and_max(series.iter().flat_map(|(_, v)| v.iter()));
        let (ymin, ymax) = match yrange {
            Some((ymin, ymax)) if !table.is_empty() => padded_range(ymin, ymax),
            _ => {
                std::fs::write(fout, placeholder_svg("Aucune donnée pour cette sélection"))
                    .map_err(|e| DashboardError::render(fout, e))?;
                info!("nothing to plot, placeholder written to {:?}", fout);
                return Ok(());
            }
        };
        let n = table.len();
        let xfmt = suitable_xfmt(table.time[n - 1] - table.time[0]);
        let title = if normalized {
            "Évolution style XKCD (base 100)"
        } else {
            "Évolution style XKCD"
        };

        let root = SVGBackend::new(fout, (1200, 500)).into_drawing_area();
        root.fill(&XKCD_BACKGROUND).map_err(|e| DashboardError::render(fout, e))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, (XKCD_FONT, 28))
            .margin(30)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(0..n, ymin..ymax)
            .map_err(|e| DashboardError::render(fout, e))?;
        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .bold_line_style(BLACK.mix(0.15).stroke_width(1))
            .axis_style(BLACK.stroke_width(3))
            .label_style((XKCD_FONT, 16))
            .x_desc("Date")
            .y_desc(y_label(normalized))
            .x_labels(n.min(12))
            .y_labels(8)
            .x_label_formatter(&|i: &usize| {
                table
                    .time
                    .get(*i)
                    .map(|t| t.format(xfmt).to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|y: &f64| format!("{:.2}", y))
            .draw()
            .map_err(|e| DashboardError::render(fout, e))?;

        for (k, (m, values)) in series.iter().enumerate() {
            let color = XKCD_COLORS[k % XKCD_COLORS.len()];
            chart
                .draw_series(LineSeries::new(
                    values.iter().enumerate().map(|(i, y)| (i, *y)),
                    color.stroke_width(3),
                ))
                .map_err(|e| DashboardError::render(fout, e))?
                .label(m.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
        }
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((XKCD_FONT, 16))
            .draw()
            .map_err(|e| DashboardError::render(fout, e))?;
        root.present().map_err(|e| DashboardError::render(fout, e))?;
        info!("static chart written to {:?}", fout);
        Ok(())
    }
}

fn escape_markup(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn placeholder_svg(message: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1200\" height=\"500\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"#fdfaf0\"/>\n\
         <text x=\"600\" y=\"250\" text-anchor=\"middle\" font-size=\"24\">{}</text>\n\
         </svg>\n",
        escape_markup(message)
    )
}

/// Put an explicit error indicator where the chart would be,
/// so that no stale chart is left behind.
pub fn render_error(style: ChartStyle, fout: &Path, err: &DashboardError) -> Result<(), DashboardError> {
    let message = format!("Erreur : {}", err);
    let doc = match style {
        ChartStyle::Interactive => format!(
            "<!DOCTYPE html>\n<html lang=\"fr\">\n<head><meta charset=\"utf-8\"><title>Erreur</title></head>\n\
             <body>\n<div role=\"alert\" style=\"color:#b00020;font-family:sans-serif;padding:2em\">\n\
             <h2>Graphique indisponible</h2>\n<p>{}</p>\n</div>\n</body>\n</html>\n",
            escape_markup(&message)
        ),
        ChartStyle::Static => placeholder_svg(&message),
    };
    std::fs::write(fout, doc).map_err(|e| DashboardError::render(fout, e))
}
