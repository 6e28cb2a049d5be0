//! Grouped bar charts: one group per x value (time step), one bar per
//! series within each group.

use std::path::Path;

use anyhow::Result;
use itertools::Itertools;
use plotters::prelude::IntoLogRange;
use plotters::prelude::*;

use crate::render::RenderError;

use super::{ChartOpts, PlotSeries, finish_pdf, format_tick, pdf_root, series_color};

/// Fraction of the space per group that the bars take up.
const GROUP_WIDTH: f64 = 0.8;

/// The distinct x values of all series, ascending; each becomes a bar
/// group.
fn group_keys(series: &[PlotSeries]) -> Vec<f64> {
    series
        .iter()
        .flat_map(|s| s.points.iter().map(|(x, _)| *x))
        .sorted_by(f64::total_cmp)
        .dedup()
        .collect()
}

/// Bars as `(series index, [left-bottom, right-top])` in chart
/// coordinates, where group `i` is centered on x = `i`.
fn bar_rects(series: &[PlotSeries], groups: &[f64], y_base: f64) -> Vec<(usize, [(f64, f64); 2])> {
    let bar_width = GROUP_WIDTH / series.len().max(1) as f64;
    let mut rects = Vec::new();
    for (j, PlotSeries { label: _, points }) in series.iter().enumerate() {
        for (x, y) in points {
            if let Ok(i) = groups.binary_search_by(|g| g.total_cmp(x)) {
                let x0 = i as f64 - GROUP_WIDTH / 2. + j as f64 * bar_width;
                rects.push((j, [(x0, y_base), (x0 + bar_width, *y)]));
            }
        }
    }
    rects
}

macro_rules! draw_bar_chart {
    { $root:expr, $opts:expr, $series:expr, $groups:expr, $y_range:expr, $y_base:expr } => {{
        let opts: &ChartOpts = $opts;
        let series: &[PlotSeries] = $series;
        let groups: &[f64] = $groups;
        let mut chart = ChartBuilder::on($root)
            .caption(&opts.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(65)
            .build_cartesian_2d(-0.5..(groups.len() as f64 - 0.5), $y_range)?;

        // Ticks are only labeled where they hit a group center
        let x_formatter = |v: &f64| {
            let i = v.round();
            if (v - i).abs() < 1e-6 && i >= 0. && (i as usize) < groups.len() {
                format_tick(groups[i as usize])
            } else {
                String::new()
            }
        };
        let y_formatter = |v: &f64| format_tick(*v);
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .x_labels(groups.len().min(25))
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .label_style(("sans-serif", 15));
        if let Some(x_label) = &opts.x_label {
            mesh.x_desc(x_label.as_str());
        }
        if let Some(y_label) = &opts.y_label {
            mesh.y_desc(y_label.as_str());
        }
        mesh.draw()?;

        let with_legend = series.len() > 1 || opts.legend_title.is_some();
        if with_legend {
            if let Some(legend_title) = &opts.legend_title {
                chart
                    .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
                    .label(legend_title.as_str())
                    .legend(|(x, y)| EmptyElement::at((x, y)));
            }
        }

        let rects = bar_rects(series, groups, $y_base);
        for (j, PlotSeries { label, points: _ }) in series.iter().enumerate() {
            let color = series_color(j);
            let drawn = chart.draw_series(
                rects
                    .iter()
                    .filter(|(series_index, [_, (_, y)])| {
                        *series_index == j && (!opts.log_y || *y > 0.)
                    })
                    .map(|(_, corners)| Rectangle::new(*corners, color.filled())),
            )?;
            if with_legend {
                drawn.label(label.as_str()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
            }
        }

        if with_legend {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .label_font(("sans-serif", 14))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
    }}
}

/// Render `series` as a grouped bar chart into a PDF file at
/// `output`. `opts.x_min` does not apply, groups are categorical.
pub fn render_bar_chart(series: &[PlotSeries], opts: &ChartOpts, output: &Path) -> Result<()> {
    let groups = group_keys(series);
    if groups.is_empty() {
        return Err(RenderError::NoData.into());
    }
    let y_range = opts.y_range(series.iter().flat_map(|s| s.points.iter().map(|(_, y)| *y)));
    let y_base = y_range.start;

    let root = pdf_root(output)?;
    if opts.log_y {
        draw_bar_chart!(&root, opts, series, &groups, y_range.log_scale(), y_base);
    } else {
        draw_bar_chart!(&root, opts, series, &groups, y_range, y_base);
    }
    finish_pdf(root, output)
}

#[cfg(test)]
mod tests {
    use kstring::KString;

    use super::*;

    fn series() -> Vec<PlotSeries> {
        vec![
            PlotSeries {
                label: KString::from_static("M1"),
                points: vec![(600., 2.), (0., 1.)],
            },
            PlotSeries {
                label: KString::from_static("M2"),
                points: vec![(600., 4.)],
            },
        ]
    }

    #[test]
    fn t_group_keys() {
        assert_eq!(group_keys(&series()), vec![0., 600.]);
    }

    #[test]
    fn t_bar_rects() {
        let s = series();
        let rects = bar_rects(&s, &group_keys(&s), 0.);
        assert_eq!(rects.len(), 3);
        // M1 at time 600 is the left half of group 1
        let (j, [(x0, y0), (x1, y1)]) = rects[0];
        assert_eq!(j, 0);
        assert!((x0 - 0.6).abs() < 1e-9);
        assert!((x1 - 1.0).abs() < 1e-9);
        assert_eq!((y0, y1), (0., 2.));
        // M2 is the right half
        let (j, [(x0, _), _]) = rects[2];
        assert_eq!(j, 1);
        assert!((x0 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn t_bar_chart_written() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bars.pdf");
        let mut opts = ChartOpts::new("Message Copy Count");
        opts.legend_title = Some("MessageName".into());
        render_bar_chart(&series(), &opts, &path)?;
        let doc = std::fs::read_to_string(&path)?;
        assert!(doc.contains("(MessageName) Tj"));
        assert!(doc.contains(" re f"));
        Ok(())
    }
}
