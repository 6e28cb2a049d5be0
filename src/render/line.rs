//! Line charts: one line with point markers per series.

use std::path::Path;

use anyhow::Result;
use plotters::prelude::IntoLogRange;
use plotters::prelude::*;

use crate::{debug, render::RenderError};

use super::{ChartOpts, PlotSeries, finish_pdf, format_tick, pdf_root, series_color};

const MARKER_SIZE: i32 = 3;

// The chart coordinate type differs between linear and log y axes,
// thus the drawing code is instantiated per axis kind.
macro_rules! draw_line_chart {
    { $root:expr, $opts:expr, $series:expr, $x_range:expr, $y_range:expr } => {{
        let opts: &ChartOpts = $opts;
        let series: &[PlotSeries] = $series;
        let mut chart = ChartBuilder::on($root)
            .caption(&opts.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(65)
            .build_cartesian_2d($x_range, $y_range)?;

        let tick_formatter = |v: &f64| format_tick(*v);
        let mut mesh = chart.configure_mesh();
        mesh.x_label_formatter(&tick_formatter)
            .y_label_formatter(&tick_formatter)
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
                // Empty series, so that the title heads the legend
                chart
                    .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
                    .label(legend_title.as_str())
                    .legend(|(x, y)| EmptyElement::at((x, y)));
            }
        }

        for (i, PlotSeries { label, points }) in series.iter().enumerate() {
            let color = series_color(i);
            let visible = points
                .iter()
                .copied()
                .filter(|(_, y)| !opts.log_y || *y > 0.)
                .collect::<Vec<_>>();
            let drawn = chart.draw_series(LineSeries::new(
                visible.iter().copied(),
                color.stroke_width(2),
            ))?;
            if with_legend {
                drawn.label(label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
            chart.draw_series(
                visible
                    .iter()
                    .map(|point| Circle::new(*point, MARKER_SIZE, color.filled())),
            )?;
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

/// Render `series` as a line chart into a PDF file at `output`.
pub fn render_line_chart(series: &[PlotSeries], opts: &ChartOpts, output: &Path) -> Result<()> {
    let all_points = || series.iter().flat_map(|s| s.points.iter().copied());
    if all_points().next().is_none() {
        return Err(RenderError::NoData.into());
    }

    let x_max = all_points().map(|(x, _)| x).fold(f64::NAN, f64::max);
    let x_range = opts.x_min..if x_max > opts.x_min {
        x_max + (x_max - opts.x_min) * 0.02
    } else {
        opts.x_min + 1.
    };
    let y_range = opts.y_range(all_points().map(|(_, y)| y));
    debug!("line chart ranges x: {x_range:?}, y: {y_range:?}, log_y: {}", opts.log_y);

    let root = pdf_root(output)?;
    if opts.log_y {
        draw_line_chart!(&root, opts, series, x_range, y_range.log_scale());
    } else {
        draw_line_chart!(&root, opts, series, x_range, y_range);
    }
    finish_pdf(root, output)
}

#[cfg(test)]
mod tests {
    use kstring::KString;

    use super::*;

    fn two_series() -> Vec<PlotSeries> {
        vec![
            PlotSeries {
                label: KString::from_static("M1"),
                points: vec![(0., 1.), (600., 3.), (1200., 4.)],
            },
            PlotSeries {
                label: KString::from_static("M2"),
                points: vec![(600., 0.), (1200., 2.)],
            },
        ]
    }

    #[test]
    fn t_line_chart_written() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lines.pdf");
        let mut opts = ChartOpts::new("Message Copy Count");
        opts.x_label = Some("Time".into());
        opts.y_label = Some("CopyCount".into());
        opts.legend_title = Some("MessageName".into());
        render_line_chart(&two_series(), &opts, &path)?;
        let doc = std::fs::read_to_string(&path)?;
        assert!(doc.starts_with("%PDF-1.4"));
        assert!(doc.contains("(Message Copy Count) Tj"));
        assert!(doc.contains("(MessageName) Tj"));
        assert!(doc.contains("(M2) Tj"));
        Ok(())
    }

    #[test]
    fn t_log_scale_with_zero_values() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("log.pdf");
        let mut opts = ChartOpts::new("log");
        opts.log_y = true;
        render_line_chart(&two_series(), &opts, &path)?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn t_no_data() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty.pdf");
        let err = render_line_chart(&[], &ChartOpts::new("empty"), &path).unwrap_err();
        assert_eq!(err.downcast_ref::<RenderError>(), Some(&RenderError::NoData));
        assert!(!path.exists());
        Ok(())
    }
}
