//! Rendering of parsed report data into PDF charts.

use std::{ops::Range, path::Path};

use anyhow::Result;
use kstring::KString;
use plotters::{coord::Shift, prelude::*};

use self::pdf_backend::PdfBackend;

pub mod bar;
pub mod line;
pub mod pdf_backend;
pub mod pie;

/// 8x6 inches, in PDF points.
pub const PAGE_SIZE: (f64, f64) = (8. * 72., 6. * 72.);

/// Drawing resolution; `plotters` font sizes and stroke widths are
/// relative to this.
pub const CANVAS_SIZE: (u32, u32) = (800, 600);

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RenderError {
    #[error("number of labels ({labels}) does not match the number of values ({values})")]
    LabelValueMismatch { labels: usize, values: usize },
    #[error("nothing to plot: all values are zero")]
    AllZero,
    #[error("nothing to plot: no data points")]
    NoData,
}

/// A named sequence of points, one line or one bar color.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: KString,
    pub points: Vec<(f64, f64)>,
}

/// Labeling and axis options shared by the line and bar charts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOpts {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub legend_title: Option<String>,
    pub x_min: f64,
    pub y_min: f64,
    pub log_y: bool,
}

impl ChartOpts {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: None,
            y_label: None,
            legend_title: None,
            x_min: 0.,
            y_min: 0.,
            log_y: false,
        }
    }

    /// The y axis range covering all `values`, starting at `y_min`
    /// (linear) or at the smallest positive value (log scale, where
    /// zero can't be shown).
    pub fn y_range(&self, values: impl Iterator<Item = f64> + Clone) -> Range<f64> {
        let max = values.clone().fold(f64::NAN, f64::max);
        if self.log_y {
            let lower = if self.y_min > 0. {
                self.y_min
            } else {
                let min_pos = values.filter(|v| *v > 0.).fold(f64::NAN, f64::min);
                if min_pos.is_nan() { 1. } else { min_pos * 0.8 }
            };
            let upper = if max.is_nan() || max <= lower {
                lower * 10.
            } else {
                max * 1.25
            };
            lower..upper
        } else {
            let upper = if max.is_nan() || max <= self.y_min {
                self.y_min + 1.
            } else {
                self.y_min + (max - self.y_min) * 1.05
            };
            self.y_min..upper
        }
    }
}

/// Colors for series, in legend order.
pub fn series_color(index: usize) -> RGBAColor {
    Palette99::pick(index).to_rgba()
}

/// Format axis tick values without spurious decimals.
pub fn format_tick(v: f64) -> String {
    if v.fract() == 0. && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else if v.abs() >= 0.01 {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        format!("{v:.1e}")
    }
}

/// Create the drawing area for a PDF page at `path`, white
/// background. The file is only written by `finish_pdf`.
pub fn pdf_root(path: &Path) -> Result<DrawingArea<PdfBackend, Shift>> {
    let root = PdfBackend::new(path, CANVAS_SIZE, PAGE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    Ok(root)
}

/// Write the page to the file and tell the user about it.
pub fn finish_pdf(root: DrawingArea<PdfBackend, Shift>, path: &Path) -> Result<()> {
    root.present()?;
    println!("Wrote output to {}", path.to_string_lossy());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_format_tick() {
        assert_eq!(format_tick(3.), "3");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-40.), "-40");
    }

    #[test]
    fn t_y_range_linear() {
        let opts = ChartOpts::new("t");
        let r = opts.y_range([0., 10., 20.].into_iter());
        assert_eq!(r.start, 0.);
        assert!((r.end - 21.).abs() < 1e-9);
        // empty data still gives a usable range
        let r = opts.y_range(std::iter::empty());
        assert_eq!(r, 0.0..1.0);
    }

    #[test]
    fn t_y_range_log_skips_zero() {
        let mut opts = ChartOpts::new("t");
        opts.log_y = true;
        let r = opts.y_range([0., 10., 100.].into_iter());
        assert_eq!(r.start, 8.);
        assert_eq!(r.end, 125.);
    }
}
