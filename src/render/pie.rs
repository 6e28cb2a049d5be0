//! Pie charts: one wedge per label, with percentages and a legend.

use std::{f64::consts::PI, path::Path};

use anyhow::Result;
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use crate::render::RenderError;

use super::{finish_pdf, pdf_root, series_color};

/// Polygon vertices per full circle
const CIRCLE_STEPS: f64 = 360.;

/// Wedge outlines in backend coordinates, starting at 12 o'clock and
/// proceeding clockwise, one per value.
fn wedges(values: &[u64], center: (i32, i32), radius: f64) -> Vec<Vec<(i32, i32)>> {
    let total: u128 = values.iter().copied().map(u128::from).sum();
    let mut start = 0.;
    let mut result = Vec::with_capacity(values.len());
    for value in values {
        let sweep = *value as f64 / total as f64 * 2. * PI;
        let steps = ((sweep / (2. * PI)) * CIRCLE_STEPS).ceil().max(1.) as usize;
        let mut points = vec![center];
        for k in 0..=steps {
            let angle = start + sweep * k as f64 / steps as f64;
            // y grows downwards in backend coordinates
            points.push((
                center.0 + (radius * angle.sin()).round() as i32,
                center.1 - (radius * angle.cos()).round() as i32,
            ));
        }
        result.push(points);
        start += sweep;
    }
    result
}

/// Render a pie chart into a PDF file at `output`. `labels` and
/// `values` must have the same length, and not all values may be
/// zero.
pub fn render_pie_chart<L: AsRef<str>>(
    labels: &[L],
    values: &[u64],
    title: &str,
    output: &Path,
) -> Result<()> {
    if labels.len() != values.len() {
        return Err(RenderError::LabelValueMismatch {
            labels: labels.len(),
            values: values.len(),
        }
        .into());
    }
    let total: u128 = values.iter().copied().map(u128::from).sum();
    if total == 0 {
        return Err(RenderError::AllZero.into());
    }

    let root = pdf_root(output)?;
    let area = root.titled(title, ("sans-serif", 26))?;
    let (width, height) = area.dim_in_pixel();
    let radius = f64::from(width.min(height)) * 0.4;
    let center = ((f64::from(width) * 0.4) as i32, (f64::from(height) / 2.) as i32);

    let percent_style = TextStyle::from(("sans-serif", 16).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    let mut start = 0.;
    for (i, (outline, value)) in wedges(values, center, radius)
        .into_iter()
        .zip(values)
        .enumerate()
    {
        let color = series_color(i);
        area.draw(&Polygon::new(outline.clone(), color.filled()))?;
        area.draw(&PathElement::new(outline, WHITE.stroke_width(2)))?;

        let fraction = *value as f64 / total as f64;
        let mid = start + fraction * PI;
        let label_pos = (
            center.0 + (radius * 0.65 * mid.sin()) as i32,
            center.1 - (radius * 0.65 * mid.cos()) as i32,
        );
        area.draw(&Text::new(
            format!("{:.1}%", fraction * 100.),
            label_pos,
            percent_style.clone(),
        ))?;
        start += fraction * 2. * PI;
    }

    // Legend to the right of the pie
    let legend_x = center.0 + radius as i32 + 40;
    let legend_y = center.1 - (labels.len() as i32 * 28) / 2;
    let legend_style = TextStyle::from(("sans-serif", 18).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (i, (label, value)) in labels.iter().zip(values).enumerate() {
        let y = legend_y + i as i32 * 28;
        area.draw(&Rectangle::new(
            [(legend_x, y - 8), (legend_x + 16, y + 8)],
            series_color(i).filled(),
        ))?;
        area.draw(&Text::new(
            format!("{} ({value})", label.as_ref()),
            (legend_x + 24, y),
            legend_style.clone(),
        ))?;
    }

    finish_pdf(root, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_wedges_cover_circle() {
        let ws = wedges(&[1, 1], (100, 100), 50.);
        assert_eq!(ws.len(), 2);
        // first wedge starts at 12 o'clock and ends at 6 o'clock
        assert_eq!(ws[0][0], (100, 100));
        assert_eq!(ws[0][1], (100, 50));
        assert_eq!(*ws[0].last().unwrap(), (100, 150));
        // the second one closes the circle
        assert_eq!(*ws[1].last().unwrap(), (100, 50));
    }

    #[test]
    fn t_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pie.pdf");
        let err = render_pie_chart(&["Success", "Aborted"], &[1], "t", &path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RenderError>(),
            Some(&RenderError::LabelValueMismatch {
                labels: 2,
                values: 1
            })
        );
        assert!(!path.exists());
    }

    #[test]
    fn t_all_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pie.pdf");
        let err = render_pie_chart::<&str>(&[], &[], "t", &path).unwrap_err();
        assert_eq!(err.downcast_ref::<RenderError>(), Some(&RenderError::AllZero));
    }

    #[test]
    fn t_pie_written() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pie.pdf");
        render_pie_chart(
            &["Success", "Aborted", "Dropped", "Delivered"],
            &[7, 3, 2, 1],
            "Message Stats",
            &path,
        )?;
        let doc = std::fs::read_to_string(&path)?;
        assert!(doc.contains("(Success \\(7\\)) Tj"));
        assert!(doc.contains("(53.8%) Tj"));
        Ok(())
    }

    #[test]
    fn t_huge_counts() -> Result<()> {
        let ws = wedges(&[u64::MAX, u64::MAX], (100, 100), 50.);
        assert_eq!(*ws[0].last().expect("has points"), (100, 150));

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pie.pdf");
        render_pie_chart(&["Success", "Dropped"], &[u64::MAX, 1], "t", &path)?;
        assert!(path.exists());
        Ok(())
    }
}
