//! A `plotters` drawing backend writing a single-page vector PDF.
//!
//! Only what the charts here need is supported: strokes, filled
//! shapes, and text in the standard Helvetica fonts (which every PDF
//! viewer has built in, thus nothing is embedded). Transparency is
//! ignored except that fully transparent shapes are skipped.
//! Characters outside of ASCII are written as `?`.

use std::{
    fmt::Write as _,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontStyle, FontTransform,
    text_anchor::{HPos, VPos},
};

/// Helvetica glyph widths (1/1000 em) for the printable ASCII range
/// 32..=126, from the standard AFM metrics.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778,
    722, 667, 611, 722, 667, 944, 667, 667, 611, // A..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556,
    333, 500, 278, 556, 500, 722, 500, 500, 500, // a..z
    334, 260, 334, 584, // {..~
];

/// Bold glyphs are wider; good enough for layout purposes.
const BOLD_WIDTH_FACTOR: f64 = 1.06;

fn text_width_em(text: &str) -> f64 {
    text.chars()
        .map(|c| {
            let i = c as u32;
            if (32..=126).contains(&i) {
                f64::from(HELVETICA_WIDTHS[(i - 32) as usize]) / 1000.
            } else {
                0.556
            }
        })
        .sum()
}

/// Escape for a PDF literal string, mapping non-ASCII to '?'.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

fn rgb(color: BackendColor) -> (f64, f64, f64) {
    let (r, g, b) = color.rgb;
    (
        f64::from(r) / 255.,
        f64::from(g) / 255.,
        f64::from(b) / 255.,
    )
}

// Cubic Bezier control point distance approximating a quarter circle
const KAPPA: f64 = 0.552_284_749_8;

pub struct PdfBackend {
    path: PathBuf,
    /// Size of the drawing area in backend pixels
    size: (u32, u32),
    /// Size of the page in PDF points (1/72 inch)
    page_size: (f64, f64),
    content: String,
}

impl PdfBackend {
    /// `size` is the drawing resolution used by `plotters`, it is
    /// scaled to `page_size` (in points, 1/72 inch).
    pub fn new<P: AsRef<Path>>(path: P, size: (u32, u32), page_size: (f64, f64)) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            size,
            page_size,
            content: String::new(),
        }
    }

    fn scale(&self) -> f64 {
        self.page_size.0 / f64::from(self.size.0)
    }

    /// Backend pixel coordinates (origin top left) to PDF user space
    /// (origin bottom left)
    fn to_pdf(&self, (x, y): BackendCoord) -> (f64, f64) {
        let s = self.scale();
        (f64::from(x) * s, self.page_size.1 - f64::from(y) * s)
    }

    fn op(&mut self, args: std::fmt::Arguments) {
        self.content
            .write_fmt(args)
            .expect("writing to a String does not fail");
        self.content.push('\n');
    }

    /// Sets up color and line width; returns false if the shape is
    /// invisible and should not be drawn at all.
    fn set_style<S: BackendStyle>(&mut self, style: &S, fill: bool) -> bool {
        let color = style.color();
        if color.alpha == 0.0 {
            return false;
        }
        let (r, g, b) = rgb(color);
        if fill {
            self.op(format_args!("{r:.3} {g:.3} {b:.3} rg"));
        } else {
            let width = f64::from(style.stroke_width().max(1)) * self.scale();
            self.op(format_args!("{r:.3} {g:.3} {b:.3} RG {width:.2} w"));
        }
        true
    }

    fn path_ops(&mut self, points: impl IntoIterator<Item = BackendCoord>) -> usize {
        let mut n = 0;
        for point in points {
            let (x, y) = self.to_pdf(point);
            if n == 0 {
                self.op(format_args!("{x:.2} {y:.2} m"));
            } else {
                self.op(format_args!("{x:.2} {y:.2} l"));
            }
            n += 1;
        }
        n
    }

    /// Serialize the page into a complete PDF document.
    fn document(&self) -> Vec<u8> {
        let (width, height) = self.page_size;
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width:.2} {height:.2}] \
                 /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>"
            ),
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                self.content.len(),
                self.content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
             /Encoding /WinAnsiEncoding >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold \
             /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", i + 1).as_bytes());
        }
        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            // each entry must be exactly 20 bytes long
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        out.extend_from_slice(xref.as_bytes());
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }
}

impl DrawingBackend for PdfBackend {
    type ErrorType = std::io::Error;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let doc = self.document();
        (|| -> std::io::Result<()> {
            let mut out = BufWriter::new(File::create(&self.path)?);
            out.write_all(&doc)?;
            out.flush()
        })()
        .map_err(DrawingErrorKind::DrawingError)
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        if color.alpha == 0.0 {
            return Ok(());
        }
        let (r, g, b) = rgb(color);
        let (x, y) = self.to_pdf(point);
        let s = self.scale();
        self.op(format_args!(
            "{r:.3} {g:.3} {b:.3} rg {x:.2} {:.2} {s:.2} {s:.2} re f",
            y - s
        ));
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        if self.set_style(style, false) {
            self.path_ops([from, to]);
            self.op(format_args!("S"));
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        if self.set_style(style, fill) {
            let (x0, y0) = self.to_pdf(upper_left);
            let (x1, y1) = self.to_pdf(bottom_right);
            let (w, h) = (x1 - x0, y0 - y1);
            self.op(format_args!(
                "{x0:.2} {y1:.2} {w:.2} {h:.2} re {}",
                if fill { "f" } else { "S" }
            ));
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        if self.set_style(style, false) {
            if self.path_ops(path) > 1 {
                self.op(format_args!("S"));
            } else {
                // single point: discard the current path
                self.op(format_args!("n"));
            }
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        if self.set_style(style, true) {
            if self.path_ops(vert) > 2 {
                self.op(format_args!("h f"));
            } else {
                self.op(format_args!("n"));
            }
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        if self.set_style(style, fill) {
            let (cx, cy) = self.to_pdf(center);
            let r = f64::from(radius) * self.scale();
            let k = r * KAPPA;
            self.op(format_args!("{:.2} {cy:.2} m", cx + r));
            self.op(format_args!(
                "{:.2} {:.2} {:.2} {:.2} {cx:.2} {:.2} c",
                cx + r,
                cy + k,
                cx + k,
                cy + r,
                cy + r
            ));
            self.op(format_args!(
                "{:.2} {:.2} {:.2} {:.2} {:.2} {cy:.2} c",
                cx - k,
                cy + r,
                cx - r,
                cy + k,
                cx - r
            ));
            self.op(format_args!(
                "{:.2} {:.2} {:.2} {:.2} {cx:.2} {:.2} c",
                cx - r,
                cy - k,
                cx - k,
                cy - r,
                cy - r
            ));
            self.op(format_args!(
                "{:.2} {:.2} {:.2} {:.2} {:.2} {cy:.2} c",
                cx + k,
                cy - r,
                cx + r,
                cy - k,
                cx + r
            ));
            self.op(format_args!("{}", if fill { "f" } else { "S" }));
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let color = style.color();
        if color.alpha == 0.0 || text.is_empty() {
            return Ok(());
        }
        let (font, width_factor) = match style.style() {
            FontStyle::Bold => ("F2", BOLD_WIDTH_FACTOR),
            _ => ("F1", 1.),
        };
        let size = style.size() * self.scale();
        let width = text_width_em(text) * width_factor * size;

        // Offset of the baseline origin from the anchor, in text space
        let anchor = style.anchor();
        let dx = match anchor.h_pos {
            HPos::Left => 0.,
            HPos::Center => -width / 2.,
            HPos::Right => -width,
        };
        let dy = match anchor.v_pos {
            VPos::Top => -0.8 * size,
            VPos::Center => -0.3 * size,
            VPos::Bottom => 0.2 * size,
        };
        // Text direction (a, b) and text "up" direction (c, d)
        let (a, b, c, d) = match style.transform() {
            FontTransform::None => (1., 0., 0., 1.),
            FontTransform::Rotate90 => (0., -1., 1., 0.),
            FontTransform::Rotate180 => (-1., 0., 0., -1.),
            FontTransform::Rotate270 => (0., 1., -1., 0.),
        };
        let (ax, ay) = self.to_pdf(pos);
        let x = ax + dx * a + dy * c;
        let y = ay + dx * b + dy * d;
        let (r, g, bl) = rgb(color);
        let s = pdf_string(text);
        self.op(format_args!(
            "BT {r:.3} {g:.3} {bl:.3} rg /{font} {size:.2} Tf \
             {a} {b} {c} {d} {x:.2} {y:.2} Tm {s} Tj ET"
        ));
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        let width_factor = match style.style() {
            FontStyle::Bold => BOLD_WIDTH_FACTOR,
            _ => 1.,
        };
        let size = style.size();
        let width = text_width_em(text) * width_factor * size;
        let (w, h) = match style.transform() {
            FontTransform::None | FontTransform::Rotate180 => (width, size),
            FontTransform::Rotate90 | FontTransform::Rotate270 => (size, width),
        };
        Ok((w.ceil() as u32, h.ceil() as u32))
    }
}
