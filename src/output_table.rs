//! Printing parsed data as a table, either human-readable with
//! padding (and optionally ANSI formatting for the header), or as
//! tab-separated values.
//!
//! Does not escape anything in the fields, values are printed via
//! `Display` directly.

use std::{
    fmt::Display,
    io::{BufWriter, IsTerminal, Write},
};

use anyhow::{Result, anyhow, bail};
use itertools::{EitherOrBoth, Itertools};
use strum_macros::EnumString;
use yansi::{Paint, Style};

#[derive(Debug, EnumString, PartialEq, Clone, Copy)]
#[strum(serialize_all = "kebab_case")]
pub enum ColorOpt {
    Auto,
    Always,
    Never,
}

impl ColorOpt {
    pub fn want_color(self, detected_terminal: bool) -> bool {
        match self {
            ColorOpt::Auto => detected_terminal,
            ColorOpt::Always => true,
            ColorOpt::Never => false,
        }
    }
}

#[derive(Debug, clap::Args, Clone)]
pub struct TerminalTableOpts {
    /// With `--print`: show the table with '\t' as separator instead
    /// of human-readable
    #[clap(long)]
    pub tsv: bool,

    /// With `--print`: whether to use ANSI codes to format the header
    /// on terminals (auto, always, never)
    #[clap(long, default_value = "auto")]
    pub color: ColorOpt,
}

impl Default for TerminalTableOpts {
    fn default() -> Self {
        Self {
            tsv: false,
            color: ColorOpt::Auto,
        }
    }
}

impl TerminalTableOpts {
    pub fn want_color(&self, detected_terminal: bool) -> bool {
        let Self { tsv, color } = self;
        if *tsv {
            false
        } else {
            color.want_color(detected_terminal)
        }
    }
}

/// Streaming table: column widths are fixed up front. A value wider
/// than its column still gets a single space before the next one.
/// The last column has no width and gets no padding.
pub struct TerminalTable<O: Write + IsTerminal> {
    opts: TerminalTableOpts,
    widths: Vec<usize>,
    padding: String,
    out: BufWriter<O>,
}

impl<O: Write + IsTerminal> TerminalTable<O> {
    const MINIMAL_PADDING_LEN: usize = 1;

    /// `widths` must have one entry less than `titles`.
    pub fn start<T: Display>(
        widths: &[usize],
        titles: &[T],
        opts: TerminalTableOpts,
        out: O,
    ) -> Result<Self> {
        let max_width = widths.iter().max().copied().unwrap_or(0);
        let is_terminal = out.is_terminal();
        let mut table = Self {
            opts,
            widths: widths.to_owned(),
            padding: " ".repeat(max_width),
            out: BufWriter::new(out),
        };
        let style = if table.opts.want_color(is_terminal) {
            Some(Style::new().bold().italic())
        } else {
            None
        };
        table.write_row(titles, style)?;
        Ok(table)
    }

    fn write_row<V: Display>(&mut self, row: &[V], style: Option<Style>) -> Result<()> {
        let num_cols = row
            .len()
            .checked_sub(1)
            .ok_or_else(|| anyhow!("need at least 1 column"))?;
        if num_cols != self.widths.len() {
            bail!(
                "widths.len != row.len - 1: {:?}",
                (self.widths.len(), row.len())
            )
        }

        for (i, either_or_both) in row.iter().zip_longest(&self.widths).enumerate() {
            let (value, width) = match either_or_both {
                EitherOrBoth::Both(value, width) => (value, Some(*width)),
                EitherOrBoth::Left(value) => (value, None),
                EitherOrBoth::Right(_) => unreachable!("row len has been checked against widths"),
            };
            if self.opts.tsv && i > 0 {
                self.out.write_all(b"\t")?;
            }
            let text = value.to_string();
            let text_len = text.chars().count();
            if let Some(style) = style {
                write!(self.out, "{}", text.as_str().paint(style))?;
            } else {
                self.out.write_all(text.as_bytes())?;
            }
            if let Some(width) = width {
                if !self.opts.tsv {
                    let padding_len = width
                        .saturating_sub(text_len)
                        .max(Self::MINIMAL_PADDING_LEN);
                    let padding_len = padding_len.min(self.padding.len());
                    self.out.write_all(self.padding[0..padding_len].as_bytes())?;
                }
            }
        }
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_data_row<V: Display>(&mut self, data: &[V]) -> Result<()> {
        self.write_row(data, None)
    }

    pub fn finish(self) -> Result<O> {
        self.out
            .into_inner()
            .map_err(|e| anyhow!("flushing the buffer: {}", e.error()))
    }
}
