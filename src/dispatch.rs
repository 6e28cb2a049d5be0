//! Selecting and running the parser and renderer for a set of input
//! files.

use std::{
    fmt::Display,
    io::stdout,
    path::{Path, PathBuf},
};

use anyhow::{Result, anyhow};

use crate::{
    aggregate::aggregate,
    config::PlotConfig,
    ctx, info,
    output_table::{TerminalTable, TerminalTableOpts},
    parse::{contact_time, message_stats::MessageStats, parse_file},
    record::{ContactTimeRow, Record, RunParameters, StatVector, TaggedRecord},
    render::{ChartOpts, bar::render_bar_chart, line::render_line_chart, pie::render_pie_chart},
    report_kind::ReportKind,
    series::{series_by_run_parameters, series_from_contact_times, series_from_records},
    utillib::path_resolve_home::path_resolve_home,
    warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

// The command this is flattened into needs a `--print-config` flag.
#[derive(Debug, Clone, clap::Args)]
pub struct PlotOpts {
    /// A report file to plot. Give several message copy count reports
    /// to plot them together, one line per probability.
    #[clap(short, long = "input", required_unless_present = "print_config")]
    pub inputs: Vec<PathBuf>,

    /// Path of the PDF file to write
    #[clap(short, long, required_unless_present = "print_config")]
    pub output: Option<PathBuf>,

    /// Directory the input paths are relative to
    #[clap(short, long)]
    pub dir: Option<PathBuf>,

    /// The kind of the reports (default: guessed from the file name
    /// of the first input, ignoring its directory names, and nothing
    /// is done if that fails)
    #[clap(short, long)]
    pub kind: Option<ReportKind>,

    /// Label of the x axis
    #[clap(short = 'x', long)]
    pub xaxis: Option<String>,

    /// Label of the y axis
    #[clap(short = 'y', long)]
    pub yaxis: Option<String>,

    /// Chart title (default: depends on the report kind)
    #[clap(short, long)]
    pub title: Option<String>,

    /// Title shown above the legend
    #[clap(long)]
    pub legend_title: Option<String>,

    /// Lower end of the x axis
    #[clap(long, default_value_t = 0.)]
    pub xmin: f64,

    /// Lower end of the y axis (with `--log-y`, values <= 0 mean
    /// automatic)
    #[clap(long, default_value_t = 0.)]
    pub ymin: f64,

    /// Use a logarithmic y axis
    #[clap(long)]
    pub log_y: bool,

    /// How to draw a single message copy count report
    #[clap(long, value_enum, default_value_t = ChartKind::Line)]
    pub chart: ChartKind,

    /// Do not fold the series with low values into "Others" (single
    /// message copy count report only)
    #[clap(long)]
    pub no_aggregate: bool,

    /// Print the data to stdout before plotting
    #[clap(long)]
    pub print: bool,

    #[clap(flatten)]
    pub table_opts: TerminalTableOpts,
}

impl PlotOpts {
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        Self {
            inputs,
            output: Some(output),
            dir: None,
            kind: None,
            xaxis: None,
            yaxis: None,
            title: None,
            legend_title: None,
            xmin: 0.,
            ymin: 0.,
            log_y: false,
            chart: ChartKind::Line,
            no_aggregate: false,
            print: false,
            table_opts: TerminalTableOpts::default(),
        }
    }

    /// The input paths, with `dir` prepended if given, and `~/`
    /// expanded.
    pub fn input_paths(&self) -> Result<Vec<PathBuf>> {
        let dir = self.dir.as_deref().map(path_resolve_home).transpose()?;
        self.inputs
            .iter()
            .map(|path| {
                let path = path_resolve_home(path)?;
                Ok(match &dir {
                    Some(dir) => dir.join(path),
                    None => path,
                })
            })
            .collect()
    }

    pub fn output(&self) -> Result<&Path> {
        self.output
            .as_deref()
            .ok_or_else(|| anyhow!("missing the `--output` option"))
    }

    fn chart_opts(&self, kind: ReportKind, x_label: &str, y_label: &str) -> ChartOpts {
        ChartOpts {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| kind.default_title().into()),
            x_label: Some(self.xaxis.clone().unwrap_or_else(|| x_label.into())),
            y_label: Some(self.yaxis.clone().unwrap_or_else(|| y_label.into())),
            legend_title: self.legend_title.clone(),
            x_min: self.xmin,
            y_min: self.ymin,
            log_y: self.log_y,
        }
    }
}

/// What `plot` did.
#[derive(Debug, PartialEq, Eq)]
pub enum PlotOutcome {
    Written(PathBuf),
    /// Nothing to do, with the reason
    Skipped(String),
}

/// Plot the reports given in `opts`.
pub fn plot(opts: &PlotOpts, config: &PlotConfig) -> Result<PlotOutcome> {
    let inputs = opts.input_paths()?;
    let output = opts.output()?;
    let first = inputs
        .first()
        .ok_or_else(|| anyhow!("need at least one input file"))?;

    let kind = if let Some(kind) = opts.kind {
        kind
    } else if let Some(kind) = ReportKind::from_file_name(first) {
        info!("guessed report kind {kind:?} from file name {first:?}");
        kind
    } else {
        let reason = format!("cannot tell the report kind from the file name {first:?}");
        warn!("{reason}, nothing to do (use --kind)");
        return Ok(PlotOutcome::Skipped(reason));
    };

    if inputs.len() > 1 && !kind.supports_multiple_inputs() {
        let reason = format!("{kind:?} reports can only be plotted one at a time");
        warn!("{reason}, nothing to do");
        return Ok(PlotOutcome::Skipped(reason));
    }

    match kind {
        ReportKind::ContactTime => plot_contact_time(first, opts)?,
        ReportKind::MessageCopy => {
            if inputs.len() > 1 {
                plot_copy_counts(&inputs, opts, config)?
            } else {
                plot_copy_count(first, opts, config)?
            }
        }
        ReportKind::MessageStats => plot_message_stats(first, opts)?,
    }
    Ok(PlotOutcome::Written(output.to_owned()))
}

fn print_table<T: Display>(
    opts: &PlotOpts,
    titles: &[&str],
    rows: impl Iterator<Item = Vec<T>>,
) -> Result<()> {
    if !opts.print {
        return Ok(());
    }
    let widths = vec![12; titles.len() - 1];
    let mut table = TerminalTable::start(&widths, titles, opts.table_opts.clone(), stdout())?;
    for row in rows {
        table.write_data_row(&row)?;
    }
    table.finish()?;
    Ok(())
}

fn print_records(opts: &PlotOpts, records: &[Record]) -> Result<()> {
    print_table(
        opts,
        &["time", "series", "value"],
        records.iter().map(|Record { time, series, value }| {
            vec![time.to_string(), series.to_string(), value.to_string()]
        }),
    )
}

fn plot_contact_time(path: &Path, opts: &PlotOpts) -> Result<()> {
    let rows = parse_file(path, contact_time::parse_str)?;
    info!("parsed {} contact time rows from {path:?}", rows.len());
    print_table(
        opts,
        &["time", "contact_time"],
        rows.iter()
            .map(|ContactTimeRow { time, contact_time }| vec![*time, *contact_time]),
    )?;
    let series = series_from_contact_times(&rows);
    render_line_chart(
        &[series],
        &opts.chart_opts(ReportKind::ContactTime, "time", "contactTime"),
        opts.output()?,
    )
}

fn plot_copy_count(path: &Path, opts: &PlotOpts, config: &PlotConfig) -> Result<()> {
    let grammar = config.copy_count_grammar()?;
    let records = parse_file(path, |s| grammar.parse_str(s))?;
    info!("parsed {} records from {path:?}", records.len());
    let records = if opts.no_aggregate {
        records
    } else {
        aggregate(records, &config.aggregation)
            .map_err(ctx!("aggregating the records from {path:?}"))?
            .0
    };
    print_records(opts, &records)?;

    let series = series_from_records(&records);
    let chart_opts = opts.chart_opts(ReportKind::MessageCopy, "Time", "CopyCount");
    match opts.chart {
        ChartKind::Line => render_line_chart(&series, &chart_opts, opts.output()?),
        ChartKind::Bar => render_bar_chart(&series, &chart_opts, opts.output()?),
    }
}

fn plot_copy_counts(paths: &[PathBuf], opts: &PlotOpts, config: &PlotConfig) -> Result<()> {
    let grammar = config.copy_count_grammar()?;
    let mut records = Vec::new();
    for path in paths {
        let parameters = RunParameters::from_path(path, &config.run_parameters);
        let file_records = parse_file(path, |s| grammar.parse_str(s))?;
        info!(
            "parsed {} records from {path:?}, run parameters: {parameters}",
            file_records.len()
        );
        records.extend(file_records.into_iter().map(|record| TaggedRecord {
            record,
            parameters: parameters.clone(),
        }));
    }
    print_table(
        opts,
        &["time", "series", "value", "probability", "speed"],
        records.iter().map(|TaggedRecord { record, parameters }| {
            vec![
                record.time.to_string(),
                record.series.to_string(),
                record.value.to_string(),
                parameters.probability.to_string(),
                parameters.speed.to_string(),
            ]
        }),
    )?;

    let series = series_by_run_parameters(&records);
    let mut chart_opts = opts.chart_opts(ReportKind::MessageCopy, "Time", "CopyCount");
    if chart_opts.legend_title.is_none() {
        chart_opts.legend_title = Some("Probability".into());
    }
    render_line_chart(&series, &chart_opts, opts.output()?)
}

fn plot_message_stats(path: &Path, opts: &PlotOpts) -> Result<()> {
    let stats = parse_file(path, MessageStats::parse_str)?;
    info!("parsed {stats:?} from {path:?}");
    let stat_vector: StatVector = stats.stat_vector();
    print_table(
        opts,
        &["label", "value"],
        stat_vector
            .0
            .iter()
            .map(|entry| vec![entry.label.to_string(), entry.value.to_string()]),
    )?;
    let title = opts
        .title
        .as_deref()
        .unwrap_or(ReportKind::MessageStats.default_title());
    render_pie_chart(&stat_vector.labels(), &stat_vector.values(), title, opts.output()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_input_paths() -> Result<()> {
        let mut opts = PlotOpts::new(vec!["a.txt".into(), "b/c.txt".into()], "o.pdf".into());
        assert_eq!(opts.input_paths()?, opts.inputs);
        opts.dir = Some("reports".into());
        assert_eq!(
            opts.input_paths()?,
            [Path::new("reports/a.txt"), Path::new("reports/b/c.txt")]
        );
        // absolute inputs are not affected by `dir`
        opts.inputs = vec!["/tmp/x.txt".into()];
        assert_eq!(opts.input_paths()?, [Path::new("/tmp/x.txt")]);
        Ok(())
    }

    #[test]
    fn t_chart_opts_overrides() {
        let mut opts = PlotOpts::new(vec![], "o.pdf".into());
        let c = opts.chart_opts(ReportKind::MessageCopy, "Time", "CopyCount");
        assert_eq!(c.title, "Message Copy Count");
        assert_eq!(c.x_label.as_deref(), Some("Time"));
        opts.title = Some("Copies".into());
        opts.yaxis = Some("n".into());
        let c = opts.chart_opts(ReportKind::MessageCopy, "Time", "CopyCount");
        assert_eq!(c.title, "Copies");
        assert_eq!(c.y_label.as_deref(), Some("n"));
    }

    #[test]
    fn t_no_inputs() {
        let opts = PlotOpts::new(vec![], "o.pdf".into());
        assert!(plot(&opts, &PlotConfig::default()).is_err());
    }
}
