use std::{fs, path::Path};

use anyhow::Result;
use onesim_plot::{
    config::PlotConfig,
    dispatch::{ChartKind, PlotOpts, PlotOutcome, plot},
    report_kind::ReportKind,
    utillib::logging::{LogLevel, set_log_level},
};
use tempfile::TempDir;

const COPY_COUNT_REPORT: &str = "\
[0]
M1 1
M2 1
M3 1
[600]
M1 0
M2 1
M3 5
";

const STATS_REPORT: &str = "\
Message stats for scenario default_scenario
sim_time: 43200.0000
created: 12
started: 10
relayed: 7
aborted: 3
dropped: 2
removed: 0
delivered: 1
delivery_prob: 0.0833
";

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    fs::write(dir.join(name), contents)?;
    Ok(())
}

fn assert_pdf(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn opts_in(dir: &TempDir, inputs: &[&str], output: &str) -> PlotOpts {
    let mut opts = PlotOpts::new(
        inputs.iter().map(Into::into).collect(),
        dir.path().join(output),
    );
    opts.dir = Some(dir.path().to_owned());
    opts
}

#[test]
fn t_copy_count_line_chart() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(dir.path(), "MessageCopyCountReport.txt", COPY_COUNT_REPORT)?;
    let opts = opts_in(&dir, &["MessageCopyCountReport.txt"], "copies.pdf");

    let outcome = plot(&opts, &PlotConfig::default())?;
    assert_eq!(outcome, PlotOutcome::Written(dir.path().join("copies.pdf")));
    let pdf = assert_pdf(&dir.path().join("copies.pdf"))?;
    assert!(pdf.contains("(Message Copy Count) Tj"));
    // M1 is dropped, M2 merged
    assert!(pdf.contains("(Others) Tj"));
    assert!(pdf.contains("(M3) Tj"));
    assert!(!pdf.contains("(M1) Tj"));
    assert!(!pdf.contains("(M2) Tj"));
    Ok(())
}

#[test]
fn t_copy_count_bar_chart_without_aggregation() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(dir.path(), "copies.txt", COPY_COUNT_REPORT)?;
    let mut opts = opts_in(&dir, &["copies.txt"], "copies.pdf");
    opts.kind = Some(ReportKind::MessageCopy);
    opts.chart = ChartKind::Bar;
    opts.no_aggregate = true;
    opts.title = Some("All copies".into());

    plot(&opts, &PlotConfig::default())?;
    let pdf = assert_pdf(&dir.path().join("copies.pdf"))?;
    assert!(pdf.contains("(All copies) Tj"));
    assert!(pdf.contains("(M1) Tj"));
    assert!(!pdf.contains("(Others) Tj"));
    Ok(())
}

#[test]
fn t_message_stats_pie() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(dir.path(), "default_MessageStatsReport.txt", STATS_REPORT)?;
    let opts = opts_in(&dir, &["default_MessageStatsReport.txt"], "stats.pdf");

    plot(&opts, &PlotConfig::default())?;
    let pdf = assert_pdf(&dir.path().join("stats.pdf"))?;
    assert!(pdf.contains("(Success \\(7\\)) Tj"));
    assert!(pdf.contains("(Aborted \\(3\\)) Tj"));
    assert!(pdf.contains("(Delivered \\(1\\)) Tj"));
    // removed is 0 and left out
    assert!(!pdf.contains("(Removed"));
    Ok(())
}

#[test]
fn t_contact_time() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(dir.path(), "ContactTimesReport.txt", "0 4\n1 3\n2 7\n")?;
    let mut opts = opts_in(&dir, &["ContactTimesReport.txt"], "contacts.pdf");
    opts.xaxis = Some("seconds".into());

    plot(&opts, &PlotConfig::default())?;
    let pdf = assert_pdf(&dir.path().join("contacts.pdf"))?;
    assert!(pdf.contains("(ContactTime) Tj"));
    assert!(pdf.contains("(seconds) Tj"));
    assert!(pdf.contains("(contactTime) Tj"));
    Ok(())
}

#[test]
fn t_malformed_timestamp_writes_nothing() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "MessageCopyCountReport.txt",
        "[0]\nM1 1\n[end of run]\nM1 2\n",
    )?;
    let opts = opts_in(&dir, &["MessageCopyCountReport.txt"], "copies.pdf");

    let err = plot(&opts, &PlotConfig::default()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("cannot extract timestamp in line 3"), "{msg}");
    assert!(msg.contains("MessageCopyCountReport.txt"), "{msg}");
    assert!(!dir.path().join("copies.pdf").exists());
    Ok(())
}

#[test]
fn t_multi_file_probabilities() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(dir.path(), "MessageCopyCountReport_P30_D2.5k.txt", COPY_COUNT_REPORT)?;
    write(dir.path(), "MessageCopyCountReport_P5_D2.5k.txt", "[0]\nM1 2\n[600]\nM1 4\n")?;
    // no parameters in the name: warned about, defaults used
    write(dir.path(), "MessageCopyCountReport.txt", "[0]\nM1 1\n")?;
    let opts = opts_in(
        &dir,
        &[
            "MessageCopyCountReport_P30_D2.5k.txt",
            "MessageCopyCountReport_P5_D2.5k.txt",
            "MessageCopyCountReport.txt",
        ],
        "probabilities.pdf",
    );

    plot(&opts, &PlotConfig::default())?;
    let pdf = assert_pdf(&dir.path().join("probabilities.pdf"))?;
    assert!(pdf.contains("(Probability) Tj"));
    // the default speed differs, so lines are keyed by speed too
    assert!(pdf.contains("(P=30, 2.5k) Tj"));
    assert!(pdf.contains("(P=5, 2.5k) Tj"));
    assert!(pdf.contains("(P=0, 1.75k) Tj"));
    Ok(())
}

#[test]
fn t_unknown_kind_is_a_no_op() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(dir.path(), "DeliveredMessagesReport.txt", "1 2\n")?;
    let opts = opts_in(&dir, &["DeliveredMessagesReport.txt"], "out.pdf");

    let outcome = plot(&opts, &PlotConfig::default())?;
    assert!(matches!(outcome, PlotOutcome::Skipped(_)));
    assert!(!dir.path().join("out.pdf").exists());
    Ok(())
}

#[test]
fn t_several_stats_reports_is_a_no_op() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(dir.path(), "a_MessageStatsReport.txt", STATS_REPORT)?;
    write(dir.path(), "b_MessageStatsReport.txt", STATS_REPORT)?;
    let opts = opts_in(
        &dir,
        &["a_MessageStatsReport.txt", "b_MessageStatsReport.txt"],
        "out.pdf",
    );

    let outcome = plot(&opts, &PlotConfig::default())?;
    assert!(matches!(outcome, PlotOutcome::Skipped(_)));
    assert!(!dir.path().join("out.pdf").exists());
    Ok(())
}

#[test]
fn t_all_zero_stats_fail() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(dir.path(), "MessageStatsReport.txt", "started: 0\nrelayed: 0\n")?;
    let opts = opts_in(&dir, &["MessageStatsReport.txt"], "stats.pdf");

    assert!(plot(&opts, &PlotConfig::default()).is_err());
    assert!(!dir.path().join("stats.pdf").exists());
    Ok(())
}

#[test]
fn t_huge_stats_counts() -> Result<()> {
    set_log_level(LogLevel::Quiet);
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "MessageStatsReport.txt",
        "started: 18446744073709551615\nrelayed: 18446744073709551615\ndropped: 1\n",
    )?;
    let opts = opts_in(&dir, &["MessageStatsReport.txt"], "stats.pdf");

    plot(&opts, &PlotConfig::default())?;
    let pdf = assert_pdf(&dir.path().join("stats.pdf"))?;
    assert!(pdf.contains("(Success \\(18446744073709551615\\)) Tj"));
    assert!(pdf.contains("(Dropped \\(1\\)) Tj"));
    Ok(())
}
