use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use onesim_plot::{
    config::{LoadConfigFile, PlotConfig},
    dispatch::{PlotOpts, PlotOutcome, plot},
    get_terminal_width::get_terminal_width,
    info,
    utillib::{
        logging::{LogLevelOpt, set_log_level},
        path_resolve_home::path_resolve_home,
    },
};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(clap::Parser, Debug)]
#[command(
    next_line_help = true,
    term_width = get_terminal_width(4),
    bin_name = "onesim-plot",
)]
/// Plot the reports of an opportunistic network simulation run
/// (contact times, message copy counts, message stats) as PDF charts.
struct Opts {
    #[clap(flatten)]
    log_level: LogLevelOpt,

    /// Override the path to the config file (default:
    /// `~/.onesim-plot.json5` if it exists, otherwise compiled-in
    /// default values)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[clap(long)]
    print_config: bool,

    #[clap(flatten)]
    plot_opts: PlotOpts,
}

fn main() -> Result<()> {
    let Opts {
        log_level,
        config,
        print_config,
        plot_opts,
    } = Opts::parse();

    set_log_level(log_level.try_into()?);

    let config_path = config.as_deref().map(path_resolve_home).transpose()?;
    let config = PlotConfig::load_config(config_path.as_deref())?;

    if print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    match plot(&plot_opts, &config)? {
        PlotOutcome::Written(path) => info!("done writing {path:?}"),
        PlotOutcome::Skipped(reason) => info!("skipped: {reason}"),
    }
    Ok(())
}
