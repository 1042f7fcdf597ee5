//! CLI entry point for the subway congestion explorer.
//!
//! Each subcommand loads the wide CSV through one [`Dashboard`] session and
//! prints the requested view as JSON. `serve` keeps the session open and
//! answers line-delimited JSON requests on stdin.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use subway_congestion::{
    config::DashboardConfig,
    dashboard::{Dashboard, RankScope},
    model::DirectionPolicy,
    output::{export_ranking, print_json, print_pretty, ranking_file_name},
    query::{
        DirectionCompareFilter, LineCompareFilter, RankCriterion, SingleFilter, TimePreset,
        TimeRange, default_at_time_slot,
    },
    serve,
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "subway_congestion")]
#[command(about = "Explore subway car congestion from a wide per-slot CSV", long_about = None)]
struct Cli {
    /// Wide congestion CSV; overrides the config file
    #[arg(short, long, env = "DATA_FILE", global = true)]
    data: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long, env = "CONGESTION_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Keep 내선/외선 rows in every view
    #[arg(long, global = true, default_value_t = false)]
    keep_loop_directions: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StationArgs {
    /// Day type, e.g. 평일
    #[arg(long)]
    day_type: String,
    #[arg(long)]
    line: String,
    #[arg(long)]
    station: String,
}

/// Time window: a preset (출근/퇴근/전체) or explicit `HH:MM` bounds.
#[derive(Args)]
struct WindowArgs {
    #[arg(long, conflicts_with_all = ["start", "end"])]
    preset: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CriterionArg {
    Peak,
    Average,
    AtTime,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the data quality report
    Quality,
    /// List the values available for each filter
    Options {
        /// Narrow the station list to one line
        #[arg(short, long)]
        line: Option<String>,
    },
    /// KPIs and readings for one station and direction
    View {
        #[command(flatten)]
        station: StationArgs,
        #[arg(long)]
        direction: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Mean congestion per direction for one station
    CompareDirections {
        #[command(flatten)]
        station: StationArgs,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Mean congestion per line for one direction
    CompareLines {
        #[arg(long)]
        day_type: String,
        /// Comma separated, e.g. 1호선,2호선
        #[arg(long, value_delimiter = ',', required = true)]
        lines: Vec<String>,
        #[arg(long)]
        direction: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Top-N most congested readings for one station and direction
    Top {
        #[command(flatten)]
        station: StationArgs,
        #[arg(long)]
        direction: String,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long, value_enum, default_value = "peak")]
        criterion: CriterionArg,
        /// Slot for `at-time`; defaults to 08:00 or the first slot
        #[arg(long)]
        at: Option<String>,
        #[arg(short)]
        n: Option<usize>,
        /// Export file or directory; a directory gets the default file name
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Answer line-delimited JSON requests from stdin
    Serve,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/subway_congestion.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_congestion.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_file = data;
    }
    if cli.keep_loop_directions {
        config.direction_policy = DirectionPolicy::KeepAll;
    }
    info!(data_file = %config.data_file.display(), "Using input");
    print_pretty(&config);

    let mut dash = Dashboard::new(config);

    match cli.command {
        Commands::Quality => print_json(&dash.quality()?)?,
        Commands::Options { line } => print_json(&dash.options(line.as_deref())?)?,
        Commands::View {
            station,
            direction,
            window,
        } => {
            let range = resolve_window(&mut dash, &window)?;
            let view = dash.station_view(&single_filter(station, direction, range))?;
            if let Some(s) = &view.suggestion {
                warn!(
                    line = %s.line,
                    direction = %s.direction,
                    stations = ?s.stations,
                    "no data for this station; these stations have data"
                );
            }
            print_json(&view)?;
        }
        Commands::CompareDirections { station, window } => {
            let range = resolve_window(&mut dash, &window)?;
            let filter = DirectionCompareFilter {
                day_type: station.day_type,
                line: station.line,
                station: station.station,
                range,
            };
            print_json(&dash.compare_directions(&filter)?)?;
        }
        Commands::CompareLines {
            day_type,
            lines,
            direction,
            window,
        } => {
            let range = resolve_window(&mut dash, &window)?;
            let filter = LineCompareFilter {
                day_type,
                lines: lines.into_iter().map(|l| l.trim().to_string()).collect::<BTreeSet<_>>(),
                direction,
                range,
            };
            print_json(&dash.compare_lines(&filter)?)?;
        }
        Commands::Top {
            station,
            direction,
            window,
            criterion,
            at,
            n,
            export,
        } => {
            let range = resolve_window(&mut dash, &window)?;
            let criterion = match criterion {
                CriterionArg::Peak => RankCriterion::Peak,
                CriterionArg::Average => RankCriterion::Average,
                CriterionArg::AtTime => match at {
                    Some(slot) => RankCriterion::AtTime(slot),
                    None => {
                        let options = dash.options(None)?;
                        let slot = default_at_time_slot(&options.time_slots)
                            .context("no time slots loaded")?;
                        RankCriterion::AtTime(slot.to_string())
                    }
                },
            };
            let n = n.unwrap_or(dash.config().top_n);
            let filter = single_filter(station, direction, range);
            let rows = dash.rank(&RankScope::Station(filter.clone()), &criterion, Some(n))?;

            if let Some(target) = export {
                let path = if target.is_dir() {
                    target.join(ranking_file_name(n, &filter.station, &filter.day_type))
                } else {
                    target
                };
                export_ranking(&path, &rows)?;
            }
            print_json(&rows)?;
        }
        Commands::Serve => {
            info!("Serving requests on stdin");
            let stdin = std::io::stdin();
            serve::run(&mut dash, stdin.lock(), std::io::stdout().lock())?;
            info!(stats = ?dash.cache_stats(), "Session closed");
        }
    }

    Ok(())
}

fn single_filter(station: StationArgs, direction: String, range: TimeRange) -> SingleFilter {
    SingleFilter {
        day_type: station.day_type,
        line: station.line,
        station: station.station,
        direction,
        range,
    }
}

/// Turns the window flags into a range; missing bounds fall back to the full day.
fn resolve_window(dash: &mut Dashboard, window: &WindowArgs) -> Result<TimeRange> {
    if let Some(label) = &window.preset {
        let preset = TimePreset::from_label(label)
            .with_context(|| format!("unknown preset '{label}' (출근, 퇴근, 전체)"))?;
        return dash.preset_range(preset)?.context("no time slots loaded");
    }

    let all_day = dash.preset_range(TimePreset::AllDay)?;
    let start = window
        .start
        .clone()
        .or_else(|| all_day.as_ref().map(|r| r.start.clone()));
    let end = window
        .end
        .clone()
        .or_else(|| all_day.as_ref().map(|r| r.end.clone()));

    match (start, end) {
        (Some(start), Some(end)) => Ok(TimeRange::new(start, end)),
        _ => bail!("no time slots loaded and no --start/--end given"),
    }
}
