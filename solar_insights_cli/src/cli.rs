use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};
use solar_insights::{
    cache::TableCache,
    config::Config,
    dashboard::{DashboardView, Selection},
    error::SolarError,
    formatters::{CSVFormatter, JSONFormatter, OutputFormatter, OutputGenerator},
    loader::DataSource,
    SolarInsights,
};
use spinners::{Spinner, Spinners};
use strum_macros::EnumString;

use crate::display::{
    display_boxplots, display_dataset_info, display_key_statistics, display_locations,
    display_ranking, display_rows, display_summary,
};
use crate::error::SolarCliResult;

const DEFAULT_PROGRESS_SPINNER: Spinners = Spinners::Dots;
const COMPLETE_PROGRESS_STRING: &str = "✔";
const RUNNING_TAIL_STRING: &str = "...";
const LOADING_STRING: &str = "Loading data";
const STDIN_SOURCE: &str = "-";

/// Defines the output formats we are able to export rows in.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, EnumString, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl From<&OutputFormat> for OutputFormatter {
    fn from(value: &OutputFormat) -> Self {
        match value {
            OutputFormat::Csv => OutputFormatter::Csv(CSVFormatter),
            OutputFormat::Json => OutputFormatter::Json(JSONFormatter),
        }
    }
}

/// File name offered when exporting the rows of a metric, e.g. `solar_data_GHI.csv`.
fn export_file_name(metric: &str, format: OutputFormat) -> String {
    format!("solar_data_{metric}.{}", format.extension())
}

fn write_output<T, U>(
    output_generator: T,
    mut data: DataFrame,
    output_file: Option<U>,
) -> SolarCliResult<()>
where
    T: OutputGenerator,
    U: AsRef<Path>,
{
    if let Some(output_file) = output_file {
        let mut f = File::create(output_file).context("Failed to write output")?;
        output_generator.save(&mut f, &mut data)?;
    } else {
        let mut stdout_lock = std::io::stdout().lock();
        output_generator.save(&mut stdout_lock, &mut data)?;
    };
    Ok(())
}

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> SolarCliResult<()>;
}

/// Where to read the dataset from and how to interpret it.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(
        short = 'f',
        long,
        value_name = "PATH|-",
        help = "\
            CSV file to analyse, or '-' to read it from standard input. Defaults to the\n\
            `data_path` of the config file (data/solar_data.csv)."
    )]
    file: Option<String>,
    #[arg(
        long,
        value_name = "COLUMN",
        help = "Column holding location names, needed when none can be detected"
    )]
    location_column: Option<String>,
}

impl SourceArgs {
    fn data_source(&self, config: &Config) -> SolarCliResult<DataSource> {
        match self.file.as_deref() {
            Some(STDIN_SOURCE) => Ok(DataSource::from_reader("stdin", io::stdin().lock())?),
            Some(path) => Ok(DataSource::Path(path.into())),
            None => Ok(DataSource::Path(config.data_path.clone().into())),
        }
    }
}

/// Print what the user can do about a failed load, then hand the error back.
fn report_load_error(err: SolarError, config: &Config) -> SolarError {
    match &err {
        SolarError::NotFound(path) => {
            eprintln!(
                "Data file {} not found. Pass --file <PATH>, or --file - to read from standard input.",
                path.display()
            );
        }
        SolarError::SchemaError { columns, .. } => {
            eprintln!("No country/location column found in the dataset!");
            eprintln!(
                "Looking for columns named: {}",
                config.location_aliases.join(", ")
            );
            eprintln!("Your columns are: {}", columns.join(", "));
            eprintln!("Re-run with --location-column <COLUMN> to choose one.");
        }
        SolarError::NoNumericColumns => {
            eprintln!("No numeric columns found in the dataset!");
        }
        _ => {}
    }
    err
}

fn load_insights(
    source: &DataSource,
    location_column: Option<&str>,
    cache: &mut TableCache,
    config: &Config,
    quiet: bool,
) -> SolarCliResult<SolarInsights> {
    let sp = (!quiet).then(|| {
        Spinner::with_timer(
            DEFAULT_PROGRESS_SPINNER,
            LOADING_STRING.to_string() + RUNNING_TAIL_STRING,
        )
    });
    let insights = SolarInsights::load(source, cache, config.clone(), location_column);
    if let Some(mut s) = sp {
        s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
    }
    let insights = insights.map_err(|err| report_load_error(err, config))?;
    if !quiet {
        println!("Successfully loaded {} records!", insights.table.height());
    }
    Ok(insights)
}

fn load_from_args(args: &SourceArgs, config: &Config, quiet: bool) -> SolarCliResult<SolarInsights> {
    let source = args.data_source(config)?;
    load_insights(
        &source,
        args.location_column.as_deref(),
        &mut TableCache::new(),
        config,
        quiet,
    )
}

/// Which locations and metric to look at.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    #[arg(
        short = 'l',
        long = "location",
        value_delimiter = ',',
        help = "Locations to analyse, comma-separated. Defaults to the first three"
    )]
    locations: Vec<String>,
    #[arg(
        short = 'a',
        long = "all",
        conflicts_with = "locations",
        help = "Select all locations"
    )]
    all: bool,
    #[arg(
        short = 'm',
        long,
        help = "Metric to analyse. Defaults to the first detected metric"
    )]
    metric: Option<String>,
}

impl SelectionArgs {
    fn locations(&self, insights: &SolarInsights) -> Vec<String> {
        if self.all {
            insights.locations.clone()
        } else if self.locations.is_empty() {
            insights.default_locations()
        } else {
            self.locations.clone()
        }
    }

    fn selection(&self, insights: &SolarInsights) -> SolarCliResult<Selection> {
        insights
            .selection(self.locations(insights), self.metric.as_deref())?
            .ok_or_else(|| {
                anyhow!(
                    "Please select at least one {}",
                    insights.roles.location_column.to_lowercase()
                )
                .into()
            })
    }
}

fn print_distribution(view: &DashboardView) {
    display_key_statistics(&view.key_statistics, &view.location_column);
    println!(
        "\nAnalyzing {} data points across {} {}s",
        view.filtered.height(),
        view.selection.locations.len(),
        view.location_column.to_lowercase()
    );
    display_boxplots(&view.boxplots, &view.location_column, &view.selection.metric);
    display_summary(view.summary.as_ref(), &view.selection.metric);
    println!("{}", outlier_line(view));
}

fn outlier_line(view: &DashboardView) -> String {
    format!(
        "Outliers in {} (|z| > {}): {} of {} records",
        view.selection.metric,
        view.outlier_threshold,
        view.outliers.count(),
        view.outliers.len()
    )
}

fn print_ranking(view: &DashboardView) {
    println!(
        "\nTop {} {}s by Average {}",
        view.top_n, view.group_column, view.selection.metric
    );
    display_ranking(&view.ranking, &view.group_column);
}

/// The `info` command shows the structure of the dataset and the detected column roles.
#[derive(Args, Debug)]
pub struct InfoCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for InfoCommand {
    fn run(&self, config: Config) -> SolarCliResult<()> {
        info!("Running `info` subcommand");
        let insights = load_from_args(&self.source, &config, self.quiet)?;
        println!("Detected location column: {}", insights.roles.location_column);
        if let Some(region) = insights.roles.region_column.as_ref() {
            println!("Detected region column: {region}");
        }
        println!("Metrics: {}", insights.roles.metric_columns.join(", "));
        display_dataset_info(&insights.info(), &insights.roles)?;
        Ok(())
    }
}

/// The `locations` command lists the distinct values of the location column.
#[derive(Args, Debug)]
pub struct LocationsCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for LocationsCommand {
    fn run(&self, config: Config) -> SolarCliResult<()> {
        info!("Running `locations` subcommand");
        let insights = load_from_args(&self.source, &config, self.quiet)?;
        display_locations(&insights.locations, &insights.roles.location_column);
        Ok(())
    }
}

/// The `stats` command shows key statistics and the distribution of a metric per location.
#[derive(Args, Debug)]
pub struct StatsCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    selection: SelectionArgs,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for StatsCommand {
    fn run(&self, config: Config) -> SolarCliResult<()> {
        info!("Running `stats` subcommand");
        let insights = load_from_args(&self.source, &config, self.quiet)?;
        let selection = self.selection.selection(&insights)?;
        let view = insights.view(&selection, config.default_top_n)?;
        if !view.has_data() {
            println!(
                "No data available for selected {}s.",
                view.location_column.to_lowercase()
            );
            return Ok(());
        }
        print_distribution(&view);
        Ok(())
    }
}

/// The `top` command ranks regions (or locations) by the average of a metric.
#[derive(Args, Debug)]
pub struct TopCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(short = 'm', long, help = "Metric to rank by")]
    metric: Option<String>,
    #[arg(
        short = 'n',
        long,
        help = "Number of top regions to display, between 3 and 20"
    )]
    top_n: Option<usize>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for TopCommand {
    fn run(&self, config: Config) -> SolarCliResult<()> {
        info!("Running `top` subcommand");
        let insights = load_from_args(&self.source, &config, self.quiet)?;
        let metric = self
            .metric
            .as_deref()
            .unwrap_or(insights.roles.default_metric());
        let top_n = insights
            .top_n_bounds()
            .clamp(self.top_n.unwrap_or(config.default_top_n));
        let group_column = insights.roles.group_column();
        println!("\nTop {top_n} {group_column}s by Average {metric}");
        display_ranking(&insights.ranking(metric, top_n), group_column);
        Ok(())
    }
}

/// The `rows` command browses, searches and exports the rows of the selected locations.
#[derive(Args, Debug)]
pub struct RowsCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    selection: SelectionArgs,
    #[arg(short = 's', long, help = "Only keep rows containing this text in any column")]
    search: Option<String>,
    #[arg(long, help = "Show every row rather than a preview")]
    full: bool,
    #[arg(
        short = 'o',
        long,
        help = "Write the rows to this file instead of displaying them"
    )]
    output_file: Option<String>,
    #[arg(
        long,
        conflicts_with = "output_file",
        help = "Write the rows to solar_data_<METRIC>.<FORMAT>"
    )]
    export: bool,
    #[arg(
        long,
        value_name = "csv|json",
        default_value = "csv",
        help = "Format of exported rows"
    )]
    output_format: OutputFormat,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for RowsCommand {
    fn run(&self, config: Config) -> SolarCliResult<()> {
        info!("Running `rows` subcommand");
        let insights = load_from_args(&self.source, &config, self.quiet)?;
        let selection = self.selection.selection(&insights)?;
        let rows = insights.rows(&selection, self.search.as_deref())?;
        debug!("{:?}", rows.frame().shape());

        let output_file = self
            .output_file
            .clone()
            .or_else(|| {
                self.export
                    .then(|| export_file_name(&selection.metric, self.output_format))
            });
        if let Some(output_file) = output_file {
            let formatter: OutputFormatter = (&self.output_format).into();
            write_output(formatter, rows.frame().clone(), Some(&output_file))?;
            println!("Wrote {} records to {output_file}", rows.height());
        } else if self.full || self.search.is_some() {
            if self.search.is_some() {
                println!("Found {} matching records", rows.height());
            }
            display_rows(&rows, None)?;
        } else {
            println!("Preview (first {} rows):", config.preview_rows);
            display_rows(&rows, Some(config.preview_rows))?;
        }
        Ok(())
    }
}

/// The `outliers` command lists rows whose z-score exceeds a threshold.
#[derive(Args, Debug)]
pub struct OutliersCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    selection: SelectionArgs,
    #[arg(
        short = 'c',
        long,
        value_delimiter = ',',
        help = "Numeric columns to test, comma-separated. Defaults to every metric"
    )]
    columns: Vec<String>,
    #[arg(short = 't', long, help = "Z-score threshold. Defaults to the configured value (3)")]
    threshold: Option<f64>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for OutliersCommand {
    fn run(&self, config: Config) -> SolarCliResult<()> {
        info!("Running `outliers` subcommand");
        let insights = load_from_args(&self.source, &config, self.quiet)?;
        let selection = self.selection.selection(&insights)?;
        let filtered = insights.filtered(&selection)?;
        let columns = if self.columns.is_empty() {
            insights.roles.metric_columns.clone()
        } else {
            self.columns.clone()
        };
        let threshold = self.threshold.unwrap_or(config.outlier_threshold);
        let outliers = insights.outlier_rows(&filtered, &columns, threshold)?;
        println!(
            "Found {} outlier(s) among {} records (|z| > {threshold} on {})",
            outliers.height(),
            filtered.height(),
            columns.join(", ")
        );
        if !outliers.is_empty() {
            display_rows(&outliers, None)?;
        }
        Ok(())
    }
}

/// A command typed into the interactive dashboard.
#[derive(Debug, Clone, PartialEq)]
enum DashboardAction {
    Select(Vec<String>),
    SelectAll,
    Metric(String),
    Top(usize),
    Search(Option<String>),
    ToggleRaw,
    Export(Option<String>),
    Help,
    Quit,
}

const DASHBOARD_HELP: &str = "\
Commands:
  select <A,B,...>   choose locations (empty clears the selection)
  all                select every location
  metric <NAME>      choose the metric
  top <N>            number of top regions to rank
  search [TEXT]      filter rows by text (no text clears the search)
  show               toggle the full row table
  export [PATH]      write the current rows as CSV
  help               show this message
  quit               leave the dashboard";

impl FromStr for DashboardAction {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());
        Ok(match command.to_lowercase().as_str() {
            "select" => DashboardAction::Select(
                rest.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            "all" => DashboardAction::SelectAll,
            "metric" => match argument {
                Some(metric) => DashboardAction::Metric(metric),
                None => bail!("Usage: metric <NAME>"),
            },
            "top" => DashboardAction::Top(
                rest.parse()
                    .map_err(|_| anyhow!("Usage: top <N>, got '{rest}'"))?,
            ),
            "search" => DashboardAction::Search(argument),
            "show" => DashboardAction::ToggleRaw,
            "export" => DashboardAction::Export(argument),
            "help" | "?" => DashboardAction::Help,
            "quit" | "exit" | "q" => DashboardAction::Quit,
            other => bail!("Unknown command '{other}'. Type 'help' for the list of commands."),
        })
    }
}

/// Choices the user has made in the dashboard so far.
#[derive(Debug, Clone, PartialEq)]
struct DashboardState {
    locations: Vec<String>,
    metric: String,
    top_n: usize,
    search: Option<String>,
    show_raw: bool,
}

impl DashboardState {
    fn new(insights: &SolarInsights) -> Self {
        Self {
            locations: insights.default_locations(),
            metric: insights.roles.default_metric().to_string(),
            top_n: insights
                .top_n_bounds()
                .clamp(insights.config.default_top_n),
            search: None,
            show_raw: false,
        }
    }

    /// Update the state; actions that do not change it (help, export, quit) are ignored.
    fn apply(&mut self, action: DashboardAction, insights: &SolarInsights) -> anyhow::Result<()> {
        match action {
            DashboardAction::Select(locations) => self.locations = locations,
            DashboardAction::SelectAll => self.locations = insights.locations.clone(),
            DashboardAction::Metric(metric) => {
                if !insights.roles.metric_columns.contains(&metric) {
                    bail!(
                        "Unknown metric '{metric}', expected one of: {}",
                        insights.roles.metric_columns.join(", ")
                    );
                }
                self.metric = metric;
            }
            DashboardAction::Top(n) => self.top_n = insights.top_n_bounds().clamp(n),
            DashboardAction::Search(term) => self.search = term,
            DashboardAction::ToggleRaw => self.show_raw = !self.show_raw,
            DashboardAction::Export(_) | DashboardAction::Help | DashboardAction::Quit => {}
        }
        Ok(())
    }

    fn selection(&self, insights: &SolarInsights) -> SolarCliResult<Option<Selection>> {
        Ok(insights.selection(self.locations.clone(), Some(&self.metric))?)
    }
}

fn render_dashboard(insights: &SolarInsights, state: &DashboardState) -> SolarCliResult<()> {
    let location_column = insights.roles.location_column.to_lowercase();
    let Some(selection) = state.selection(insights)? else {
        println!("\nPlease select at least one {location_column} (e.g. `select Benin,Togo` or `all`).");
        return Ok(());
    };
    let view = insights.view(&selection, state.top_n)?;
    if !view.has_data() {
        println!("\nNo data available for selected {location_column}s.");
        return Ok(());
    }
    print_distribution(&view);
    print_ranking(&view);
    if state.show_raw {
        let rows = insights.rows(&selection, state.search.as_deref())?;
        println!(
            "\nShowing {} records for selected {location_column}s",
            view.filtered.height()
        );
        if state.search.is_some() {
            println!("Found {} matching records", rows.height());
        }
        display_rows(&rows, None)?;
    } else {
        println!("\nPreview (first {} rows):", insights.config.preview_rows);
        display_rows(&view.filtered, Some(insights.config.preview_rows))?;
    }
    Ok(())
}

fn export_dashboard_rows(
    insights: &SolarInsights,
    state: &DashboardState,
    path: Option<String>,
) -> SolarCliResult<()> {
    let Some(selection) = state.selection(insights)? else {
        println!("Nothing to export: no {} selected.", insights.roles.location_column);
        return Ok(());
    };
    let rows = insights.rows(&selection, state.search.as_deref())?;
    let path = path.unwrap_or_else(|| export_file_name(&selection.metric, OutputFormat::Csv));
    write_output(CSVFormatter, rows.frame().clone(), Some(&path))?;
    println!("Wrote {} records to {path}", rows.height());
    Ok(())
}

/// The `dashboard` command runs an interactive session: each command read from standard
/// input updates the selection and the whole dashboard is rendered again.
#[derive(Args, Debug)]
pub struct DashboardCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for DashboardCommand {
    fn run(&self, config: Config) -> SolarCliResult<()> {
        info!("Running `dashboard` subcommand");
        if self.source.file.as_deref() == Some(STDIN_SOURCE) {
            return Err(anyhow!(
                "The dashboard reads commands from standard input; pass the data with --file <PATH>"
            )
            .into());
        }
        let source = self.source.data_source(&config)?;
        let location_column = self.source.location_column.as_deref();
        let mut cache = TableCache::new();
        let mut insights = load_insights(&source, location_column, &mut cache, &config, self.quiet)?;
        let mut state = DashboardState::new(&insights);
        println!("{DASHBOARD_HELP}");
        render_dashboard(&insights, &state)?;

        for line in io::stdin().lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let action = match line.parse::<DashboardAction>() {
                Ok(action) => action,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };
            debug!("dashboard action: {action:?}");
            match &action {
                DashboardAction::Quit => break,
                DashboardAction::Help => {
                    println!("{DASHBOARD_HELP}");
                    continue;
                }
                DashboardAction::Export(path) => {
                    export_dashboard_rows(&insights, &state, path.clone())?;
                    continue;
                }
                _ => {}
            }
            if let Err(err) = state.apply(action, &insights) {
                println!("{err}");
                continue;
            }
            // Every interaction re-runs the pipeline; an unchanged file comes from the cache
            insights = load_insights(&source, location_column, &mut cache, &config, true)?;
            render_dashboard(&insights, &state)?;
        }
        Ok(())
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about="Explore solar irradiance data from the terminal", long_about = None, name="solar-insights")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(
        short = 'q',
        long = "quiet",
        help = "\
            Do not print progress or load messages to stdout. Results and logs (when\n\
            `RUST_LOG` is set) will still be printed.",
        global = true
    )]
    quiet: bool,
}

/// Subcommands of the CLI, each implementing `RunCommand`.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Show the columns, detected roles and first rows of the dataset
    Info(InfoCommand),
    /// List the locations in the dataset
    Locations(LocationsCommand),
    /// Key statistics and distribution of a metric for the selected locations
    Stats(StatsCommand),
    /// Rank regions by the average of a metric
    Top(TopCommand),
    /// Browse, search and export the rows of the selected locations
    Rows(RowsCommand),
    /// List rows with outlying z-scores
    Outliers(OutliersCommand),
    /// Interactive dashboard
    Dashboard(DashboardCommand),
}

#[cfg(test)]
mod tests {
    use solar_insights::loader::load_csv;
    use tempfile::NamedTempFile;

    use super::*;

    fn sample_data() -> String {
        format!("{}/../data/solar_data.csv", env!("CARGO_MANIFEST_DIR"))
    }

    fn sample_source() -> SourceArgs {
        SourceArgs {
            file: Some(sample_data()),
            location_column: None,
        }
    }

    fn sample_insights() -> SolarInsights {
        load_from_args(&sample_source(), &Config::default(), true).unwrap()
    }

    #[test]
    fn rows_command_exports_the_filtered_view() {
        let output_file = NamedTempFile::new().unwrap();
        let output_path = output_file.path().to_string_lossy().to_string();
        let selection = SelectionArgs {
            locations: vec!["Benin".into(), "Togo".into()],
            all: false,
            metric: Some("DNI".into()),
        };
        let rows_command = RowsCommand {
            source: sample_source(),
            selection: selection.clone(),
            search: None,
            full: false,
            output_file: Some(output_path.clone()),
            export: false,
            output_format: OutputFormat::Csv,
            quiet: true,
        };
        rows_command.run(Config::default()).unwrap();

        let insights = sample_insights();
        let expected = insights
            .rows(&selection.selection(&insights).unwrap(), None)
            .unwrap();
        let exported = load_csv(&output_path).unwrap();
        assert_eq!(exported.height(), 20);
        assert_eq!(exported.height(), expected.height());
        assert!(exported.frame().equals_missing(expected.frame()));
    }

    #[test]
    fn commands_run_on_sample_data() {
        let quiet = true;
        InfoCommand {
            source: sample_source(),
            quiet,
        }
        .run(Config::default())
        .unwrap();
        StatsCommand {
            source: sample_source(),
            selection: SelectionArgs::default(),
            quiet,
        }
        .run(Config::default())
        .unwrap();
        TopCommand {
            source: sample_source(),
            metric: Some("GHI".into()),
            top_n: Some(50),
            quiet,
        }
        .run(Config::default())
        .unwrap();
        OutliersCommand {
            source: sample_source(),
            selection: SelectionArgs {
                all: true,
                ..Default::default()
            },
            columns: vec![],
            threshold: None,
            quiet,
        }
        .run(Config::default())
        .unwrap();
    }

    #[test]
    fn missing_file_fails() {
        let result = LocationsCommand {
            source: SourceArgs {
                file: Some("no/such/file.csv".into()),
                location_column: None,
            },
            quiet: true,
        }
        .run(Config::default());
        assert!(result.is_err());
    }

    #[test]
    fn selection_args_default_to_first_locations() {
        let insights = sample_insights();
        assert_eq!(insights.locations, vec!["Benin", "Ghana", "Sierra Leone", "Togo"]);
        let selection = SelectionArgs::default().selection(&insights).unwrap();
        assert_eq!(selection.locations(), vec!["Benin", "Ghana", "Sierra Leone"]);
        assert_eq!(selection.metric, "GHI");
        let all = SelectionArgs {
            all: true,
            ..Default::default()
        };
        assert_eq!(all.selection(&insights).unwrap().locations.len(), 4);
    }

    #[test]
    fn dashboard_actions_parse() {
        assert_eq!(
            "select Benin, Togo".parse::<DashboardAction>().unwrap(),
            DashboardAction::Select(vec!["Benin".into(), "Togo".into()])
        );
        assert_eq!(
            "select".parse::<DashboardAction>().unwrap(),
            DashboardAction::Select(vec![])
        );
        assert_eq!(
            "ALL".parse::<DashboardAction>().unwrap(),
            DashboardAction::SelectAll
        );
        assert_eq!(
            "metric DNI".parse::<DashboardAction>().unwrap(),
            DashboardAction::Metric("DNI".into())
        );
        assert_eq!(
            "top 7".parse::<DashboardAction>().unwrap(),
            DashboardAction::Top(7)
        );
        assert_eq!(
            "search sierra leone".parse::<DashboardAction>().unwrap(),
            DashboardAction::Search(Some("sierra leone".into()))
        );
        assert_eq!(
            "search".parse::<DashboardAction>().unwrap(),
            DashboardAction::Search(None)
        );
        assert_eq!(
            "export out.csv".parse::<DashboardAction>().unwrap(),
            DashboardAction::Export(Some("out.csv".into()))
        );
        assert_eq!("q".parse::<DashboardAction>().unwrap(), DashboardAction::Quit);
        assert!("top many".parse::<DashboardAction>().is_err());
        assert!("metric".parse::<DashboardAction>().is_err());
        assert!("dance".parse::<DashboardAction>().is_err());
    }

    #[test]
    fn dashboard_state_follows_actions() {
        let insights = sample_insights();
        let mut state = DashboardState::new(&insights);
        assert_eq!(state.top_n, 4);
        assert_eq!(state.metric, "GHI");

        state.apply(DashboardAction::Top(1), &insights).unwrap();
        assert_eq!(state.top_n, 3);
        state.apply(DashboardAction::SelectAll, &insights).unwrap();
        assert_eq!(state.locations.len(), 4);
        assert!(state
            .apply(DashboardAction::Metric("Country".into()), &insights)
            .is_err());
        assert_eq!(state.metric, "GHI");
        state.apply(DashboardAction::Select(vec![]), &insights).unwrap();
        assert_eq!(state.selection(&insights).unwrap(), None);
        render_dashboard(&insights, &state).unwrap();
    }

    #[test]
    fn distribution_reports_outlier_count() {
        let insights = sample_insights();
        let selection = SelectionArgs {
            all: true,
            ..Default::default()
        }
        .selection(&insights)
        .unwrap();
        let view = insights.view(&selection, 5).unwrap();
        assert_eq!(view.outliers.len(), 40);
        assert_eq!(
            outlier_line(&view),
            format!("Outliers in GHI (|z| > 3): {} of 40 records", view.outliers.count())
        );
    }

    #[test]
    fn export_file_names() {
        assert_eq!(export_file_name("GHI", OutputFormat::Csv), "solar_data_GHI.csv");
        assert_eq!(export_file_name("RH", OutputFormat::Json), "solar_data_RH.json");
    }

    #[test]
    fn output_type_should_deserialize_properly() {
        let output_format = OutputFormat::from_str("CSV");
        assert_eq!(
            output_format.unwrap(),
            OutputFormat::Csv,
            "parsing should be case insensitive"
        );
        let output_format = OutputFormat::from_str("parquet");
        assert!(output_format.is_err(), "non listed formats should fail");
    }

    #[test]
    fn cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
