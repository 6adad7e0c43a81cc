use super::{
    FuelPrices, InflationSeries, Measure, SeriesTable, DEFAULT_FUEL_CSV, INFLATION_EXPORT_NAME,
    INSEE_URL, SP95_EXPORT_NAME, VERSION,
};
use crate::error::DashboardError;
use crate::export::write_csv;
use crate::memo::Memo;
use crate::merge::merge;
use crate::render::{chart_path, render_error, ChartStyle};
use crate::scrape::PageSource;
use crate::view::{apply, default_years, displayed_columns, ViewOptions};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The two dashboards: fuel prices against the indices, or the indices alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    Sp95,
    Inflation,
}

impl DashboardKind {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardKind::Sp95 => "sp95_dashboard",
            DashboardKind::Inflation => "inflation_dashboard",
        }
    }

    fn about(&self) -> &'static str {
        match self {
            DashboardKind::Sp95 => "cli dashboard comparing the SP95 price with the IPC, IPCH and ISJ indices",
            DashboardKind::Inflation => "cli dashboard of the IPC, IPCH and ISJ indices scraped from INSEE",
        }
    }

    pub fn chart_stem(&self) -> &'static str {
        match self {
            DashboardKind::Sp95 => "sp95_inflation",
            DashboardKind::Inflation => "inflation",
        }
    }

    pub fn export_name(&self) -> &'static str {
        match self {
            DashboardKind::Sp95 => SP95_EXPORT_NAME,
            DashboardKind::Inflation => INFLATION_EXPORT_NAME,
        }
    }

    pub fn available_measures(&self) -> &'static [Measure] {
        match self {
            DashboardKind::Sp95 => &Measure::ALL,
            DashboardKind::Inflation => &Measure::INFLATION,
        }
    }

    pub fn default_measures(&self) -> Vec<Measure> {
        match self {
            DashboardKind::Sp95 => vec![Measure::Sp95, Measure::Ipc],
            DashboardKind::Inflation => Measure::INFLATION.to_vec(),
        }
    }
}

/// Everything the command line controls.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardArgs {
    pub csvin: PathBuf,
    pub url: String,
    pub measures: Vec<Measure>,
    /// None selects the last five years of the data.
    pub years: Option<BTreeSet<i32>>,
    pub normalize: bool,
    pub style: ChartStyle,
    pub outdir: PathBuf,
    pub timeout: Duration,
    pub session: bool,
    pub describe: bool,
    pub verbose: bool,
}

pub fn build_command(kind: DashboardKind) -> Command {
    let curve_names: Vec<&'static str> = kind.available_measures().iter().map(|m| m.label()).collect();
    let default_curves: Vec<&'static str> = kind.default_measures().iter().map(|m| m.label()).collect();
    let arg_csvin = Arg::new("input_csvfile")
        .help("name for the csv file with the Date and Prix columns")
        .short('f')
        .long("csvfile")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value(DEFAULT_FUEL_CSV);
    let arg_url = Arg::new("url")
        .help("page listing the monthly IPCH, ISJ and IPC values")
        .short('u')
        .long("url")
        .num_args(1)
        .default_value(INSEE_URL);
    let arg_curves = Arg::new("curves")
        .help("curves to display")
        .short('c')
        .long("curves")
        .num_args(1..)
        .value_delimiter(',')
        .action(ArgAction::Append)
        .ignore_case(true)
        .value_parser(curve_names)
        .default_values(default_curves);
    let arg_years = Arg::new("years")
        .help("years to display, the last five available by default")
        .short('y')
        .long("years")
        .num_args(1..)
        .value_delimiter(',')
        .action(ArgAction::Append)
        .value_parser(value_parser!(i32));
    let arg_normalize = Arg::new("normalize")
        .help("rebase every curve to 100 at the first displayed month")
        .short('n')
        .long("normalize")
        .action(ArgAction::SetTrue);
    let arg_style = Arg::new("style")
        .help("interactive html chart (plotly) or static svg chart (xkcd style)")
        .short('s')
        .long("style")
        .num_args(1)
        .value_parser(["interactive", "static"])
        .default_value("interactive");
    let arg_outdir = Arg::new("outdir")
        .help("directory for the chart and the exported csv")
        .short('o')
        .long("outdir")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value(".");
    let arg_timeout = Arg::new("timeout")
        .help("http timeout, in seconds")
        .long("timeout")
        .num_args(1)
        .value_parser(value_parser!(u64))
        .default_value("15");
    let arg_session = Arg::new("session")
        .help("keep reading display changes from stdin (years, curves, normalize, style, refresh, show, quit)")
        .long("session")
        .action(ArgAction::SetTrue);
    let arg_describe = Arg::new("describe")
        .help("print what IPCH, IPC and ISJ measure and exit")
        .long("describe")
        .action(ArgAction::SetTrue);
    let arg_verbose = Arg::new("verbose")
        .help("print verbose information")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue);
    let cmd = Command::new(kind.name())
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about(kind.about())
        .arg(arg_url)
        .arg(arg_curves)
        .arg(arg_years)
        .arg(arg_normalize)
        .arg(arg_style)
        .arg(arg_outdir)
        .arg(arg_timeout)
        .arg(arg_session)
        .arg(arg_describe)
        .arg(arg_verbose);
    match kind {
        DashboardKind::Sp95 => cmd.arg(arg_csvin),
        DashboardKind::Inflation => cmd,
    }
}

/// Takes the CLI arguments of the given dashboard.
pub fn parse_cli(kind: DashboardKind) -> DashboardArgs {
    let matches = build_command(kind).get_matches();
    args_from_matches(kind, &matches)
}

/// Values with a default or a restricted set of possible values
/// are enforced by clap, so they can be safely unwrapped.
pub fn args_from_matches(kind: DashboardKind, m: &ArgMatches) -> DashboardArgs {
    let csvin = match kind {
        DashboardKind::Sp95 => m.get_one::<PathBuf>("input_csvfile").unwrap().to_owned(),
        DashboardKind::Inflation => PathBuf::from(DEFAULT_FUEL_CSV),
    };
    let mut measures: Vec<Measure> = Vec::new();
    for c in m.get_many::<String>("curves").unwrap() {
        let measure: Measure = c.parse().unwrap();
        if !measures.contains(&measure) {
            measures.push(measure);
        }
    }
    let years = m
        .get_many::<i32>("years")
        .map(|ys| ys.copied().collect::<BTreeSet<i32>>());
    let style: ChartStyle = m.get_one::<String>("style").unwrap().parse().unwrap();
    DashboardArgs {
        csvin,
        url: m.get_one::<String>("url").unwrap().to_owned(),
        measures,
        years,
        normalize: m.get_flag("normalize"),
        style,
        outdir: m.get_one::<PathBuf>("outdir").unwrap().to_owned(),
        timeout: Duration::from_secs(*m.get_one::<u64>("timeout").unwrap()),
        session: m.get_flag("session"),
        describe: m.get_flag("describe"),
        verbose: m.get_flag("verbose"),
    }
}

pub fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub chart: PathBuf,
    pub export: PathBuf,
    pub view: SeriesTable,
}

/// The data sources of one dashboard, memoized per path and per url
/// for as long as the dashboard lives.
pub struct Dashboard<S: PageSource> {
    kind: DashboardKind,
    source: S,
    csvin: PathBuf,
    url: String,
    fuel_cache: Memo<PathBuf, FuelPrices>,
    inflation_cache: Memo<String, InflationSeries>,
}

impl<S: PageSource> Dashboard<S> {
    pub fn new(kind: DashboardKind, source: S, csvin: PathBuf, url: String) -> Dashboard<S> {
        Dashboard {
            kind,
            source,
            csvin,
            url,
            fuel_cache: Memo::new("fuel prices"),
            inflation_cache: Memo::new("inflation page"),
        }
    }

    pub fn kind(&self) -> DashboardKind {
        self.kind
    }

    pub fn fuel_prices(&mut self) -> Result<FuelPrices, DashboardError> {
        self.fuel_cache
            .get_or_try_insert_with(&self.csvin, |p| FuelPrices::from_csv(p))
    }

    pub fn inflation(&mut self) -> Result<InflationSeries, DashboardError> {
        let source = &self.source;
        self.inflation_cache
            .get_or_try_insert_with(&self.url, |url| InflationSeries::fetch(source, url))
    }

    /// Number of times the page was actually requested.
    pub fn page_fetches(&self) -> usize {
        self.inflation_cache.misses()
    }

    /// Forget the loaded data; the next run reads the file and fetches the page again.
    pub fn refresh(&mut self) {
        info!("clearing the cached fuel prices and inflation page");
        self.fuel_cache.clear();
        self.inflation_cache.clear();
    }

    /// The unfiltered table of this dashboard:
    /// the merged series, or the inflation series alone.
    pub fn base_table(&mut self) -> Result<SeriesTable, DashboardError> {
        match self.kind {
            DashboardKind::Sp95 => {
                let fuel = self.fuel_prices()?;
                let inflation = self.inflation()?;
                Ok(merge(&fuel, &inflation))
            }
            DashboardKind::Inflation => Ok(self.inflation()?.to_table()),
        }
    }

    /// Run the pipeline for the given view and write the chart and the export to `outdir`.
    /// On failure the chart is replaced by an error indicator before the error is returned.
    pub fn render_view(
        &mut self,
        opts: &ViewOptions,
        style: ChartStyle,
        outdir: &Path,
    ) -> Result<Rendered, DashboardError> {
        let chart = chart_path(outdir, self.kind.chart_stem(), style);
        match self.try_render_view(opts, style, outdir, &chart) {
            Ok(r) => Ok(r),
            Err(e) => {
                error!("{}", e);
                if let Err(e2) = render_error(style, &chart, &e) {
                    error!("{}", e2);
                }
                Err(e)
            }
        }
    }

    fn try_render_view(
        &mut self,
        opts: &ViewOptions,
        style: ChartStyle,
        outdir: &Path,
        chart: &Path,
    ) -> Result<Rendered, DashboardError> {
        let table = self.base_table()?;
        let view = apply(&table, opts);
        style
            .renderer()
            .render(&view, &opts.measures, opts.normalize, chart)?;
        let export = outdir.join(self.kind.export_name());
        write_csv(&view, &opts.measures, &export)?;
        Ok(Rendered {
            chart: chart.to_path_buf(),
            export,
            view,
        })
    }
}

/// A change of the display read from the session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Years(BTreeSet<i32>),
    Curves(Vec<Measure>),
    Normalize(bool),
    Style(ChartStyle),
    Refresh,
    Show,
    Quit,
}

pub fn parse_command(line: &str, kind: DashboardKind) -> Result<SessionCommand, String> {
    let mut words = line.split(|c: char| c.is_whitespace() || c == ',').filter(|w| !w.is_empty());
    let verb = words.next().ok_or("empty command")?;
    match verb.to_ascii_lowercase().as_str() {
        "years" => {
            let mut years = BTreeSet::new();
            for w in words {
                years.insert(w.parse::<i32>().map_err(|_| format!("not a year: {}", w))?);
            }
            Ok(SessionCommand::Years(years))
        }
        "curves" => {
            let mut measures = Vec::new();
            for w in words {
                let m: Measure = w.parse()?;
                if !kind.available_measures().contains(&m) {
                    return Err(format!("{} is not available in {}", m, kind.name()));
                }
                if !measures.contains(&m) {
                    measures.push(m);
                }
            }
            Ok(SessionCommand::Curves(measures))
        }
        "normalize" => match words.next().map(|w| w.to_ascii_lowercase()).as_deref() {
            Some("on") | Some("true") | Some("1") => Ok(SessionCommand::Normalize(true)),
            Some("off") | Some("false") | Some("0") => Ok(SessionCommand::Normalize(false)),
            _ => Err(String::from("usage: normalize on|off")),
        },
        "style" => {
            let s = words.next().ok_or("usage: style interactive|static")?;
            Ok(SessionCommand::Style(s.parse()?))
        }
        "refresh" => Ok(SessionCommand::Refresh),
        "show" => Ok(SessionCommand::Show),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command: {}", other)),
    }
}

fn report<W: Write>(out: &mut W, r: &Rendered, measures: &[Measure]) -> std::io::Result<()> {
    writeln!(out, "{}", r.view.select(&displayed_columns(measures)))?;
    writeln!(out, "chart written to {}", r.chart.display())?;
    writeln!(out, "data written to {}", r.export.display())
}

/// Apply display changes read line by line, re-running the pipeline after each one.
/// Pipeline failures are reported and the session goes on; `refresh` retries the sources.
pub fn run_session<S, R, W>(
    dashboard: &mut Dashboard<S>,
    opts: &mut ViewOptions,
    style: &mut ChartStyle,
    outdir: &Path,
    input: R,
    out: &mut W,
) -> Result<(), DashboardError>
where
    S: PageSource,
    R: BufRead,
    W: Write,
{
    let io_err = |e: std::io::Error| DashboardError::Export(e.to_string());
    for line in input.lines() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match parse_command(&line, dashboard.kind()) {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(out, "{}", e).map_err(io_err)?;
                continue;
            }
        };
        match cmd {
            SessionCommand::Quit => break,
            SessionCommand::Years(y) => opts.years = y,
            SessionCommand::Curves(c) => opts.measures = c,
            SessionCommand::Normalize(n) => opts.normalize = n,
            SessionCommand::Style(s) => *style = s,
            SessionCommand::Refresh => dashboard.refresh(),
            SessionCommand::Show => {}
        }
        match dashboard.render_view(opts, *style, outdir) {
            Ok(r) => report(out, &r, &opts.measures).map_err(io_err)?,
            Err(e) => writeln!(out, "error: {}", e).map_err(io_err)?,
        }
    }
    Ok(())
}

/// Entry point shared by both binaries.
pub fn run<S: PageSource>(kind: DashboardKind, args: &DashboardArgs, source: S) -> Result<(), DashboardError> {
    if args.describe {
        for m in kind.available_measures().iter() {
            println!("{}\n", m.description());
        }
        return Ok(());
    }
    std::fs::create_dir_all(&args.outdir)
        .map_err(|e| DashboardError::file_access(&args.outdir, e))?;

    let mut dashboard = Dashboard::new(kind, source, args.csvin.clone(), args.url.clone());
    let years = match &args.years {
        Some(years) => years.clone(),
        None => match dashboard.base_table() {
            Ok(table) => default_years(&table),
            Err(e) => {
                error!("{}", e);
                let chart = chart_path(&args.outdir, kind.chart_stem(), args.style);
                render_error(args.style, &chart, &e)?;
                return Err(e);
            }
        },
    };
    let mut opts = ViewOptions {
        years,
        measures: args.measures.clone(),
        normalize: args.normalize,
    };
    let mut style = args.style;
    info!(
        "{}: curves {:?}, years {:?}, normalize {}, style {}",
        kind.name(),
        opts.measures,
        opts.years,
        opts.normalize,
        style
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match dashboard.render_view(&opts, style, &args.outdir) {
        Ok(r) => report(&mut out, &r, &opts.measures)
            .map_err(|e| DashboardError::Export(e.to_string()))?,
        Err(e) if !args.session => return Err(e),
        Err(_) => {}
    }
    if args.session {
        let stdin = std::io::stdin();
        run_session(&mut dashboard, &mut opts, &mut style, &args.outdir, stdin.lock(), &mut out)?;
    }
    debug!("{}: page fetched {} time(s)", kind.name(), dashboard.page_fetches());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Cursor;

    struct FakePage {
        body: Option<String>,
        calls: Cell<usize>,
    }

    impl FakePage {
        fn serving(body: &str) -> FakePage {
            FakePage {
                body: Some(body.to_owned()),
                calls: Cell::new(0),
            }
        }

        fn down() -> FakePage {
            FakePage {
                body: None,
                calls: Cell::new(0),
            }
        }
    }

    impl PageSource for FakePage {
        fn fetch(&self, url: &str) -> Result<String, DashboardError> {
            self.calls.set(self.calls.get() + 1);
            self.body.clone().ok_or_else(|| DashboardError::Fetch {
                url: url.to_owned(),
                reason: String::from("network unreachable"),
            })
        }
    }

    const PAGE: &str = "<table>\
        <tr><td>2023-12</td><td>117.9</td><td>119.8</td><td>117.1</td></tr>\
        <tr><td>2024-01</td><td>118.2</td><td>120.1</td><td>117.5</td></tr>\
        <tr><td>2024-02</td><td>118.5</td><td>120.4</td><td>117.8</td></tr>\
        </table>";

    fn fuel_csv(dir: &Path) -> PathBuf {
        let p = dir.join("prix.csv");
        std::fs::write(&p, "Date,Prix\n2023-12-01,1.80\n2024-01-01,1.85\n2024-03-01,1.90\n").unwrap();
        p
    }

    fn opts(years: &[i32], measures: &[Measure], normalize: bool) -> ViewOptions {
        ViewOptions {
            years: years.iter().copied().collect(),
            measures: measures.to_vec(),
            normalize,
        }
    }

    #[test]
    fn cli_defaults() {
        let m = build_command(DashboardKind::Sp95).try_get_matches_from(["sp95_dashboard"]).unwrap();
        let a = args_from_matches(DashboardKind::Sp95, &m);
        assert_eq!(a.csvin, PathBuf::from(DEFAULT_FUEL_CSV));
        assert_eq!(a.url, INSEE_URL);
        assert_eq!(a.measures, vec![Measure::Sp95, Measure::Ipc]);
        assert_eq!(a.years, None);
        assert!(!a.normalize && !a.session && !a.describe);
        assert_eq!(a.style, ChartStyle::Interactive);
        assert_eq!(a.timeout, Duration::from_secs(15));
    }

    #[test]
    fn cli_values() {
        let m = build_command(DashboardKind::Sp95)
            .try_get_matches_from([
                "sp95_dashboard", "-c", "isj,ipc", "-c", "ISJ", "-y", "2023", "2024", "-n", "-s", "static",
                "-o", "out", "--timeout", "3",
            ])
            .unwrap();
        let a = args_from_matches(DashboardKind::Sp95, &m);
        assert_eq!(a.measures, vec![Measure::Isj, Measure::Ipc]);
        assert_eq!(a.years, Some([2023, 2024].into_iter().collect()));
        assert!(a.normalize);
        assert_eq!(a.style, ChartStyle::Static);
        assert_eq!(a.outdir, PathBuf::from("out"));
        assert_eq!(a.timeout, Duration::from_secs(3));
    }

    #[test]
    fn inflation_cli_rejects_sp95_and_csvfile() {
        let cmd = || build_command(DashboardKind::Inflation);
        assert!(cmd().try_get_matches_from(["inflation_dashboard", "-c", "SP95"]).is_err());
        assert!(cmd().try_get_matches_from(["inflation_dashboard", "-f", "x.csv"]).is_err());
        let m = cmd().try_get_matches_from(["inflation_dashboard"]).unwrap();
        let a = args_from_matches(DashboardKind::Inflation, &m);
        assert_eq!(a.measures, Measure::INFLATION.to_vec());
    }

    #[test]
    fn page_is_fetched_once_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = Dashboard::new(DashboardKind::Sp95, FakePage::serving(PAGE), fuel_csv(dir.path()), "u".into());
        let first = d
            .render_view(&opts(&[2023, 2024], &[Measure::Sp95, Measure::Ipc], false), ChartStyle::Interactive, dir.path())
            .unwrap();
        let second = d
            .render_view(&opts(&[2024], &[Measure::Ipch], true), ChartStyle::Interactive, dir.path())
            .unwrap();
        assert_eq!(d.source.calls.get(), 1);
        assert_eq!(d.page_fetches(), 1);
        assert_eq!(first.view.len(), 2);
        assert_eq!(second.view.len(), 1);
        assert_eq!(second.view.column("IPCH_norm"), Some(&[100.][..]));
        assert_eq!(d.inflation().unwrap(), d.inflation().unwrap());
        assert_eq!(d.source.calls.get(), 1);

        d.refresh();
        d.base_table().unwrap();
        assert_eq!(d.source.calls.get(), 2);
    }

    #[test]
    fn merged_run_writes_chart_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = Dashboard::new(DashboardKind::Sp95, FakePage::serving(PAGE), fuel_csv(dir.path()), "u".into());
        let r = d
            .render_view(&opts(&[2024], &[Measure::Sp95, Measure::Ipc], false), ChartStyle::Interactive, dir.path())
            .unwrap();
        assert_eq!(r.chart, dir.path().join("sp95_inflation.html"));
        let csv = std::fs::read_to_string(&r.export).unwrap();
        assert_eq!(csv, "Date,IPC,Prix\n2024-01-01,117.5,1.85\n");
    }

    #[test]
    fn fetch_failure_replaces_chart_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("inflation.html");
        std::fs::write(&chart, "old chart").unwrap();
        let mut d = Dashboard::new(DashboardKind::Inflation, FakePage::down(), PathBuf::new(), "u".into());
        let err = d
            .render_view(&opts(&[2024], &[Measure::Ipc], false), ChartStyle::Interactive, dir.path())
            .unwrap_err();
        assert!(matches!(err, DashboardError::Fetch { .. }));
        let html = std::fs::read_to_string(&chart).unwrap();
        assert!(html.contains("network unreachable"));
        assert!(!html.contains("old chart"));
    }

    #[test]
    fn missing_fuel_file_is_fatal_for_merged_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = Dashboard::new(
            DashboardKind::Sp95,
            FakePage::serving(PAGE),
            dir.path().join("missing.csv"),
            "u".into(),
        );
        let err = d.base_table().unwrap_err();
        assert!(matches!(err, DashboardError::FileAccess { .. }));
    }

    #[test]
    fn parse_session_commands() {
        let k = DashboardKind::Sp95;
        assert_eq!(
            parse_command("years 2023, 2024", k),
            Ok(SessionCommand::Years([2023, 2024].into_iter().collect()))
        );
        assert_eq!(parse_command("years", k), Ok(SessionCommand::Years(BTreeSet::new())));
        assert_eq!(
            parse_command("curves sp95 ipc sp95", k),
            Ok(SessionCommand::Curves(vec![Measure::Sp95, Measure::Ipc]))
        );
        assert!(parse_command("curves sp95", DashboardKind::Inflation).is_err());
        assert_eq!(parse_command("normalize ON", k), Ok(SessionCommand::Normalize(true)));
        assert!(parse_command("normalize maybe", k).is_err());
        assert_eq!(parse_command("style static", k), Ok(SessionCommand::Style(ChartStyle::Static)));
        assert_eq!(parse_command("refresh", k), Ok(SessionCommand::Refresh));
        assert_eq!(parse_command("quit", k), Ok(SessionCommand::Quit));
        assert!(parse_command("dance", k).is_err());
        assert!(parse_command("years twenty", k).is_err());
    }

    #[test]
    fn session_reruns_without_refetching() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = Dashboard::new(DashboardKind::Inflation, FakePage::serving(PAGE), PathBuf::new(), "u".into());
        let mut o = opts(&[2024], &[Measure::Ipc], false);
        let mut style = ChartStyle::Interactive;
        let input = Cursor::new("years 2023 2024\nnormalize on\nbogus\nyears\nquit\nyears 2024\n");
        let mut out: Vec<u8> = Vec::new();
        run_session(&mut d, &mut o, &mut style, dir.path(), input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unknown command: bogus"));
        assert!(o.normalize);
        assert!(o.years.is_empty());
        assert_eq!(d.source.calls.get(), 1);
        let csv = std::fs::read_to_string(dir.path().join(INFLATION_EXPORT_NAME)).unwrap();
        assert_eq!(csv, "Date,IPC\n");
    }
}
