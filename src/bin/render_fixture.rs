use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use vizbind::api::{
    BarChart, BarChartConfig, BubbleChart, BubbleChartConfig, ChartPage, CoinChart,
    CoinChartConfig, ForceGraph, ForceGraphConfig, Surface, coins_from_json, countries_from_json,
    graph_from_json, revenues_from_json,
};
use vizbind::render::{Color, Renderer, SvgRenderer};

const USAGE: &str = "usage: render_fixture <bar|bubble|force|coin> --input <path> [--config <path>] [--output <path>] [--frames <n>] [--index <n>] [--coin <name>] [--metric <name>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    Bar,
    Bubble,
    Force,
    Coin,
}

#[derive(Debug)]
struct CliArgs {
    page: PageKind,
    input: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    frames: u32,
    index: Option<usize>,
    coin: Option<String>,
    metric: Option<String>,
}

fn main() {
    let _ = vizbind::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let fixture = read(&args.input)?;
    let config = args.config.as_deref().map(read).transpose()?;

    let mut page: Box<dyn ChartPage> = match args.page {
        PageKind::Bar => {
            let config = parse_config(config.as_deref(), BarChartConfig::from_json_str)?;
            let mut page = BarChart::new(config);
            page.set_data(revenues_from_json(&fixture).map_err(|err| err.to_string())?);
            Box::new(page)
        }
        PageKind::Bubble => {
            let config = parse_config(config.as_deref(), BubbleChartConfig::from_json_str)?;
            let mut page = BubbleChart::new(config);
            page.set_frames(countries_from_json(&fixture).map_err(|err| err.to_string())?);
            if let Some(index) = args.index {
                page.scrub(index);
            }
            Box::new(page)
        }
        PageKind::Force => {
            let config = parse_config(config.as_deref(), ForceGraphConfig::from_json_str)?;
            let mut page = ForceGraph::new(config);
            page.set_graph(graph_from_json(&fixture).map_err(|err| err.to_string())?)
                .map_err(|err| err.to_string())?;
            Box::new(page)
        }
        PageKind::Coin => {
            let config = parse_config(config.as_deref(), CoinChartConfig::from_json_str)?;
            let mut page = CoinChart::new(config);
            page.set_data(coins_from_json(&fixture).map_err(|err| err.to_string())?);
            if let Some(coin) = &args.coin {
                page.select_coin(coin).map_err(|err| err.to_string())?;
            }
            if let Some(metric) = &args.metric {
                page.select_metric(metric).map_err(|err| err.to_string())?;
            }
            Box::new(page)
        }
    };

    let viewport = page.scene().viewport();
    page.mount(Surface::new(viewport));
    // Frames are spaced far enough apart for every transition to settle.
    for frame in 0..args.frames.max(1) {
        page.render(Duration::from_secs(u64::from(frame)))
            .map_err(|err| err.to_string())?;
    }
    let frame = page.frame().ok_or_else(|| "page has no surface".to_owned())?;

    let mut renderer = SvgRenderer::new().with_background(Color::WHITE);
    renderer.render(frame).map_err(|err| err.to_string())?;
    match &args.output {
        Some(path) => fs::write(path, renderer.document())
            .map_err(|err| format!("failed to write `{}`: {err}", path.display())),
        None => {
            print!("{}", renderer.document());
            Ok(())
        }
    }
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("failed to read `{}`: {err}", path.display()))
}

fn parse_config<C: Default>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> vizbind::ChartResult<C>,
) -> Result<C, String> {
    raw.map_or_else(|| Ok(C::default()), |raw| parse(raw).map_err(|err| err.to_string()))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let page = match args.next().as_deref() {
        Some("bar") => PageKind::Bar,
        Some("bubble") => PageKind::Bubble,
        Some("force") => PageKind::Force,
        Some("coin") => PageKind::Coin,
        _ => return Err(USAGE.to_owned()),
    };

    let mut input = None::<PathBuf>;
    let mut config = None::<PathBuf>;
    let mut output = None::<PathBuf>;
    let mut frames = None::<u32>;
    let mut index = None::<usize>;
    let mut coin = None::<String>;
    let mut metric = None::<String>;

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--input" => input = Some(PathBuf::from(value()?)),
            "--config" => config = Some(PathBuf::from(value()?)),
            "--output" => output = Some(PathBuf::from(value()?)),
            "--frames" => {
                let raw = value()?;
                frames = Some(
                    raw.parse()
                        .map_err(|_| format!("invalid frame count `{raw}`"))?,
                );
            }
            "--index" => {
                let raw = value()?;
                index = Some(
                    raw.parse()
                        .map_err(|_| format!("invalid frame index `{raw}`"))?,
                );
            }
            "--coin" => coin = Some(value()?),
            "--metric" => metric = Some(value()?),
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`")),
        }
    }

    let default_frames = if page == PageKind::Force { 300 } else { 1 };
    Ok(CliArgs {
        page,
        input: input.ok_or_else(|| "missing --input".to_owned())?,
        config,
        output,
        frames: frames.unwrap_or(default_frames),
        index,
        coin,
        metric,
    })
}
