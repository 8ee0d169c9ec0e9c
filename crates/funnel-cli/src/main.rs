use funnel_core::{Engine, FunnelConfig};
use funnel_render::LayoutOptions;
use funnel_render::svg::{SvgRenderOptions, render_funnel_debug_svg};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Funnel(funnel_core::Error),
    Render(funnel_render::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Funnel(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<funnel_core::Error> for CliError {
    fn from(value: funnel_core::Error) -> Self {
        Self::Funnel(value)
    }
}

impl From<funnel_render::Error> for CliError {
    fn from(value: funnel_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Parse,
    Detect,
    Layout,
    Render,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    with_meta: bool,
    plot_width: f64,
    plot_height: f64,
    overrides: Vec<(String, Value)>,
    include_placeholders: bool,
    diagram_id: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
struct MetaOut<'a> {
    series_type: &'a str,
    config: &'a Value,
    effective_config: &'a Value,
    title: Option<&'a str>,
}

#[derive(Serialize)]
struct ParseOut<'a> {
    meta: MetaOut<'a>,
    model: &'a Value,
}

fn usage() -> &'static str {
    "funnel-cli\n\
\n\
USAGE:\n\
  funnel-cli [parse] [--pretty] [--meta] [--set <key>=<json>]... [<path>|-]\n\
  funnel-cli detect [<path>|-]\n\
  funnel-cli layout [--pretty] [--plot-width <w>] [--plot-height <h>] [--set <key>=<json>]... [<path>|-]\n\
  funnel-cli render [--plot-width <w>] [--plot-height <h>] [--set <key>=<json>]... [--placeholders] [--id <diagram-id>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is a JSON document: { \"type\": \"funnel\"|\"pyramid\", \"options\": {..}, \"data\": [..] }.\n\
  - --set applies a series option to every document, e.g. --set dataLabels.position='\"left\"'.\n\
    Values are JSON; anything that is not valid JSON is taken as a string.\n\
  - render prints a debug SVG to stdout by default; use --out to write a file.\n\
  - Set FUNNEL_LOG (e.g. FUNNEL_LOG=debug) to see layout diagnostics on stderr.\n\
"
}

fn parse_override(raw: &str) -> Option<(String, Value)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = serde_json::from_str::<Value>(value.trim())
        .unwrap_or_else(|_| Value::String(value.trim().to_string()));
    Some((key.to_string(), value))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Parse,
        plot_width: LayoutOptions::default().plot_width,
        plot_height: LayoutOptions::default().plot_height,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "parse" => args.command = Command::Parse,
            "detect" => args.command = Command::Detect,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--meta" => args.with_meta = true,
            "--placeholders" => args.include_placeholders = true,
            "--plot-width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.plot_width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !args.plot_width.is_finite() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--plot-height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.plot_height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !args.plot_height.is_finite() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--set" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let Some(kv) = parse_override(raw) else {
                    return Err(CliError::Usage(usage()));
                };
                args.overrides.push(kv);
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FUNNEL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let mut engine = Engine::new();
    if !args.overrides.is_empty() {
        let mut cfg = FunnelConfig::empty_object();
        for (key, value) in &args.overrides {
            cfg.set_value(key, value.clone());
        }
        engine = engine.with_site_config(cfg);
    }

    let parsed = engine.parse_document_sync(&text)?;
    tracing::debug!(series_type = %parsed.meta.series_type, "document parsed");

    let layout_opts = LayoutOptions::with_plot_size(args.plot_width, args.plot_height);

    match args.command {
        Command::Detect => {
            println!("{}", parsed.meta.series_type);
            Ok(())
        }
        Command::Parse => {
            if args.with_meta {
                let out = ParseOut {
                    meta: MetaOut {
                        series_type: &parsed.meta.series_type,
                        config: parsed.meta.config.as_value(),
                        effective_config: parsed.meta.effective_config.as_value(),
                        title: parsed.meta.title.as_deref(),
                    },
                    model: &parsed.model,
                };
                write_json(&out, args.pretty)?;
            } else {
                write_json(&parsed.model, args.pretty)?;
            }
            Ok(())
        }
        Command::Layout => {
            let layouted = funnel_render::layout_parsed(&parsed, &layout_opts)?;
            write_json(&layouted, args.pretty)?;
            Ok(())
        }
        Command::Render => {
            let layouted = funnel_render::layout_parsed(&parsed, &layout_opts)?;

            let connector_width = parsed
                .meta
                .effective_config
                .get_f64("dataLabels.connectorWidth")
                .unwrap_or(1.0);
            let svg_options = SvgRenderOptions {
                diagram_id: args.diagram_id.clone(),
                include_placeholders: args.include_placeholders,
                connector_width,
                ..Default::default()
            };
            let svg = render_funnel_debug_svg(&layouted.layout, &svg_options);
            write_text(&svg, args.out.as_deref())?;
            Ok(())
        }
    }
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
