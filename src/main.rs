use anyhow::{bail, Context, Result};
use serde_json::json;
use std::{env, path::PathBuf};
use tabviz::{ConfigField, Settings, Workspace};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: tabviz <FILE> [--settings <YAML>] [key=value ...]";

struct Args {
    file: PathBuf,
    settings: Option<PathBuf>,
    overrides: Vec<(String, String)>,
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let mut file = None;
    let mut settings = None;
    let mut overrides = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--settings" {
            settings = Some(PathBuf::from(args.next().context(USAGE)?));
        } else if let Some((key, value)) = arg.split_once('=') {
            overrides.push((key.to_string(), value.to_string()));
        } else if file.is_none() {
            file = Some(PathBuf::from(arg));
        } else {
            bail!("unexpected argument `{}`\n{}", arg, USAGE);
        }
    }

    Ok(Args {
        file: file.context(USAGE)?,
        settings,
        overrides,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tabviz=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) args + settings ──────────────────────────────────────────
    let args = parse_args()?;
    let settings = match &args.settings {
        Some(path) => Settings::from_yaml_file(path)?,
        None => Settings::default(),
    };
    // reject bad overrides before doing any work
    let overrides = args
        .overrides
        .iter()
        .map(|(k, v)| ConfigField::parse(k, v))
        .collect::<Result<Vec<_>, _>>()?;

    // ─── 3) load + normalize ─────────────────────────────────────────
    let workspace = Workspace::new(settings);
    info!(file = %args.file.display(), "loading");
    workspace.load_file(&args.file).await;
    let view = workspace.wait_until_idle().await;
    if let Some(msg) = &view.error {
        error!("{}", msg);
        bail!("{}", msg);
    }

    // ─── 4) apply chart overrides ────────────────────────────────────
    // axis choices depend on the loaded columns, so check them all before applying any
    for field in &overrides {
        workspace.check_config_field(field)?;
    }
    for field in overrides {
        if !workspace.set_config_field(field.clone())? {
            warn!(?field, "chart override not applied; no chart configuration");
        }
    }

    // ─── 5) emit ─────────────────────────────────────────────────────
    let out = json!({
        "columns": view.columns(),
        "rows": view.rows(),
        "chart": workspace.chart_config(),
        "chartData": workspace.chart_data(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    info!(
        columns = view.columns().len(),
        rows = view.rows().len(),
        "done"
    );
    Ok(())
}
