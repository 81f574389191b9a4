use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use choreo::{
    Evaluator, RateFunctionBridge, RenderConfig, SceneBuilder, SceneFile,
    foundation::core::{Fps, Resolution},
    scene::{Severity, TextFactory},
    timeline::inspect::{TimelineReport, sample_property, sample_rate_function},
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "choreo", version)]
struct Cli {
    /// More logging on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a scene and print its diagnostics.
    Validate(ValidateArgs),
    /// Evaluate a scene into a per-frame render plan (JSON).
    Plan(PlanArgs),
    /// Print the built timeline's structure and warnings.
    Inspect(InspectArgs),
    /// List rate functions, or sample one.
    Easings(EasingsArgs),
    /// Write the built timeline as JSON.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Render config JSON; scene settings still take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Override the output width.
    #[arg(long)]
    width: Option<u32>,

    /// Override the output height.
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print diagnostics as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output plan JSON.
    #[arg(long)]
    out: PathBuf,

    /// First frame (inclusive).
    #[arg(long)]
    start: Option<u64>,

    /// Last frame (exclusive).
    #[arg(long)]
    end: Option<u64>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Object whose property to sample.
    #[arg(long, requires = "property")]
    object: Option<String>,

    /// Property to sample (e.g. `position`, `opacity`).
    #[arg(long, requires = "object")]
    property: Option<String>,

    /// Number of samples.
    #[arg(long, default_value_t = 11)]
    samples: usize,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct EasingsArgs {
    /// Rate function to sample instead of listing the catalogue.
    #[arg(long)]
    sample: Option<String>,

    /// Number of samples.
    #[arg(long, default_value_t = 11)]
    samples: usize,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output timeline JSON.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Easings(args) => cmd_easings(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_scene(path: &Path) -> anyhow::Result<SceneFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open scene '{}'", path.display()))?;
    let scene = SceneFile::from_json(&text).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<RenderConfig> {
    let mut cfg = match &args.config {
        Some(p) => RenderConfig::load_json(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => RenderConfig::default(),
    };
    if let Some(fps) = args.fps {
        cfg.fps = Fps::new(fps, 1)?;
    }
    if args.width.is_some() || args.height.is_some() {
        cfg.resolution = Resolution::new(
            args.width.unwrap_or(cfg.resolution.width),
            args.height.unwrap_or(cfg.resolution.height),
        )?;
    }
    Ok(cfg)
}

fn build(in_path: &Path, config: &ConfigArgs) -> anyhow::Result<choreo::BuiltScene> {
    let file = read_scene(in_path)?;
    let cfg = load_config(config)?;
    let built = SceneBuilder::new(cfg)
        .build(&file)
        .with_context(|| format!("build scene '{}'", in_path.display()))?;
    for d in built.diagnostics.iter() {
        if d.severity == Severity::Warning {
            tracing::warn!("{d}");
        }
    }
    Ok(built)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value)
        .with_context(|| format!("write '{}'", path.display()))?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let file = read_scene(&args.in_path)?;
    let diags = file.validate(&TextFactory::default());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diags)?);
    } else {
        for d in diags.iter() {
            println!("{d}");
        }
        println!(
            "{} error(s), {} warning(s)",
            diags.count(Severity::Error),
            diags.count(Severity::Warning)
        );
    }

    if diags.has_errors() {
        anyhow::bail!("scene '{}' is invalid", args.in_path.display());
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let scene = build(&args.in_path, &args.config)?;
    let frame_count = scene.timeline.frame_count();
    let range = match (args.start, args.end) {
        (None, None) => None,
        (start, end) => Some(start.unwrap_or(0)..end.unwrap_or(frame_count)),
    };
    let plan = Evaluator::render_plan(&scene, range)?;
    write_json(&args.out, &plan)?;
    println!(
        "wrote {} frames ({} unique) to {}",
        plan.frames.len(),
        plan.unique_frames(),
        args.out.display()
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let scene = build(&args.in_path, &args.config)?;
    print!("{}", TimelineReport::new(&scene.timeline));

    if let (Some(object), Some(property)) = (&args.object, &args.property) {
        let layer = scene
            .object(object)
            .with_context(|| format!("unknown object '{object}'"))?
            .layer
            .name();
        let samples = sample_property(&scene.timeline, layer, object, property, args.samples)?;
        println!("{object}.{property}:");
        for (t, v) in samples {
            println!("  {t:>8.3}s  {}", serde_json::to_string(&v)?);
        }
    }
    Ok(())
}

fn cmd_easings(args: EasingsArgs) -> anyhow::Result<()> {
    let bridge = RateFunctionBridge::new();
    match args.sample {
        Some(name) => {
            let f = bridge.get_rate_function(&name)?;
            for (t, y) in sample_rate_function(&f, args.samples) {
                println!("{t:.3}\t{y:.6}");
            }
        }
        None => {
            for entry in bridge.catalogue() {
                match entry.target {
                    Some(target) => println!("{:<28} -> {target}", entry.name),
                    None => println!("{:<28} {:?}", entry.name, entry.family),
                }
            }
        }
    }
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let scene = build(&args.in_path, &args.config)?;
    write_json(&args.out, &scene.timeline)?;
    println!("wrote timeline to {}", args.out.display());
    Ok(())
}
