use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lettermark::{
    AvatarConfig, AvatarDispatcher, AvatarPath, AvatarRequest, InMemoryUserDirectory,
    LetterAvatarRenderer, NoUserDirectory, UserLookup, fnv1a64, normalize_name,
};

#[derive(Parser, Debug)]
#[command(name = "lettermark", version, about = "Resolve and render user avatars")]
struct Cli {
    /// JSON configuration file; `LETTERMARK_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a letter avatar as a PNG.
    Render(RenderArgs),
    /// Print the glyph and palette color a name maps to.
    Inspect(InspectArgs),
    /// Run the full dispatch (lookup, external probe, fallback) and write the result.
    Resolve(ResolveArgs),
    /// Render one letter avatar per line of a names file, in parallel.
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Display name.
    #[arg(long, default_value = "")]
    name: String,

    /// Edge length in pixels (clamped to the configured range).
    #[arg(long)]
    size: Option<i64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Display name.
    #[arg(long, default_value = "")]
    name: String,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// User id to look up in `--users`.
    #[arg(long)]
    id: Option<i64>,

    /// Fallback display name.
    #[arg(long, default_value = "")]
    name: String,

    /// Fallback email.
    #[arg(long)]
    email: Option<String>,

    /// Edge length in pixels (clamped to the configured range).
    #[arg(long)]
    size: Option<i64>,

    /// JSON array of `{id, name, email}` user records.
    #[arg(long)]
    users: Option<PathBuf>,

    /// Output path for the image bytes.
    #[arg(long)]
    out: PathBuf,

    /// Never contact the external avatar service.
    #[arg(long, default_value_t = false)]
    offline: bool,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Text file with one display name per line.
    #[arg(long)]
    names_file: PathBuf,

    /// Directory receiving `NNNN.png` files, numbered by line.
    #[arg(long)]
    out_dir: PathBuf,

    /// Edge length in pixels (clamped to the configured range).
    #[arg(long)]
    size: Option<i64>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Render(args) => cmd_render(&cfg, args),
        Command::Inspect(args) => cmd_inspect(&cfg, args),
        Command::Resolve(args) => cmd_resolve(cfg, args),
        Command::Batch(args) => cmd_batch(&cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AvatarConfig> {
    let mut cfg = match path {
        Some(p) => AvatarConfig::from_path(p)?,
        None => AvatarConfig::default(),
    };
    cfg.apply_env_overrides()?;
    Ok(cfg)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn cmd_render(cfg: &AvatarConfig, args: RenderArgs) -> anyhow::Result<()> {
    let renderer = LetterAvatarRenderer::from_config(cfg)?;
    let size = args
        .size
        .map_or(cfg.sizes.default_size(), |s| cfg.sizes.clamp(s));
    let image = renderer.try_render(&args.name, size)?;
    write_output(&args.out, image.bytes())?;

    eprintln!("wrote {} ({size}px)", args.out.display());
    Ok(())
}

fn cmd_inspect(cfg: &AvatarConfig, args: InspectArgs) -> anyhow::Result<()> {
    let renderer = LetterAvatarRenderer::from_config(cfg)?;
    let plan = renderer.plan(&args.name);
    let normalized = normalize_name(&args.name);

    let report = serde_json::json!({
        "name": args.name,
        "normalized": normalized,
        "hash": format!("{:#018x}", fnv1a64(normalized.as_bytes())),
        "glyph": plan.glyph,
        "palette_index": plan.palette_index,
        "color_name": plan.color_name,
        "background": plan.background.to_string(),
        "font": renderer.font_family(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_resolve(mut cfg: AvatarConfig, args: ResolveArgs) -> anyhow::Result<()> {
    if args.offline {
        cfg.probe.enabled = false;
    }
    let lookup: Arc<dyn UserLookup> = match &args.users {
        Some(path) => Arc::new(InMemoryUserDirectory::from_path(path)?),
        None => Arc::new(NoUserDirectory),
    };
    let dispatcher = AvatarDispatcher::from_config(&cfg, lookup)?;

    let mut req = AvatarRequest::new(
        args.name,
        args.size.unwrap_or(i64::from(cfg.sizes.default)),
        &cfg.sizes,
    );
    req.user_id = args.id;
    req.email = args.email;

    let outcome = dispatcher.dispatch(&req);
    write_output(&args.out, outcome.image.bytes())?;

    let source = match outcome.path {
        AvatarPath::External => "external".to_string(),
        AvatarPath::Generated { miss } => format!("generated ({miss})"),
    };
    println!("{}", outcome.image.mime_type());
    eprintln!(
        "wrote {} [{source}, {} bytes]",
        args.out.display(),
        outcome.image.bytes().len()
    );
    Ok(())
}

fn cmd_batch(cfg: &AvatarConfig, args: BatchArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.names_file)
        .with_context(|| format!("read names file '{}'", args.names_file.display()))?;
    let names: Vec<&str> = text.lines().collect();

    let renderer = LetterAvatarRenderer::from_config(cfg)?;
    let size = args
        .size
        .map_or(cfg.sizes.default_size(), |s| cfg.sizes.clamp(s));
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let render_all = || -> anyhow::Result<()> {
        names.par_iter().enumerate().try_for_each(|(i, name)| {
            let image = renderer.try_render(name, size)?;
            write_output(&args.out_dir.join(format!("{i:04}.png")), image.bytes())
        })
    };
    match args.threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("build rayon pool")?
            .install(render_all)?,
        None => render_all()?,
    }

    eprintln!(
        "wrote {} avatars to {}",
        names.len(),
        args.out_dir.display()
    );
    Ok(())
}
