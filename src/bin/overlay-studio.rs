use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use overlay_studio::layout::fonts::{detect_family_name, read_font_file};
use overlay_studio::model::color::Color;
use overlay_studio::model::template::resolve_text;
use overlay_studio::{Compositor, CpuSurface, EditorConfig, FrameRGBA, Template};

#[derive(Parser, Debug)]
#[command(name = "overlay-studio", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a template's overlays at one point in time as a PNG.
    Render(RenderArgs),
    /// Check a template file and list its overlays.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Template JSON.
    #[arg(long)]
    template: PathBuf,

    /// Timeline position in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Font file to load under the family name it declares. Repeatable.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Font file to load under another family name, as `FAMILY=PATH`. Repeatable.
    #[arg(long = "font-as", value_parser = parse_font_alias)]
    font_aliases: Vec<(String, PathBuf)>,

    /// Weight the loaded fonts are registered at.
    #[arg(long, default_value_t = 400)]
    font_weight: u16,

    /// Output width; defaults to the template resolution.
    #[arg(long)]
    width: Option<u32>,

    /// Output height; defaults to the template resolution.
    #[arg(long)]
    height: Option<u32>,

    /// Fill color behind the overlays, e.g. `#101418`. Transparent when omitted.
    #[arg(long, value_parser = parse_color)]
    background: Option<Color>,

    /// Editor config JSON (visibility epsilon and friends).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Template JSON.
    #[arg(long)]
    template: PathBuf,
}

fn parse_font_alias(raw: &str) -> Result<(String, PathBuf), String> {
    let (family, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FAMILY=PATH, got '{raw}'"))?;
    if family.trim().is_empty() || path.trim().is_empty() {
        return Err(format!("expected FAMILY=PATH, got '{raw}'"));
    }
    Ok((family.trim().to_string(), PathBuf::from(path.trim())))
}

fn parse_color(raw: &str) -> Result<Color, String> {
    Color::parse(raw)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "overlay_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let template = Template::from_path(&args.template)?;
    let config = match &args.config {
        Some(path) => EditorConfig::from_path(path)?,
        None => EditorConfig::default(),
    };

    let width = args.width.unwrap_or(template.resolution.width);
    let height = args.height.unwrap_or(template.resolution.height);
    let mut surface = CpuSurface::new(width, height)?;
    register_fonts(&mut surface, &args)?;

    let mut compositor = Compositor::new(config);
    let report = compositor.render_template(&mut surface, &template, args.time)?;
    for skipped in &report.skipped {
        tracing::warn!(key = %skipped.key, reason = %skipped.reason, "overlay not drawn");
    }

    let overlays = surface.finish();
    let frame = match args.background {
        Some(bg) => {
            let mut frame = solid_frame(width, height, bg);
            frame.composite_over(&overlays, 1.0)?;
            frame
        }
        None => overlays,
    };

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(&args.out)?;

    eprintln!(
        "wrote {} ({} drawn, {} skipped)",
        args.out.display(),
        report.drawn.len(),
        report.skipped.len()
    );
    Ok(())
}

fn register_fonts(surface: &mut CpuSurface, args: &RenderArgs) -> anyhow::Result<()> {
    for path in &args.fonts {
        let data = read_font_file(path)?;
        let family = detect_family_name(&data)
            .with_context(|| format!("detect family of '{}'", path.display()))?;
        tracing::info!(%family, path = %path.display(), "font loaded");
        surface.register_font(&family, args.font_weight, data)?;
    }
    for (family, path) in &args.font_aliases {
        let data = read_font_file(path)?;
        tracing::info!(%family, path = %path.display(), "font loaded");
        surface.register_font(family, args.font_weight, data)?;
    }
    Ok(())
}

fn solid_frame(width: u32, height: u32, color: Color) -> FrameRGBA {
    let px = color.to_premul().to_array();
    FrameRGBA {
        width,
        height,
        data: px.repeat(width as usize * height as usize),
        premultiplied: true,
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let template = read_template(&args.template)?;
    println!(
        "ok: {} overlays at {}x{}",
        template.overlays.len(),
        template.resolution.width,
        template.resolution.height
    );
    let mut overlays: Vec<_> = template.overlays.iter().collect();
    overlays.sort_by_key(|o| o.layer_index);
    for o in overlays {
        println!(
            "  [{}] {} ({}) {:.2}s-{:.2}s \"{}\"",
            o.layer_index,
            o.label,
            o.endpoint_key,
            o.timing.start_time,
            o.timing.end_time,
            resolve_text(o, &template.fields)
        );
    }
    Ok(())
}

fn read_template(path: &Path) -> anyhow::Result<Template> {
    Template::from_path(path).with_context(|| format!("invalid template '{}'", path.display()))
}
