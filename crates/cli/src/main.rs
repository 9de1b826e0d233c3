//! Chromap CLI - color-map conversion between CPT, SLD and GeoCSS

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::Command as Process;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use chromap_codecs::{
    read_color_map, write_color_map, ColorMapType, Format, Parsed, SerializeOptions,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "chromap")]
#[command(author, version, about = "Color-map conversion for raster styling", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a color map between formats
    Convert {
        /// Input color-map file
        input: PathBuf,
        /// Output color-map file
        output: PathBuf,
        /// Input format: cpt, sld, geocss (default: from extension)
        #[arg(long)]
        from: Option<String>,
        /// Output format: cpt, sld, geocss (default: from extension)
        #[arg(long)]
        to: Option<String>,
        /// Style title
        #[arg(long)]
        title: Option<String>,
        /// Style description / abstract
        #[arg(long)]
        description: Option<String>,
        /// Color map type: ramp, intervals, values
        #[arg(long, default_value = "ramp")]
        color_map_type: String,
        /// Emit opacity on every entry (default 1.0 where unset)
        #[arg(long)]
        with_opacity: bool,
        /// Emit entry labels
        #[arg(long)]
        with_labels: bool,
        /// Label template, e.g. "${value} m"
        #[arg(long)]
        label_template: Option<String>,
        /// Feature-info label name (GeoCSS only)
        #[arg(long)]
        info_label: Option<String>,
    },
    /// Show information about a color-map file
    Info {
        /// Input color-map file
        input: PathBuf,
        /// Input format: cpt, sld, geocss (default: from extension)
        #[arg(long)]
        from: Option<String>,
    },
    /// Recolor a raster with a color table via gdaldem color-relief
    Render {
        /// Input raster file
        input: PathBuf,
        /// Output raster file
        output: PathBuf,
        /// Color table (cpt, sld or geocss; converted to cpt as needed)
        #[arg(long)]
        color_table: PathBuf,
        /// GDAL output format name (-of)
        #[arg(long)]
        output_format: Option<String>,
        /// Add an alpha channel to the output
        #[arg(long)]
        alpha: bool,
        /// Match color table entries exactly, error otherwise
        #[arg(long, conflicts_with = "nearest_color_entry")]
        exact_color_entry: bool,
        /// Use the nearest color table entry instead of interpolating
        #[arg(long)]
        nearest_color_entry: bool,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Resolve a format from an explicit flag, falling back to the extension.
fn resolve_format(flag: Option<&str>, path: &Path) -> Result<Format> {
    if let Some(name) = flag {
        return Format::from_name(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown format: {}. Use cpt, sld or geocss.", name));
    }
    Format::from_path(path).ok_or_else(|| {
        anyhow::anyhow!(
            "Cannot infer format of {}; pass --from/--to explicitly.",
            path.display()
        )
    })
}

fn parse_color_map_type(s: &str) -> Result<ColorMapType> {
    ColorMapType::from_name(s)
        .ok_or_else(|| anyhow::anyhow!("Unknown color map type: {}. Use ramp, intervals or values.", s))
}

fn read_input(path: &Path, format: Format) -> Result<Parsed> {
    let parsed = read_color_map(path, format)
        .with_context(|| format!("Failed to read {} as {}", path.display(), format))?;
    for warning in &parsed.warnings {
        warn!("{}: {}", path.display(), warning);
    }
    info!(
        "Parsed {} ramp entries from {}",
        parsed.map.len(),
        path.display()
    );
    Ok(parsed)
}

/// Fixed option set forwarded to `gdaldem color-relief`.
#[derive(Debug, Clone, Default)]
struct ReliefOptions {
    alpha: bool,
    exact_color_entry: bool,
    nearest_color_entry: bool,
    output_format: Option<String>,
}

impl ReliefOptions {
    fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.alpha {
            args.push("-alpha".to_string());
        }
        if self.exact_color_entry {
            args.push("-exact_color_entry".to_string());
        }
        if self.nearest_color_entry {
            args.push("-nearest_color_entry".to_string());
        }
        if let Some(of) = &self.output_format {
            args.push("-of".to_string());
            args.push(of.clone());
        }
        args
    }
}

/// Make sure the color table is CPT, converting it next to the original
/// when it is not. An existing converted file is reused.
fn ensure_cpt_table(color_table: &Path) -> Result<PathBuf> {
    if !color_table.is_file() {
        anyhow::bail!("Unable to read color table: {}", color_table.display());
    }
    let format = resolve_format(None, color_table)?;
    if format == Format::Cpt {
        return Ok(color_table.to_path_buf());
    }

    let cpt_path = color_table.with_extension("cpt");
    if cpt_path.exists() {
        info!("Reusing converted color table: {}", cpt_path.display());
        return Ok(cpt_path);
    }

    info!(
        "Converting color table from {} to cpt: {}",
        format,
        cpt_path.display()
    );
    let parsed = read_input(color_table, format)?;
    write_color_map(&cpt_path, Format::Cpt, &parsed.map, &SerializeOptions::default())
        .with_context(|| format!("Failed to write {}", cpt_path.display()))?;
    Ok(cpt_path)
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Convert ──────────────────────────────────────────────────
        Commands::Convert {
            input,
            output,
            from,
            to,
            title,
            description,
            color_map_type,
            with_opacity,
            with_labels,
            label_template,
            info_label,
        } => {
            let from = resolve_format(from.as_deref(), &input)?;
            let to = resolve_format(to.as_deref(), &output)?;
            let color_map_type = parse_color_map_type(&color_map_type)?;

            let parsed = read_input(&input, from)?;

            let mut options = SerializeOptions::default();
            options.cpt.title = title.clone();
            options.cpt.description = description.clone();
            options.sld.title = title.clone();
            options.sld.description = description.clone();
            options.sld.color_map_type = color_map_type;
            options.sld.with_opacity = with_opacity;
            options.sld.with_labels = with_labels;
            options.sld.label_template = label_template.clone();
            options.geocss.title = title;
            options.geocss.description = description;
            options.geocss.color_map_type = color_map_type;
            options.geocss.with_opacity = with_opacity;
            options.geocss.with_labels = with_labels;
            options.geocss.label_template = label_template;
            options.geocss.info_label = info_label;

            write_color_map(&output, to, &parsed.map, &options)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{} -> {} ({} entries)", from, to, parsed.map.len());
            println!("Saved to: {}", output.display());
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input, from } => {
            let format = resolve_format(from.as_deref(), &input)?;
            let parsed = read_input(&input, format)?;
            let map = &parsed.map;

            println!("File: {}", input.display());
            println!("Format: {}", format);
            println!("Entries: {}", map.len());
            for entry in &map.entries {
                println!(
                    "  [{}] #{} opacity={} label={}",
                    fmt_optional(entry.value),
                    entry.color_hex(),
                    fmt_optional(entry.opacity),
                    entry.label.as_deref().unwrap_or("-")
                );
            }
            if let Some(bg) = &map.background {
                println!("Background: #{}", bg.color_hex());
            }
            if let Some(fg) = &map.foreground {
                println!("Foreground: #{}", fg.color_hex());
            }
            if let Some(nan) = &map.nodata {
                println!("NoData: #{}", nan.color_hex());
            }
            if !parsed.warnings.is_empty() {
                println!("Warnings: {}", parsed.warnings.len());
            }
        }

        // ── Render ───────────────────────────────────────────────────
        Commands::Render {
            input,
            output,
            color_table,
            output_format,
            alpha,
            exact_color_entry,
            nearest_color_entry,
        } => {
            let options = ReliefOptions {
                alpha,
                exact_color_entry,
                nearest_color_entry,
                output_format,
            };
            let cpt_table = ensure_cpt_table(&color_table)?;

            let args = options.to_args();
            info!(
                ">> gdaldem color-relief {} {} {} {}",
                input.display(),
                cpt_table.display(),
                output.display(),
                args.join(" ")
            );

            let pb = spinner("Rendering color relief...");
            let status = Process::new("gdaldem")
                .arg("color-relief")
                .arg(&input)
                .arg(&cpt_table)
                .arg(&output)
                .args(&args)
                .status()
                .context("Failed to run gdaldem; is GDAL installed?")?;
            pb.finish_and_clear();

            if !status.success() {
                anyhow::bail!("gdaldem color-relief exited with {}", status);
            }
            println!("Color relief saved to: {}", output.display());
        }
    }

    Ok(())
}
