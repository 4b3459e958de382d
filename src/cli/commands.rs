use super::wizard::run_wizard;
use crate::infra::config::install_default_catalog;
use crate::infra::preview::Preview;
use crate::services::Generator;
use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Service id to include (repeatable, or comma separated)
    #[arg(short = 's', long = "service", value_name = "ID", value_delimiter = ',')]
    pub services: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Show what would be written instead of writing
    #[arg(long)]
    pub dry_run: bool,
}

fn generator(root: &Path) -> Result<Generator> {
    Generator::load(root).with_context(|| format!("loading services for {}", root.display()))
}

/// Runs the interactive wizard on stdin/stdout.
pub fn wizard(root: &Path) -> Result<()> {
    let generator = generator(root)?;
    let stdin = io::stdin();
    let output = run_wizard(&generator, stdin.lock(), io::stdout())?;
    if output.is_none() {
        info!("wizard ended without generating files");
    }
    Ok(())
}

pub fn detect(root: &Path, out: &mut impl Write) -> Result<()> {
    let details = crate::infra::detect::detect_language(root)?;

    writeln!(out, "🔎 Language: {}", details.label())?;
    let version = details.version();
    writeln!(
        out,
        "   Version:  {}",
        if version.is_empty() { "unknown" } else { version }
    )?;
    let markers = details.markers();
    if markers.is_empty() {
        writeln!(out, "   Markers:  none")?;
    } else {
        writeln!(out, "   Markers:  {}", markers.join(", "))?;
    }
    Ok(())
}

pub fn services(root: &Path, out: &mut impl Write) -> Result<()> {
    let generator = generator(root)?;
    let catalog = generator.catalog();

    for category in catalog.categories() {
        writeln!(out, "{category}:")?;
        for svc in catalog.in_category(&category) {
            let mut line = format!("  {:<12} {}", svc.id, svc.display_name());
            if !svc.description.is_empty() {
                line.push_str(&format!(" - {}", svc.description));
            }
            if !svc.requires.is_empty() {
                line.push_str(&format!(" (requires {})", svc.requires.join(", ")));
            }
            writeln!(out, "{line}")?;
        }
    }

    if catalog.selectable().is_empty() {
        writeln!(out, "⚠️  No selectable services in catalog")?;
    }
    Ok(())
}

pub fn generate(root: &Path, args: &GenerateArgs, out: &mut impl Write) -> Result<()> {
    let generator = generator(root)?;
    let ids = &args.selection.services;

    for warning in generator.warnings(ids)? {
        writeln!(out, "⚠️  {warning}")?;
    }

    if args.dry_run {
        let preview = generator.preview(ids)?;
        return print_preview(&preview, true, out);
    }

    let output = generator.generate(ids)?;
    writeln!(out, "✅ Wrote {}", output.compose_path.display())?;
    writeln!(out, "✅ Wrote {}", output.dockerfile_path.display())?;
    if let Some(ignore) = &output.dockerignore_path {
        writeln!(out, "✅ Wrote {}", ignore.display())?;
    }
    Ok(())
}

pub fn preview(root: &Path, args: &SelectionArgs, out: &mut impl Write) -> Result<()> {
    let generator = generator(root)?;
    let preview = generator.preview(&args.services)?;
    print_preview(&preview, false, out)
}

fn print_preview(preview: &Preview, with_content: bool, out: &mut impl Write) -> Result<()> {
    for file in preview.files() {
        writeln!(out, "{:<10} {}", file.status, file.path.display())?;
        if with_content && !file.content.is_empty() {
            writeln!(out)?;
            for line in file.content.lines() {
                writeln!(out, "    {line}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn init(root: &Path, out: &mut impl Write) -> Result<()> {
    match install_default_catalog(root)? {
        Some(path) => writeln!(out, "✅ Installed service catalog at {}", path.display())?,
        None => writeln!(out, "ℹ️  Service catalog already present, left untouched")?,
    }
    Ok(())
}
