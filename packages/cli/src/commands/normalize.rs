use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{normalize_document, PluginStack, StoredDocument};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Stored document file
    pub file: PathBuf,

    /// Rewrite the file instead of printing to stdout
    #[arg(short, long)]
    pub write: bool,
}

/// Normalize a loaded document in place. Returns whether anything changed.
pub(crate) fn normalize_stored(stored: &mut StoredDocument, stack: &PluginStack) -> Result<bool> {
    if stored.document().is_invalid_sentinel() {
        return Err(anyhow!("{} is not a valid document", stored.path.display()));
    }

    let normalized = normalize_document(stored.document().clone(), stack)?;
    if &normalized == stored.document() {
        return Ok(false);
    }
    stored.replace(normalized);
    debug!(path = %stored.path.display(), version = stored.version, "Normalized document");
    Ok(true)
}

pub fn normalize(args: NormalizeArgs) -> Result<()> {
    let mut stored = StoredDocument::load(&args.file)?;
    let changed = normalize_stored(&mut stored, &PluginStack::standard())?;

    if !args.write {
        println!("{}", stored.to_json()?);
        return Ok(());
    }

    if changed {
        stored.save()?;
        println!("  {} {} normalized", "✓".green(), args.file.display());
    } else {
        println!("  {} {} already normalized", "✓".green(), args.file.display());
    }
    Ok(())
}
