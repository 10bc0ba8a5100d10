use anyhow::Result;
use clap::Args;
use folio_common::{serialize_nodes_to_plain_text, truncate_to_length};
use folio_editor::{normalize_document, PluginStack};
use folio_workspace::WorkspaceConfig;
use std::path::PathBuf;

use super::read_document;

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Stored document file
    pub file: PathBuf,

    /// Keep at most this many characters
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Cut at the configured preview length
    #[arg(long, conflicts_with = "limit")]
    pub preview: bool,
}

pub fn text(args: TextArgs, config: &WorkspaceConfig) -> Result<()> {
    let document = normalize_document(read_document(&args.file)?, &PluginStack::standard())?;

    let limit = match (args.limit, args.preview) {
        (Some(limit), _) => Some(limit),
        (None, true) => Some(config.preview_length),
        (None, false) => None,
    };
    let text = match limit {
        Some(limit) => serialize_nodes_to_plain_text(&truncate_to_length(&document.children, limit)),
        None => serialize_nodes_to_plain_text(&document.children),
    };

    println!("{}", text);
    Ok(())
}
