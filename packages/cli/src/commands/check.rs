use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{normalize_document, PluginStack};
use folio_model::Document;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Stored document files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum CheckOutcome {
    Clean,
    NeedsNormalization,
    Invalid(String),
}

pub(crate) fn check_source(source: &str, stack: &PluginStack) -> Result<CheckOutcome> {
    let value = match serde_json::from_str(source) {
        Ok(value) => value,
        Err(err) => return Ok(CheckOutcome::Invalid(err.to_string())),
    };
    let document = match Document::parse_value(value) {
        Ok(document) => document,
        Err(err) => return Ok(CheckOutcome::Invalid(err.to_string())),
    };

    let normalized = normalize_document(document.clone(), stack)?;
    if normalized == document {
        Ok(CheckOutcome::Clean)
    } else {
        Ok(CheckOutcome::NeedsNormalization)
    }
}

pub fn check(args: CheckArgs) -> Result<()> {
    println!("🔍 {} Folio documents", "Checking".green().bold());
    println!();

    let stack = PluginStack::standard();
    let mut invalid = 0;
    let mut unnormalized = 0;

    for file in &args.files {
        let source = fs::read_to_string(file).with_context(|| format!("Cannot read {}", file.display()))?;
        match check_source(&source, &stack)? {
            CheckOutcome::Clean => println!("  {} {}", "✓".green(), file.display()),
            CheckOutcome::NeedsNormalization => {
                unnormalized += 1;
                println!("  {} {} - {}", "~".yellow(), file.display(), "not normalized".yellow());
            }
            CheckOutcome::Invalid(reason) => {
                invalid += 1;
                println!("  {} {} - {}", "✗".red(), file.display(), reason.red());
            }
        }
    }

    println!();
    println!("   Files checked: {}", args.files.len());
    if unnormalized > 0 {
        println!("   {} {}", "Not normalized:".yellow(), unnormalized);
    }

    if invalid > 0 {
        return Err(anyhow!("{} invalid document(s)", invalid));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_document() {
        let source = r#"[{ "type": "paragraph", "children": [{ "text": "Hello" }] }]"#;
        assert_eq!(check_source(source, &PluginStack::standard()).unwrap(), CheckOutcome::Clean);
    }

    #[test]
    fn test_root_leaf_needs_normalization() {
        let source = r#"[{ "text": "loose" }]"#;
        assert_eq!(
            check_source(source, &PluginStack::standard()).unwrap(),
            CheckOutcome::NeedsNormalization
        );
    }

    #[test]
    fn test_invalid_documents() {
        let stack = PluginStack::standard();
        assert!(matches!(check_source("{ nope", &stack).unwrap(), CheckOutcome::Invalid(_)));
        assert!(matches!(check_source("[]", &stack).unwrap(), CheckOutcome::Invalid(_)));
        assert!(matches!(
            check_source(r#"[{ "type": "paragraph", "children": [] }]"#, &stack).unwrap(),
            CheckOutcome::Invalid(_)
        ));
    }
}
