use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use folio_workspace::{FormState, WorkspaceConfig};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ReferencesArgs {
    /// Stored form: a JSON object of field name to document
    pub file: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub(crate) fn load_form(path: &Path, config: &WorkspaceConfig) -> Result<FormState> {
    let source = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let value: Value = serde_json::from_str(&source)?;
    if !value.is_object() {
        return Err(anyhow!("{} is not a form object", path.display()));
    }
    Ok(FormState::from_value(config.clone(), &value)?)
}

pub fn references(args: ReferencesArgs, config: &WorkspaceConfig) -> Result<()> {
    let form = load_form(&args.file, config)?;
    let index = form.reference_index();

    match args.format.as_str() {
        "json" => {
            let usages: Vec<_> = index.iter().collect();
            println!("{}", serde_json::to_string_pretty(&usages)?);
        }
        "text" => {
            if index.is_empty() {
                println!("{}", "No citations found".yellow());
                return Ok(());
            }
            for usage in index.iter() {
                let fields: Vec<&str> = usage.fields.iter().map(String::as_str).collect();
                println!(
                    "  {} {}  {}",
                    format!("[{}]", usage.doc_index).bold(),
                    usage.ref_id,
                    fields.join(", ").dimmed()
                );
            }
        }
        other => return Err(anyhow!("Unknown format: {}", other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_form_and_number_citations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(
            &path,
            r#"{
                "results": [{ "type": "paragraph", "children": [
                    { "text": "see " },
                    { "type": "reference", "refId": "b", "children": [{ "text": "" }] },
                    { "text": "" }
                ] }],
                "abstract": [{ "type": "paragraph", "children": [
                    { "text": "after " },
                    { "type": "reference", "refId": "a", "children": [{ "text": "" }] },
                    { "text": "" }
                ] }]
            }"#,
        )
        .unwrap();

        let form = load_form(&path, &WorkspaceConfig::default()).unwrap();
        let index = form.reference_index();
        assert_eq!(index.doc_index("a"), Some(1));
        assert_eq!(index.doc_index("b"), Some(2));
    }

    #[test]
    fn test_form_must_be_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(load_form(&path, &WorkspaceConfig::default()).is_err());
    }
}
