//! Local document store management.

use std::io::Read;
use std::path::PathBuf;

use clap::Subcommand;
use console::style;

use gb_core::config::AppConfig;
use gb_core::error::{GbError, GbResult};
use gb_models::value::{fields_from_json, fields_to_json};
use gb_models::{Document, Fields, LocalStore};

#[derive(Subcommand, Debug)]
pub enum StoreAction {
    /// Print a document as JSON.
    Get {
        collection: String,
        id: String,
        /// Print the typed field encoding instead of plain JSON.
        #[arg(long)]
        typed: bool,
    },
    /// Create or replace a document from a JSON object.
    Put {
        collection: String,
        id: String,
        /// Read the fields from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Input uses the typed field encoding instead of plain JSON.
        #[arg(long)]
        typed: bool,
    },
    /// Delete a document.
    Delete { collection: String, id: String },
    /// List document ids in a collection.
    List { collection: String },
    /// Delete every document in the local store.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(config: &AppConfig, action: StoreAction) -> GbResult<()> {
    let path = config.effective_sqlite_path()?;
    let store = LocalStore::init(&path, &config.store)?;

    match action {
        StoreAction::Get { collection, id, typed } => {
            let doc = store.get(&collection, &id)?.ok_or_else(|| GbError::DocumentNotFound {
                collection: collection.clone(),
                id: id.clone(),
            })?;
            println!("{}", render(&doc, typed)?);
        }
        StoreAction::Put { collection, id, file, typed } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let fields = parse_fields(&raw, typed)?;
            store.put(&collection, &id, &fields)?;
            println!("{} stored {collection}/{id}", style("ok").green());
        }
        StoreAction::Delete { collection, id } => {
            if store.delete(&collection, &id)? {
                println!("{} deleted {collection}/{id}", style("ok").green());
            } else {
                println!("{} {collection}/{id} did not exist", style("skip").yellow());
            }
        }
        StoreAction::List { collection } => {
            for id in store.list_ids(&collection)? {
                println!("{id}");
            }
        }
        StoreAction::Reset { yes } => {
            if !yes {
                return Err(GbError::Config("refusing to reset without --yes".into()));
            }
            store.reset()?;
            println!("{} reset {}", style("ok").green(), path.display());
        }
    }
    Ok(())
}

/// Parse document fields from JSON text.
pub fn parse_fields(raw: &str, typed: bool) -> GbResult<Fields> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if typed {
        return Ok(serde_json::from_value(value)?);
    }
    fields_from_json(&value)
        .ok_or_else(|| GbError::InvalidPayload("document must be a JSON object".into()))
}

fn render(doc: &Document, typed: bool) -> GbResult<String> {
    let fields = if typed {
        serde_json::to_value(&doc.fields)?
    } else {
        fields_to_json(&doc.fields)
    };
    Ok(serde_json::to_string_pretty(&fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_models::FieldValue;

    #[test]
    fn test_parse_plain_fields() {
        let fields = parse_fields(r#"{"name": "Ayu", "fcm_tokens": {"tok": true}}"#, false).unwrap();
        assert_eq!(fields["name"], FieldValue::StringValue("Ayu".into()));
        assert!(fields["fcm_tokens"].as_map().unwrap().contains_key("tok"));
    }

    #[test]
    fn test_parse_typed_fields() {
        let fields = parse_fields(r#"{"age": {"integerValue": "30"}}"#, true).unwrap();
        assert_eq!(fields["age"], FieldValue::IntegerValue(30));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(parse_fields("[1, 2]", false).is_err());
    }

    #[test]
    fn test_store_commands_against_temp_db() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.store.sqlite_path = dir.path().join("docs.db").display().to_string();

        let input = dir.path().join("user.json");
        std::fs::write(&input, r#"{"fcm_tokens": {"a": true}}"#).unwrap();

        run(
            &config,
            StoreAction::Put {
                collection: "users".into(),
                id: "u1".into(),
                file: Some(input),
                typed: false,
            },
        )
        .unwrap();

        let store = LocalStore::init(&config.effective_sqlite_path().unwrap(), &config.store).unwrap();
        assert_eq!(store.list_ids("users").unwrap(), vec!["u1"]);

        run(
            &config,
            StoreAction::Delete {
                collection: "users".into(),
                id: "u1".into(),
            },
        )
        .unwrap();
        assert!(store.list_ids("users").unwrap().is_empty());
    }
}
