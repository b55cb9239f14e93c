//! Command-line front end for the collection store.
//!
//! # Responsibility
//! - Read configuration from flags and environment.
//! - Decide the visibility context once, at this boundary.
//! - Print results as JSON on stdout.

mod args;

use anyhow::{Context, Result};
use args::{Cli, Command};
use clap::Parser;
use collection_core::db::open_db;
use collection_core::{
    default_log_level, init_logging, CollectionService, FrontendRequest, RecordCollection,
    RequestMarkerResolver, SqliteCollectionRepository, StaticRecordCollection,
};
use log::info;
use serde_json::{json, Value};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&cli.db).with_context(|| format!("failed to open `{}`", cli.db))?;
    let repo = SqliteCollectionRepository::try_new(&conn)?;
    let resolver = RequestMarkerResolver::new(cli.public.then_some(FrontendRequest));
    let service = CollectionService::with_resolver(repo, resolver);
    info!(
        "event=cli_command module=cli status=start context={}",
        service.context().as_str()
    );

    let output = match &cli.command {
        Command::List => render_all(&service.find_all()?),
        Command::Show { id } => match service.find_by_id(*id)? {
            Some(collection) => render(&*collection),
            None => Value::Null,
        },
        Command::ByTable { table } => render_all(&service.find_by_owning_table(table)?),
        Command::ByType { type_tag, table } => match table {
            Some(table) => render_all(&service.find_by_type_and_owning_table(type_tag, table)?),
            None => render_all(&service.find_by_type(type_tag)?),
        },
        Command::Delete { id } => {
            service.delete_by_id(*id)?;
            json!({ "deleted": id })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn render_all(collections: &[Box<dyn RecordCollection>]) -> Value {
    Value::Array(
        collections
            .iter()
            .map(|collection| render(&**collection))
            .collect(),
    )
}

fn render(collection: &dyn RecordCollection) -> Value {
    let mut value = match collection.downcast_ref::<StaticRecordCollection>() {
        Some(static_collection) => json!(static_collection),
        None => json!({
            "id": collection.id(),
            "owning_table": collection.owning_table(),
            "title": collection.title(),
        }),
    };
    if let Value::Object(fields) = &mut value {
        fields.insert("type".to_string(), json!(collection.type_tag()));
    }
    value
}
