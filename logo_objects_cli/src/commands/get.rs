use anyhow::Result;
use clap::Args;
use logo_objects_api::{ApiClient, QueryOptions};

use super::{with_entity, Resource};
use crate::output::{print_json, print_record_table, OutputFormat};

#[derive(Args)]
pub struct GetArgs {
    /// Resource the record belongs to
    #[arg(value_enum)]
    pub resource: Resource,

    /// Internal reference of the record
    pub id: String,

    /// Include sub-collections (e.g. item units)
    #[arg(long)]
    pub expand: bool,
}

pub async fn run(args: &GetArgs, client: &ApiClient, format: &OutputFormat) -> Result<()> {
    let options = if args.expand {
        Some(QueryOptions::default().with_expand(true))
    } else {
        None
    };
    let record = with_entity!(client, args.resource, |entity| {
        entity.get_by_id(&args.id, options.as_ref()).await?
    });

    match format {
        OutputFormat::Table => print_record_table(&record),
        OutputFormat::Json => print_json(&record),
    }

    Ok(())
}
