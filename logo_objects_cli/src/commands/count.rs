use anyhow::Result;
use clap::Args;
use logo_objects_api::{ApiClient, QueryOptions};
use serde_json::json;

use super::filters::FilterArgs;
use super::{with_entity, Resource};
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct CountArgs {
    /// Resource to count
    #[arg(value_enum)]
    pub resource: Resource,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub async fn run(args: &CountArgs, client: &ApiClient, format: &OutputFormat) -> Result<()> {
    let options = QueryOptions::default().with_criteria(&args.filter.to_criteria()?);
    let count = with_entity!(client, args.resource, |entity| {
        entity.count_matching(options).await?
    });

    match format {
        OutputFormat::Table => println!("{}", count),
        OutputFormat::Json => print_json(&json!({ "count": count })),
    }

    Ok(())
}
