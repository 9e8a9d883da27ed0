use anyhow::Result;
use clap::Args;
use logo_objects_api::{ApiClient, QueryOptions, SortDirection, SortSpec};

use super::filters::FilterArgs;
use super::{with_entity, Resource};
use crate::output::{print_json, print_records_table, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// Resource to list
    #[arg(value_enum)]
    pub resource: Resource,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Comma-separated columns to return (e.g. CODE,NAME)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Comma-separated columns to sort by
    #[arg(long, value_delimiter = ',')]
    pub sort: Vec<String>,

    /// Sort descending instead of ascending
    #[arg(long)]
    pub desc: bool,

    /// Maximum number of records
    #[arg(long, default_value = "25")]
    pub limit: u32,

    /// Number of records to skip
    #[arg(long)]
    pub offset: Option<u32>,

    /// Ask the server for the total number of matches
    #[arg(long)]
    pub with_count: bool,
}

impl ListArgs {
    pub fn to_options(&self) -> Result<QueryOptions> {
        let mut options = QueryOptions::default()
            .with_criteria(&self.filter.to_criteria()?)
            .with_limit(self.limit);

        if !self.fields.is_empty() {
            options = options.with_fields(&self.fields[..]);
        }
        if let Some(sort) = sort_spec(&self.sort, self.desc) {
            options = options.with_sort(sort);
        }
        if let Some(offset) = self.offset {
            options = options.with_offset(offset);
        }
        if self.with_count {
            options = options.with_total_count(true);
        }
        Ok(options)
    }
}

fn sort_spec(fields: &[String], desc: bool) -> Option<SortSpec> {
    let direction = if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    match fields {
        [] => None,
        [field] if desc => Some(SortSpec::FieldWithDirection(field.clone(), direction)),
        [field] => Some(SortSpec::Field(field.clone())),
        many if desc => Some(SortSpec::FieldsWithDirection(many.to_vec(), direction)),
        many => Some(SortSpec::Fields(many.to_vec())),
    }
}

pub async fn run(args: &ListArgs, client: &ApiClient, format: &OutputFormat) -> Result<()> {
    let options = args.to_options()?;
    let resp = with_entity!(client, args.resource, |entity| {
        entity.get_all(&options).await?
    });

    if let Some(total) = resp.total_count {
        eprintln!("{} of {} records", resp.items.len(), total);
    }

    match format {
        OutputFormat::Table => print_records_table(&resp.items),
        OutputFormat::Json => print_json(&resp),
    }

    Ok(())
}
