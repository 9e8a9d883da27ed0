//! `--filter` / `--like` flags shared by `list` and `count`.

use anyhow::{bail, Result};
use clap::Args;
use logo_objects_api::{FieldValue, Operators, Scalar, SearchCriteria};

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Equality filter FIELD=VALUE; a comma-separated VALUE matches any of its parts
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Pattern filter FIELD=PATTERN, with `*` as wildcard
    #[arg(long = "like", value_name = "FIELD=PATTERN")]
    pub likes: Vec<String>,
}

impl FilterArgs {
    pub fn to_criteria(&self) -> Result<SearchCriteria> {
        let mut criteria = SearchCriteria::new();
        for raw in &self.filters {
            let (field, value) = split_pair(raw)?;
            let value = if value.contains(',') {
                FieldValue::any_of(value.split(',').map(|v| parse_scalar(v.trim())))
            } else {
                FieldValue::Scalar(parse_scalar(value))
            };
            criteria = criteria.with(field.to_string(), value);
        }
        for raw in &self.likes {
            let (field, pattern) = split_pair(raw)?;
            criteria = criteria.with(field.to_string(), Operators::new().like(pattern));
        }
        Ok(criteria)
    }
}

fn split_pair(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value)),
        _ => bail!("Expected FIELD=VALUE, got '{}'", raw),
    }
}

/// Numbers and booleans are sent bare, anything else as a quoted string.
/// Wrap a value in single quotes to force a string, e.g. `CODE='001'`.
pub fn parse_scalar(raw: &str) -> Scalar {
    if let Some(quoted) = raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return Scalar::Str(quoted.to_string());
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Scalar::Int(i);
    }
    if let Some(float) = raw.parse::<f64>().ok().and_then(Scalar::finite) {
        return float;
    }
    match raw {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        _ => Scalar::Str(raw.to_string()),
    }
}
