//! List options: the [`Query`] trait, [`QueryOptions`], and sorting.

use std::str::FromStr;

use url::{form_urlencoded, Url};

use super::criteria::{build_search_query, Column, SearchCriteria};

/// Trait implemented by everything that renders into URL query parameters.
pub trait Query {
    /// Renders the parameters as an `&`-joined, form-encoded string without a leading `?`.
    fn to_query_string(&self) -> String;

    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        let qs = self.to_query_string();
        if !qs.is_empty() {
            let combined = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, qs),
                _ => qs,
            };
            url.set_query(Some(&combined));
        }
        url
    }
}

/// Sort order for list results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order. This is the default.
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// The accepted sort shapes: one or several fields, with or without an
/// explicit direction. A missing direction means ascending.
#[derive(Clone, Debug, PartialEq)]
pub enum SortSpec {
    Field(String),
    FieldWithDirection(String, SortDirection),
    Fields(Vec<String>),
    FieldsWithDirection(Vec<String>, SortDirection),
}

impl SortSpec {
    pub fn asc(field: impl Column) -> Self {
        SortSpec::Field(field.column_name().to_string())
    }

    pub fn desc(field: impl Column) -> Self {
        SortSpec::FieldWithDirection(field.column_name().to_string(), SortDirection::Desc)
    }

    /// Normalises every shape into `(field, direction)` pairs.
    pub fn normalize(&self) -> Vec<(String, SortDirection)> {
        match self {
            SortSpec::Field(field) => vec![(field.clone(), SortDirection::Asc)],
            SortSpec::FieldWithDirection(field, dir) => vec![(field.clone(), *dir)],
            SortSpec::Fields(fields) => fields
                .iter()
                .map(|f| (f.clone(), SortDirection::Asc))
                .collect(),
            SortSpec::FieldsWithDirection(fields, dir) => {
                fields.iter().map(|f| (f.clone(), *dir)).collect()
            }
        }
    }

    /// Wire form of the `sort` parameter: comma-joined, descending fields prefixed with `-`.
    pub fn to_param(&self) -> String {
        self.normalize()
            .into_iter()
            .map(|(field, dir)| {
                format!(
                    "{}{}",
                    match dir {
                        SortDirection::Asc => "",
                        SortDirection::Desc => "-",
                    },
                    field
                )
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Field selection, sorting, paging and filtering for list endpoints.
///
/// Unset options are left out of the query string; `false` and `0` are sent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    pub fields: Option<Vec<String>>,
    pub sort: Option<SortSpec>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Compiled filter expression, see [`build_search_query`].
    pub q: Option<String>,
    pub expand: Option<bool>,
    pub expand_level: Option<u32>,
    pub count: Option<bool>,
    pub with_count: Option<bool>,
    pub first: Option<bool>,
    pub last: Option<bool>,
}

impl Query for QueryOptions {
    fn to_query_string(&self) -> String {
        build_query_string(self)
    }
}

impl QueryOptions {
    pub fn with_fields<C: Column>(mut self, fields: &[C]) -> Self {
        self.fields = Some(
            fields
                .iter()
                .map(|f| f.column_name().to_string())
                .collect(),
        );
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_q(mut self, q: &str) -> Self {
        self.q = Some(q.to_string());
        self
    }

    /// Sets `q` from the compiled criteria. Criteria that render nothing clear `q`.
    pub fn with_criteria<C: Column>(mut self, criteria: &SearchCriteria<C>) -> Self {
        self.q = build_search_query(criteria);
        self
    }

    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = Some(expand);
        self
    }

    pub fn with_expand_level(mut self, level: u32) -> Self {
        self.expand_level = Some(level);
        self
    }

    pub fn with_count(mut self, count: bool) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_total_count(mut self, with_count: bool) -> Self {
        self.with_count = Some(with_count);
        self
    }

    pub fn with_first(mut self, first: bool) -> Self {
        self.first = Some(first);
        self
    }

    pub fn with_last(mut self, last: bool) -> Self {
        self.last = Some(last);
        self
    }
}

/// Renders options as a form-encoded query string with no leading `?`.
pub fn build_query_string(options: &QueryOptions) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if let Some(fields) = &options.fields {
        serializer.append_pair("fields", &fields.join(","));
    }
    if let Some(sort) = &options.sort {
        serializer.append_pair("sort", &sort.to_param());
    }
    if let Some(limit) = options.limit {
        serializer.append_pair("limit", &limit.to_string());
    }
    if let Some(offset) = options.offset {
        serializer.append_pair("offset", &offset.to_string());
    }
    if let Some(q) = &options.q {
        serializer.append_pair("q", q);
    }
    if let Some(expand) = options.expand {
        serializer.append_pair("expand", &expand.to_string());
    }
    if let Some(expand_level) = options.expand_level {
        serializer.append_pair("expandLevel", &expand_level.to_string());
    }
    if let Some(count) = options.count {
        serializer.append_pair("count", &count.to_string());
    }
    if let Some(with_count) = options.with_count {
        serializer.append_pair("withCount", &with_count.to_string());
    }
    if let Some(first) = options.first {
        serializer.append_pair("first", &first.to_string());
    }
    if let Some(last) = options.last {
        serializer.append_pair("last", &last.to_string());
    }

    serializer.finish()
}
