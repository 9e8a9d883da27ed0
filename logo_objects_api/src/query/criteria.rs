//! Filter criteria and the `q` expression compiler.

use std::fmt;

/// Anything that names a physical column of a remote entity (e.g. `CODE`).
///
/// Implemented for plain strings and for the per-entity field enums in
/// [`crate::entities`], so criteria can be typed per entity or built from
/// runtime input alike.
pub trait Column {
    fn column_name(&self) -> &str;
}

impl Column for &str {
    fn column_name(&self) -> &str {
        self
    }
}

impl Column for String {
    fn column_name(&self) -> &str {
        self.as_str()
    }
}

/// A single literal value in a filter expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    /// Must be finite: the filter syntax has no literal for NaN or infinity.
    /// Use [`Scalar::finite`] for values that are not known to be.
    Float(f64),
    Bool(bool),
}

impl Scalar {
    /// A float literal, or `None` for NaN and infinities.
    pub fn finite(value: f64) -> Option<Self> {
        value.is_finite().then_some(Scalar::Float(value))
    }
}

impl fmt::Display for Scalar {
    /// Renders the value as a filter literal: strings single-quoted with
    /// embedded quotes doubled, everything else bare.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}
impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}
impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Scalar::Str(value.clone())
    }
}
impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}
impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}
impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value.into())
    }
}
/// Callers pass finite values only; see [`Scalar::Float`].
impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}
impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Comparison operators understood by the remote filter syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Like,
    Gte,
    Lte,
    Gt,
    Lt,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Operator::Eq => "eq",
                Operator::Ne => "ne",
                Operator::Like => "like",
                Operator::Gte => "gte",
                Operator::Lte => "lte",
                Operator::Gt => "gt",
                Operator::Lt => "lt",
            }
        )?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Condition {
    Compare(Operator, Scalar),
    In(Vec<Scalar>),
}

impl Condition {
    fn same_slot(&self, other: &Condition) -> bool {
        match (self, other) {
            (Condition::Compare(a, _), Condition::Compare(b, _)) => a == b,
            (Condition::In(_), Condition::In(_)) => true,
            _ => false,
        }
    }
}

/// An operator object: several operators applied to one field, joined with `and`.
///
/// Each operator holds at most one value; setting it again replaces the value
/// without moving it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Operators {
    conditions: Vec<Condition>,
}

impl Operators {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(mut self, condition: Condition) -> Self {
        match self.conditions.iter_mut().find(|c| c.same_slot(&condition)) {
            Some(slot) => *slot = condition,
            None => self.conditions.push(condition),
        }
        self
    }

    pub fn op(self, operator: Operator, value: impl Into<Scalar>) -> Self {
        self.set(Condition::Compare(operator, value.into()))
    }

    pub fn eq(self, value: impl Into<Scalar>) -> Self {
        self.op(Operator::Eq, value)
    }
    pub fn ne(self, value: impl Into<Scalar>) -> Self {
        self.op(Operator::Ne, value)
    }
    /// The pattern is sent verbatim; wildcards (conventionally `*`) are the caller's.
    pub fn like(self, pattern: impl Into<Scalar>) -> Self {
        self.op(Operator::Like, pattern)
    }
    pub fn gte(self, value: impl Into<Scalar>) -> Self {
        self.op(Operator::Gte, value)
    }
    pub fn lte(self, value: impl Into<Scalar>) -> Self {
        self.op(Operator::Lte, value)
    }
    pub fn gt(self, value: impl Into<Scalar>) -> Self {
        self.op(Operator::Gt, value)
    }
    pub fn lt(self, value: impl Into<Scalar>) -> Self {
        self.op(Operator::Lt, value)
    }
    pub fn is_in<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.set(Condition::In(values.into_iter().map(Into::into).collect()))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// The value given for one field of a [`SearchCriteria`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// `FIELD eq value`
    Scalar(Scalar),
    /// `(FIELD eq a or FIELD eq b ...)`
    AnyOf(Vec<Scalar>),
    Operators(Operators),
}

impl FieldValue {
    pub fn any_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        FieldValue::AnyOf(values.into_iter().map(Into::into).collect())
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        FieldValue::Scalar(value)
    }
}

macro_rules! scalar_field_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_field_value!(&str, String, &String, i32, i64, u32, f64, bool);

impl From<Operators> for FieldValue {
    fn from(value: Operators) -> Self {
        FieldValue::Operators(value)
    }
}

/// Field filters keyed by column, kept in insertion order.
///
/// Entries set to `None` are remembered but produce no clause, mirroring an
/// explicitly unset field.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchCriteria<C = String> {
    entries: Vec<(C, Option<FieldValue>)>,
}

impl<C> Default for SearchCriteria<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C: Column> SearchCriteria<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter for a column. A column already present keeps its position.
    pub fn with_opt(mut self, column: C, value: Option<FieldValue>) -> Self {
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.column_name() == column.column_name())
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    pub fn with(self, column: C, value: impl Into<FieldValue>) -> Self {
        self.with_opt(column, Some(value.into()))
    }

    /// Shortcut for a `like` filter with a trailing wildcard.
    pub fn starts_with(self, column: C, prefix: &str) -> Self {
        self.with(column, Operators::new().like(format!("{}*", prefix)))
    }

    /// Shortcut for a `like` filter wrapped in wildcards.
    pub fn contains(self, column: C, fragment: &str) -> Self {
        self.with(column, Operators::new().like(format!("*{}*", fragment)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_none())
    }

    /// Compiles the criteria into a filter expression; see [`build_search_query`].
    pub fn to_filter(&self) -> Option<String> {
        build_search_query(self)
    }
}

/// Compiles criteria into the `q` filter expression.
///
/// Returns `None` when no entry renders a clause, so callers can leave the
/// `q` parameter out entirely.
pub fn build_search_query<C: Column>(criteria: &SearchCriteria<C>) -> Option<String> {
    let clauses: Vec<String> = criteria
        .entries
        .iter()
        .filter_map(|(column, value)| {
            value
                .as_ref()
                .and_then(|value| render_field(column.column_name(), value))
        })
        .collect();

    if clauses.is_empty() {
        None
    } else {
        Some(build_query(&clauses))
    }
}

/// Joins raw filter conditions with `and`.
pub fn build_query<S: AsRef<str>>(conditions: &[S]) -> String {
    conditions
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(" and ")
}

fn render_field(field: &str, value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Scalar(scalar) => Some(format!("{} eq {}", field, scalar)),
        FieldValue::AnyOf(values) => render_any_of(field, values),
        FieldValue::Operators(ops) => {
            let parts: Vec<String> = ops
                .conditions
                .iter()
                .filter_map(|condition| match condition {
                    Condition::Compare(op, scalar) => Some(format!("{} {} {}", field, op, scalar)),
                    Condition::In(values) => render_any_of(field, values),
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(build_query(&parts))
            }
        }
    }
}

// Empty lists produce no clause rather than an unparseable `()`.
fn render_any_of(field: &str, values: &[Scalar]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = values
        .iter()
        .map(|v| format!("{} eq {}", field, v))
        .collect();
    Some(format!("({})", alternatives.join(" or ")))
}
