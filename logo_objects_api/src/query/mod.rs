//! Query compilation: filter criteria to the `q` expression, and list options
//! to URL query strings. Everything here is pure.

mod criteria;
pub use self::criteria::{
    build_query, build_search_query, Column, FieldValue, Operator, Operators, Scalar,
    SearchCriteria,
};

mod options;
pub use self::options::{build_query_string, Query, QueryOptions, SortDirection, SortSpec};
