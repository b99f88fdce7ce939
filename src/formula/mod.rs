//! Filter formula builder
//!
//! Builds `filterByFormula` strings. Tokens are classified as function calls
//! (inserted bare), column references (`{column}`) or literals (`'value'`),
//! and then composed inside `AND(...)`, `OR(...)` and `NOT(...)`.

mod builder;

pub use builder::{
    all_of, any_of, classify_column, classify_value, date_range_filter, field_equals,
    is_formula_call, not, DateBound,
};
