//! # Condition tables
//!
//! A condition table is a user-supplied CSV file mapping wells to
//! experimental conditions (treatment, dose, cell line, ...). Rows are keyed by
//! plate row letter, column number and, optionally, acquisition id:
//!
//! ```text
//! row,column,acquisition,treatment,dose
//! A,1,0,DMSO,0.0
//! A,2,0,Drug X,1.5
//! ```
//!
//! Header matching for `row`, `column`/`col` and `acquisition` is
//! case-insensitive; cell values are compared exactly. When a table has both
//! a `column` and a `col` header, the one declared first is the key. Every
//! other column becomes a per-well attribute attached to the tiles of that
//! well.

mod resolve;
mod table;


pub use resolve::{attributes_from_condition_table, PLACEHOLDER_VALUES};
pub use table::ConditionTable;
