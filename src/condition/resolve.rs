use std::collections::BTreeSet;

use super::ConditionTable;
use crate::error::ConfigurationError;
use crate::logging::RunLogger;
use crate::model::{AttributeValue, Attributes};

/// String cells treated as missing values after trimming
pub const PLACEHOLDER_VALUES: [&str; 4] = ["", "Na", "NA", "N/A"];

fn matches_text(cell: &AttributeValue, expected: &str) -> bool {
    matches!(cell, AttributeValue::String(s) if s == expected)
}

fn matches_number(cell: &AttributeValue, expected: u32) -> bool {
    match cell {
        AttributeValue::Int(n) => *n == i64::from(expected),
        AttributeValue::Float(x) => *x == f64::from(expected),
        _ => false,
    }
}

/// Well column and acquisition keys must be numbers (or missing) in every row
fn check_numeric_key(table: &ConditionTable, index: usize) -> Result<(), ConfigurationError> {
    let offending = table.rows().iter().map(|cells| &cells[index]).find(|cell| {
        !matches!(
            cell,
            AttributeValue::Int(_) | AttributeValue::Float(_) | AttributeValue::Null
        )
    });
    match offending {
        Some(cell) => Err(ConfigurationError::MalformedConditionTable(format!(
            "'{}' must hold numbers, found a {} value",
            table.columns()[index],
            cell.type_name()
        ))),
        None => Ok(()),
    }
}

fn clean_text(value: &AttributeValue) -> AttributeValue {
    match value {
        AttributeValue::String(s) => {
            let trimmed = s.trim();
            if PLACEHOLDER_VALUES.contains(&trimmed) {
                AttributeValue::Null
            } else {
                AttributeValue::String(trimmed.to_string())
            }
        }
        other => other.clone(),
    }
}

/// Resolve the condition attributes of one well.
///
/// Returns an empty mapping when there is no table or no matching row. The
/// `row`, `column`/`col` and `acquisition` columns are not returned. When
/// several rows match, the first one provides the values; every matched row
/// still takes part in the column type check. A well column or acquisition
/// column that is not numeric is rejected as malformed.
pub fn attributes_from_condition_table(
    table: Option<&ConditionTable>,
    row: &str,
    column: u32,
    acquisition: u32,
    log: &RunLogger,
) -> Result<Attributes, ConfigurationError> {
    let Some(table) = table else {
        return Ok(Attributes::new());
    };

    let row_index = table
        .find_column("row")
        .ok_or(ConfigurationError::MissingRowColumn)?;
    let column_index = table
        .find_any_column(&["column", "col"])
        .ok_or(ConfigurationError::MissingColumnColumn)?;
    let acquisition_index = table.find_column("acquisition");
    check_numeric_key(table, column_index)?;
    if let Some(index) = acquisition_index {
        check_numeric_key(table, index)?;
    }

    let matched: Vec<&Vec<AttributeValue>> = table
        .rows()
        .iter()
        .filter(|cells| {
            matches_text(&cells[row_index], row)
                && matches_number(&cells[column_index], column)
                && acquisition_index.map_or(true, |i| matches_number(&cells[i], acquisition))
        })
        .collect();

    if matched.is_empty() {
        log.warn(format_args!(
            "No matching entry found in condition table for {row}{column} (acquisition {acquisition})"
        ));
        return Ok(Attributes::new());
    }
    if matched.len() > 1 {
        log.warn(format_args!(
            "{} entries found in condition table for {row}{column} (acquisition {acquisition}), \
             using the first one",
            matched.len()
        ));
    }

    let mut attributes = Attributes::new();
    for (index, name) in table.columns().iter().enumerate() {
        if index == row_index || index == column_index || Some(index) == acquisition_index {
            continue;
        }
        let values: Vec<&AttributeValue> = matched.iter().map(|cells| &cells[index]).collect();

        let all_text = values
            .iter()
            .all(|v| matches!(v, AttributeValue::String(_) | AttributeValue::Null));
        let all_scalar = values.iter().all(|v| {
            matches!(
                v,
                AttributeValue::Int(_)
                    | AttributeValue::Float(_)
                    | AttributeValue::Bool(_)
                    | AttributeValue::Null
            )
        });

        let value = if all_text {
            clean_text(values[0])
        } else if all_scalar {
            values[0].clone()
        } else {
            let types: BTreeSet<&str> = values.iter().map(|v| v.type_name()).collect();
            return Err(ConfigurationError::MixedTypeColumn {
                column: name.clone(),
                types: types.into_iter().collect::<Vec<_>>().join(", "),
            });
        };
        attributes.insert(name.clone(), value);
    }

    Ok(attributes)
}
