//! Filter compiler.
//!
//! Turns a [`TheftFilter`] into a [`Predicate`]. Pure: nothing here touches
//! the store.

use theft_map_database_models::{Clause, Matcher, Predicate, TheftFilter};
use theft_map_theft_models::{ALL_TIMES, TheftField};

/// Splits a comma-joined multi-value parameter into its values.
///
/// Pieces are trimmed and empty pieces dropped, so `None`, `""` and `" , "`
/// all yield an empty list (no constraint).
#[must_use]
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Compiles a filter configuration into a predicate.
///
/// Empty sets and empty strings add no clause, and a `time_of_day` of
/// `"All"` is unconstrained. Clause order follows the option order of
/// [`TheftFilter`].
#[must_use]
pub fn compile(filter: &TheftFilter) -> Predicate {
    let mut clauses = Vec::new();

    push_one_of(&mut clauses, TheftField::Station, &filter.localities);
    push_one_of(&mut clauses, TheftField::Place, &filter.places);
    push_equals(&mut clauses, TheftField::Make, filter.company.as_deref());
    push_one_of(&mut clauses, TheftField::Category, &filter.categories);
    push_equals(
        &mut clauses,
        TheftField::TimeOfDay,
        filter.time_of_day.as_deref().filter(|t| *t != ALL_TIMES),
    );
    push_one_of(&mut clauses, TheftField::Day, &filter.days);
    push_one_of(&mut clauses, TheftField::Spot, &filter.spot_types);

    Predicate::new(clauses)
}

fn push_one_of(clauses: &mut Vec<Clause>, field: TheftField, values: &[String]) {
    let values: Vec<String> = values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect();
    if values.is_empty() {
        return;
    }
    clauses.push(Clause {
        field,
        matcher: Matcher::OneOf(values),
    });
}

fn push_equals(clauses: &mut Vec<Clause>, field: TheftField, value: Option<&str>) {
    if let Some(value) = value
        && !value.trim().is_empty()
    {
        clauses.push(Clause {
            field,
            matcher: Matcher::Equals(value.to_string()),
        });
    }
}
