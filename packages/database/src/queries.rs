//! SQL query functions over the `thefts` document table.
//!
//! Every logical field read compiles to a `COALESCE` over each stored
//! spelling, so documents from different dataset versions group and filter
//! together. Predicate values are always bound as parameters; only static
//! key names and replacement literals are spliced into the SQL text.

use std::fmt::Write as _;

use duckdb::{Connection, params_from_iter};
use theft_map_database_models::{
    GroupCount, GroupOrder, GroupQuery, Matcher, Predicate, TheftDocument,
};
use theft_map_theft_models::TheftField;

use crate::{DbError, apply_projection};

/// Returns the SQL expression reading `field` as text from `doc`.
#[must_use]
pub fn field_expr(field: TheftField) -> String {
    let reads: Vec<String> = field
        .stored_keys()
        .iter()
        .map(|key| format!("json_extract_string(doc, '$.\"{key}\"')"))
        .collect();
    if reads.len() == 1 {
        reads.into_iter().next().unwrap_or_default()
    } else {
        format!("COALESCE({})", reads.join(", "))
    }
}

/// Builds a WHERE clause (with leading space) and its bound parameters.
///
/// Returns an empty string for the empty predicate.
#[must_use]
pub fn where_clause(predicate: &Predicate) -> (String, Vec<String>) {
    let mut frags = Vec::new();
    let mut params = Vec::new();

    for clause in predicate.clauses() {
        let expr = field_expr(clause.field);
        match &clause.matcher {
            Matcher::Equals(value) => {
                frags.push(format!("{expr} = ?"));
                params.push(value.clone());
            }
            Matcher::OneOf(values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                frags.push(format!("{expr} IN ({placeholders})"));
                params.extend(values.iter().cloned());
            }
        }
    }

    if frags.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", frags.join(" AND ")), params)
    }
}

fn sql_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Builds the grouped-count SQL for `query` and its bound parameters.
#[must_use]
pub fn group_sql(predicate: &Predicate, query: &GroupQuery) -> (String, Vec<String>) {
    let (wc, params) = where_clause(predicate);

    let mut select = Vec::with_capacity(query.keys.len());
    let mut group_by = Vec::with_capacity(query.keys.len());
    for (i, key) in query.keys.iter().enumerate() {
        let expr = field_expr(key.field);
        let expr = match &key.if_missing {
            Some(literal) => format!("COALESCE({expr}, {})", sql_literal(literal)),
            None => expr,
        };
        select.push(format!("{expr} AS k{i}"));
        group_by.push(format!("k{i}"));
    }

    let key_order = |nulls: &str| {
        group_by
            .iter()
            .map(|k| format!("{k} ASC NULLS {nulls}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let order_by = match query.order {
        GroupOrder::CountDesc => format!("cnt DESC, {}", key_order("LAST")),
        GroupOrder::KeyAsc => format!("{}, cnt DESC", key_order("FIRST")),
    };

    let mut sql = format!(
        "SELECT {}, COUNT(*) AS cnt FROM thefts{wc} GROUP BY {} ORDER BY {order_by}",
        select.join(", "),
        group_by.join(", "),
    );
    if let Some(limit) = query.limit {
        let _ = write!(sql, " LIMIT {limit}");
    }

    (sql, params)
}

/// Counts documents matching `predicate`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count(conn: &Connection, predicate: &Predicate) -> Result<u64, DbError> {
    let (wc, params) = where_clause(predicate);
    let mut stmt = conn.prepare(&format!("SELECT COUNT(*) FROM thefts{wc}"))?;
    let total: i64 = stmt.query_row(params_from_iter(params.iter()), |row| row.get(0))?;
    Ok(u64::try_from(total).unwrap_or(0))
}

/// Groups documents matching `predicate` and counts each group.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn group_count(
    conn: &Connection,
    predicate: &Predicate,
    query: &GroupQuery,
) -> Result<Vec<GroupCount>, DbError> {
    let (sql, params) = group_sql(predicate, query);
    let key_count = query.keys.len();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        let mut keys = Vec::with_capacity(key_count);
        for i in 0..key_count {
            keys.push(row.get::<_, Option<String>>(i)?);
        }
        let cnt: i64 = row.get(key_count)?;
        Ok(GroupCount {
            keys,
            count: u64::try_from(cnt).unwrap_or(0),
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Returns documents matching `predicate` in insertion order, projected to
/// `projection` (empty = whole document).
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored document is not a
/// JSON object.
pub fn find(
    conn: &Connection,
    predicate: &Predicate,
    projection: &[TheftField],
) -> Result<Vec<TheftDocument>, DbError> {
    let (wc, params) = where_clause(predicate);
    let mut stmt = conn.prepare(&format!(
        "SELECT CAST(doc AS VARCHAR) FROM thefts{wc} ORDER BY id"
    ))?;
    let raw = stmt
        .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    raw.iter()
        .map(|text| parse_document(text).map(|doc| apply_projection(doc, projection)))
        .collect()
}

/// Parses a stored JSON document.
///
/// # Errors
///
/// Returns [`DbError`] if `text` is not a JSON object.
pub fn parse_document(text: &str) -> Result<TheftDocument, DbError> {
    match serde_json::from_str(text)? {
        serde_json::Value::Object(map) => Ok(TheftDocument::new(map)),
        other => Err(DbError::Conversion {
            message: format!("Stored theft record is not an object: {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use theft_map_database_models::{Clause, TheftFilter};

    use super::*;
    use crate::filter::compile;

    #[test]
    fn single_spelling_reads_directly() {
        assert_eq!(
            field_expr(TheftField::Station),
            "json_extract_string(doc, '$.\"POLICE_STATION\"')"
        );
    }

    #[test]
    fn multiple_spellings_coalesce() {
        assert_eq!(
            field_expr(TheftField::Make),
            "COALESCE(json_extract_string(doc, '$.\"MAKE\"'), json_extract_string(doc, '$.\"Make\"'))"
        );
    }

    #[test]
    fn empty_predicate_has_no_where_clause() {
        let (wc, params) = where_clause(&Predicate::default());
        assert!(wc.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn binds_every_value() {
        let filter = TheftFilter {
            localities: vec!["A".to_string(), "B".to_string()],
            company: Some("Honda".to_string()),
            ..TheftFilter::default()
        };
        let (wc, params) = where_clause(&compile(&filter));
        assert!(wc.starts_with(" WHERE "));
        assert_eq!(wc.matches('?').count(), 3);
        assert!(wc.contains(" IN (?, ?)"));
        assert!(wc.contains(" AND "));
        assert_eq!(params, vec!["A", "B", "Honda"]);
    }

    #[test]
    fn values_never_reach_sql_text() {
        let predicate = Predicate::new(vec![Clause {
            field: TheftField::Place,
            matcher: Matcher::Equals("x' OR 1=1 --".to_string()),
        }]);
        let (wc, _) = where_clause(&predicate);
        assert!(!wc.contains("OR 1=1"));
    }

    #[test]
    fn group_sql_orders_and_limits() {
        let (sql, _) = group_sql(
            &Predicate::default(),
            &GroupQuery::by(TheftField::Make).limit(5),
        );
        assert!(sql.contains("GROUP BY k0"));
        assert!(sql.contains("ORDER BY cnt DESC, k0 ASC NULLS LAST"));
        assert!(sql.ends_with(" LIMIT 5"));
    }

    #[test]
    fn group_sql_escapes_replacement_literal() {
        let (sql, _) = group_sql(
            &Predicate::default(),
            &GroupQuery::by(TheftField::Station).if_missing("O'Brien"),
        );
        assert!(sql.contains("'O''Brien'"));
    }

    #[test]
    fn key_ascending_puts_missing_first() {
        let (sql, _) = group_sql(
            &Predicate::default(),
            &GroupQuery::by_all(&[TheftField::Make, TheftField::TimeOfDay])
                .order(GroupOrder::KeyAsc),
        );
        assert!(sql.contains("ORDER BY k0 ASC NULLS FIRST, k1 ASC NULLS FIRST, cnt DESC"));
    }
}
