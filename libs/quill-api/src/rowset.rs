use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as Json;

use crate::codec;
use crate::error::DecodeError;
use crate::row::Row;
use crate::schema::{ColumnSchema, StructType};

// ════════════════════════════════════════════════════════════════
//  Wire shape
// ════════════════════════════════════════════════════════════════

/// Undecoded `executeSql` response:
/// `{metadata: {rowType: {fields}}, rows: [[...]], stats?}`.
///
/// DML responses may omit `metadata` and `rows`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireResultSet {
    #[serde(default)]
    pub metadata: Option<ResultSetMetadata>,
    #[serde(default)]
    pub rows: Vec<Vec<Json>>,
    #[serde(default)]
    pub stats: Option<ResultSetStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetMetadata {
    #[serde(default)]
    pub row_type: StructType,
}

/// Execution statistics. Counts are int64 and arrive as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetStats {
    #[serde(default)]
    pub row_count_exact: Option<String>,
    #[serde(default)]
    pub row_count_lower_bound: Option<String>,
}

// ════════════════════════════════════════════════════════════════
//  Decoder
// ════════════════════════════════════════════════════════════════

/// Decode raw rows against `schema`, column by column in schema order.
///
/// Every raw row must have exactly `schema.len()` scalars. The whole
/// sequence is materialized before returning.
pub fn decode_rows(schema: &Arc<ColumnSchema>, raw_rows: &[Vec<Json>]) -> Result<Vec<Row>, DecodeError> {
    let mut rows = Vec::with_capacity(raw_rows.len());
    for (row_idx, raw) in raw_rows.iter().enumerate() {
        if raw.len() != schema.len() {
            return Err(DecodeError::malformed(format!(
                "row {row_idx}: expected {} columns, got {}",
                schema.len(),
                raw.len()
            )));
        }
        let mut values = Vec::with_capacity(raw.len());
        for (field, scalar) in schema.fields().iter().zip(raw) {
            let value = codec::decode(scalar, field.field_type.code)
                .map_err(|e| e.with_context(format!("row {row_idx}, column '{}'", field.name)))?;
            values.push(value);
        }
        rows.push(Row::new(values, Arc::clone(schema)));
    }
    Ok(rows)
}

// ════════════════════════════════════════════════════════════════
//  ResultSet
// ════════════════════════════════════════════════════════════════

/// Fully decoded result of one statement.
#[derive(Debug, Clone)]
pub struct ResultSet {
    schema: Arc<ColumnSchema>,
    rows: Vec<Row>,
    stats: Option<ResultSetStats>,
    row_count_exact: Option<i64>,
}

impl ResultSet {
    /// Build the shared schema once from the response metadata, then decode
    /// every row against it.
    pub fn decode(wire: WireResultSet) -> Result<Self, DecodeError> {
        let row_type = wire.metadata.map(|m| m.row_type).unwrap_or_default();
        let schema = Arc::new(ColumnSchema::from(row_type));
        let rows = decode_rows(&schema, &wire.rows)?;
        let row_count_exact = match &wire.stats {
            Some(stats) => {
                parse_count("rowCountLowerBound", stats.row_count_lower_bound.as_deref())?;
                parse_count("rowCountExact", stats.row_count_exact.as_deref())?
            }
            None => None,
        };
        Ok(Self {
            schema,
            rows,
            stats: wire.stats,
            row_count_exact,
        })
    }

    pub fn schema(&self) -> &Arc<ColumnSchema> {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn stats(&self) -> Option<&ResultSetStats> {
        self.stats.as_ref()
    }

    /// Exact number of rows modified by a DML statement.
    pub fn row_count_exact(&self) -> Option<i64> {
        self.row_count_exact
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Stats counts are int64 and follow the INT64 column rule.
fn parse_count(name: &str, raw: Option<&str>) -> Result<Option<i64>, DecodeError> {
    raw.map(|n| {
        n.parse::<i64>()
            .map_err(|e| DecodeError::malformed(format!("stats {name} {n:?}: {e}")))
    })
    .transpose()
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, TypeCode};
    use crate::value::Value;
    use chrono::DateTime;
    use serde_json::json;

    fn login_schema() -> Arc<ColumnSchema> {
        Arc::new(ColumnSchema::new(vec![
            Field::new("username", TypeCode::String),
            Field::new("last_login", TypeCode::Timestamp),
        ]))
    }

    #[test]
    fn test_login_scenario() {
        let schema = login_schema();
        let raw = vec![
            vec![json!("janedoe"), json!("2024-01-01T00:00:00.000Z")],
            vec![json!("bobsmith"), Json::Null],
        ];
        let rows = decode_rows(&schema, &raw).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("username"), Some(&Value::from("janedoe")));
        assert_eq!(
            rows[0].get("last_login"),
            Some(&Value::Timestamp(DateTime::from_timestamp(1_704_067_200, 0).unwrap()))
        );
        assert_eq!(rows[1].get("last_login"), Some(&Value::Null));
        assert_eq!(rows[0].get("email"), None);
        assert_eq!(rows[1].get("email"), None);
    }

    #[test]
    fn test_rows_share_schema() {
        let schema = login_schema();
        let raw = vec![
            vec![json!("a"), Json::Null],
            vec![json!("b"), Json::Null],
        ];
        let rows = decode_rows(&schema, &raw).unwrap();
        assert!(Arc::ptr_eq(rows[0].schema(), &schema));
        assert!(Arc::ptr_eq(rows[1].schema(), &schema));
    }

    #[test]
    fn test_column_count_mismatch() {
        let schema = login_schema();
        let short = vec![vec![json!("janedoe")]];
        let err = decode_rows(&schema, &short).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedValue(_)));

        let long = vec![vec![json!("a"), Json::Null, json!(1)]];
        assert!(matches!(decode_rows(&schema, &long), Err(DecodeError::MalformedValue(_))));
    }

    #[test]
    fn test_error_names_row_and_column() {
        let schema = login_schema();
        let raw = vec![
            vec![json!("ok"), Json::Null],
            vec![json!("bad"), json!("not a time")],
        ];
        match decode_rows(&schema, &raw).unwrap_err() {
            DecodeError::MalformedValue(msg) => {
                assert!(msg.starts_with("row 1, column 'last_login'"), "{msg}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_result_set_from_wire() {
        let wire: WireResultSet = serde_json::from_value(json!({
            "metadata": {"rowType": {"fields": [
                {"name": "id", "type": {"code": "INT64"}},
                {"name": "payload", "type": {"code": "BYTES"}}
            ]}},
            "rows": [["1", "AAE="], ["2", null]]
        }))
        .unwrap();
        let rs = ResultSet::decode(wire).unwrap();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.schema().len(), 2);
        assert_eq!(rs.rows()[0].get("payload"), Some(&Value::Bytes(vec![0, 1])));
        assert_eq!(rs.rows()[1].get(0), Some(&Value::Int64(2)));
        assert_eq!(rs.row_count_exact(), None);
    }

    #[test]
    fn test_dml_result_without_rows() {
        let wire: WireResultSet = serde_json::from_value(json!({
            "metadata": {"rowType": {}},
            "stats": {"rowCountExact": "3"}
        }))
        .unwrap();
        let rs = ResultSet::decode(wire).unwrap();
        assert!(rs.is_empty());
        assert!(rs.schema().is_empty());
        assert_eq!(rs.row_count_exact(), Some(3));
    }

    #[test]
    fn test_unsupported_column_type() {
        let wire: WireResultSet = serde_json::from_value(json!({
            "metadata": {"rowType": {"fields": [{"name": "n", "type": {"code": "NUMERIC"}}]}},
            "rows": [["1.5"]]
        }))
        .unwrap();
        assert_eq!(
            ResultSet::decode(wire).unwrap_err(),
            DecodeError::UnsupportedType(TypeCode::Numeric)
        );
    }

    #[test]
    fn test_unknown_column_type() {
        let wire: WireResultSet = serde_json::from_value(json!({
            "metadata": {"rowType": {"fields": [{"name": "u", "type": {"code": "UUID"}}]}},
            "rows": [[null]]
        }))
        .unwrap();
        let rs = ResultSet::decode(wire).unwrap();
        assert_eq!(rs.rows()[0].get("u"), Some(&Value::Null));

        let wire: WireResultSet = serde_json::from_value(json!({
            "metadata": {"rowType": {"fields": [{"name": "u", "type": {"code": "UUID"}}]}},
            "rows": [["3f2c0b4e-0000-4000-8000-000000000000"]]
        }))
        .unwrap();
        assert_eq!(
            ResultSet::decode(wire).unwrap_err(),
            DecodeError::UnsupportedType(TypeCode::Unknown)
        );
    }

    #[test]
    fn test_malformed_stats_count() {
        let wire: WireResultSet = serde_json::from_value(json!({
            "stats": {"rowCountExact": "three"}
        }))
        .unwrap();
        match ResultSet::decode(wire) {
            Err(DecodeError::MalformedValue(msg)) => assert!(msg.contains("rowCountExact"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }

        let wire: WireResultSet = serde_json::from_value(json!({
            "stats": {"rowCountLowerBound": "1.5"}
        }))
        .unwrap();
        assert!(matches!(ResultSet::decode(wire), Err(DecodeError::MalformedValue(_))));
    }
}
