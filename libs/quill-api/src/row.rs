use std::sync::Arc;

use crate::schema::ColumnSchema;
use crate::value::Value;

/// One decoded row.
///
/// Values are positional, order matches `schema.fields()`. The schema is
/// shared with every other row of the same result; only the `Arc` is cloned.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
    schema: Arc<ColumnSchema>,
}

impl Row {
    pub(crate) fn new(values: Vec<Value>, schema: Arc<ColumnSchema>) -> Self {
        Self { values, schema }
    }

    /// Value by position (`usize`) or by column name (`&str`).
    ///
    /// Out of range positions and unknown names yield `None`.
    pub fn get<I: RowIndex>(&self, index: I) -> Option<&Value> {
        index.position(&self.schema).and_then(|i| self.values.get(i))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn schema(&self) -> &Arc<ColumnSchema> {
        &self.schema
    }

    /// `(column name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Column selector accepted by [`Row::get`].
pub trait RowIndex {
    fn position(&self, schema: &ColumnSchema) -> Option<usize>;
}

impl RowIndex for usize {
    fn position(&self, schema: &ColumnSchema) -> Option<usize> {
        (*self < schema.len()).then_some(*self)
    }
}

impl RowIndex for &str {
    fn position(&self, schema: &ColumnSchema) -> Option<usize> {
        schema.index_of(self)
    }
}

impl RowIndex for &String {
    fn position(&self, schema: &ColumnSchema) -> Option<usize> {
        schema.index_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, TypeCode};

    fn row() -> Row {
        let schema = Arc::new(ColumnSchema::new(vec![
            Field::new("id", TypeCode::Int64),
            Field::new("name", TypeCode::String),
        ]));
        Row::new(vec![Value::Int64(1), Value::from("ada")], schema)
    }

    #[test]
    fn test_get_by_position_and_name() {
        let row = row();
        assert_eq!(row.get(0), Some(&Value::Int64(1)));
        assert_eq!(row.get("name"), Some(&Value::from("ada")));
        let key = String::from("id");
        assert_eq!(row.get(&key), Some(&Value::Int64(1)));
    }

    #[test]
    fn test_absent_lookups() {
        let row = row();
        assert_eq!(row.get(2), None);
        assert_eq!(row.get("nope"), None);
    }

    #[test]
    fn test_iter_pairs() {
        let row = row();
        let names: Vec<&str> = row.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["id", "name"]);
    }
}
