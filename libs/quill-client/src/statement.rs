use std::collections::BTreeMap;

use serde_json::Value as Json;

use quill_api::{Type, Value};

/// SQL text plus named parameters (`@name` in the SQL).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
struct Param {
    name: String,
    value: Value,
    /// `None` leaves the type to the server (untyped NULL).
    param_type: Option<Type>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind `value`, declaring the type implied by its tag.
    pub fn bind(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        let param_type = value.type_code().map(Type::new);
        self.push(name.into(), value, param_type)
    }

    /// Bind `value` with an explicit declared type, e.g. a typed NULL.
    pub fn bind_typed(self, name: impl Into<String>, value: impl Into<Value>, param_type: impl Into<Type>) -> Self {
        self.push(name.into(), value.into(), Some(param_type.into()))
    }

    fn push(mut self, name: String, value: Value, param_type: Option<Type>) -> Self {
        self.params.retain(|p| p.name != name);
        self.params.push(Param { name, value, param_type });
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Wire `params` and `paramTypes` maps.
    pub(crate) fn wire_params(&self) -> (serde_json::Map<String, Json>, BTreeMap<String, Type>) {
        let mut params = serde_json::Map::new();
        let mut types = BTreeMap::new();
        for p in &self.params {
            params.insert(p.name.clone(), quill_api::encode(&p.value));
            if let Some(ty) = &p.param_type {
                types.insert(p.name.clone(), ty.clone());
            }
        }
        (params, types)
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}

impl From<&String> for Statement {
    fn from(sql: &String) -> Self {
        Self::new(sql.as_str())
    }
}
