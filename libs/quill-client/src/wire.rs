//! Request/response bodies of the REST protocol. Field names are camelCase.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use quill_api::Type;

use crate::error::{ClientError, ClientResult};

// ═══════════════════════════════════════════════════════════════
//  Sessions
// ═══════════════════════════════════════════════════════════════

#[derive(Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionTemplate<'a>>,
}

#[derive(Serialize)]
pub(crate) struct SessionTemplate<'a> {
    pub labels: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionResponse {
    pub name: String,
}

// ═══════════════════════════════════════════════════════════════
//  Transactions
// ═══════════════════════════════════════════════════════════════

/// `{"readWrite": {}}` / `{"readOnly": {}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum TransactionOptions {
    ReadWrite {},
    ReadOnly {},
}

#[derive(Serialize)]
pub(crate) struct BeginTransactionRequest {
    pub options: TransactionOptions,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionResponse {
    pub id: String,
}

/// `{"id": "..."}` for an open transaction, `{"singleUse": {...}}` otherwise.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum TransactionSelector<'a> {
    Id(&'a str),
    SingleUse(TransactionOptions),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FinishTransactionRequest<'a> {
    pub transaction_id: &'a str,
}

// ═══════════════════════════════════════════════════════════════
//  executeSql
// ═══════════════════════════════════════════════════════════════

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecuteSqlRequest<'a> {
    pub transaction: TransactionSelector<'a>,
    pub sql: &'a str,
    /// int64, sent as a decimal string like every other int64 on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seqno: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub params: serde_json::Map<String, Json>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub param_types: BTreeMap<String, Type>,
}

/// Deserialize a response body, mapping shape mismatches to `Remote`.
pub(crate) fn parse_response<T: DeserializeOwned>(body: Json, what: &str) -> ClientResult<T> {
    serde_json::from_value(body).map_err(|e| ClientError::Remote(format!("unrecognized {what} response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_options_shape() {
        let begin = BeginTransactionRequest {
            options: TransactionOptions::ReadWrite {},
        };
        assert_eq!(serde_json::to_value(begin).unwrap(), json!({"options": {"readWrite": {}}}));
        assert_eq!(
            serde_json::to_value(TransactionOptions::ReadOnly {}).unwrap(),
            json!({"readOnly": {}})
        );
    }

    #[test]
    fn test_execute_sql_shape() {
        let req = ExecuteSqlRequest {
            transaction: TransactionSelector::Id("tx1"),
            sql: "SELECT 1",
            seqno: Some("4".into()),
            params: serde_json::Map::new(),
            param_types: BTreeMap::new(),
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({"transaction": {"id": "tx1"}, "sql": "SELECT 1", "seqno": "4"})
        );

        let single = ExecuteSqlRequest {
            transaction: TransactionSelector::SingleUse(TransactionOptions::ReadOnly {}),
            sql: "SELECT 1",
            seqno: None,
            params: serde_json::Map::new(),
            param_types: BTreeMap::new(),
        };
        assert_eq!(
            serde_json::to_value(single).unwrap(),
            json!({"transaction": {"singleUse": {"readOnly": {}}}, "sql": "SELECT 1"})
        );
    }

    #[test]
    fn test_finish_request_is_camel_case() {
        let req = FinishTransactionRequest { transaction_id: "tx9" };
        assert_eq!(serde_json::to_value(req).unwrap(), json!({"transactionId": "tx9"}));
    }

    #[test]
    fn test_parse_response_shape_mismatch() {
        let err = parse_response::<TransactionResponse>(json!({"name": "x"}), "beginTransaction").unwrap_err();
        assert!(matches!(err, ClientError::Remote(msg) if msg.contains("beginTransaction")));
    }
}
