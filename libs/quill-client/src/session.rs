use std::collections::HashMap;
use std::sync::Arc;

use quill_api::{ResultSet, WireResultSet};

use crate::error::{ClientError, ClientResult};
use crate::statement::Statement;
use crate::transaction::{Mode, ReadOnly, ReadWrite, Transaction, TransactionMode};
use crate::transport::{BoxFuture, Transport};
use crate::wire::{
    BeginTransactionRequest, CreateSessionRequest, ExecuteSqlRequest, FinishTransactionRequest,
    SessionResponse, SessionTemplate, TransactionResponse, TransactionSelector, parse_response,
};

/// Server-side session handle.
///
/// Lifecycle: created → any number of transactions → closed. `close`
/// consumes the handle and transactions borrow it, so a session can neither
/// be used after close nor closed under a live transaction.
///
/// Dropping a session that was never closed logs a leak warning; the server
/// reaps it eventually.
pub struct Session {
    transport: Arc<dyn Transport>,
    name: String,
    closed: bool,
}

impl Session {
    /// Allocate a new session on `database`
    /// (`projects/{p}/instances/{i}/databases/{d}`).
    pub async fn create(
        transport: Arc<dyn Transport>,
        database: &str,
        labels: &HashMap<String, String>,
    ) -> ClientResult<Self> {
        let request = CreateSessionRequest {
            session: (!labels.is_empty()).then_some(SessionTemplate { labels }),
        };
        let path = format!("/v1/{database}/sessions");
        let body = transport.post(&path, serde_json::to_value(&request)?).await?;
        let resp: SessionResponse = parse_response(body, "createSession")?;
        if resp.name.is_empty() {
            return Err(ClientError::Remote("createSession returned an empty session name".into()));
        }

        tracing::info!(session = %resp.name, "session created");
        Ok(Self {
            transport,
            name: resp.name,
            closed: false,
        })
    }

    /// Server-assigned session name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Transactions ──

    /// Begin a transaction whose mode is chosen by the type parameter.
    pub async fn begin_transaction<M: Mode>(&self) -> ClientResult<Transaction<'_, M>> {
        let request = BeginTransactionRequest {
            options: M::KIND.options(),
        };
        let path = self.path("beginTransaction");
        let body = self.transport.post(&path, serde_json::to_value(&request)?).await?;
        let resp: TransactionResponse = parse_response(body, "beginTransaction")?;

        tracing::debug!(session = %self.name, transaction = %resp.id, mode = %M::KIND, "transaction started");
        Ok(Transaction::new(self, resp.id))
    }

    pub async fn begin_read_write(&self) -> ClientResult<Transaction<'_, ReadWrite>> {
        self.begin_transaction().await
    }

    pub async fn begin_read_only(&self) -> ClientResult<Transaction<'_, ReadOnly>> {
        self.begin_transaction().await
    }

    /// Run one read-only statement in a single-use transaction. No
    /// transaction handle and no sequence number are involved.
    pub async fn execute_single_use(&self, stmt: impl Into<Statement>) -> ClientResult<ResultSet> {
        let stmt = stmt.into();
        let selector = TransactionSelector::SingleUse(TransactionMode::ReadOnly.options());
        self.execute_sql(selector, None, &stmt).await
    }

    /// Run `f` inside a read-write transaction.
    ///
    /// `Ok` commits; `Err` rolls back and returns the body's error. A failed
    /// rollback is only logged: the body's error is the one worth reporting.
    /// A failed commit is returned as is and never retried.
    pub async fn run_read_write<'s, F, T, E>(&'s self, f: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut Transaction<'s, ReadWrite>) -> BoxFuture<'t, Result<T, E>>,
        E: From<ClientError>,
    {
        let mut txn = self.begin_read_write().await?;
        let outcome = f(&mut txn).await;
        match outcome {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(e) => {
                let id = txn.id().to_string();
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(
                        session = %self.name,
                        transaction = %id,
                        error = %rollback_err,
                        "rollback after failed transaction body failed"
                    );
                }
                Err(e)
            }
        }
    }

    /// Run `f` inside a read-only transaction, finishing it on every exit path.
    pub async fn run_read_only<'s, F, T, E>(&'s self, f: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut Transaction<'s, ReadOnly>) -> BoxFuture<'t, Result<T, E>>,
        E: From<ClientError>,
    {
        let mut txn = self.begin_read_only().await?;
        let outcome = f(&mut txn).await;
        txn.finish();
        outcome
    }

    /// Terminate the session. Calling code cannot close twice: the handle is
    /// consumed even when the request fails.
    pub async fn close(mut self) -> ClientResult<()> {
        self.closed = true;
        let path = format!("/v1/{}", self.name);
        self.transport.delete(&path).await?;
        tracing::info!(session = %self.name, "session closed");
        Ok(())
    }

    // ── Wire calls shared with Transaction ──

    fn path(&self, method: &str) -> String {
        format!("/v1/{}:{method}", self.name)
    }

    pub(crate) async fn execute_sql(
        &self,
        selector: TransactionSelector<'_>,
        seqno: Option<i64>,
        stmt: &Statement,
    ) -> ClientResult<ResultSet> {
        let (params, param_types) = stmt.wire_params();
        let request = ExecuteSqlRequest {
            transaction: selector,
            sql: stmt.sql(),
            seqno: seqno.map(|n| n.to_string()),
            params,
            param_types,
        };
        let path = self.path("executeSql");
        let body = self.transport.post(&path, serde_json::to_value(&request)?).await?;
        let wire: WireResultSet = parse_response(body, "executeSql")?;
        Ok(ResultSet::decode(wire)?)
    }

    pub(crate) async fn commit_transaction(&self, id: &str) -> ClientResult<()> {
        let request = FinishTransactionRequest { transaction_id: id };
        let path = self.path("commit");
        self.transport.post(&path, serde_json::to_value(&request)?).await?;
        Ok(())
    }

    pub(crate) async fn rollback_transaction(&self, id: &str) -> ClientResult<()> {
        let request = FinishTransactionRequest { transaction_id: id };
        let path = self.path("rollback");
        self.transport.post(&path, serde_json::to_value(&request)?).await?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(session = %self.name, "session dropped without close()");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("closed", &self.closed)
            .finish()
    }
}
