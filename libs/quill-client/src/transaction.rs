//! Transaction handle with a compile-time access mode.
//!
//! `commit`, `rollback` and `finish` consume the handle, so a second
//! termination or an execute after termination does not compile. `commit`
//! exists only for read-write transactions, `finish` only for read-only ones.

use std::marker::PhantomData;

use quill_api::ResultSet;

use crate::error::ClientResult;
use crate::session::Session;
use crate::statement::Statement;
use crate::wire::{TransactionOptions, TransactionSelector};

/// Access mode of a transaction, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    ReadOnly,
    ReadWrite,
}

impl TransactionMode {
    pub(crate) fn options(self) -> TransactionOptions {
        match self {
            TransactionMode::ReadOnly => TransactionOptions::ReadOnly {},
            TransactionMode::ReadWrite => TransactionOptions::ReadWrite {},
        }
    }
}

impl std::fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionMode::ReadOnly => f.write_str("read-only"),
            TransactionMode::ReadWrite => f.write_str("read-write"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::ReadOnly {}
    impl Sealed for super::ReadWrite {}
}

/// Type-level access mode. Implemented by [`ReadOnly`] and [`ReadWrite`] only.
pub trait Mode: sealed::Sealed + Send + Sync + 'static {
    const KIND: TransactionMode;
}

/// Marker: no writes, no server-side commit; terminate with `finish`.
#[derive(Debug)]
pub enum ReadOnly {}

/// Marker: writes allowed; terminate with `commit` or `rollback`.
#[derive(Debug)]
pub enum ReadWrite {}

impl Mode for ReadOnly {
    const KIND: TransactionMode = TransactionMode::ReadOnly;
}

impl Mode for ReadWrite {
    const KIND: TransactionMode = TransactionMode::ReadWrite;
}

/// An open transaction bound to a borrowed [`Session`].
///
/// Statements carry a sequence number starting at 0 and incremented once per
/// `execute` call, whether or not the call succeeds. `execute` takes
/// `&mut self`: at most one statement is in flight per transaction.
///
/// Dropping a transaction that was never terminated logs a leak warning.
pub struct Transaction<'s, M: Mode> {
    session: &'s Session,
    id: String,
    seqno: i64,
    active: bool,
    _mode: PhantomData<M>,
}

impl<'s, M: Mode> Transaction<'s, M> {
    pub(crate) fn new(session: &'s Session, id: String) -> Self {
        Self {
            session,
            id,
            seqno: 0,
            active: true,
            _mode: PhantomData,
        }
    }

    /// Server-assigned transaction id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> TransactionMode {
        M::KIND
    }

    /// Sequence number the next `execute` will carry.
    pub fn next_seqno(&self) -> i64 {
        self.seqno
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Execute one statement inside this transaction.
    ///
    /// The sequence counter advances before the request is sent, so a failed
    /// call still consumes its number.
    pub async fn execute(&mut self, stmt: impl Into<Statement>) -> ClientResult<ResultSet> {
        let stmt = stmt.into();
        let seqno = self.seqno;
        self.seqno += 1;

        tracing::debug!(
            session = %self.session.name(),
            transaction = %self.id,
            seqno,
            "execute statement"
        );
        self.session
            .execute_sql(TransactionSelector::Id(&self.id), Some(seqno), &stmt)
            .await
            .map_err(|e| e.with_context(format!("statement seqno {seqno}")))
    }

    /// Roll back. Valid in either mode.
    pub async fn rollback(mut self) -> ClientResult<()> {
        self.active = false;
        self.session.rollback_transaction(&self.id).await?;
        tracing::debug!(transaction = %self.id, mode = %M::KIND, "transaction rolled back");
        Ok(())
    }
}

impl<'s> Transaction<'s, ReadWrite> {
    /// Commit the transaction.
    ///
    /// Known limitation: when this returns an error the outcome is unknown.
    /// The server may have applied the commit even though the response was
    /// lost, so retrying risks a double apply. No retry is attempted here.
    pub async fn commit(mut self) -> ClientResult<()> {
        self.active = false;
        self.session.commit_transaction(&self.id).await?;
        tracing::debug!(transaction = %self.id, statements = self.seqno, "transaction committed");
        Ok(())
    }
}

impl<'s> Transaction<'s, ReadOnly> {
    /// Mark the read-only transaction done. No server call: read-only
    /// transactions have nothing to commit.
    pub fn finish(mut self) {
        self.active = false;
        tracing::debug!(transaction = %self.id, "read-only transaction finished");
    }
}

impl<M: Mode> Drop for Transaction<'_, M> {
    fn drop(&mut self) {
        if self.active {
            tracing::warn!(
                session = %self.session.name(),
                transaction = %self.id,
                mode = %M::KIND,
                "transaction dropped while active; it was neither committed, rolled back nor finished"
            );
        }
    }
}

impl<M: Mode> std::fmt::Debug for Transaction<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("mode", &M::KIND)
            .field("seqno", &self.seqno)
            .field("active", &self.active)
            .finish()
    }
}
