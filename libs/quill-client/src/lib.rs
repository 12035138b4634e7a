//! Async HTTP/JSON client for a transactional SQL database service.
//!
//! ```no_run
//! use quill_client::{Client, ClientConfig, ClientError, Statement};
//!
//! # async fn demo() -> Result<(), ClientError> {
//! let client = Client::new(&ClientConfig::load("quill.toml")?)?;
//! let session = client.create_session().await?;
//!
//! let users = session
//!     .run_read_write(|txn| {
//!         Box::pin(async move {
//!             txn.execute(Statement::new("UPDATE users SET active = @a").bind("a", true)).await?;
//!             let rs = txn.execute("SELECT username FROM users").await?;
//!             Ok::<_, ClientError>(rs.len())
//!         })
//!     })
//!     .await?;
//!
//! session.close().await?;
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod session;
mod statement;
mod transaction;
mod transport;
mod wire;

#[cfg(test)]
pub(crate) mod mock;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::Session;
pub use statement::Statement;
pub use transaction::{Mode, ReadOnly, ReadWrite, Transaction, TransactionMode};
pub use transport::{BoxFuture, HttpTransport, Transport};

pub use quill_api::{
    ColumnSchema, DecodeError, Field, ResultSet, ResultSetStats, Row, RowIndex, StructType, Type, TypeCode,
    Value, WireResultSet, decode, encode,
};
