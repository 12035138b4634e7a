use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::transport::{BoxFuture, HttpTransport, Transport};

/// Entry point: one database, one transport, any number of sessions.
///
/// Cheap to clone; clones share the transport and its connection pool.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    database: String,
    session_labels: HashMap<String, String>,
}

impl Client {
    /// Build a client talking HTTP to `config.endpoint`.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        tracing::info!(
            endpoint = %config.endpoint,
            database = %config.database_path(),
            "client initialized"
        );
        Ok(Self {
            transport: Arc::new(transport),
            database: config.database_path(),
            session_labels: config.session_labels.clone(),
        })
    }

    /// Build a client over any [`Transport`]. `database` is the full
    /// `projects/.../databases/...` path.
    pub fn with_transport(database: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            database: database.into(),
            session_labels: HashMap::new(),
        }
    }

    pub fn session_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.session_labels = labels;
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Create a session. The caller owns it and must `close` it.
    pub async fn create_session(&self) -> ClientResult<Session> {
        Session::create(self.transport.clone(), &self.database, &self.session_labels).await
    }

    /// Run `f` with a fresh session, closing it on every exit path.
    ///
    /// The body's error takes precedence over a close failure, which is then
    /// only logged.
    pub async fn with_session<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: for<'s> FnOnce(&'s Session) -> BoxFuture<'s, Result<T, E>>,
        E: From<ClientError>,
    {
        let session = self.create_session().await?;
        let outcome = f(&session).await;
        match outcome {
            Ok(value) => {
                session.close().await?;
                Ok(value)
            }
            Err(e) => {
                let name = session.name().to_string();
                if let Err(close_err) = session.close().await {
                    tracing::warn!(session = %name, error = %close_err, "close after failed session body failed");
                }
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("database", &self.database)
            .field("session_labels", &self.session_labels)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig::new("p", "", "d");
        assert!(matches!(Client::new(&config), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_new_uses_database_path() {
        let client = Client::new(&ClientConfig::new("p", "i", "d")).unwrap();
        assert_eq!(client.database(), "projects/p/instances/i/databases/d");
    }

    #[tokio::test]
    async fn test_with_session_closes_on_success() {
        let (client, mock) = MockTransport::client();
        let n = client
            .with_session(|session| {
                Box::pin(async move {
                    let rs = session.execute_single_use("SELECT 1").await?;
                    Ok::<_, ClientError>(rs.len())
                })
            })
            .await
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(mock.deletes().len(), 1);
    }

    #[tokio::test]
    async fn test_with_session_closes_on_error() {
        let (client, mock) = MockTransport::client();
        let result: Result<(), ClientError> = client
            .with_session(|session| {
                Box::pin(async move {
                    session.execute_single_use("boom").await?;
                    Ok(())
                })
            })
            .await;
        assert!(matches!(result, Err(ClientError::Remote(_))));
        assert_eq!(mock.deletes().len(), 1);
    }

    #[tokio::test]
    async fn test_with_session_body_error_wins_over_close_error() {
        let (client, mock) = MockTransport::client();
        mock.fail_on("DELETE");
        let result: Result<(), ClientError> = client
            .with_session(|_session| Box::pin(async move { Err(ClientError::Config("body".into())) }))
            .await;
        assert!(matches!(result, Err(ClientError::Config(msg)) if msg == "body"));
    }

    #[tokio::test]
    async fn test_with_session_and_transaction_nest() {
        let (client, mock) = MockTransport::client();
        client
            .with_session(|session| {
                Box::pin(async move {
                    session
                        .run_read_write(|txn| {
                            Box::pin(async move {
                                txn.execute("INSERT 1").await?;
                                Ok::<_, ClientError>(())
                            })
                        })
                        .await
                })
            })
            .await
            .unwrap();
        assert_eq!(mock.calls_to(":commit").len(), 1);
        assert_eq!(mock.deletes().len(), 1);
    }
}
