use quill_client::{Client, Row};
use serde_json::{Map, Value as Json};

use super::error::CliError;

/// One row as a JSON object keyed by column name, values in wire encoding.
fn render_row(row: &Row) -> Json {
    let mut obj = Map::with_capacity(row.len());
    for (name, value) in row.iter() {
        obj.insert(name.to_string(), quill_client::encode(value));
    }
    Json::Object(obj)
}

/// `quill query`: single-use read-only query, rows printed as JSON lines.
pub async fn run(client: &Client, sql: &str) -> Result<(), CliError> {
    let sql = sql.to_string();
    let rs = client
        .with_session(|session| Box::pin(async move { session.execute_single_use(sql).await }))
        .await?;

    for row in &rs {
        println!("{}", serde_json::to_string(&render_row(row))?);
    }
    tracing::info!(rows = rs.len(), "query done");
    Ok(())
}
