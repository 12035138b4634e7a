use quill_client::{Client, ClientError};

use super::error::CliError;

fn load_script(file: &str) -> Result<Vec<String>, CliError> {
    quill_sql::split_file(file).map_err(|source| CliError::Io {
        path: file.to_string(),
        source,
    })
}

/// `quill split`: print each statement of the script, separated by blank lines.
pub fn split(file: &str) -> Result<(), CliError> {
    for stmt in load_script(file)? {
        println!("{stmt};\n");
    }
    Ok(())
}

/// `quill run`: execute the script in one read-write transaction. Any failing
/// statement rolls the whole script back.
pub async fn run(client: &Client, file: &str) -> Result<(), CliError> {
    let statements = load_script(file)?;
    if statements.is_empty() {
        tracing::info!(file, "script has no statements");
        return Ok(());
    }
    tracing::info!(file, statements = statements.len(), "running script");

    let affected = client
        .with_session(|session| {
            Box::pin(async move {
                session
                    .run_read_write(move |txn| {
                        Box::pin(async move {
                            let mut affected = 0i64;
                            for (i, sql) in statements.iter().enumerate() {
                                let rs = txn.execute(sql.as_str()).await?;
                                let count = rs.row_count_exact().unwrap_or(rs.len() as i64);
                                tracing::info!(statement = i + 1, rows = count, "statement done");
                                affected += rs.row_count_exact().unwrap_or(0);
                            }
                            Ok::<_, ClientError>(affected)
                        })
                    })
                    .await
            })
        })
        .await?;

    tracing::info!(file, rows_affected = affected, "script committed");
    Ok(())
}
