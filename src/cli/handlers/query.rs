use anyhow::{Context, Result};

use super::CommandContext;
use crate::bocchi::Bocchi;
use crate::client::{FetchPolicy, QueryOptions};
use crate::scope::QueryScope;

pub fn handle_query(
    ctx: &CommandContext,
    query: String,
    variables: Option<String>,
    operation_name: Option<String>,
    fetch_policy: Option<FetchPolicy>,
    data_only: bool,
) -> Result<()> {
    let mut options = QueryOptions::new();
    if let Some(v) = variables {
        options = options.with_variables(
            serde_json::from_str(&v).context("Failed to parse --variables as JSON")?,
        );
    }
    if let Some(name) = operation_name {
        options.operation_name = Some(name);
    }
    options.fetch_policy = fetch_policy;

    let bocchi = Bocchi::with_config(ctx.schema(), &ctx.config.client);

    let result = tokio::runtime::Runtime::new()?.block_on(async {
        let scope = QueryScope::mount();
        let mut observable = scope.use_query(&bocchi.client, query, Some(options));
        let result = observable.settled().await;
        scope.unmount();
        result
    });

    if data_only {
        println!("{}", serde_json::to_string_pretty(&result.data)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if let Some(error) = result.error {
        anyhow::bail!("{}", error);
    }
    Ok(())
}
