use clap::Args;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{GlobalRole, Principal};
use crate::cli::utils::{connect, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::PgStore;
use crate::scope::{RequestHints, TenantResolver};

#[derive(Debug, Args)]
pub struct ScopeArgs {
    #[arg(long, help = "Principal id (UUID)")]
    pub principal: Uuid,

    #[arg(long, help = "Treat the principal as elevated")]
    pub elevated: bool,

    #[arg(long, help = "Restaurant id or slug to resolve, as if sent in the header")]
    pub hint: Option<String>,
}

pub async fn handle(args: ScopeArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let database = connect(config::config()).await?;
    let resolver = TenantResolver::new(Arc::new(PgStore::new(&database)));

    let principal = Principal {
        id: args.principal,
        global_role: if args.elevated { GlobalRole::Elevated } else { GlobalRole::Ordinary },
    };
    let hints = RequestHints {
        header: args.hint,
        ..RequestHints::default()
    };

    let result = resolver.resolve(&principal, &hints).await;
    database.close().await;
    let scope = result?;

    output_success(
        &output_format,
        &format!(
            "Resolved restaurant: {}",
            scope.resolved_slug().unwrap_or("none")
        ),
        Some(json!({
            "scope": scope,
            "predicate": scope.predicate(),
        })),
    )
}
