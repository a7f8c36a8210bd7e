use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{issue_token, GlobalRole};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "Principal id (UUID)")]
    pub principal: Uuid,

    #[arg(long, help = "Issue the token with the elevated platform role")]
    pub elevated: bool,
}

impl TokenArgs {
    pub fn role(&self) -> GlobalRole {
        if self.elevated {
            GlobalRole::Elevated
        } else {
            GlobalRole::Ordinary
        }
    }
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let token = issue_token(args.principal, args.role(), security)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Token issued",
            Some(json!({
                "token": token,
                "principal": args.principal,
                "role": args.role(),
                "expires_in_hours": security.jwt_expiry_hours,
            })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
