use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(help = "User id to place in the token subject")]
    pub user_id: String,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    if security.jwt_secret.is_empty() {
        anyhow::bail!("AUTH_JWT_SECRET must be set to mint development tokens");
    }

    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);
    let claims = Claims::new(&args.user_id, hours)?;
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => output_success(
            output_format,
            &format!("Token issued for {}", args.user_id),
            Some(json!({ "token": token, "user_id": args.user_id, "expires_at": claims.exp })),
        )?,
    }

    Ok(())
}
