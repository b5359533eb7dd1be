//! `crucible check`: one token request against the configured endpoint.

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let provider = super::connect(global).await?;
    let token_url = &provider.client().tokens().credentials().token_url;
    println!("Credentials verified against {token_url}");
    Ok(())
}
