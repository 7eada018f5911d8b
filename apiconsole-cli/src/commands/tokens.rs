//! Tokens command - generate, list, delete and redeem credit tokens.

use anyhow::{Result, anyhow};
use apiconsole_core::{CreditBalance, TokenFilter, TokenInfo};
use apiconsole_fetch::ApiError;
use clap::{Args, Subcommand};
use tracing::{info, warn};

use super::emit;
use crate::Cli;
use crate::output::TokenListOutput;
use crate::session::Session;

/// Arguments for the tokens command.
#[derive(Args)]
pub struct TokensArgs {
    #[command(subcommand)]
    pub action: TokensAction,
}

/// Token subcommands.
#[derive(Subcommand)]
pub enum TokensAction {
    /// Mint a new credit token.
    Generate {
        /// Credits the token grants.
        #[arg(long, short)]
        credits: i64,

        /// Free-text description (max 500 characters).
        #[arg(long, short)]
        description: Option<String>,
    },

    /// List tokens.
    List {
        /// Which tokens: mine, all, used, unused.
        #[arg(long, default_value = "mine")]
        filter: String,
    },

    /// Delete a token by id.
    Delete {
        /// Token id.
        id: String,
    },

    /// Redeem a token for credits.
    Redeem {
        /// 32-character lowercase hex token.
        token: String,
    },
}

/// Parses a `--filter` value.
pub fn parse_filter(name: &str) -> Result<TokenFilter> {
    TokenFilter::from_name(name)
        .ok_or_else(|| anyhow!("Unknown filter: {name}. Use: mine, all, used, unused"))
}

/// Runs the tokens command.
pub async fn run(args: &TokensArgs, cli: &Cli) -> Result<()> {
    let session = Session::open(cli).await?;

    match &args.action {
        TokensAction::Generate {
            credits,
            description,
        } => {
            let generated = session
                .api
                .generate_token(*credits, description.as_deref())
                .await?;
            let owner = creator_id(session.credits.refresh().await);
            let token = TokenInfo::from_generated(generated, owner.as_deref());
            emit(cli, &token, |f| f.format_generated(&token))
        }
        TokensAction::List { filter } => {
            let filter = parse_filter(filter)?;
            let tokens = session.api.list_tokens(filter).await?;
            info!(count = tokens.len(), filter = filter.as_str(), "Tokens listed");
            emit(cli, &TokenListOutput::new(filter, &tokens), |f| {
                f.format_tokens(&tokens)
            })
        }
        TokensAction::Delete { id } => {
            session.api.delete_token(id).await?;
            let result = serde_json::json!({"deleted": id});
            emit(cli, &result, |_| format!("Deleted token {id}"))
        }
        TokensAction::Redeem { token } => {
            let message = session.credits.redeem(token).await?;
            let state = session.credits.state().await;
            let result = serde_json::json!({"message": message, "credits": state.credits});
            emit(cli, &result, |f| f.format_success(&message))
        }
    }
}

/// Owner recorded on a freshly generated token; a failed balance lookup
/// leaves it unset rather than failing the generation.
fn creator_id(balance: Result<CreditBalance, ApiError>) -> Option<String> {
    match balance {
        Ok(balance) => balance.user_id,
        Err(e) => {
            warn!(error = %e, "Could not resolve token owner");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_id_from_refreshed_balance() {
        let balance = CreditBalance {
            credits: 10,
            user_id: Some("user-1".to_string()),
        };
        assert_eq!(creator_id(Ok(balance)).as_deref(), Some("user-1"));
        assert_eq!(
            creator_id(Err(ApiError::Authentication("expired".to_string()))),
            None
        );
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("unused").unwrap(), TokenFilter::Unused);
        assert_eq!(parse_filter("ALL").unwrap(), TokenFilter::All);
        assert!(parse_filter("expired").is_err());
    }
}
