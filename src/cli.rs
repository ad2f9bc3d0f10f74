use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "filelink-bot")]
#[command(author, version, about = "Telegram bot that turns uploaded files into shareable links", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Apply database migrations and exit
    Migrate,

    /// Grant premium to a user without going through the bot
    Grant {
        /// Telegram user id
        user_id: i64,

        /// Number of 30-day months
        #[arg(default_value_t = 1)]
        months: i64,
    },

    /// Revoke premium from a user
    Revoke {
        /// Telegram user id
        user_id: i64,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_no_command() {
        let cli = Cli::try_parse_from(["filelink-bot"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_grant_and_revoke() {
        let cli = Cli::try_parse_from(["filelink-bot", "grant", "42", "3"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Grant { user_id: 42, months: 3 }));

        let cli = Cli::try_parse_from(["filelink-bot", "grant", "42"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Grant { user_id: 42, months: 1 }));

        let cli = Cli::try_parse_from(["filelink-bot", "revoke", "7"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Revoke { user_id: 7 }));

        assert!(Cli::try_parse_from(["filelink-bot", "grant", "abc"]).is_err());
    }
}
