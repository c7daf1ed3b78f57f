use clap::{Parser, Subcommand, Args};
use crate::config::Config;
use crate::models::MonthlyBlobPolicy;

#[derive(Parser)]
#[command(name = "pgnsync")]
#[command(about = "Mirror chess.com monthly game archives into a folder of per-game Markdown files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for values otherwise taken from PGNSYNC_* environment variables
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// chess.com account handle
    #[arg(short, long)]
    pub account: Option<String>,

    /// Output folder for game files
    #[arg(short, long)]
    pub output: Option<String>,

    /// Sync archives from this year on (requires --cutoff-month)
    #[arg(long)]
    pub cutoff_year: Option<i32>,

    /// Sync archives from this month on (1-12, requires --cutoff-year)
    #[arg(long)]
    pub cutoff_month: Option<u32>,

    /// API base URL
    #[arg(long)]
    pub api_base: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download included monthly archives and write one file per game
    Sync {
        #[command(flatten)]
        config: ConfigArgs,

        /// Policy for existing monthly blob files (overwrite, keep)
        #[arg(long)]
        blob_policy: Option<MonthlyBlobPolicy>,

        /// Number of monthly archives fetched ahead
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List remote archives and whether the cutoff includes them
    Archives {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show what the local mirror already contains
    Status {
        /// Output folder for game files
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl ConfigArgs {
    /// Apply command line overrides on top of an environment-derived config
    pub fn apply(&self, config: &mut Config) {
        if let Some(account) = &self.account {
            config.account = Some(account.clone());
        }
        if let Some(output) = &self.output {
            config.output_dir = output.into();
        }
        if self.cutoff_year.is_some() || self.cutoff_month.is_some() {
            config.cutoff_year = self.cutoff_year;
            config.cutoff_month = self.cutoff_month;
        }
        if let Some(api_base) = &self.api_base {
            config.api_base_url = api_base.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_arguments_parse() {
        let cli = Cli::parse_from([
            "pgnsync", "sync", "--account", "hikaru", "--cutoff-year", "2024", "--cutoff-month", "6",
            "--blob-policy", "keep", "--concurrency", "3", "--json",
        ]);

        match cli.command {
            Commands::Sync { config, blob_policy, concurrency, json } => {
                assert_eq!(config.account.as_deref(), Some("hikaru"));
                assert_eq!(config.cutoff_year, Some(2024));
                assert_eq!(config.cutoff_month, Some(6));
                assert_eq!(blob_policy, Some(MonthlyBlobPolicy::KeepExisting));
                assert_eq!(concurrency, Some(3));
                assert!(json);
            }
            _ => panic!("expected sync command"),
        }
    }

    #[test]
    fn test_overrides_replace_env_values() {
        let mut config = Config {
            account: Some("from-env".to_string()),
            cutoff_year: Some(2020),
            cutoff_month: Some(1),
            ..Config::default()
        };
        let args = ConfigArgs {
            account: Some("from-cli".to_string()),
            output: Some("vault/chess".to_string()),
            cutoff_year: Some(2024),
            cutoff_month: Some(6),
            api_base: None,
        };
        args.apply(&mut config);

        assert_eq!(config.account.as_deref(), Some("from-cli"));
        assert_eq!(config.output_dir_str(), "vault/chess");
        assert_eq!(config.cutoff().unwrap().map(|c| c.to_string()).as_deref(), Some("2024-06"));
        assert_eq!(config.api_base_url, "https://api.chess.com");
    }
}
