// src/config.rs
use crate::api::{DiskCache, MemoryCache, NullCache, ResponseCache};
use crate::constants::{
    ACCOUNT_ENV_VAR, API_KEY_ENV_VAR, DEFAULT_CACHE_TTL_SECS, MEMORY_CACHE_CAPACITY,
};
use crate::error::AppError;
use crate::types::{AccountName, ApiKey, Credentials, ProjectId, TemplateId, ValidationError};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Account short name (defaults to $CMS_ACCOUNT)
    #[arg(short, long, global = true)]
    pub account: Option<String>,

    /// Override the API root, e.g. for a self-hosted instance
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Disable response caching (always fetch fresh data)
    #[arg(long, default_value_t = false, global = true)]
    pub no_cache: bool,

    /// Cache TTL in seconds (default: 300 = 5 minutes)
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS, global = true)]
    pub cache_ttl: u64,

    /// Directory for cached responses (defaults to the user cache dir)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show the user the API key belongs to
    Me,
    /// List the account's projects
    Projects,
    /// List the templates of a project
    Templates { project: String },
    /// Print the mappable fields of a project, optionally for one template
    Fields {
        project: String,
        #[arg(short, long)]
        template: Option<String>,
    },
    /// Print every row of a project as one JSON object per line
    Rows {
        project: String,
        #[arg(short, long)]
        template: Option<String>,
        /// Only rows updated at or after this RFC 3339 timestamp
        #[arg(long)]
        since: Option<String>,
        /// Print destination fields resolved through this mapping file
        #[arg(long)]
        mapping: Option<PathBuf>,
        /// Source to destination IDs of earlier imports, per migration
        #[arg(long, requires = "mapping")]
        id_map: Option<PathBuf>,
    },
}

/// What the operator asked for, with IDs validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Me,
    Projects,
    Templates {
        project: ProjectId,
    },
    Fields {
        project: ProjectId,
        template: Option<TemplateId>,
    },
    Rows {
        project: ProjectId,
        template: Option<TemplateId>,
        since: Option<DateTime<Utc>>,
        mapping: Option<PathBuf>,
        id_map: Option<PathBuf>,
    },
}

/// How API responses are cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSettings {
    Disabled,
    Disk { dir: PathBuf, ttl_secs: u64 },
}

/// Resolved configuration, validated and ready to build a client.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub credentials: Credentials,
    pub cache: CacheSettings,
    pub verbose: bool,
    pub action: Action,
}

impl SourceConfig {
    /// Resolves a complete configuration from CLI input and the environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, |name| std::env::var(name).ok())
    }

    /// Like [`SourceConfig::resolve`], reading variables through `env`.
    pub fn resolve_with(
        cli: CommandLineInput,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let account = cli
            .account
            .clone()
            .or_else(|| env(ACCOUNT_ENV_VAR))
            .ok_or_else(|| {
                AppError::MissingConfiguration(format!(
                    "pass --account or set {}",
                    ACCOUNT_ENV_VAR
                ))
            })?;
        let api_key = env(API_KEY_ENV_VAR).ok_or_else(|| {
            AppError::MissingConfiguration(format!(
                "{} environment variable not set",
                API_KEY_ENV_VAR
            ))
        })?;

        let mut credentials = Credentials::new(AccountName::new(account)?, ApiKey::new(api_key)?)?;
        if let Some(base_url) = &cli.base_url {
            credentials = credentials.with_base_url(base_url)?;
        }

        let cache = if cli.no_cache {
            CacheSettings::Disabled
        } else {
            CacheSettings::Disk {
                dir: cli
                    .cache_dir
                    .clone()
                    .unwrap_or_else(DiskCache::default_cache_dir),
                ttl_secs: cli.cache_ttl,
            }
        };

        Ok(SourceConfig {
            credentials,
            cache,
            verbose: cli.verbose,
            action: Action::from_command(cli.command)?,
        })
    }

    /// Opens the configured cache. A disk cache that cannot be created falls
    /// back to memory so a run is never blocked by the cache.
    pub fn open_cache(&self) -> Arc<dyn ResponseCache> {
        match &self.cache {
            CacheSettings::Disabled => {
                log::info!("Cache disabled; all requests go to the API");
                Arc::new(NullCache)
            }
            CacheSettings::Disk { dir, ttl_secs } => match DiskCache::open(dir, *ttl_secs) {
                Ok(cache) => {
                    log::info!("Cache enabled at {} (TTL: {}s)", dir.display(), ttl_secs);
                    Arc::new(cache)
                }
                Err(e) => {
                    log::warn!("{}; caching in memory instead", e);
                    Arc::new(MemoryCache::new(MEMORY_CACHE_CAPACITY, *ttl_secs))
                }
            },
        }
    }
}

impl Action {
    fn from_command(command: CliCommand) -> Result<Self, ValidationError> {
        Ok(match command {
            CliCommand::Me => Action::Me,
            CliCommand::Projects => Action::Projects,
            CliCommand::Templates { project } => Action::Templates {
                project: ProjectId::parse(&project)?,
            },
            CliCommand::Fields { project, template } => Action::Fields {
                project: ProjectId::parse(&project)?,
                template: template.as_deref().map(TemplateId::parse).transpose()?,
            },
            CliCommand::Rows {
                project,
                template,
                since,
                mapping,
                id_map,
            } => Action::Rows {
                project: ProjectId::parse(&project)?,
                template: template.as_deref().map(TemplateId::parse).transpose()?,
                since: since.as_deref().map(parse_timestamp).transpose()?,
                mapping,
                id_map,
            },
        })
    }
}

fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidTimestamp {
            value: input.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn parse(args: &[&str]) -> CommandLineInput {
        CommandLineInput::parse_from(std::iter::once("cms-migrate-source").chain(args.iter().copied()))
    }

    #[test]
    fn resolves_account_from_environment() {
        let config = SourceConfig::resolve_with(
            parse(&["rows", "12", "--template", "34"]),
            env(&[("CMS_ACCOUNT", "acme"), ("CMS_API_KEY", "k3y")]),
        )
        .unwrap();

        assert_eq!(
            config.credentials.base_url().as_str(),
            "https://acme.example-cms.com/api/0.4/"
        );
        assert_eq!(
            config.action,
            Action::Rows {
                project: ProjectId::parse("12").unwrap(),
                template: Some(TemplateId::parse("34").unwrap()),
                since: None,
                mapping: None,
                id_map: None,
            }
        );
        assert!(matches!(config.cache, CacheSettings::Disk { ttl_secs: 300, .. }));
    }

    #[test]
    fn flag_overrides_environment_account() {
        let config = SourceConfig::resolve_with(
            parse(&["--account", "other", "--no-cache", "projects"]),
            env(&[("CMS_ACCOUNT", "acme"), ("CMS_API_KEY", "k3y")]),
        )
        .unwrap();
        assert_eq!(config.credentials.account().as_str(), "other");
        assert_eq!(config.cache, CacheSettings::Disabled);
    }

    #[test]
    fn api_key_is_required() {
        let result = SourceConfig::resolve_with(parse(&["-a", "acme", "me"]), env(&[]));
        assert!(matches!(result, Err(AppError::MissingConfiguration(_))));
    }

    #[test]
    fn base_url_override_must_be_http() {
        let vars = env(&[("CMS_API_KEY", "k3y")]);
        let ok = SourceConfig::resolve_with(
            parse(&["-a", "acme", "--base-url", "http://localhost:8080/api", "me"]),
            &vars,
        )
        .unwrap();
        assert_eq!(ok.credentials.base_url().as_str(), "http://localhost:8080/api/");

        let bad = SourceConfig::resolve_with(
            parse(&["-a", "acme", "--base-url", "ftp://files", "me"]),
            &vars,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn rejects_non_numeric_ids_and_bad_timestamps() {
        let vars = env(&[("CMS_ACCOUNT", "acme"), ("CMS_API_KEY", "k3y")]);
        assert!(SourceConfig::resolve_with(parse(&["templates", "abc"]), &vars).is_err());
        assert!(
            SourceConfig::resolve_with(parse(&["rows", "1", "--since", "yesterday"]), &vars)
                .is_err()
        );
        let config = SourceConfig::resolve_with(
            parse(&["rows", "1", "--since", "2024-01-01T00:00:00Z"]),
            &vars,
        )
        .unwrap();
        assert!(matches!(config.action, Action::Rows { since: Some(_), .. }));
    }

    #[test]
    fn id_map_needs_a_mapping() {
        let args = ["cms-migrate-source", "rows", "1", "--id-map", "ids.json"];
        assert!(CommandLineInput::try_parse_from(args).is_err());

        let cli = parse(&["rows", "1", "--mapping", "m.json", "--id-map", "ids.json"]);
        assert!(matches!(
            cli.command,
            CliCommand::Rows { id_map: Some(_), mapping: Some(_), .. }
        ));
    }

    #[test]
    fn unwritable_cache_dir_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let config = SourceConfig::resolve_with(
            parse(&["--cache-dir", blocker.join("sub").to_str().unwrap(), "-a", "acme", "me"]),
            env(&[("CMS_API_KEY", "k3y")]),
        )
        .unwrap();
        let cache = config.open_cache();
        cache.set("k", "v");
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }
}
