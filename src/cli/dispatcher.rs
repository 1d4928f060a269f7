use crate::api::client::ConnectClient;
use crate::cli::main_types::{Commands, ConfigCommands};
use crate::core::collector::InventoryCollector;
use crate::core::export::SnapshotExporter;
use crate::display::TableDisplay;
use crate::error::{AppError, CliError, StorageError};
use crate::storage::config::{Config, Profile};
use crate::utils::logging::{log_warning, print_verbose};
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use std::path::PathBuf;
use std::sync::Arc;

pub struct Dispatcher {
    config: Config,
    profile_name: String,
    region_override: Option<String>,
    config_path: Option<PathBuf>,
    verbose: bool,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        profile_name: String,
        region_override: Option<String>,
        config_path: Option<PathBuf>,
        verbose: bool,
    ) -> Self {
        Self {
            config,
            profile_name,
            region_override,
            config_path,
            verbose,
        }
    }

    fn log_verbose(&self, msg: &str) {
        print_verbose(self.verbose, msg);
    }

    /// The effective profile: configured, or empty defaults when absent.
    fn active_profile(&self) -> Profile {
        self.config
            .get_profile(&self.profile_name)
            .cloned()
            .unwrap_or_default()
    }

    fn resolve_region(&self, profile: &Profile) -> String {
        self.region_override
            .clone()
            .unwrap_or_else(|| profile.region().to_string())
    }

    pub async fn dispatch(&mut self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Review {
                export_json,
                output,
                concurrency,
            } => {
                self.handle_review_command(export_json, output, concurrency)
                    .await
            }
            Commands::Config { command } => self.handle_config_command(command).await,
        }
    }

    async fn handle_review_command(
        &self,
        export_json: bool,
        output: Option<String>,
        concurrency: Option<usize>,
    ) -> Result<(), AppError> {
        let profile = self.active_profile();
        let region = self.resolve_region(&profile);
        self.log_verbose(&format!("Reviewing Connect inventory in {}", region));

        let credentials = self
            .resolve_credentials(profile.aws_profile.as_deref(), &region)
            .await?;

        let client = match profile.timeout_seconds {
            Some(timeout) => ConnectClient::with_timeout(&region, credentials, timeout)?,
            None => ConnectClient::new(&region, credentials)?,
        };

        let mut collector = InventoryCollector::new(Arc::new(client), &region);
        if let Some(limit) = concurrency.or(profile.concurrency) {
            collector = collector.with_concurrency(limit);
        }

        // Ctrl-C requests a graceful stop: in-flight instances finish,
        // the rest are skipped and the snapshot is marked partial.
        let cancel = collector.cancel_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log_warning("Cancellation requested, finishing in-flight instances...");
                cancel.cancel();
            }
        });

        let snapshot = collector.collect().await?;

        let display = TableDisplay::new();
        println!("{}", display.render_snapshot(&snapshot)?);

        if export_json {
            let path = output.unwrap_or_else(|| SnapshotExporter::default_file_name(&snapshot));
            let document = SnapshotExporter::to_json(&snapshot)?;
            std::fs::write(&path, document).map_err(|source| StorageError::FileIo {
                path: path.clone(),
                source,
            })?;
            println!("Snapshot exported to {}", path);
        }

        Ok(())
    }

    /// Resolve AWS credentials through the standard chain (environment,
    /// shared config, SSO, IMDS), optionally pinned to a named profile.
    async fn resolve_credentials(
        &self,
        aws_profile: Option<&str>,
        region: &str,
    ) -> Result<Credentials, AppError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()));
        if let Some(name) = aws_profile {
            self.log_verbose(&format!("Using AWS profile: {}", name));
            loader = loader.profile_name(name);
        }
        let shared_config = loader.load().await;

        let provider = shared_config.credentials_provider().ok_or_else(|| {
            CliError::CredentialsUnavailable {
                message: "no credentials provider in the AWS configuration".to_string(),
                hint: "Set AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY or configure a profile"
                    .to_string(),
            }
        })?;

        let credentials =
            provider
                .provide_credentials()
                .await
                .map_err(|e| CliError::CredentialsUnavailable {
                    message: e.to_string(),
                    hint: "Run 'aws configure' or 'aws sso login' for the target account"
                        .to_string(),
                })?;

        Ok(credentials)
    }

    async fn handle_config_command(&mut self, commands: ConfigCommands) -> Result<(), AppError> {
        match commands {
            ConfigCommands::Show => {
                self.log_verbose("Attempting config show command");

                println!("Current Configuration:");
                println!("=====================");

                if let Some(default_profile) = &self.config.default_profile {
                    println!("Default Profile: {}", default_profile);
                } else {
                    println!("Default Profile: (not set)");
                }

                println!("\nProfiles:");
                if self.config.profiles.is_empty() {
                    println!("  No profiles configured");
                } else {
                    for (name, profile) in &self.config.profiles {
                        println!("  [{}]", name);
                        println!("    Region: {}", profile.region());
                        if let Some(aws_profile) = &profile.aws_profile {
                            println!("    AWS profile: {}", aws_profile);
                        }
                        if let Some(concurrency) = profile.concurrency {
                            println!("    Concurrency: {}", concurrency);
                        }
                        if let Some(timeout) = profile.timeout_seconds {
                            println!("    Timeout: {} seconds", timeout);
                        }
                    }
                }

                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                self.log_verbose(&format!(
                    "Attempting config set - key: {}, value: {}",
                    key, value
                ));

                let mut profile = self.active_profile();
                profile.set_value(&key, &value)?;
                self.config.set_profile(self.profile_name.clone(), profile);
                if self.config.default_profile.is_none() {
                    self.config.default_profile = Some(self.profile_name.clone());
                }
                self.config.save(self.config_path.clone())?;

                println!(
                    "Set {} = {} for profile '{}'",
                    key, value, self.profile_name
                );
                Ok(())
            }
        }
    }
}
