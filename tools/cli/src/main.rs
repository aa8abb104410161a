//! Lockbox CLI - Command line interface for the credential vault.
//!
//! Every command that touches stored credentials first checks the master
//! passphrase; the first run walks through setting one.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zeroize::Zeroizing;

use lockbox_common::Error;
use lockbox_crypto::PasswordPolicy;
use lockbox_vault::{MasterPrompt, VaultConfig, VaultManager, VaultRepository};

#[derive(Parser)]
#[command(name = "lockbox")]
#[command(about = "Lockbox - Local encrypted password vault")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Vault directory (default: platform data directory).
    #[arg(short, long)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the master passphrase.
    Init,

    /// Add or replace an account.
    Add {
        /// Service/site name (e.g. gmail, github).
        service: String,

        /// Username or email.
        username: String,

        /// Generate the password instead of prompting for it.
        #[arg(short, long)]
        generate: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Show an account.
    Get {
        /// Service/site name.
        service: String,
    },

    /// List saved services.
    List,

    /// Delete an account.
    Delete {
        /// Service/site name.
        service: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Replace an account's password.
    Update {
        /// Service/site name.
        service: String,

        /// Generate the password instead of prompting for it.
        #[arg(short, long)]
        generate: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Generate a password without touching the vault.
    Generate {
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

/// Password generation flags. Setting any of them implies `--generate`.
#[derive(Args, Clone, Copy)]
struct PolicyArgs {
    /// Minimum uppercase letters [default: 4].
    #[arg(long, allow_negative_numbers = true)]
    upper: Option<i64>,

    /// Minimum lowercase letters [default: 4].
    #[arg(long, allow_negative_numbers = true)]
    lower: Option<i64>,

    /// Minimum digits [default: 2].
    #[arg(long, allow_negative_numbers = true)]
    digits: Option<i64>,

    /// Minimum symbols [default: 2].
    #[arg(long, allow_negative_numbers = true)]
    symbols: Option<i64>,

    /// Total password length [default: 16].
    #[arg(long, allow_negative_numbers = true)]
    length: Option<i64>,
}

impl PolicyArgs {
    fn is_set(&self) -> bool {
        [self.upper, self.lower, self.digits, self.symbols, self.length]
            .iter()
            .any(Option::is_some)
    }

    /// `Some(self)` when generation was requested by flag or by any policy value.
    fn requested(self, generate: bool) -> Option<Self> {
        (generate || self.is_set()).then_some(self)
    }

    fn generate(&self) -> Result<String> {
        let defaults = PasswordPolicy::default();
        let or_default = |value: Option<i64>, default: usize| value.unwrap_or(default as i64);

        let policy = PasswordPolicy::from_signed(
            or_default(self.upper, defaults.min_upper),
            or_default(self.lower, defaults.min_lower),
            or_default(self.digits, defaults.min_digits),
            or_default(self.symbols, defaults.min_symbols),
            or_default(self.length, defaults.length),
        )?;

        Ok(VaultManager::generate_password(
            policy.min_upper,
            policy.min_lower,
            policy.min_digits,
            policy.min_symbols,
            policy.length,
        )?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = VaultConfig::new(cli.dir.unwrap_or_else(VaultConfig::default_dir));

    match cli.command {
        Commands::Init => cmd_init(config),

        Commands::Add {
            service,
            username,
            generate,
            policy,
        } => cmd_add(config, &service, &username, policy.requested(generate)),

        Commands::Get { service } => cmd_get(config, &service),

        Commands::List => cmd_list(config),

        Commands::Delete { service, yes } => cmd_delete(config, &service, yes),

        Commands::Update {
            service,
            generate,
            policy,
        } => cmd_update(config, &service, policy.requested(generate)),

        Commands::Generate { policy } => cmd_generate(&policy),
    }
}

/// Reads passphrases from the terminal without echo.
struct TerminalPrompt;

impl MasterPrompt for TerminalPrompt {
    fn new_passphrase(&mut self) -> lockbox_common::Result<(Zeroizing<String>, Zeroizing<String>)> {
        let passphrase = Zeroizing::new(rpassword::prompt_password("Enter new master passphrase: ")?);
        let confirmation = Zeroizing::new(rpassword::prompt_password("Confirm master passphrase: ")?);
        Ok((passphrase, confirmation))
    }

    fn passphrase(&mut self) -> lockbox_common::Result<Zeroizing<String>> {
        Ok(Zeroizing::new(rpassword::prompt_password("Enter master passphrase: ")?))
    }

    fn rejected(&mut self, reason: &Error) {
        eprintln!("{}. Try again.", reason);
    }

    fn setup_complete(&mut self) {
        println!("Master passphrase set.");
    }
}

fn open_manager(config: VaultConfig) -> Result<VaultManager> {
    VaultManager::open(config).context("Failed to open vault")
}

/// Unlock the vault, setting the master passphrase first if there is none.
/// A wrong master passphrase ends the process.
fn unlock(manager: &VaultManager) -> Result<VaultRepository> {
    if !manager.is_initialized()? {
        println!("No master passphrase found. Let's set one up.");
    }

    match manager.unlock(&mut TerminalPrompt) {
        Ok(repo) => Ok(repo),
        Err(e) if e.is_fatal() => {
            eprintln!("{}. Exiting.", e);
            std::process::exit(1);
        }
        Err(e) => Err(e).context("Failed to unlock vault"),
    }
}

/// Ask a yes/no question on stdin. Anything but "y" means no.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Produce the password for add/update: generated or typed.
fn obtain_password(policy: Option<PolicyArgs>) -> Result<Zeroizing<String>> {
    match policy {
        Some(policy) => {
            let password = Zeroizing::new(policy.generate()?);
            println!("Generated password: {}", password.as_str());
            Ok(password)
        }
        None => {
            let password = rpassword::prompt_password("Password: ")
                .context("Failed to read password")?;
            Ok(Zeroizing::new(password))
        }
    }
}

/// Set the master passphrase.
fn cmd_init(config: VaultConfig) -> Result<()> {
    let manager = open_manager(config)?;

    match manager.setup_interactive(&mut TerminalPrompt) {
        Ok(()) => {}
        Err(Error::AlreadyExists(_)) => anyhow::bail!("Master passphrase is already set"),
        Err(e) => return Err(e).context("Failed to set master passphrase"),
    }

    info!(dir = %manager.config().dir.display(), "Vault initialized");
    Ok(())
}

/// Add or replace an account.
fn cmd_add(
    config: VaultConfig,
    service: &str,
    username: &str,
    policy: Option<PolicyArgs>,
) -> Result<()> {
    let manager = open_manager(config)?;
    let vault = unlock(&manager)?;

    let password = obtain_password(policy)?;
    vault
        .add(service, username.trim(), &password)
        .context("Failed to save account")?;

    println!("Account for '{}' saved.", service.trim().to_lowercase());
    Ok(())
}

/// Show an account.
fn cmd_get(config: VaultConfig, service: &str) -> Result<()> {
    let manager = open_manager(config)?;
    let vault = unlock(&manager)?;

    match vault.get(service) {
        Ok(cred) => {
            println!("Service:   {}", service.trim().to_lowercase());
            println!("Username:  {}", cred.username);
            println!("Password:  {}", cred.password.as_str());
            Ok(())
        }
        Err(Error::NotFound(_)) => {
            println!("No such account found.");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to read account"),
    }
}

/// List saved services.
fn cmd_list(config: VaultConfig) -> Result<()> {
    let manager = open_manager(config)?;
    let vault = unlock(&manager)?;

    let services = vault.list().context("Failed to read vault")?;
    if services.is_empty() {
        println!("Vault is empty.");
    } else {
        println!("Saved accounts:");
        for service in services {
            println!("  - {}", service);
        }
    }

    Ok(())
}

/// Delete an account after confirmation.
fn cmd_delete(config: VaultConfig, service: &str, yes: bool) -> Result<()> {
    let manager = open_manager(config)?;
    let vault = unlock(&manager)?;

    if !vault.contains(service)? {
        println!("No such account found.");
        return Ok(());
    }

    let name = service.trim().to_lowercase();
    if !yes && !confirm(&format!("Are you sure you want to delete '{}'?", name))? {
        println!("Deletion cancelled.");
        return Ok(());
    }

    vault.delete(service).context("Failed to delete account")?;
    println!("Account '{}' deleted.", name);
    Ok(())
}

/// Replace an account's password.
fn cmd_update(config: VaultConfig, service: &str, policy: Option<PolicyArgs>) -> Result<()> {
    let manager = open_manager(config)?;
    let vault = unlock(&manager)?;

    if !vault.contains(service)? {
        println!("No such account found.");
        return Ok(());
    }

    let password = obtain_password(policy)?;
    vault
        .update_password(service, &password)
        .context("Failed to update password")?;

    println!("Password for '{}' updated.", service.trim().to_lowercase());
    Ok(())
}

/// Generate a password.
fn cmd_generate(policy: &PolicyArgs) -> Result<()> {
    println!("{}", policy.generate()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_policy_is_invalid_parameters() {
        let cli = Cli::try_parse_from(["lockbox", "generate", "--upper", "-1"]).unwrap();
        let Commands::Generate { policy } = cli.command else {
            panic!("expected generate");
        };

        let err = policy.generate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_default_policy_generates() {
        let cli = Cli::try_parse_from(["lockbox", "generate"]).unwrap();
        let Commands::Generate { policy } = cli.command else {
            panic!("expected generate");
        };

        assert_eq!(policy.generate().unwrap().len(), 16);
    }

    #[test]
    fn test_add_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "lockbox", "--dir", "/tmp/v", "add", "GitHub", "octocat", "--generate", "--length",
            "20",
        ])
        .unwrap();

        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/v")));
        let Commands::Add {
            service,
            generate,
            policy,
            ..
        } = cli.command
        else {
            panic!("expected add");
        };
        assert_eq!(service, "GitHub");
        assert!(generate);
        assert_eq!(policy.length, Some(20));
        assert_eq!(policy.requested(generate).unwrap().generate().unwrap().len(), 20);
    }

    #[test]
    fn test_policy_flag_alone_requests_generation() {
        let cli = Cli::try_parse_from(["lockbox", "update", "gh", "--length", "24"]).unwrap();
        let Commands::Update {
            generate, policy, ..
        } = cli.command
        else {
            panic!("expected update");
        };

        assert!(!generate);
        let policy = policy.requested(generate).expect("length implies generation");
        assert_eq!(policy.generate().unwrap().len(), 24);
    }

    #[test]
    fn test_no_policy_flags_prompts_for_password() {
        let cli = Cli::try_parse_from(["lockbox", "add", "gh", "octocat"]).unwrap();
        let Commands::Add {
            generate, policy, ..
        } = cli.command
        else {
            panic!("expected add");
        };

        assert!(policy.requested(generate).is_none());
    }
}
