//! Configuration settings for vault-setup
//!
//! Defines all CLI arguments, command-line overrides, and the
//! phase selection for a setup run.

use crate::config::resolver::SetupPolicy;
use crate::error::{IoResultExt, Result, SetupError};
use clap::Parser;
use std::path::{Path, PathBuf};

/// vault-setup - Provision an Obsidian vault with templates and Templater settings
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vault-setup")]
#[command(author = "Vault Setup Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Configure an Obsidian vault with required plugins and settings")]
#[command(long_about = r#"
vault-setup copies config.json, the Templater folder and CSS snippets into an
Obsidian vault, then writes the Templater plugin settings to match the
directories declared in config.json.

Examples:
  vault-setup                           # Copy files and configure (current directory)
  vault-setup /path/to/vault            # Copy files and configure (specific vault)
  vault-setup --copy /path/to/vault     # Copy files only
  vault-setup --configure /path/to/vault  # Configure plugins only
  vault-setup --vault /path/to/vault    # Copy files and configure (explicit vault)
"#)]
pub struct CliArgs {
    /// Path to the Obsidian vault directory (default: current directory)
    #[arg(value_name = "VAULT_PATH")]
    pub vault_path: Option<PathBuf>,

    /// Path to the Obsidian vault directory (alternative to positional argument)
    #[arg(short = 'v', long = "vault", value_name = "PATH")]
    pub vault: Option<PathBuf>,

    /// Source bundle holding config.json, Templater and CssSnippets (default: current directory)
    #[arg(short = 's', long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Copy config.json, Templater folder and CSS snippets to the target vault
    #[arg(short = 'c', long)]
    pub copy: bool,

    /// Configure plugin settings only (requires existing config.json in target vault)
    #[arg(short = 'C', long)]
    pub configure: bool,

    /// Do not back up files before overwriting them
    #[arg(long)]
    pub no_backup: bool,

    /// Backup directory name inside the vault
    #[arg(long, value_name = "NAME")]
    pub backup_dir: Option<String>,

    /// Skip files that already exist in the vault
    #[arg(long)]
    pub no_overwrite: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose logging (can be repeated: --verbose --verbose)
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Which phases a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePlan {
    /// Copy assets into the vault
    pub copy: bool,
    /// Verify plugins and write plugin settings
    pub configure: bool,
}

impl PhasePlan {
    /// Resolve explicit copy/configure intents into enabled phases
    ///
    /// Neither intent means a full setup. Requesting both explicitly is
    /// rejected, since the unflagged default already runs both.
    pub fn resolve(copy: bool, configure: bool) -> Result<Self> {
        match (copy, configure) {
            (true, true) => Err(SetupError::InvalidModeSelection),
            (false, false) => Ok(Self {
                copy: true,
                configure: true,
            }),
            (copy, configure) => Ok(Self { copy, configure }),
        }
    }

    /// Plan running every phase
    pub fn full() -> Self {
        Self {
            copy: true,
            configure: true,
        }
    }
}

/// Command-line overrides for the `setup` block of the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupOverrides {
    /// Force backups on or off
    pub backup: Option<bool>,
    /// Replace the backup directory name
    pub backup_directory: Option<String>,
    /// Force overwriting on or off
    pub overwrite: Option<bool>,
}

impl SetupOverrides {
    /// Apply the overrides on top of a configured policy
    pub fn apply(&self, mut policy: SetupPolicy) -> SetupPolicy {
        if let Some(backup) = self.backup {
            policy.backup_enabled = backup;
        }
        if let Some(dir) = &self.backup_directory {
            policy.backup_directory = dir.clone();
        }
        if let Some(overwrite) = self.overwrite {
            policy.overwrite_existing = overwrite;
        }
        policy
    }
}

/// Runtime options derived from CLI args
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Vault root
    pub vault: PathBuf,
    /// Source bundle root
    pub source: PathBuf,
    /// Phases to run
    pub plan: PhasePlan,
    /// Overrides for the configured policy
    pub overrides: SetupOverrides,
}

impl SetupOptions {
    /// Create options from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let plan = PhasePlan::resolve(args.copy, args.configure)?;

        let cwd = std::env::current_dir().with_path(".")?;
        let vault = match args.vault_path.as_ref().or(args.vault.as_ref()) {
            Some(path) => validate_vault(path)?,
            None => cwd.clone(),
        };
        let source = args.source.clone().unwrap_or(cwd);

        let overrides = SetupOverrides {
            backup: args.no_backup.then_some(false),
            backup_directory: args.backup_dir.clone(),
            overwrite: args.no_overwrite.then_some(false),
        };

        Ok(Self {
            vault,
            source,
            plan,
            overrides,
        })
    }
}

/// Check that a vault path exists and is a directory, returning it canonicalized
pub fn validate_vault(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(SetupError::InvalidVault {
            path: path.to_path_buf(),
            reason: "path does not exist",
        });
    }
    if !path.is_dir() {
        return Err(SetupError::InvalidVault {
            path: path.to_path_buf(),
            reason: "path is not a directory",
        });
    }
    path.canonicalize().with_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_phase_plan_decision_table() {
        assert_eq!(PhasePlan::resolve(false, false).unwrap(), PhasePlan::full());
        assert_eq!(
            PhasePlan::resolve(true, false).unwrap(),
            PhasePlan {
                copy: true,
                configure: false
            }
        );
        assert_eq!(
            PhasePlan::resolve(false, true).unwrap(),
            PhasePlan {
                copy: false,
                configure: true
            }
        );
        assert!(matches!(
            PhasePlan::resolve(true, true),
            Err(SetupError::InvalidModeSelection)
        ));
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs::parse_from([
            "vault-setup",
            "--copy",
            "--no-backup",
            "--backup-dir",
            "bk",
            "/tmp/vault",
        ]);
        assert!(args.copy);
        assert!(!args.configure);
        assert!(args.no_backup);
        assert_eq!(args.backup_dir.as_deref(), Some("bk"));
        assert_eq!(args.vault_path, Some(PathBuf::from("/tmp/vault")));

        let args = CliArgs::parse_from(["vault-setup", "-C", "-v", "/tmp/vault", "--verbose", "--verbose"]);
        assert!(args.configure);
        assert_eq!(args.vault, Some(PathBuf::from("/tmp/vault")));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_from_cli_overrides() {
        let vault = TempDir::new().unwrap();
        let args = CliArgs {
            vault: Some(vault.path().to_path_buf()),
            no_backup: true,
            no_overwrite: true,
            ..Default::default()
        };
        let options = SetupOptions::from_cli(&args).unwrap();
        assert_eq!(options.plan, PhasePlan::full());
        assert_eq!(options.vault, vault.path().canonicalize().unwrap());
        assert_eq!(options.overrides.backup, Some(false));
        assert_eq!(options.overrides.overwrite, Some(false));
        assert_eq!(options.overrides.backup_directory, None);
    }

    #[test]
    fn test_from_cli_rejects_both_modes() {
        let args = CliArgs {
            copy: true,
            configure: true,
            ..Default::default()
        };
        assert!(matches!(
            SetupOptions::from_cli(&args),
            Err(SetupError::InvalidModeSelection)
        ));
    }

    #[test]
    fn test_validate_vault() {
        let dir = TempDir::new().unwrap();
        assert!(validate_vault(dir.path()).is_ok());

        let missing = dir.path().join("missing");
        assert!(matches!(
            validate_vault(&missing),
            Err(SetupError::InvalidVault { .. })
        ));

        let file = dir.path().join("note.md");
        std::fs::write(&file, "# note").unwrap();
        assert!(matches!(
            validate_vault(&file),
            Err(SetupError::InvalidVault { reason: "path is not a directory", .. })
        ));
    }

    #[test]
    fn test_overrides_leave_unset_fields() {
        let policy = SetupPolicy {
            backup_enabled: true,
            backup_directory: "bk".into(),
            overwrite_existing: true,
        };
        assert_eq!(SetupOverrides::default().apply(policy.clone()), policy);
    }
}
