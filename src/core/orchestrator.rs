//! Setup orchestration
//!
//! Runs the selected phases in order (copy, verify plugins, configure) and
//! stops at the first failed phase.

use crate::config::{ConfigResolver, PhasePlan, SetupOptions, SetupOverrides, SetupPolicy, VaultLayout};
use crate::error::{Result, SetupError};
use crate::plugin::{
    missing_plugins, ApplyReport, PluginInventory, PluginSettingsBuilder, VaultPluginInventory,
};
use crate::progress::ProgressReporter;
use crate::sync::{AssetSynchronizer, BackupPolicy, SyncReport};
use std::fmt;
use std::sync::Arc;

const INSTALL_INSTRUCTIONS: [&str; 5] = [
    "1. Open Obsidian and go to Settings > Community plugins",
    "2. Click the 'Browse' button",
    "3. Search for and install the plugins listed above",
    "4. Enable the plugins after installation",
    "5. Run this setup again after installation is complete",
];

/// A unit of work within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Copy bundle assets into the vault
    Copy,
    /// Load the vault configuration and check required plugins
    Verify,
    /// Write the Templater settings
    Configure,
}

impl Phase {
    /// Heading shown when the phase starts
    pub fn title(&self) -> &'static str {
        match self {
            Self::Copy => "Copying files to vault...",
            Self::Verify => "Checking required plugins...",
            Self::Configure => "Configuring Templater plugin...",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Copy => "copy",
            Self::Verify => "verify",
            Self::Configure => "configure",
        };
        f.write_str(name)
    }
}

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    /// Nothing started yet
    Idle,
    /// Copy phase running
    Copying,
    /// Verify phase running
    Verifying,
    /// Configure phase running
    Configuring,
    /// Every selected phase succeeded
    Done,
    /// A phase failed; later phases did not run
    Failed,
}

impl SetupState {
    fn running(phase: Phase) -> Self {
        match phase {
            Phase::Copy => Self::Copying,
            Phase::Verify => Self::Verifying,
            Phase::Configure => Self::Configuring,
        }
    }
}

/// Outcome of one executed phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    /// Phase that ran
    pub phase: Phase,
    /// Failure message, if the phase failed
    pub error: Option<String>,
}

impl PhaseOutcome {
    /// Check if the phase succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a whole setup run
#[derive(Debug)]
pub struct SetupReport {
    /// Final state, `Done` or `Failed`
    pub state: SetupState,
    /// Executed phases in order
    pub phases: Vec<PhaseOutcome>,
    /// Copy phase details
    pub sync: Option<SyncReport>,
    /// Required plugins found missing
    pub missing_plugins: Vec<String>,
    /// Configure phase details
    pub settings: Option<ApplyReport>,
    /// Error that ended the run
    pub error: Option<SetupError>,
}

impl SetupReport {
    fn new() -> Self {
        Self {
            state: SetupState::Idle,
            phases: Vec::new(),
            sync: None,
            missing_plugins: Vec::new(),
            settings: None,
            error: None,
        }
    }

    /// Check if every selected phase succeeded
    pub fn is_success(&self) -> bool {
        self.state == SetupState::Done
    }

    /// Phase that ended the run, if any
    pub fn failed_phase(&self) -> Option<Phase> {
        self.phases
            .iter()
            .find(|p| !p.is_success())
            .map(|p| p.phase)
    }
}

/// Sequences the setup phases against one vault
pub struct SetupOrchestrator {
    layout: VaultLayout,
    plan: PhasePlan,
    overrides: SetupOverrides,
    inventory: Box<dyn PluginInventory>,
    reporter: Arc<ProgressReporter>,
}

impl SetupOrchestrator {
    /// Create an orchestrator for resolved options
    pub fn new(options: SetupOptions) -> Self {
        let layout = VaultLayout::new(options.vault, options.source);
        let inventory = Box::new(VaultPluginInventory::for_layout(&layout));
        Self {
            layout,
            plan: options.plan,
            overrides: options.overrides,
            inventory,
            reporter: Arc::new(ProgressReporter::disabled()),
        }
    }

    /// Set progress reporter
    pub fn with_reporter(mut self, reporter: Arc<ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replace the installed-plugin lookup
    pub fn with_inventory(mut self, inventory: Box<dyn PluginInventory>) -> Self {
        self.inventory = inventory;
        self
    }

    /// Execute the selected phases
    pub fn run(&self) -> SetupReport {
        let mut report = SetupReport::new();

        self.reporter.line("🔧 Starting Obsidian Setup...");
        self.reporter
            .line(&format!("📁 Vault path: {}", self.layout.vault_root.display()));
        if self.plan.copy {
            self.reporter
                .line(&format!("📂 Source path: {}", self.layout.source_root.display()));
        }

        let mut step = 0;
        let mut resolver = None;

        if self.plan.copy {
            step += 1;
            self.enter(&mut report, step, Phase::Copy);
            match self.copy_phase() {
                Ok(sync) => {
                    report.sync = Some(sync);
                    report.phases.push(PhaseOutcome {
                        phase: Phase::Copy,
                        error: None,
                    });
                }
                Err(e) => return self.fail(report, Phase::Copy, e),
            }
        }

        if self.plan.configure {
            step += 1;
            self.enter(&mut report, step, Phase::Verify);
            match self.verify_phase(&mut report) {
                Ok(loaded) => {
                    resolver = Some(loaded);
                    report.phases.push(PhaseOutcome {
                        phase: Phase::Verify,
                        error: None,
                    });
                }
                Err(e) => return self.fail(report, Phase::Verify, e),
            }
        }

        if let Some(resolver) = resolver {
            step += 1;
            self.enter(&mut report, step, Phase::Configure);
            match self.configure_phase(&resolver) {
                Ok(applied) => {
                    report.settings = Some(applied);
                    report.phases.push(PhaseOutcome {
                        phase: Phase::Configure,
                        error: None,
                    });
                }
                Err(e) => return self.fail(report, Phase::Configure, e),
            }
        }

        report.state = SetupState::Done;
        tracing::info!("Setup finished: {:?}", report.state);
        self.reporter.finish_success("Setup completed successfully!");
        if self.plan.configure {
            self.reporter
                .line("💡 Please restart Obsidian to apply the changes.");
        }
        report
    }

    fn enter(&self, report: &mut SetupReport, step: usize, phase: Phase) {
        let next = SetupState::running(phase);
        tracing::info!("State {:?} -> {:?}", report.state, next);
        report.state = next;
        self.reporter.start_phase(step, phase.title());
    }

    fn fail(&self, mut report: SetupReport, phase: Phase, error: SetupError) -> SetupReport {
        tracing::debug!("{} phase failed: {}", phase, error);
        report.phases.push(PhaseOutcome {
            phase,
            error: Some(error.to_string()),
        });
        report.state = SetupState::Failed;
        report.error = Some(error);
        self.reporter
            .finish_error(&format!("Setup failed during the {} phase", phase));
        report
    }

    fn copy_phase(&self) -> Result<SyncReport> {
        let source = ConfigResolver::load_source(&self.layout.source_config_path());
        let resolver = ConfigResolver::source_only(source);
        let policy = SetupPolicy::resolve(&resolver, &self.overrides);
        tracing::debug!("Copy policy: {:?}", policy);

        let sync = AssetSynchronizer::new(self.layout.clone(), policy)
            .with_reporter(Arc::clone(&self.reporter))
            .sync_all()?;

        let failed = sync.templates.failures.len()
            + sync.snippets.as_ref().map_or(0, |s| s.failures.len());
        if failed > 0 {
            let first = sync
                .templates
                .failures
                .iter()
                .chain(sync.snippets.iter().flat_map(|s| s.failures.iter()))
                .next();
            let (path, reason) = first
                .map(|(p, r)| (p.clone(), r.clone()))
                .unwrap_or_default();
            return Err(SetupError::file_copy(
                self.layout.source_root.join(&path),
                self.layout.vault_root.join(&path),
                format!("{} (and {} more failed file(s))", reason, failed - 1),
            ));
        }

        Ok(sync)
    }

    fn verify_phase(&self, report: &mut SetupReport) -> Result<ConfigResolver> {
        let config_path = self.layout.config_path();
        let primary = match ConfigResolver::load(&config_path) {
            Ok(doc) => doc,
            Err(e) => {
                self.reporter.failure(&e.to_string());
                if matches!(e, SetupError::ConfigNotFound(_)) {
                    self.reporter
                        .line("Please ensure config.json exists in the vault root directory.");
                }
                return Err(e);
            }
        };
        let source = ConfigResolver::load_source(&self.layout.source_config_path());
        let resolver = ConfigResolver::new(Some(primary), source);

        let required = resolver.required_plugins().map_err(|e| {
            self.reporter.failure(&e.to_string());
            e
        })?;
        let missing = missing_plugins(self.inventory.as_ref(), &required);
        if !missing.is_empty() {
            self.reporter
                .failure("The following required plugins are not installed:");
            for plugin in &missing {
                self.reporter.line(&format!("   - {}", plugin));
            }
            self.reporter.line("\nInstallation instructions:");
            for line in INSTALL_INSTRUCTIONS {
                self.reporter.line(line);
            }
            report.missing_plugins = missing.clone();
            return Err(SetupError::PluginsMissing(missing));
        }

        tracing::debug!("All {} required plugins installed", required.len());
        self.reporter.success("All required plugins are installed.");
        Ok(resolver)
    }

    fn configure_phase(&self, resolver: &ConfigResolver) -> Result<ApplyReport> {
        let policy = SetupPolicy::resolve(resolver, &self.overrides);
        let backup = BackupPolicy::from_policy(&self.layout, &policy);
        PluginSettingsBuilder::new(&self.layout, resolver, backup)
            .with_reporter(Arc::clone(&self.reporter))
            .apply()
            .map_err(|e| {
                self.reporter
                    .failure(&format!("Error configuring Templater: {}", e));
                e
            })
    }
}
