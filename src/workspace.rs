//! The declared document, its state file and the configured provider

use crate::Context;
use crate::config::Document;
use crate::provider::{ProcessEnvironment, Provider, ProviderBlock, resolve_config};
use crate::state_reader::DirectoryReader;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::StateDocument;
use declarative::planner::resolve_against_state;
use log::debug;
use std::path::PathBuf;

/// Expand `~` and environment variables in a path.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

pub struct Workspace {
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub document: Document,
    pub state: StateDocument,
}

impl Workspace {
    /// Load the declared document and the state file.
    pub fn open(ctx: &Context) -> Result<Self> {
        let config_path = expand(&ctx.config);
        let document = Document::load(&config_path)?;
        let mut workspace = Self::open_state(ctx)?;
        workspace.config_path = config_path;
        workspace.document = document;
        Ok(workspace)
    }

    /// Load only the state file; the document stays empty.
    pub fn open_state(ctx: &Context) -> Result<Self> {
        let state_path = expand(&ctx.state);
        let state = StateDocument::load(&state_path)?;
        debug!(
            "loaded {} instances from {}",
            state.addresses().len(),
            state_path.display()
        );
        Ok(Self {
            config_path: expand(&ctx.config),
            state_path,
            document: Document::default(),
            state,
        })
    }

    pub fn save(&mut self) -> Result<()> {
        self.state
            .save(&self.state_path)
            .with_context(|| format!("Failed to write state to {}", self.state_path.display()))?;
        debug!("saved state to {}", self.state_path.display());
        Ok(())
    }

    /// Configure the provider from the `[provider]` block, the environment
    /// and any signup key left in a local state file.
    pub fn connect(&self, ctx: &Context) -> Result<Provider> {
        let (resolved, unknown) = resolve_against_state(&self.document.provider, &self.state);
        let block = ProviderBlock::new(&resolved, unknown);
        let config = resolve_config(&block, &ProcessEnvironment, &DirectoryReader::current_dir());

        if !ctx.quiet || config.diagnostics.has_errors() {
            ui::diagnostics(&config.diagnostics);
        }
        if config.diagnostics.has_errors() {
            bail!("Invalid provider configuration");
        }

        Provider::configure(&config).context("Failed to configure the Quismon provider")
    }
}
