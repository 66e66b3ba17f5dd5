use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::{ClipDrop, SaveOutcome};
use crate::clipboard::{create_provider, ClipboardProvider};
use crate::config::Settings;
use crate::preview::CopyOutcome;

pub mod history_picker;

#[derive(Parser)]
#[command(name = "clipdrop")]
#[command(about = "Save clipboard snapshots and bring them back later")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TARGET"), ", built ", env!("BUILD_DATE"), ")"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Save the current clipboard content")]
    Save,

    #[command(about = "List saved clips, newest first")]
    List {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    #[command(about = "Render a clip as an HTML preview")]
    Show {
        id: i64,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    #[command(about = "Copy a saved clip back to the clipboard")]
    Copy { id: i64 },

    #[command(about = "Delete all saved clips")]
    Clear,

    #[command(about = "Pick a clip interactively and copy it")]
    Pick,

    #[command(about = "Settings management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show current settings")]
    Show,

    #[command(about = "Write an example settings file")]
    Init {
        #[arg(long)]
        force: bool,
    },

    #[command(about = "Validate the settings file")]
    Validate,
}

pub struct CliHandler {
    settings: Settings,
    config_path: Option<PathBuf>,
    app: Option<Arc<ClipDrop>>,
}

impl CliHandler {
    pub fn new(settings: Settings, config_path: Option<PathBuf>) -> Self {
        Self {
            settings,
            config_path,
            app: None,
        }
    }

    /// Lazily open the store and clipboard when needed
    fn ensure_app(&mut self) -> Result<Arc<ClipDrop>> {
        if let Some(app) = &self.app {
            return Ok(Arc::clone(app));
        }

        info!("Opening clip store at {}", self.settings.store_dir.display());
        let clipboard: Arc<dyn ClipboardProvider> = Arc::from(create_provider()?);
        let app = Arc::new(ClipDrop::new(self.settings.clone(), clipboard)?);
        self.app = Some(Arc::clone(&app));
        Ok(app)
    }

    pub async fn handle_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Save => self.save().await,
            Commands::List { limit } => self.list(limit).await,
            Commands::Show { id, output } => self.show(id, output).await,
            Commands::Copy { id } => self.copy(id).await,
            Commands::Clear => self.clear().await,
            Commands::Pick => self.pick().await,
            Commands::Config { action } => self.handle_config_action(action),
        }
    }

    async fn save(&mut self) -> Result<()> {
        let app = self.ensure_app()?;
        match app.save_clipboard().await? {
            SaveOutcome::Saved(record) => {
                let preview: String = record.preview.chars().take(60).collect();
                println!("Saved: {}", preview);
            }
            SaveOutcome::Duplicate => println!("Duplicate, already saved"),
            SaveOutcome::Empty => println!("Clipboard is empty"),
        }
        Ok(())
    }

    async fn list(&mut self, limit: Option<usize>) -> Result<()> {
        let app = self.ensure_app()?;
        let entries = app.menu().await;

        if entries.is_empty() {
            println!("No clips saved");
            return Ok(());
        }

        for entry in entries.iter().take(limit.unwrap_or(usize::MAX)) {
            println!("{:>12}  {}", entry.id, entry.label);
        }
        Ok(())
    }

    async fn show(&mut self, id: i64, output: Option<PathBuf>) -> Result<()> {
        let app = self.ensure_app()?;
        let document = app
            .render(id)
            .await
            .ok_or_else(|| anyhow!("No clip with id {}", id))?;

        match output {
            Some(path) => {
                std::fs::write(&path, &document.html)?;
                println!("Wrote preview of \"{}\" to {}", document.title, path.display());
            }
            None => println!("{}", document.html),
        }
        Ok(())
    }

    async fn copy(&mut self, id: i64) -> Result<()> {
        let app = self.ensure_app()?;
        match app.copy_clip(id).await? {
            Some(outcome) => report_copy(&outcome),
            None => return Err(anyhow!("No clip with id {}", id)),
        }
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        let app = self.ensure_app()?;
        app.clear_all().await?;
        println!("All clips cleared");
        Ok(())
    }

    async fn pick(&mut self) -> Result<()> {
        let app = self.ensure_app()?;
        let mut picker = history_picker::HistoryPicker::new(app);
        picker.show().await
    }

    fn handle_config_action(&mut self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                println!("Current Settings:");
                println!("{:#?}", self.settings);
            }
            ConfigAction::Init { force } => {
                let path = self
                    .config_path
                    .clone()
                    .or_else(Settings::default_config_path)
                    .ok_or_else(|| anyhow!("Could not find a config directory"))?;
                Settings::write_example(&path, force)?;
                println!("Example settings written to {}", path.display());
            }
            ConfigAction::Validate => {
                // Strict load, unlike the lenient one used at startup
                Settings::load(self.config_path.as_deref())?;
                println!("Settings are valid");
            }
        }
        Ok(())
    }
}

pub(crate) fn report_copy(outcome: &CopyOutcome) {
    match outcome {
        CopyOutcome::Copied(kind) => println!("Copied {:?} clip to clipboard", kind),
        CopyOutcome::MissingAsset(filename) => println!("Image not found: {}", filename),
        CopyOutcome::NothingShown => println!("Nothing to copy"),
    }
}
