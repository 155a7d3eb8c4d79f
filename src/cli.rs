//! Command-line front end over on-disk project storage

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::color::Rgba;
use crate::config::AppConfig;
use crate::constants::storage::{DATABASE_DIR, LEGACY_FILENAME};
use crate::dialog::StaticFilePicker;
use crate::project::ProjectManager;
use crate::settings::{PreviewSettings, SettingsController, aspect};
use crate::storage::{DirectoryStore, JsonFileKeyValueStore, KeyValueStore, StructuredStore};

#[derive(Debug, Parser)]
#[command(name = "shotpad", version, about = "Manage screenshot editor projects")]
pub struct Cli {
    /// Project storage directory (defaults to the user data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List open projects in tab order
    List,
    /// Create an empty project
    New {
        #[arg(long)]
        name: Option<String>,
    },
    /// Import a project from a JSON export
    Import { files: Vec<PathBuf> },
    /// Export a project as JSON
    Export {
        tab: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Copy a project into a new tab
    Duplicate { tab: String },
    /// Delete a project
    Delete { tab: String },
    /// Move a project to another tab position
    Move { tab: String, position: usize },
    /// Change a project's preview settings
    Settings(SettingsArgs),
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    pub tab: String,
    #[arg(long)]
    pub width: Option<f64>,
    #[arg(long)]
    pub height: Option<f64>,
    /// Lock width to height, e.g. 16:9
    #[arg(long, value_parser = aspect::parse_ratio)]
    pub aspect_ratio: Option<[f64; 2]>,
    /// Clear the size and re-measure on next render
    #[arg(long)]
    pub reset_size: bool,
    #[arg(long)]
    pub padding: Option<u32>,
    #[arg(long)]
    pub padding_locked: Option<bool>,
    #[arg(long)]
    pub border_radius: Option<u32>,
    #[arg(long, value_parser = parse_color)]
    pub border_color: Option<Rgba>,
    #[arg(long)]
    pub header: Option<bool>,
    #[arg(long)]
    pub shadow: Option<bool>,
    #[arg(long)]
    pub default_background: bool,
}

fn parse_color(input: &str) -> Result<Rgba> {
    Rgba::parse_hex(input).with_context(|| format!("Invalid color {:?}, expected #RRGGBB or #AARRGGBB", input))
}

pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(crate::constants::config::APP_DIR);
    path
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    info!(path = %data_dir.display(), "Using data directory");

    let key_value = JsonFileKeyValueStore::open(data_dir.join(LEGACY_FILENAME))?;
    let database = DirectoryStore::new(data_dir.join(DATABASE_DIR));
    let mut manager = ProjectManager::new(key_value, database, &config);
    manager.hydrate_from_storage().await?;

    // New tab ids are printed only once they are saved
    let mut created = None;
    match cli.command {
        Command::List => list(&manager),
        Command::New { name } => {
            let Some(tab_id) = manager.try_add_new_project(None).await? else {
                bail!("Project limit reached");
            };
            manager.patch_project(&tab_id, |state| {
                if let Some(name) = name {
                    state.tab.name = name;
                }
            })?;
            created = Some(tab_id);
        }
        Command::Import { files } => {
            let picker = StaticFilePicker::new(files);
            match manager.import_new_project(&picker).await? {
                Some(tab_id) => created = Some(tab_id),
                None => warn!("No JSON file given, nothing imported"),
            }
        }
        Command::Export { tab, out } => {
            let tab_id = resolve_tab(&manager, &tab)?;
            let json = manager.export_project(&tab_id)?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write export to {:?}", path))?;
                    info!(path = %path.display(), tab = %tab_id, "Exported project");
                }
                None => println!("{}", json),
            }
        }
        Command::Duplicate { tab } => {
            let tab_id = resolve_tab(&manager, &tab)?;
            created = Some(manager.duplicate_project(&tab_id).await?);
        }
        Command::Delete { tab } => {
            let tab_id = resolve_tab(&manager, &tab)?;
            let index = manager.position(&tab_id).context("Project disappeared")?;
            manager.delete_project(index).await?;
        }
        Command::Move { tab, position } => {
            let tab_id = resolve_tab(&manager, &tab)?;
            let from = manager.position(&tab_id).context("Project disappeared")?;
            manager.move_project(from, position)?;
        }
        Command::Settings(args) => {
            let tab_id = resolve_tab(&manager, &args.tab)?;
            let current = manager
                .find_project_by_tab_id(&tab_id)
                .context("Project disappeared")?
                .state()
                .settings
                .clone();

            let mut controller = SettingsController::from_settings(current, manager.settings_defaults().clone());
            apply_settings(&mut controller, &args);
            let settings = controller.into_settings();
            manager.patch_project(&tab_id, |state| state.settings = settings)?;
        }
    }

    let synced = manager.flush().await.context("Unsaved changes were not written")?;
    info!(synced, "Flushed pending project writes");

    if let Some(tab_id) = created {
        println!("{}", tab_id);
    }
    Ok(())
}

fn apply_settings(controller: &mut SettingsController, args: &SettingsArgs) {
    if args.reset_size {
        controller.reset_window_size();
    }
    if let Some(height) = args.height {
        controller.set_height(height);
    }
    if let Some(width) = args.width {
        controller.set_width(width, true);
    }
    if let Some([x, y]) = args.aspect_ratio {
        controller.set_aspect_ratio(x, y);
    }
    if args.default_background {
        controller.set_default_background();
    }

    controller.update(|settings| {
        if let Some(locked) = args.padding_locked {
            settings.padding_locked = locked;
        }
        if let Some(padding) = args.padding {
            settings.padding = padding;
        }
        if let Some(radius) = args.border_radius {
            settings.border_radius = radius;
        }
        if let Some(color) = args.border_color {
            settings.border_color = color;
        }
        if let Some(header) = args.header {
            settings.show_header = header;
        }
        if let Some(shadow) = args.shadow {
            settings.show_shadow = shadow;
        }
    });
}

/// Accept a tab id, an id without the namespace, or a 0-based position
fn resolve_tab<K: KeyValueStore, S: StructuredStore>(manager: &ProjectManager<K, S>, tab: &str) -> Result<String> {
    if let Some(project) = manager.find_project_by_tab_id(tab) {
        return Ok(project.tab_id().to_string());
    }

    let namespaced = crate::project::resolve_key(Some(tab));
    if let Some(project) = manager.find_project_by_tab_id(&namespaced) {
        return Ok(project.tab_id().to_string());
    }

    if let Ok(index) = tab.parse::<usize>() {
        if let Some(project) = manager.projects().get(index) {
            return Ok(project.tab_id().to_string());
        }
    }

    bail!("No project matches {:?}", tab)
}

fn list<K: KeyValueStore, S: StructuredStore>(manager: &ProjectManager<K, S>) {
    let current = manager.current_tab();
    for (index, project) in manager.projects().iter().enumerate() {
        let state = project.state();
        let marker = if current == Some(project.tab_id()) { "*" } else { " " };
        let order = state.tab.order.map_or_else(|| "-".to_string(), |order| order.to_string());
        println!(
            "{} {:>3}  {:<44} {:<24} order={} {}x{}",
            marker, index, project.tab_id(), state.tab.name, order, state.settings.width, state.settings.height
        );
    }
}
