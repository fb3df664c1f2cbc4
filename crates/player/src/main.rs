//! Idol Planner - command line composition root.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use idolplanner_domain::{
    CraftingOptionId, GridPosition, GridTab, InventoryIdolId, ModifierCatalog, PlacementId,
    ScarabId, SetId,
};
use idolplanner_player::infrastructure::platform::{FileStorageProvider, SystemClock};
use idolplanner_player::presentation::render_set;
use idolplanner_player::{PlannerConfig, PlannerService};
use idolplanner_shared::{share_url, ShareId};

type Planner = PlannerService<FileStorageProvider, SystemClock>;

#[derive(Debug, Parser)]
#[command(name = "idolplanner", version, about = "Path of Exile idol grid planner")]
struct Args {
    /// Directory holding storage.json (overrides IDOL_PLANNER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Modifier catalog JSON (overrides IDOL_PLANNER_CATALOG)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the active set
    Show,
    /// List every set
    Sets,
    /// Import pasted idol text from a file, or stdin when no file is given
    Import { file: Option<PathBuf> },
    /// Place an inventory idol; without coordinates the first free spot is used
    Place {
        inventory_idol_id: String,
        x: Option<i32>,
        y: Option<i32>,
        #[arg(long, default_value_t = 1)]
        tab: u8,
    },
    /// Move a placement
    Move {
        placement_id: String,
        x: i32,
        y: i32,
        #[arg(long, default_value_t = 1)]
        tab: u8,
    },
    /// Remove a placement; the idol stays in the inventory
    RemovePlacement { placement_id: String },
    /// Remove an inventory idol from every set
    RemoveIdol { inventory_idol_id: String },
    /// Remove every placement on a tab
    ClearTab { tab: u8 },
    /// Create a set and make it active
    NewSet { name: String },
    /// Make a set active
    Select { set_id: String },
    /// Rename the active set
    Rename { name: String },
    /// Copy the active set
    Duplicate { name: String },
    /// Delete a set
    DeleteSet { set_id: String },
    /// Fill or empty a scarab slot (0-4)
    Scarab { slot: usize, scarab_id: Option<String> },
    /// Set or clear the crafting option
    Crafting { option_id: Option<String> },
    /// Lock an unlock condition; placements on its cells are removed
    Lock { condition_id: String },
    /// Unlock an unlock condition
    Unlock { condition_id: String },
    /// Print the share request body for the active set
    ShareExport,
    /// Import a shared set payload from a file
    ShareImport {
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the public link of a share id
    ShareUrl { share_id: String },
    /// Recompute and print the active set's content hash
    Hash,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = PlannerConfig::from_env()?;
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(catalog) = args.catalog.clone() {
        config.catalog_path = Some(catalog);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(data_dir = %config.data_dir.display(), "Starting Idol Planner");

    let storage = FileStorageProvider::open(&config.data_dir);
    let (mut planner, notice) = Planner::load(storage, SystemClock::new());
    if let Some(notice) = notice {
        eprintln!("{}", notice);
    }

    run(&mut planner, &config, args.command)
}

fn run(planner: &mut Planner, config: &PlannerConfig, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Show => match planner.active_set() {
            Some(set) => print!("{}", render_set(set)),
            None => println!("No idol sets yet"),
        },
        Command::Sets => {
            let active = planner.document().active_set_id();
            for set in planner.document().sets() {
                let marker = if Some(set.id()) == active { "*" } else { " " };
                println!("{} {} {}", marker, set.id(), set.name());
            }
        }
        Command::Import { file } => {
            let catalog = load_catalog(config)?;
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            let outcome = planner.import_clipboard(&text, &catalog)?;
            for failure in &outcome.failures {
                eprintln!("  {}", failure);
            }
            println!("{}", outcome.summary);
            for id in &outcome.added {
                println!("  added {}", id);
            }
        }
        Command::Place {
            inventory_idol_id,
            x,
            y,
            tab,
        } => {
            let id = InventoryIdolId::parse(inventory_idol_id)?;
            let tab = GridTab::from_number(tab)?;
            let placement = match (x, y) {
                (Some(x), Some(y)) => planner.try_place_idol(&id, GridPosition::new(x, y), tab)?,
                (None, None) => planner.auto_place_idol(&id, tab)?,
                _ => bail!("give both x and y, or neither"),
            };
            println!("{}", placement);
        }
        Command::Move {
            placement_id,
            x,
            y,
            tab,
        } => {
            let id = PlacementId::parse(placement_id)?;
            planner.try_move_idol(&id, GridPosition::new(x, y), GridTab::from_number(tab)?)?;
        }
        Command::RemovePlacement { placement_id } => {
            if !planner.remove_placement(&PlacementId::parse(placement_id)?)? {
                bail!("no such placement in the active set");
            }
        }
        Command::RemoveIdol { inventory_idol_id } => {
            let sets = planner.remove_inventory_idol(&InventoryIdolId::parse(inventory_idol_id)?)?;
            println!("removed from {} set(s)", sets);
        }
        Command::ClearTab { tab } => {
            let removed = planner.clear_tab(GridTab::from_number(tab)?)?;
            println!("removed {} placement(s)", removed);
        }
        Command::NewSet { name } => println!("{}", planner.create_set(&name)?),
        Command::Select { set_id } => planner.select_set(&SetId::parse(set_id)?)?,
        Command::Rename { name } => planner.rename_active_set(&name)?,
        Command::Duplicate { name } => println!("{}", planner.duplicate_active_set(&name)?),
        Command::DeleteSet { set_id } => {
            if !planner.delete_set(&SetId::parse(set_id)?)? {
                bail!("no such set");
            }
        }
        Command::Scarab { slot, scarab_id } => {
            let scarab = scarab_id.map(ScarabId::parse).transpose()?;
            planner.set_scarab(slot, scarab)?;
        }
        Command::Crafting { option_id } => {
            let option = option_id.map(CraftingOptionId::parse).transpose()?;
            planner.set_crafting_option(option)?;
        }
        Command::Lock { condition_id } => {
            let removed = planner.set_condition_unlocked(&condition_id, false)?;
            println!("removed {} placement(s)", removed);
        }
        Command::Unlock { condition_id } => {
            planner.set_condition_unlocked(&condition_id, true)?;
        }
        Command::ShareExport => {
            let request = planner.export_share_request()?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::ShareImport { file, name } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let id = planner.import_shared_json(&json, name.as_deref())?;
            println!("{}", id);
        }
        Command::ShareUrl { share_id } => {
            let id = ShareId::parse(share_id)?;
            println!("{}", share_url(&config.share_base_url, &id));
        }
        Command::Hash => println!("{}", planner.refresh_content_hash()?),
    }
    Ok(())
}

fn load_catalog(config: &PlannerConfig) -> anyhow::Result<ModifierCatalog> {
    let Some(path) = &config.catalog_path else {
        bail!("no modifier catalog configured (set IDOL_PLANNER_CATALOG or pass --catalog)");
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading modifier catalog {}", path.display()))?;
    let catalog = ModifierCatalog::from_json(&json)?;
    tracing::debug!(definitions = catalog.len(), "Loaded modifier catalog");
    Ok(catalog)
}
