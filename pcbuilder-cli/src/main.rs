//! PC Builder CLI - component catalog and compatibility checks from the command line.

mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pcbuilder::{
    discover_settings, load_settings_from_path, Component, ComponentKind, Database,
    DatabaseError, PcBuilderCore, PcBuilderError, Settings,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "pcbuilder")]
#[command(about = "PC component catalog and compatibility checker", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides the settings file)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Settings file (JSON). Defaults to ./pcbuilder.json when present
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "human")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the component catalog
    Components {
        #[command(subcommand)]
        command: ComponentCommands,
    },

    /// Show stock levels and catalog value
    Inventory {
        /// Report components with fewer units than this
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// Assemble, list and check configurations
    Configs {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// List compatibility rules
    Rules {
        /// Show detailed rule descriptions
        #[arg(short, long)]
        verbose: bool,
    },

    /// Load the sample catalog into an empty database
    Seed,
}

#[derive(Subcommand)]
enum ComponentCommands {
    /// List all components
    List,

    /// Search components by name, type or specifications
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Add a component to the catalog
    Add(AddArgs),

    /// Change fields of an existing component
    Update(UpdateArgs),

    /// Delete a component that is not part of any configuration
    Remove {
        #[arg(value_name = "ID")]
        id: i64,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Create a configuration from component ids
    Create {
        #[arg(value_name = "NAME")]
        name: String,

        /// Component ids to include
        #[arg(value_name = "ID", required = true)]
        ids: Vec<i64>,
    },

    /// List stored configurations
    List,

    /// Check a stored configuration and record its status
    Check {
        #[arg(value_name = "ID")]
        id: i64,

        /// Exit with error code if issues found at this severity or higher
        #[arg(long, value_enum)]
        fail_on: Option<FailOnSeverity>,
    },

    /// Delete a configuration
    Remove {
        #[arg(value_name = "ID")]
        id: i64,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,

    /// Processor, Motherboard, Memory, Video Card, Power Supply, Chassis or any other type
    #[arg(long = "type", value_name = "TYPE")]
    kind: String,

    #[arg(long)]
    price: f64,

    #[arg(long, default_value = "0")]
    quantity: u32,

    #[command(flatten)]
    attributes: AttributeArgs,
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(value_name = "ID")]
    id: i64,

    #[arg(long)]
    name: Option<String>,

    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<String>,

    #[arg(long)]
    price: Option<f64>,

    #[arg(long)]
    quantity: Option<u32>,

    #[command(flatten)]
    attributes: AttributeArgs,
}

#[derive(Args)]
struct AttributeArgs {
    /// Free-text specifications
    #[arg(long)]
    specs: Option<String>,

    #[arg(long)]
    socket: Option<String>,

    #[arg(long)]
    memory_type: Option<String>,

    #[arg(long)]
    form_factor: Option<String>,

    /// Power draw in watts, or rated output for a power supply
    #[arg(long)]
    power: Option<u32>,

    /// Maximum supported memory in GB (motherboards)
    #[arg(long)]
    max_memory: Option<u32>,
}

impl AttributeArgs {
    fn apply(self, component: &mut Component) {
        if let Some(specs) = self.specs {
            component.specifications = Some(specs);
        }
        if let Some(socket) = self.socket {
            component.socket = Some(socket);
        }
        if let Some(memory_type) = self.memory_type {
            component.memory_type = Some(memory_type);
        }
        if let Some(form_factor) = self.form_factor {
            component.form_factor = Some(form_factor);
        }
        if let Some(power) = self.power {
            component.power_watts = Some(power);
        }
        if let Some(max_memory) = self.max_memory {
            component.max_memory_gb = Some(max_memory);
        }
    }
}

#[derive(Clone, ValueEnum)]
enum FailOnSeverity {
    Error,
    Warning,
}

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    init_tracing(&settings.log_filter);

    let exit_code = match run(cli, &settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, PcBuilderError> {
    let mut settings = match &cli.config {
        Some(path) => load_settings_from_path(path)?,
        None => discover_settings(&std::env::current_dir()?)?.unwrap_or_default(),
    };
    if let Some(db) = &cli.db {
        settings.database_path = db.clone();
    }
    Ok(settings)
}

fn run(cli: Cli, settings: &Settings) -> Result<i32, PcBuilderError> {
    let format = cli.format;

    if let Commands::Rules { verbose } = cli.command {
        output::print_rules(verbose, &format);
        return Ok(0);
    }

    let db = PcBuilderCore::open_database(settings)?;
    tracing::debug!(path = %settings.database_path.display(), "database opened");

    match cli.command {
        Commands::Components { command } => handle_components(&db, command, &format),
        Commands::Inventory { threshold } => {
            let threshold = threshold.unwrap_or(settings.low_stock_threshold);
            let report = db.inventory_report(threshold)?;
            output::print_inventory(&report, &format);
            Ok(0)
        }
        Commands::Configs { command } => handle_configs(&db, command, &format),
        Commands::Seed => {
            let inserted = db.seed_sample_data()?;
            output::print_seeded(inserted, &format);
            Ok(0)
        }
        Commands::Rules { .. } => Ok(0),
    }
}

fn handle_components(
    db: &Database,
    command: ComponentCommands,
    format: &OutputFormat,
) -> Result<i32, PcBuilderError> {
    match command {
        ComponentCommands::List => {
            output::print_components(&db.list_components()?, format);
        }
        ComponentCommands::Search { query } => {
            output::print_components(&db.search_components(&query)?, format);
        }
        ComponentCommands::Add(args) => {
            let mut component = Component::new(args.name, ComponentKind::from(args.kind), args.price)
                .with_quantity(args.quantity);
            args.attributes.apply(&mut component);
            let id = db.add_component(&component)?;
            component.id = Some(id);
            output::print_component_saved("Added", &component, format);
        }
        ComponentCommands::Update(args) => {
            let mut component = db.get_component(args.id)?.ok_or(DatabaseError::NotFound {
                entity: "Component",
                id: args.id,
            })?;
            if let Some(name) = args.name {
                component.name = name;
            }
            if let Some(kind) = args.kind {
                component.kind = ComponentKind::from(kind);
            }
            if let Some(price) = args.price {
                component.price = price;
            }
            if let Some(quantity) = args.quantity {
                component.quantity = quantity;
            }
            args.attributes.apply(&mut component);
            db.update_component(&component)?;
            output::print_component_saved("Updated", &component, format);
        }
        ComponentCommands::Remove { id } => {
            db.delete_component(id)?;
            output::print_removed("Component", id, format);
        }
    }
    Ok(0)
}

fn handle_configs(
    db: &Database,
    command: ConfigCommands,
    format: &OutputFormat,
) -> Result<i32, PcBuilderError> {
    match command {
        ConfigCommands::Create { name, ids } => {
            let config = db.create_configuration(&name, &ids)?;
            let resolved = config.component_ids();
            let skipped: Vec<i64> = ids
                .iter()
                .copied()
                .filter(|id| !resolved.contains(id))
                .collect();
            output::print_created_configuration(&config, &skipped, format);
            Ok(0)
        }
        ConfigCommands::List => {
            output::print_configurations(&db.list_configurations()?, format);
            Ok(0)
        }
        ConfigCommands::Check { id, fail_on } => {
            let report = PcBuilderCore::check_stored_configuration(db, id)?;
            output::print_report(&report, format);
            let failed = match fail_on {
                Some(FailOnSeverity::Error) => report.has_errors(),
                Some(FailOnSeverity::Warning) => report.has_warnings_or_errors(),
                None => false,
            };
            Ok(if failed { 1 } else { 0 })
        }
        ConfigCommands::Remove { id } => {
            db.delete_configuration(id)?;
            output::print_removed("Configuration", id, format);
            Ok(0)
        }
    }
}
