use clap::{Args, Subcommand};
use emporium_app::{
    database::{self, Db},
    domain::inventory::PgInventoryService,
};

mod adjust;
mod show;

#[derive(Debug, Args)]
pub(crate) struct InventoryCommand {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: InventorySubcommand,
}

#[derive(Debug, Subcommand)]
enum InventorySubcommand {
    /// Show stock counts and recent adjustments for a product
    Show(show::ShowInventoryArgs),

    /// Restock, write off or correct a product's on-hand quantity
    Adjust(adjust::AdjustInventoryArgs),
}

pub(crate) async fn run(command: InventoryCommand) -> Result<(), String> {
    let database_url = command
        .database_url
        .ok_or_else(|| "DATABASE_URL is required".to_string())?;

    let pool = database::connect(&database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgInventoryService::new(Db::new(pool));

    match command.command {
        InventorySubcommand::Show(args) => show::run(&service, args).await,
        InventorySubcommand::Adjust(args) => adjust::run(&service, args).await,
    }
}
