use clap::Args;
use emporium_app::domain::{
    inventory::{InventoryService, PgInventoryService},
    products::records::ProductUuid,
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ShowInventoryArgs {
    /// Product UUID
    #[arg(long)]
    product_uuid: Uuid,

    /// Number of recent adjustments to print
    #[arg(long, default_value_t = 10)]
    history: u32,
}

pub(crate) async fn run(service: &PgInventoryService, args: ShowInventoryArgs) -> Result<(), String> {
    let product = ProductUuid::from_uuid(args.product_uuid);

    let inventory = service
        .get_inventory(product)
        .await
        .map_err(|error| format!("failed to load inventory: {error}"))?;

    println!("product_uuid: {}", inventory.product_uuid);
    println!("quantity: {}", inventory.quantity);
    println!("reserved: {}", inventory.reserved);
    println!("available: {}", inventory.available());
    println!("updated_at: {}", inventory.updated_at);

    if args.history == 0 {
        return Ok(());
    }

    let adjustments = service
        .list_adjustments(product, args.history)
        .await
        .map_err(|error| format!("failed to load adjustments: {error}"))?;

    for adjustment in adjustments {
        println!();
        println!("adjustment_uuid: {}", adjustment.uuid);
        println!("delta: {:+}", adjustment.delta);
        println!("reason: {}", adjustment.reason);
        println!("quantity_after: {}", adjustment.quantity_after);
        println!("note: {}", adjustment.note.as_deref().unwrap_or("-"));
        println!("created_at: {}", adjustment.created_at);
    }

    Ok(())
}
