use clap::{Args, ValueEnum};
use emporium_app::domain::{
    inventory::{
        InventoryService, PgInventoryService, data::StockAdjustment, records::AdjustmentReason,
    },
    products::records::ProductUuid,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReasonArg {
    Restock,
    Damage,
    Correction,
    Return,
}

impl From<ReasonArg> for AdjustmentReason {
    fn from(reason: ReasonArg) -> Self {
        match reason {
            ReasonArg::Restock => Self::Restock,
            ReasonArg::Damage => Self::Damage,
            ReasonArg::Correction => Self::Correction,
            ReasonArg::Return => Self::Return,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct AdjustInventoryArgs {
    /// Product UUID
    #[arg(long)]
    product_uuid: Uuid,

    /// Signed change to on-hand quantity, e.g. 25 or -2
    #[arg(long, allow_hyphen_values = true)]
    delta: i64,

    /// Why stock is changing
    #[arg(long, value_enum)]
    reason: ReasonArg,

    /// Free-text note stored with the adjustment
    #[arg(long)]
    note: Option<String>,
}

pub(crate) async fn run(
    service: &PgInventoryService,
    args: AdjustInventoryArgs,
) -> Result<(), String> {
    let inventory = service
        .adjust_stock(
            ProductUuid::from_uuid(args.product_uuid),
            StockAdjustment {
                delta: args.delta,
                reason: args.reason.into(),
                note: args.note,
            },
        )
        .await
        .map_err(|error| format!("failed to adjust stock: {error}"))?;

    println!("product_uuid: {}", inventory.product_uuid);
    println!("quantity: {}", inventory.quantity);
    println!("reserved: {}", inventory.reserved);
    println!("available: {}", inventory.available());

    Ok(())
}
