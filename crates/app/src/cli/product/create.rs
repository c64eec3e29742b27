use clap::Args;
use emporium_app::{
    database::{self, Db},
    domain::{
        inventory::{InventoryService, PgInventoryService},
        products::{
            PgProductsService, ProductsService,
            data::NewProduct,
            records::{ProductStatus, ProductUuid},
        },
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Product title
    #[arg(long)]
    title: String,

    /// Unit price in minor units
    #[arg(long)]
    price: u64,

    /// Catalog status: draft, active, sold or cancelled
    #[arg(long, default_value = "active")]
    status: ProductStatus,

    /// Optional product UUID; generated when omitted
    #[arg(long)]
    product_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateProductArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let db = Db::new(pool);

    let product = PgProductsService::new(db.clone())
        .create_product(NewProduct {
            uuid: args
                .product_uuid
                .map_or_else(ProductUuid::new, ProductUuid::from_uuid),
            title: args.title,
            price: args.price,
            status: args.status,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    PgInventoryService::new(db)
        .ensure_inventory(product.uuid)
        .await
        .map_err(|error| format!("failed to create inventory record: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("title: {}", product.title);
    println!("price: {}", product.price);
    println!("status: {}", product.status);

    Ok(())
}
