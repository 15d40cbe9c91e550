use clap::{Parser, Subcommand};
use storefront_app::{AppConfig, AppState};
use storefront_cart::Cart;
use storefront_catalog::{QueryParameters, SortOrder, DEFAULT_MAX_PRICE};
use storefront_core::{Product, ProductId};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Browse the catalog and manage the cart")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List products in a price range.
    Products {
        #[arg(long, default_value_t = 0.0)]
        min: f64,
        #[arg(long, default_value_t = DEFAULT_MAX_PRICE)]
        max: f64,
        /// asc, desc or none
        #[arg(long, default_value = "asc")]
        sort: SortOrder,
    },
    /// Case-insensitive title search.
    Search { term: String },
    /// Show a single product.
    Show { id: ProductId },
    /// Show or change the cart.
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
}

#[derive(Debug, Subcommand)]
enum CartAction {
    /// Add one unit of a catalog product.
    Add { id: ProductId },
    /// Drop a product line entirely.
    Remove { id: ProductId },
    /// Empty the cart.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = AppConfig::from_env();
    storefront_observability::init_with(loaded.config.log_format);
    loaded.log_fallbacks();
    let config = loaded.config;

    let state = AppState::bootstrap(&config).await?;
    let result = run(&state, cli.command);

    // Pending cart writes land even when the command failed.
    state.shutdown().await;
    result
}

fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Products { min, max, sort } => {
            let params = QueryParameters::default()
                .with_price_range(min, max)
                .with_sort_order(sort);
            print_products(&state.catalog.view(&params));
        }
        Command::Search { term } => print_products(&state.catalog.search(&term)),
        Command::Show { id } => {
            let product = catalog_product(state, id)?;
            println!("#{} {}", product.id, product.title);
            println!("  price: {:.2}", product.price.value());
            if !product.description.is_empty() {
                println!("  {}", product.description);
            }
            println!("  in cart: {}", state.cart.cart().quantity_of(id));
        }
        Command::Cart { action } => {
            let cart = match action {
                None => state.cart.cart(),
                Some(CartAction::Add { id }) => {
                    let product = catalog_product(state, id)?.clone();
                    state.cart.add_to_cart(&product)
                }
                Some(CartAction::Remove { id }) => state.cart.remove_from_cart(id),
                Some(CartAction::Clear) => {
                    state.cart.clear_cart();
                    state.cart.cart()
                }
            };
            print_cart(&cart);
        }
    }
    Ok(())
}

fn catalog_product(state: &AppState, id: ProductId) -> anyhow::Result<&Product> {
    state
        .catalog
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("product {id} is not in the catalog"))
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("no products");
        return;
    }
    for product in products {
        println!("#{:<4} {:>10.2}  {}", product.id, product.price.value(), product.title);
    }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }
    for line in cart.lines() {
        println!(
            "#{:<4} {:>3} x {:>10.2} = {:>10.2}  {}",
            line.product_id(),
            line.quantity,
            line.unit_price().value(),
            line.amount(),
            line.product.title
        );
    }
    println!("items: {}  total: {:.2}", cart.total_items(), cart.total_price());
}
