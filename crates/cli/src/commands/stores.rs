//! Store commands.

use clap::Subcommand;
use covu_client::StoreQuery;
use covu_core::{StoreId, humanize_category};

use super::{CliError, Context, naira, print_page_footer, print_product_line, print_store_line};

#[derive(Subcommand)]
pub enum StoresAction {
    /// List stores
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Category slug, see `covu categories`
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a store and its rating summary
    Show { id: StoreId },
    /// List a store's products
    Products {
        id: StoreId,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Rate a store you have bought from
    Rate {
        id: StoreId,

        /// 1 to 5
        #[arg(short, long)]
        stars: u8,

        #[arg(short, long)]
        review: Option<String>,
    },
}

pub async fn run(ctx: &Context, action: StoresAction) -> Result<(), CliError> {
    let client = &ctx.client;
    match action {
        StoresAction::List {
            page,
            category,
            search,
        } => {
            let stores = client
                .list_stores(&StoreQuery {
                    page,
                    category,
                    search,
                })
                .await?;
            for store in &stores.items {
                print_store_line(store);
            }
            print_page_footer(&stores);
        }
        StoresAction::Show { id } => {
            let store = client.get_store(id).await?;
            let stats = client.get_store_rating_stats(id).await?;

            println!("{} (#{})", store.name, store.id);
            if let Some(description) = &store.description {
                println!("  {description}");
            }
            if let Some(category) = &store.category {
                println!("  Category: {}", humanize_category(category));
            }
            if let Some(city) = &store.city {
                println!("  City:     {city}");
            }
            let delivery = store.delivery_info();
            if let (Some(within), Some(outside)) =
                (delivery.delivery_within_lga, delivery.delivery_outside_lga)
            {
                println!(
                    "  Delivery: {} within LGA, {} outside",
                    naira(within),
                    naira(outside)
                );
            }
            match stats.average_rating {
                Some(average) => println!(
                    "  Rating:   {average:.1} from {} ratings",
                    stats.total_ratings
                ),
                None => println!("  Rating:   not rated yet"),
            }
        }
        StoresAction::Products { id, page } => {
            let products = client.get_store_products(id, page).await?;
            for product in &products.items {
                print_product_line(product);
            }
            print_page_footer(&products);
        }
        StoresAction::Rate { id, stars, review } => {
            client.rate_store(id, stars, review.as_deref()).await?;
            println!("Thanks for rating store #{id}.");
        }
    }
    Ok(())
}
