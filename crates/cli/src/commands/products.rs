//! Product commands.

use clap::Subcommand;
use covu_client::ProductQuery;
use covu_core::{CATEGORIES, ProductId, StoreId, humanize_category};

use super::{CliError, Context, naira, print_page_footer, print_product_line};

/// Related products shown under a product.
const RELATED_LIMIT: usize = 4;

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List products
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Category slug, see `covu categories`
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        search: Option<String>,

        /// Only products from this store
        #[arg(long)]
        store: Option<StoreId>,
    },
    /// Show a product with its rating and related products
    Show { id: ProductId },
    /// List reviews left on a product
    Reviews {
        id: ProductId,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Rate a product you have bought
    Rate {
        id: ProductId,

        /// 1 to 5
        #[arg(short, long)]
        stars: u8,

        #[arg(short, long)]
        review: Option<String>,
    },
}

pub async fn run(ctx: &Context, action: ProductsAction) -> Result<(), CliError> {
    let client = &ctx.client;
    match action {
        ProductsAction::List {
            page,
            category,
            search,
            store,
        } => {
            let products = client
                .list_products(&ProductQuery {
                    page,
                    category,
                    search,
                    store,
                })
                .await?;
            for product in &products.items {
                print_product_line(product);
            }
            print_page_footer(&products);
        }
        ProductsAction::Show { id } => {
            let product = client.get_product(id).await?;
            let stats = client.get_product_rating_stats(id).await?;

            println!("{} (#{})", product.name, product.id);
            println!("  Price:    {}", naira(product.price));
            if let Some(store) = product.store_label() {
                println!("  Store:    {store}");
            }
            if let Some(stock) = product.stock {
                println!("  In stock: {stock}");
            }
            if let Some(description) = &product.description {
                println!("  {description}");
            }
            if let Some(average) = stats.average_rating {
                println!(
                    "  Rating:   {average:.1} from {} ratings",
                    stats.total_ratings
                );
            }
            if ctx.cart()?.is_in_cart(id) {
                println!("  (in your cart)");
            }

            if let Some(category) = &product.category {
                let related = client
                    .related_products(category, product.id, RELATED_LIMIT)
                    .await?;
                if !related.is_empty() {
                    println!();
                    println!("More in {}:", humanize_category(category));
                    for product in &related {
                        print_product_line(product);
                    }
                }
            }
        }
        ProductsAction::Reviews { id, page } => {
            let reviews = client.get_product_reviews(id, page).await?;
            for review in &reviews.items {
                let author = review
                    .user
                    .as_ref()
                    .map_or_else(|| "anonymous".to_owned(), |u| u.label());
                println!(
                    "{}{}  {author}",
                    "*".repeat(usize::from(review.rating)),
                    " ".repeat(5 - usize::from(review.rating.min(5)))
                );
                if let Some(text) = review.review.as_deref().filter(|t| !t.is_empty()) {
                    println!("    {text}");
                }
            }
            print_page_footer(&reviews);
        }
        ProductsAction::Rate { id, stars, review } => {
            client.rate_product(id, stars, review.as_deref()).await?;
            println!("Thanks for rating product #{id}.");
        }
    }
    Ok(())
}

pub fn categories() {
    for category in CATEGORIES {
        println!("{:<18} {}", category.slug, category.name);
    }
}
