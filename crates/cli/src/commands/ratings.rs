//! Rating commands.

use clap::Subcommand;
use covu_core::StoreId;
use covu_core::models::RatingStats;

use super::{CliError, Context, print_page_footer};

#[derive(Subcommand)]
pub enum RatingsAction {
    /// Ratings you have left
    Mine,
    /// Rating breakdown for a store
    Store { id: StoreId },
}

pub async fn run(ctx: &Context, action: RatingsAction) -> Result<(), CliError> {
    let client = &ctx.client;
    match action {
        RatingsAction::Mine => {
            let ratings = client.my_ratings().await?;
            for rating in &ratings.items {
                println!(
                    "{}/5  {}",
                    rating.rating,
                    rating.review.as_deref().unwrap_or_default()
                );
            }
            print_page_footer(&ratings);
        }
        RatingsAction::Store { id } => {
            print_stats(&client.get_store_rating_stats(id).await?);
        }
    }
    Ok(())
}

fn print_stats(stats: &RatingStats) {
    match stats.average_rating {
        Some(average) => println!("{average:.1} from {} ratings", stats.total_ratings),
        None => println!("Not rated yet"),
    }
    for stars in (1..=5).rev() {
        let count = stats
            .distribution
            .get(&stars.to_string())
            .copied()
            .unwrap_or_default();
        println!("  {stars} stars: {count}");
    }
}
