//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! covu auth login -e ada@example.com          # password from COVU_PASSWORD or --password
//! covu auth register -n "Ada Obi" -e ada@example.com --phone 08031234567 \
//!     --state Lagos --lga Ikeja --password '...' --confirm-password '...'
//! covu auth profile
//! covu auth become-seller --store-name "Ada's Closet" --category ladies_clothes
//! covu auth logout
//! ```

use clap::Subcommand;
use covu_client::{BecomeSellerInput, RegisterInput};
use covu_core::models::User;
use covu_core::{Email, PhoneNumber};
use secrecy::SecretString;

use super::{CliError, Context, naira};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: Email,

        #[arg(short, long, env = "COVU_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: Email,

        /// Nigerian phone number (`080...` or `+234...`)
        #[arg(long)]
        phone: PhoneNumber,

        #[arg(long)]
        state: String,

        /// Local Government Area
        #[arg(long)]
        lga: String,

        #[arg(long, env = "COVU_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        confirm_password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Profile,
    /// Change the account password
    ChangePassword {
        #[arg(long)]
        old: String,

        #[arg(long)]
        new: String,

        #[arg(long)]
        confirm: String,
    },
    /// Open a store and start selling
    BecomeSeller {
        #[arg(long)]
        store_name: String,

        #[arg(long)]
        description: Option<String>,

        /// Category slug, see `covu categories`
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        city: Option<String>,
    },
}

pub async fn run(ctx: &Context, action: AuthAction) -> Result<(), CliError> {
    let client = &ctx.client;
    match action {
        AuthAction::Login { email, password } => {
            let user = client.login(&email, &SecretString::from(password)).await?;
            println!("Signed in as {}", user.display_name());
        }
        AuthAction::Register {
            name,
            email,
            phone,
            state,
            lga,
            password,
            confirm_password,
        } => {
            let input = RegisterInput {
                full_name: name,
                email,
                phone,
                state,
                lga,
                password: SecretString::from(password),
                confirm_password: SecretString::from(confirm_password),
            };
            let user = client.register(&input).await?;
            println!("Welcome to Covu, {}!", user.display_name());
        }
        AuthAction::Logout => {
            client.logout()?;
            println!("Signed out.");
        }
        AuthAction::Profile => {
            if !client.is_authenticated()? {
                return Err(not_signed_in());
            }
            print_user(&client.get_profile().await?);
        }
        AuthAction::ChangePassword { old, new, confirm } => {
            client
                .change_password(
                    &SecretString::from(old),
                    &SecretString::from(new),
                    &SecretString::from(confirm),
                )
                .await?;
            println!("Password changed.");
        }
        AuthAction::BecomeSeller {
            store_name,
            description,
            category,
            city,
        } => {
            let input = BecomeSellerInput {
                store_name,
                description,
                category,
                city,
            };
            let user = client.become_seller(&input).await?;
            println!("{} is now a seller.", user.display_name());
        }
    }
    Ok(())
}

pub fn not_signed_in() -> CliError {
    CliError::Refused("Not signed in. Run `covu auth login` first.".to_owned())
}

fn print_user(user: &User) {
    println!("{}", user.display_name());
    println!("  Email:    {}", user.email);
    if let Some(phone) = &user.phone {
        println!("  Phone:    {phone}");
    }
    let location: Vec<&str> = [&user.city, &user.lga, &user.state]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();
    if !location.is_empty() {
        println!("  Location: {}", location.join(", "));
    }
    println!("  Seller:   {}", if user.is_seller { "yes" } else { "no" });
    if let Some(balance) = user.wallet_balance {
        println!("  Wallet:   {}", naira(balance));
    }
}
