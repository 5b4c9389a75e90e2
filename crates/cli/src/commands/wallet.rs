//! Wallet commands.
//!
//! Top-ups are paid on a hosted payment page: `fund` prints its URL and a
//! reference, and `verify` credits the wallet once the payment went
//! through.

use clap::Subcommand;
use covu_client::BankDetails;
use rust_decimal::Decimal;

use super::{CliError, Context, naira, print_page_footer};

#[derive(Subcommand)]
pub enum WalletAction {
    /// Show the wallet balance
    Balance,
    /// Start a top-up of ₦100 to ₦100,000
    Fund { amount: Decimal },
    /// Confirm a top-up by its payment reference
    Verify { reference: String },
    /// List wallet transactions
    Transactions {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Withdraw to a bank account
    Withdraw {
        amount: Decimal,

        #[arg(long)]
        bank_code: String,

        #[arg(long)]
        account_number: String,

        #[arg(long)]
        account_name: String,
    },
}

pub async fn run(ctx: &Context, action: WalletAction) -> Result<(), CliError> {
    let client = &ctx.client;
    match action {
        WalletAction::Balance => {
            println!("Balance: {}", naira(client.wallet_balance().await?));
        }
        WalletAction::Fund { amount } => {
            let response = client.fund_wallet(amount).await?;
            let Some(payment) = response.payment() else {
                return Err(CliError::Refused(
                    response
                        .message
                        .unwrap_or_else(|| "Failed to initialize payment".to_owned()),
                ));
            };
            println!("Complete the payment of {} at:", naira(amount));
            println!("  {}", payment.authorization_url);
            println!("Then run `covu wallet verify {}`.", payment.reference);
        }
        WalletAction::Verify { reference } => {
            let verification = client.verify_payment(&reference).await?;
            if !verification.is_success() {
                return Err(CliError::Refused(
                    verification
                        .message
                        .unwrap_or_else(|| "Payment could not be verified".to_owned()),
                ));
            }
            match verification.amount {
                Some(amount) => println!("{} added to your wallet.", naira(amount)),
                None => println!("Payment verified."),
            }
            if let Some(balance) = verification.balance {
                println!("Balance: {}", naira(balance));
            }
        }
        WalletAction::Transactions { page } => {
            let transactions = client.transactions(page).await?;
            for tx in &transactions.items {
                let date = tx
                    .created_at
                    .map_or_else(String::new, |d| d.format("%d %b %Y").to_string());
                println!(
                    "{date:<12} {:<12} {:>14}  {:<10} {}",
                    tx.transaction_type.as_deref().unwrap_or("-"),
                    naira(tx.amount),
                    tx.status.as_deref().unwrap_or("-"),
                    tx.description
                        .as_deref()
                        .or(tx.reference.as_deref())
                        .unwrap_or_default()
                );
            }
            print_page_footer(&transactions);
        }
        WalletAction::Withdraw {
            amount,
            bank_code,
            account_number,
            account_name,
        } => {
            let bank = BankDetails {
                bank_code,
                account_number,
                account_name,
            };
            let withdrawal = client.withdraw(amount, &bank).await?;
            println!(
                "{}",
                withdrawal
                    .message
                    .unwrap_or_else(|| format!("Withdrawal of {} requested.", naira(amount)))
            );
            if let Some(reference) = withdrawal.reference {
                println!("Reference: {reference}");
            }
        }
    }
    Ok(())
}
