//! Wallet operations.
//!
//! Funding goes through a hosted payment page: [`CovuClient::fund_wallet`]
//! returns its URL and a reference, and the payment is credited once
//! [`CovuClient::verify_payment`] confirms that reference.

use covu_core::Page;
use covu_core::models::{
    FundWalletResponse, PaymentVerification, Transaction, WalletBalance, Withdrawal,
};
use covu_core::validate::{validate_positive, validate_top_up};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, instrument};

use super::CovuClient;
use crate::error::ApiError;
use crate::http::ApiRequest;

/// Destination account for a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankDetails {
    pub bank_code: String,
    pub account_number: String,
    pub account_name: String,
}

impl CovuClient {
    /// Current wallet balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn wallet_balance(&self) -> Result<Decimal, ApiError> {
        let balance: WalletBalance = self.api().send(ApiRequest::get("/wallet/balance/")).await?;
        Ok(balance.balance)
    }

    /// Start a wallet top-up of ₦100 to ₦100,000.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is out of range or the request fails.
    #[instrument(skip(self))]
    pub async fn fund_wallet(&self, amount: Decimal) -> Result<FundWalletResponse, ApiError> {
        let amount = validate_top_up(amount)?;
        self.api()
            .send(ApiRequest::post("/wallet/fund/").json(json!({ "amount": amount })))
            .await
    }

    /// Confirm a top-up by its payment reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn verify_payment(&self, reference: &str) -> Result<PaymentVerification, ApiError> {
        let verification: PaymentVerification = self
            .api()
            .send(
                ApiRequest::post("/wallet/verify-payment/")
                    .json(json!({ "reference": reference.trim() })),
            )
            .await?;
        if verification.is_success() {
            info!("Wallet payment verified");
        }
        Ok(verification)
    }

    /// Wallet ledger, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn transactions(&self, page: u32) -> Result<Page<Transaction>, ApiError> {
        let page = page.max(1);
        let transactions: Page<Transaction> = self
            .api()
            .send(ApiRequest::get("/wallet/transactions/").query("page", page))
            .await?;
        Ok(transactions.with_page(page))
    }

    /// Withdraw to a bank account.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the backend
    /// rejects the withdrawal.
    #[instrument(skip(self, bank), fields(bank_code = %bank.bank_code))]
    pub async fn withdraw(
        &self,
        amount: Decimal,
        bank: &BankDetails,
    ) -> Result<Withdrawal, ApiError> {
        let amount = validate_positive(amount)?;
        let request = ApiRequest::post("/wallet/withdraw/").json(json!({
            "amount": amount,
            "bank_code": bank.bank_code,
            "account_number": bank.account_number,
            "account_name": bank.account_name,
        }));

        let withdrawal = self.api().send(request).await?;
        info!("Withdrawal requested");
        Ok(withdrawal)
    }
}
