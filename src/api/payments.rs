// ABOUTME: Payment client creating gateway payment intents and recording participation
// ABOUTME: Card handling stays with the payment gateway; only the publishable key lives here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use serde::Serialize;
use tracing::info;

use crate::config::PaymentConfig;
use crate::constants::endpoints;
use crate::errors::{AppError, AppResult};
use crate::http::AuthorizedClient;
use crate::models::{Contest, PaymentIntent, PaymentRecord};

use super::InsertResult;

#[derive(Serialize)]
struct IntentRequest {
    price: f64,
}

/// Payment endpoints
#[derive(Debug, Clone)]
pub struct PaymentsApi {
    client: AuthorizedClient,
    config: PaymentConfig,
}

impl PaymentsApi {
    /// Payments API over the authorized client
    #[must_use]
    pub const fn new(client: AuthorizedClient, config: PaymentConfig) -> Self {
        Self { client, config }
    }

    /// Publishable key for the payment gateway SDK
    #[must_use]
    pub fn publishable_key(&self) -> &str {
        &self.config.public_key
    }

    /// Create a payment intent for `price`
    ///
    /// # Errors
    ///
    /// `InvalidInput` unless `price` is positive; authorization or transport failures
    pub async fn create_intent(&self, price: f64) -> AppResult<PaymentIntent> {
        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::invalid_input("Payment amount must be positive"));
        }
        self.client
            .post(endpoints::PAYMENT_INTENT, &IntentRequest { price })
            .await
    }

    /// Record a completed payment, registering the payer for the contest
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the record does not match `contest`; authorization or
    /// transport failures
    pub async fn record(&self, contest: &Contest, payment: &PaymentRecord) -> AppResult<InsertResult> {
        if payment.contest_id != contest.id {
            return Err(AppError::invalid_input("Payment is for a different contest"));
        }
        if payment.transaction_id.trim().is_empty() {
            return Err(AppError::invalid_input("Transaction id is required"));
        }
        let result: InsertResult = self.client.post(endpoints::PAYMENTS, payment).await?;
        info!(contest_id = %contest.id, "Contest registration recorded");
        Ok(result)
    }

    /// Contests the signed-in user has paid for
    ///
    /// # Errors
    ///
    /// Authorization or transport failures
    pub async fn participated(&self) -> AppResult<Vec<Contest>> {
        self.client.get(endpoints::PAYMENTS_PARTICIPATED).await
    }
}
