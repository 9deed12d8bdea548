//! Authorize.Net card payment client.
//!
//! Speaks the JSON flavour of the Authorize.Net API: one
//! `createTransactionRequest` per charge, with `authCaptureTransaction`.

use std::time::Duration;

use async_trait::async_trait;
use eventcover_core::{
    errors::Error,
    payments::{GatewayCharge, GatewayChargeRequest, PaymentGateway},
    Result,
};
use reqwest::Client;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::AuthorizeNetConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authorize.Net limits invoice numbers to 20 characters.
const MAX_INVOICE_NUMBER_LEN: usize = 20;
const MAX_DESCRIPTION_LEN: usize = 255;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTransactionEnvelope<'a> {
    create_transaction_request: CreateTransactionRequest<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTransactionRequest<'a> {
    merchant_authentication: MerchantAuthentication<'a>,
    transaction_request: TransactionRequest<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MerchantAuthentication<'a> {
    name: &'a str,
    transaction_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest<'a> {
    transaction_type: &'static str,
    amount: String,
    payment: PaymentSection<'a>,
    order: OrderSection,
    customer: CustomerSection<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bill_to: Option<BillTo<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentSection<'a> {
    credit_card: CreditCard<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreditCard<'a> {
    card_number: &'a str,
    expiration_date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    card_code: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderSection {
    invoice_number: String,
    description: String,
}

#[derive(Serialize)]
struct CustomerSection<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BillTo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zip: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTransactionResponse {
    transaction_response: Option<TransactionResponse>,
    messages: Option<ResultMessages>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionResponse {
    response_code: Option<String>,
    auth_code: Option<String>,
    trans_id: Option<String>,
    #[serde(default)]
    messages: Vec<TransactionMessage>,
    #[serde(default)]
    errors: Vec<TransactionError>,
}

#[derive(Debug, Deserialize)]
struct TransactionMessage {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionError {
    error_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultMessages {
    result_code: Option<String>,
    #[serde(default)]
    message: Vec<ResultMessage>,
}

#[derive(Debug, Deserialize)]
struct ResultMessage {
    text: Option<String>,
}

/// Card charges through Authorize.Net.
pub struct AuthorizeNetGateway {
    client: Client,
    config: AuthorizeNetConfig,
}

impl AuthorizeNetGateway {
    pub fn new(config: AuthorizeNetConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (
            self.config.api_login_id.as_deref(),
            self.config.transaction_key.as_deref(),
        ) {
            (Some(login), Some(key)) => Ok((login, key)),
            _ => Err(Error::ExternalService(
                "Payment gateway is not configured".to_string(),
            )),
        }
    }
}

fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn build_envelope<'a>(
    login: &'a str,
    key: &'a str,
    request: &'a GatewayChargeRequest,
) -> CreateTransactionEnvelope<'a> {
    let has_billing = request.first_name.is_some()
        || request.last_name.is_some()
        || request.zip.is_some();

    CreateTransactionEnvelope {
        create_transaction_request: CreateTransactionRequest {
            merchant_authentication: MerchantAuthentication {
                name: login,
                transaction_key: key,
            },
            transaction_request: TransactionRequest {
                transaction_type: "authCaptureTransaction",
                amount: format_amount(request.amount),
                payment: PaymentSection {
                    credit_card: CreditCard {
                        card_number: &request.card.card_number,
                        expiration_date: &request.card.expiration_date,
                        card_code: request.card.card_code.as_deref(),
                    },
                },
                order: OrderSection {
                    invoice_number: truncate(&request.invoice_number, MAX_INVOICE_NUMBER_LEN),
                    description: truncate(&request.description, MAX_DESCRIPTION_LEN),
                },
                customer: CustomerSection {
                    email: &request.customer_email,
                },
                bill_to: has_billing.then(|| BillTo {
                    first_name: request.first_name.as_deref(),
                    last_name: request.last_name.as_deref(),
                    zip: request.zip.as_deref(),
                }),
            },
        },
    }
}

/// Interprets a response body. Only response code `1` is an approval.
fn parse_response(body: &str) -> Result<GatewayCharge> {
    // The API prefixes its JSON with a byte order mark.
    let body = body.trim_start_matches('\u{feff}');
    let response: CreateTransactionResponse = serde_json::from_str(body).map_err(|e| {
        Error::ExternalService(format!("Unreadable payment gateway response: {}", e))
    })?;

    let result_text = response
        .messages
        .as_ref()
        .and_then(|m| m.message.first())
        .and_then(|m| m.text.clone());

    let Some(transaction) = response.transaction_response else {
        return Err(Error::ExternalService(
            result_text.unwrap_or_else(|| "Payment was not processed".to_string()),
        ));
    };

    let approved = transaction.response_code.as_deref() == Some("1")
        && response
            .messages
            .as_ref()
            .and_then(|m| m.result_code.as_deref())
            .map_or(true, |code| code.eq_ignore_ascii_case("ok"));

    if !approved {
        let message = transaction
            .errors
            .iter()
            .find_map(|e| e.error_text.clone())
            .or(result_text)
            .unwrap_or_else(|| "The card was declined".to_string());
        return Err(Error::ExternalService(message));
    }

    let transaction_id = transaction
        .trans_id
        .filter(|id| !id.is_empty() && id != "0")
        .ok_or_else(|| {
            Error::ExternalService("Payment gateway returned no transaction id".to_string())
        })?;

    Ok(GatewayCharge {
        transaction_id,
        auth_code: transaction.auth_code.filter(|code| !code.is_empty()),
        message: transaction
            .messages
            .into_iter()
            .find_map(|m| m.description),
    })
}

#[async_trait]
impl PaymentGateway for AuthorizeNetGateway {
    async fn charge(&self, request: GatewayChargeRequest) -> Result<GatewayCharge> {
        let (login, key) = self.credentials()?;
        let envelope = build_envelope(login, key, &request);

        tracing::info!(
            "Charging {} for invoice {}",
            format_amount(request.amount),
            request.invoice_number
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| Error::ExternalService(format!("Payment gateway unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ExternalService(format!(
                "Payment gateway HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ExternalService(e.to_string()))?;

        let charge = parse_response(&body);
        match &charge {
            Ok(c) => tracing::info!("Payment approved, transaction {}", c.transaction_id),
            Err(e) => tracing::warn!("Payment for {} rejected: {}", request.invoice_number, e),
        }
        charge
    }
}
