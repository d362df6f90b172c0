use crate::error::{ApiError, ApiResult};
use crate::models::PaymentState;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use sqlx::Row;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-gateway-signature";

const EVENT_CHARGE_SUCCEEDED: &str = "charge.succeeded";
const EVENT_CHARGE_FAILED: &str = "charge.failed";
const EVENT_CHARGE_CANCELLED: &str = "charge.cancelled";

pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String, ApiError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ApiError::internal("server misconfiguration"))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Stage 1: authenticity. Fails closed when no secret is configured; nothing
/// downstream runs unless the raw body matches the signature header.
pub fn verify_signature(
    secret: Option<&str>,
    body: &[u8],
    provided: Option<&str>,
) -> Result<(), ApiError> {
    let Some(secret) = secret.map(str::trim).filter(|s| !s.is_empty()) else {
        tracing::error!("webhook signing secret not configured");
        return Err(ApiError::internal("server misconfiguration"));
    };
    let Some(provided) = provided.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(ApiError::bad_request("missing signature"));
    };
    let expected = sign_payload(secret, body)?;
    if expected.as_bytes().ct_eq(provided.as_bytes()).unwrap_u8() != 1 {
        return Err(ApiError::bad_request("invalid signature"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub failure_message: Option<String>,
}

/// Stage 3: what an event means for local state. Pure so the mapping is
/// testable without storage.
#[derive(Debug, PartialEq)]
pub enum WebhookAction {
    Settle,
    Fail { reason: String },
    Cancel,
    Ignore,
}

pub fn action_for_event(event: &str, payload: &WebhookPayload) -> WebhookAction {
    match event {
        EVENT_CHARGE_SUCCEEDED => WebhookAction::Settle,
        EVENT_CHARGE_FAILED => WebhookAction::Fail {
            reason: payload
                .failure_message
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("Payment failed")
                .to_string(),
        },
        EVENT_CHARGE_CANCELLED => WebhookAction::Cancel,
        _ => WebhookAction::Ignore,
    }
}

pub(crate) enum SettleOutcome {
    Applied {
        booking_reference: String,
        amount: i64,
    },
    AlreadyProcessed,
}

enum MarkOutcome {
    Applied { booking_reference: String },
    PaymentAlreadySettled,
}

struct ResolvedPayment {
    payment_id: String,
    payment_status: String,
    amount: i64,
    booking_id: String,
    booking_reference: String,
    booking_payment_status: String,
    booking_status: String,
}

/// Stage 2: resolve payment by intent id and booking through the payment,
/// with both rows locked for the rest of the transaction.
async fn resolve_for_update(
    state: &AppState,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    intent_id: &str,
) -> ApiResult<ResolvedPayment> {
    let payments = state.table("payments");
    let bookings = state.table("bookings");

    let p = sqlx::query(&format!(
        "SELECT id,booking_id,status,amount FROM {payments} WHERE intent_id=$1 FOR UPDATE"
    ))
    .bind(intent_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "db webhook payment lookup failed");
        ApiError::internal("database error")
    })?
    .ok_or_else(|| ApiError::not_found("payment not found"))?;

    let payment_id: String = p.try_get("id").unwrap_or_default();
    let booking_id: String = p.try_get("booking_id").unwrap_or_default();
    let payment_status: String = p.try_get("status").unwrap_or_else(|_| "pending".to_string());
    let amount: i64 = p.try_get("amount").unwrap_or(0);
    if booking_id.trim().is_empty() {
        return Err(ApiError::not_found("booking not found"));
    }

    let b = sqlx::query(&format!(
        "SELECT id,booking_reference,payment_status,booking_status FROM {bookings} WHERE id=$1 FOR UPDATE"
    ))
    .bind(&booking_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "db webhook booking lookup failed");
        ApiError::internal("database error")
    })?
    .ok_or_else(|| ApiError::not_found("booking not found"))?;

    Ok(ResolvedPayment {
        payment_id,
        payment_status,
        amount,
        booking_id,
        booking_reference: b.try_get("booking_reference").unwrap_or_default(),
        booking_payment_status: b
            .try_get("payment_status")
            .unwrap_or_else(|_| "Pending".to_string()),
        booking_status: b
            .try_get("booking_status")
            .unwrap_or_else(|_| "Pending".to_string()),
    })
}

/// Stage 4 for a settled charge. One transaction covers both records, so the
/// half-applied Payment=successful/Booking=Pending split cannot be observed;
/// a mid-apply error rolls everything back and the gateway retries. Also the
/// pull path: `verify_payment` funnels through here so the webhook and
/// verification can never double-apply.
pub(crate) async fn apply_charge_succeeded(
    state: &AppState,
    intent_id: &str,
) -> ApiResult<SettleOutcome> {
    let payments = state.table("payments");
    let bookings = state.table("bookings");

    let mut tx = state.pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "db begin webhook settle failed");
        ApiError::internal("database error")
    })?;

    let resolved = resolve_for_update(state, &mut tx, intent_id).await?;

    if resolved.payment_status == PaymentState::Successful.as_str()
        && resolved.booking_payment_status == "Paid"
        && resolved.booking_status == "Confirmed"
    {
        tx.rollback().await.ok();
        return Ok(SettleOutcome::AlreadyProcessed);
    }

    sqlx::query(&format!(
        "UPDATE {payments} SET status='successful', paid_at=$1, failure_reason=NULL WHERE id=$2"
    ))
    .bind(Utc::now().to_rfc3339())
    .bind(&resolved.payment_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "db webhook payment settle failed");
        ApiError::internal("database error")
    })?;

    sqlx::query(&format!(
        "UPDATE {bookings} SET payment_status='Paid', booking_status='Confirmed' WHERE id=$1"
    ))
    .bind(&resolved.booking_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "db webhook booking settle failed");
        ApiError::internal("database error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "db webhook settle commit failed");
        ApiError::internal("database error")
    })?;

    Ok(SettleOutcome::Applied {
        booking_reference: resolved.booking_reference,
        amount: resolved.amount,
    })
}

async fn mark_charge_outcome(
    state: &AppState,
    intent_id: &str,
    payment_status: PaymentState,
    failure_reason: Option<&str>,
) -> ApiResult<MarkOutcome> {
    let payments = state.table("payments");
    let bookings = state.table("bookings");

    let mut tx = state.pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "db begin webhook mark failed");
        ApiError::internal("database error")
    })?;

    let resolved = resolve_for_update(state, &mut tx, intent_id).await?;

    // A successful payment is terminal; a late failure/cancel event must not
    // overwrite settled money.
    if resolved.payment_status == PaymentState::Successful.as_str() {
        tx.rollback().await.ok();
        return Ok(MarkOutcome::PaymentAlreadySettled);
    }

    if let Some(reason) = failure_reason {
        sqlx::query(&format!(
            "UPDATE {payments} SET status=$1, failure_reason=$2 WHERE id=$3"
        ))
        .bind(payment_status.as_str())
        .bind(reason)
        .bind(&resolved.payment_id)
        .execute(&mut *tx)
        .await
    } else {
        sqlx::query(&format!("UPDATE {payments} SET status=$1 WHERE id=$2"))
            .bind(payment_status.as_str())
            .bind(&resolved.payment_id)
            .execute(&mut *tx)
            .await
    }
    .map_err(|e| {
        tracing::error!(error = %e, "db webhook payment mark failed");
        ApiError::internal("database error")
    })?;

    // booking_status stays untouched: a failed or cancelled charge does not
    // cancel the booking.
    sqlx::query(&format!(
        "UPDATE {bookings} SET payment_status='Failed' WHERE id=$1"
    ))
    .bind(&resolved.booking_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "db webhook booking mark failed");
        ApiError::internal("database error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "db webhook mark commit failed");
        ApiError::internal("database error")
    })?;

    Ok(MarkOutcome::Applied {
        booking_reference: resolved.booking_reference,
    })
}

pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<axum::Json<serde_json::Value>> {
    verify_signature(
        state.webhook_secret.as_deref(),
        &body,
        headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok()),
    )?;

    let event: WebhookEvent =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("invalid webhook body"))?;

    let action = action_for_event(&event.event, &event.payload);
    if action == WebhookAction::Ignore {
        tracing::info!(event = %event.event, "webhook event received but not handled");
        return Ok(axum::Json(serde_json::json!({
            "message": "webhook received but not handled",
            "event": event.event,
        })));
    }

    let intent_id = event
        .payload
        .payment_intent_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing payment_intent_id"))?;

    match action {
        WebhookAction::Settle => match apply_charge_succeeded(&state, intent_id).await? {
            SettleOutcome::Applied {
                booking_reference,
                amount,
            } => {
                tracing::info!(%booking_reference, intent_id, "payment settled via webhook");
                Ok(axum::Json(serde_json::json!({
                    "message": "Payment processed successfully",
                    "booking_reference": booking_reference,
                    "amount": amount,
                })))
            }
            SettleOutcome::AlreadyProcessed => {
                tracing::info!(intent_id, "webhook delivery for already-settled payment");
                Ok(axum::Json(serde_json::json!({
                    "message": "Payment already processed",
                })))
            }
        },
        WebhookAction::Fail { reason } => {
            match mark_charge_outcome(&state, intent_id, PaymentState::Failed, Some(&reason)).await? {
                MarkOutcome::Applied { booking_reference } => {
                    tracing::warn!(%booking_reference, intent_id, %reason, "payment failed via webhook");
                    Ok(axum::Json(serde_json::json!({
                        "message": "Payment failure recorded",
                    })))
                }
                MarkOutcome::PaymentAlreadySettled => Ok(axum::Json(serde_json::json!({
                    "message": "payment already settled; event ignored",
                }))),
            }
        }
        WebhookAction::Cancel => {
            match mark_charge_outcome(&state, intent_id, PaymentState::Cancelled, None).await? {
                MarkOutcome::Applied { booking_reference } => {
                    tracing::warn!(%booking_reference, intent_id, "payment cancelled via webhook");
                    Ok(axum::Json(serde_json::json!({
                        "message": "Payment cancellation recorded",
                    })))
                }
                MarkOutcome::PaymentAlreadySettled => Ok(axum::Json(serde_json::json!({
                    "message": "payment already settled; event ignored",
                }))),
            }
        }
        WebhookAction::Ignore => unreachable!("ignored events are acknowledged above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const SECRET: &str = "whs_test_secret_0123456789";

    #[test]
    fn signature_round_trip_verifies() {
        let body = br#"{"event":"charge.succeeded","payload":{"payment_intent_id":"pi_1"}}"#;
        let sig = sign_payload(SECRET, body).expect("sign");
        assert!(verify_signature(Some(SECRET), body, Some(&sig)).is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let body = br#"{"event":"charge.succeeded"}"#;
        let sig = sign_payload(SECRET, body).expect("sign");
        let err = verify_signature(Some(SECRET), br#"{"event":"charge.failed"}"#, Some(&sig))
            .expect_err("must reject");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_signature_is_rejected() {
        let err = verify_signature(Some(SECRET), b"{}", None).expect_err("must reject");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let err = verify_signature(Some(SECRET), b"{}", Some("   ")).expect_err("must reject");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unconfigured_secret_fails_closed() {
        let body = b"{}";
        let sig = sign_payload(SECRET, body).expect("sign");
        let err = verify_signature(None, body, Some(&sig)).expect_err("must fail closed");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        let err = verify_signature(Some("  "), body, Some(&sig)).expect_err("must fail closed");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn events_map_to_actions() {
        let payload = WebhookPayload {
            payment_intent_id: Some("pi_1".to_string()),
            failure_message: Some("insufficient balance".to_string()),
        };
        assert_eq!(
            action_for_event("charge.succeeded", &payload),
            WebhookAction::Settle
        );
        assert_eq!(
            action_for_event("charge.failed", &payload),
            WebhookAction::Fail {
                reason: "insufficient balance".to_string()
            }
        );
        assert_eq!(
            action_for_event("charge.cancelled", &payload),
            WebhookAction::Cancel
        );
        assert_eq!(
            action_for_event("charge.refund.initiated", &payload),
            WebhookAction::Ignore
        );
    }

    #[test]
    fn failure_reason_defaults_when_message_is_absent() {
        let payload = WebhookPayload::default();
        assert_eq!(
            action_for_event("charge.failed", &payload),
            WebhookAction::Fail {
                reason: "Payment failed".to_string()
            }
        );
    }

    #[test]
    fn webhook_body_parses_with_extra_fields() {
        let raw = r#"{
            "event": "charge.succeeded",
            "payload": {
                "payment_intent_id": "pi_42",
                "amount": 325,
                "currency": "GMD",
                "customer": {"id": "cus_1"}
            },
            "created_at": "2025-07-10T10:00:00Z"
        }"#;
        let event: WebhookEvent = serde_json::from_str(raw).expect("parse");
        assert_eq!(event.event, "charge.succeeded");
        assert_eq!(event.payload.payment_intent_id.as_deref(), Some("pi_42"));
    }
}
