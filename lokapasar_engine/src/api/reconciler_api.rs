use std::fmt::Debug;

use chrono::Utc;
use log::*;
use lp_common::Rupiah;
use serde::Serialize;

use crate::{
    api::errors::OrderFlowError,
    db_types::{Order, OrderNumber, PaymentStatus},
    gateway::{map_provider_status, WebhookEvent},
    traits::{OrderStore, StatusUpdate},
};

/// The outcome of applying one webhook event. Every variant is acknowledged to the provider with a 200; the
/// distinction only matters for logging, tests and manual review.
#[derive(Debug, Clone, Serialize)]
pub enum Reconciliation {
    /// The event transitioned the order. First (and only) application of this outcome.
    Applied(Order),
    /// The order was already in the state the event targets. Duplicate or reordered delivery; nothing changed.
    AlreadySettled(Order),
    /// The provider status does not map to a terminal payment state for this rail. Acknowledged and dropped.
    Ignored,
    /// The event conflicts with recorded state and needs a human. Nothing was mutated.
    Anomaly(ReconciliationAnomaly),
}

/// Events that must never be auto-corrected. They are logged at error level and surfaced for manual review, but the
/// webhook is still acknowledged so the provider does not retry forever.
#[derive(Debug, Clone, Serialize)]
pub enum ReconciliationAnomaly {
    /// The order is already in a different terminal state than the event wants (e.g. a late `PAID` for an order that
    /// expired). Flipping a terminal state silently would falsify the books.
    TerminalConflict { number: OrderNumber, current: PaymentStatus, incoming: PaymentStatus },
    /// The provider reports a paid amount that differs from the order total. The order is not marked paid.
    AmountMismatch { number: OrderNumber, expected: Rupiah, reported: Rupiah },
}

/// `ReconcilerApi` applies authenticated provider webhooks to order state, enforcing the payment state machine
/// regardless of delivery order or duplication. Authentication happens in the server layer before events get here;
/// this API assumes the event is genuine and concentrates on idempotency and monotonicity.
pub struct ReconcilerApi<B> {
    db: B,
}

impl<B> Debug for ReconcilerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconcilerApi")
    }
}

impl<B> Clone for ReconcilerApi<B>
where B: Clone
{
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> ReconcilerApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> ReconcilerApi<B>
where B: OrderStore
{
    /// Applies one inbound event. The algorithm, in order:
    ///
    /// 1. Resolve the target order by its external reference. An unknown reference is an error (no order is ever
    ///    created from a webhook), though the transport layer still acknowledges it.
    /// 2. Map the provider status string to a terminal payment status via the fixed per-rail table. Unmapped
    ///    statuses are interim notifications; they are acknowledged and ignored.
    /// 3. For a `Paid` target carrying an amount, require it to equal the order total.
    /// 4. Apply the conditional update with precondition `{Unpaid, Pending}`. A failed precondition is a duplicate
    ///    or late delivery: a no-op when the recorded state already matches the event, an anomaly when it conflicts.
    ///
    /// Applying the same event twice therefore changes state exactly once, and no sequence of events can move an
    /// order out of a terminal state.
    pub async fn apply_event(&self, event: WebhookEvent) -> Result<Reconciliation, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_number(&event.reference)
            .await?
            .ok_or_else(|| OrderFlowError::UnknownReference(event.reference.clone()))?;
        let target = match map_provider_status(event.rail, &event.status) {
            Some(status) => status,
            None => {
                debug!("💳️ Ignoring {} webhook with unmapped status '{}' for [{}]", event.rail, event.status, event.reference);
                return Ok(Reconciliation::Ignored);
            },
        };

        if target == PaymentStatus::Paid {
            if let Some(reported) = event.paid_amount {
                if reported != order.total_amount {
                    error!(
                        "💳️ Amount mismatch on [{}]: provider reports {reported}, order total is {}. Flagging for \
                         manual review.",
                        order.order_number, order.total_amount
                    );
                    return Ok(Reconciliation::Anomaly(ReconciliationAnomaly::AmountMismatch {
                        number: order.order_number,
                        expected: order.total_amount,
                        reported,
                    }));
                }
            }
        }

        let update = match target {
            PaymentStatus::Paid => StatusUpdate::paid(event.paid_at.unwrap_or_else(Utc::now)),
            status => StatusUpdate::to(status),
        };
        let expected = [PaymentStatus::Unpaid, PaymentStatus::Pending];
        match self.db.update_payment_status(&event.reference, &expected, update).await? {
            Some(order) => {
                info!("💳️ Order [{}] reconciled to {} via {} webhook", order.order_number, target, event.rail);
                Ok(Reconciliation::Applied(order))
            },
            None => {
                // Precondition failed: the order is already terminal. Decide between a harmless duplicate and a
                // genuine conflict from the state we can now observe.
                let current = self
                    .db
                    .fetch_order_by_number(&event.reference)
                    .await?
                    .ok_or_else(|| OrderFlowError::UnknownReference(event.reference.clone()))?;
                if current.payment_status == target {
                    debug!("💳️ Duplicate {} webhook for [{}]; already {target}", event.rail, current.order_number);
                    Ok(Reconciliation::AlreadySettled(current))
                } else {
                    error!(
                        "💳️ Terminal conflict on [{}]: recorded {} but provider sent {target}. Not auto-correcting; \
                         flagging for manual review.",
                        current.order_number, current.payment_status
                    );
                    Ok(Reconciliation::Anomaly(ReconciliationAnomaly::TerminalConflict {
                        number: current.order_number,
                        current: current.payment_status,
                        incoming: target,
                    }))
                }
            },
        }
    }
}
