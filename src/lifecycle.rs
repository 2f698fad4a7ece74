//! Lifecycle Controller
//!
//! Applies requested status transitions and driver assignments to orders. Every operation
//! follows the same cycle: fetch the authoritative record, validate against the status
//! vocabulary, submit the mutation, then re-fetch. Nothing is predicted locally, so concurrent
//! changes by another actor are picked up rather than overwritten.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    backend::{BackendError, OrderMutation, OrderQuery, StatusUpdate},
    orders::{DriverId, OrderFilter, OrderId, OrderRecord},
    status::{DeliveryStatus, InvalidTransition, LifecycleStatus},
};

/// Lifecycle failures, each recoverable by the initiating view.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The requested status is not reachable from the current one.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// Cash-on-delivery completion without confirming the full amount was collected.
    #[error("collection of {expected} must be confirmed before delivery")]
    PaymentNotConfirmed {
        /// Order total
        expected: Decimal,
        /// Amount the caller confirmed, if any
        collected: Option<Decimal>,
    },

    /// The driver can no longer change because the food has been picked up.
    #[error("driver assignment is locked once the delivery is {status}")]
    AssignmentLocked {
        /// Delivery status at the time of the request
        status: DeliveryStatus,
    },

    /// A backend call failed; nothing was changed locally.
    #[error("order service unavailable")]
    BackendUnavailable(#[source] BackendError),

    /// The change was applied but the updated record could not be fetched.
    #[error("change applied but the order could not be refreshed")]
    Stale(#[source] BackendError),
}

/// Extra input a transition may need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionContext {
    /// Cash the driver confirms having collected.
    pub cash_collected: Option<Decimal>,
}

impl TransitionContext {
    /// Context confirming collection of `amount`.
    pub fn with_cash(amount: Decimal) -> Self {
        Self {
            cash_collected: Some(amount),
        }
    }
}

/// Enforces the transition table and the cash-on-delivery confirmation.
#[derive(Clone)]
pub struct LifecycleController {
    query: Arc<dyn OrderQuery>,
    mutation: Arc<dyn OrderMutation>,
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController").finish_non_exhaustive()
    }
}

impl LifecycleController {
    /// Create a controller over the given collaborators.
    pub fn new(query: Arc<dyn OrderQuery>, mutation: Arc<dyn OrderMutation>) -> Self {
        Self { query, mutation }
    }

    /// Fetch the authoritative record.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::BackendUnavailable`] if the query fails.
    pub async fn refresh(&self, id: OrderId) -> Result<OrderRecord, LifecycleError> {
        self.query
            .get_order(id)
            .await
            .map_err(LifecycleError::BackendUnavailable)
    }

    /// List orders matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::BackendUnavailable`] if the query fails.
    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<OrderRecord>, LifecycleError> {
        self.query
            .list_orders(filter)
            .await
            .map_err(LifecycleError::BackendUnavailable)
    }

    /// Move an order or its delivery to `requested` and return the refreshed record.
    ///
    /// `context.cash_collected` is forwarded only when a cash-on-delivery order is marked
    /// delivered; any other transition drops it.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: the table, or the state of the other status
    ///   family, rejects the move. `Assigned` is never accepted here; it follows from
    ///   [`LifecycleController::assign`].
    /// - [`LifecycleError::PaymentNotConfirmed`]: a cash-on-delivery order is being marked
    ///   delivered without `context.cash_collected` equal to the order total.
    /// - [`LifecycleError::BackendUnavailable`]: fetching or mutating failed; nothing changed.
    /// - [`LifecycleError::Stale`]: the change was applied but the re-fetch failed.
    #[tracing::instrument(
        name = "lifecycle.transition",
        skip(self, context),
        fields(order_id = %id, requested = %requested),
        err
    )]
    pub async fn transition(
        &self,
        id: OrderId,
        requested: LifecycleStatus,
        context: TransitionContext,
    ) -> Result<OrderRecord, LifecycleError> {
        let current = self.refresh(id).await?;

        current.check_transition(requested)?;

        let collects_cash = requested.is_delivery_completion() && current.is_cash_on_delivery();

        if collects_cash {
            confirm_cash(&current, context)?;
        }

        let update = StatusUpdate {
            status: requested,
            cash_collected: context.cash_collected.filter(|_| collects_cash),
        };

        if let Err(error) = self.mutation.set_status(id, update).await {
            return Err(self.explain_rejection(id, requested, error).await);
        }

        info!(order_id = %id, status = %requested, "status changed");

        self.query.get_order(id).await.map_err(LifecycleError::Stale)
    }

    /// Set (`Some`) or clear (`None`) the driver of an order's delivery and return the refreshed
    /// record.
    ///
    /// Setting a driver moves a pending delivery to `Assigned`; clearing it hands the delivery
    /// back to the status it had before. Both are applied by the backend and read back here.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AssignmentLocked`]: the delivery is past pickup.
    /// - [`LifecycleError::BackendUnavailable`]: fetching or mutating failed; nothing changed.
    /// - [`LifecycleError::Stale`]: the change was applied but the re-fetch failed.
    #[tracing::instrument(
        name = "lifecycle.assign",
        skip(self),
        fields(order_id = %id, driver = ?driver),
        err
    )]
    pub async fn assign(
        &self,
        id: OrderId,
        driver: Option<DriverId>,
    ) -> Result<OrderRecord, LifecycleError> {
        let current = self.refresh(id).await?;

        ensure_assignable(&current)?;

        if let Err(error) = self.mutation.assign_driver(id, driver).await {
            if matches!(error, BackendError::Rejected(_))
                && let Ok(latest) = self.query.get_order(id).await
            {
                ensure_assignable(&latest)?;
            }

            return Err(LifecycleError::BackendUnavailable(error));
        }

        info!(order_id = %id, driver = ?driver, "driver assignment changed");

        self.query.get_order(id).await.map_err(LifecycleError::Stale)
    }

    /// A mutation rejected by the backend usually means another actor moved the record first;
    /// report that as the transition it now is.
    async fn explain_rejection(
        &self,
        id: OrderId,
        requested: LifecycleStatus,
        error: BackendError,
    ) -> LifecycleError {
        if matches!(error, BackendError::Rejected(_))
            && let Ok(latest) = self.query.get_order(id).await
            && let Err(rejection) = latest.check_transition(requested)
        {
            warn!(order_id = %id, %rejection, "lost a concurrent transition");

            return rejection.into();
        }

        LifecycleError::BackendUnavailable(error)
    }
}

fn confirm_cash(order: &OrderRecord, context: TransitionContext) -> Result<(), LifecycleError> {
    match context.cash_collected {
        Some(collected) if collected == order.total => Ok(()),
        collected => Err(LifecycleError::PaymentNotConfirmed {
            expected: order.total,
            collected,
        }),
    }
}

fn ensure_assignable(order: &OrderRecord) -> Result<(), LifecycleError> {
    if order.delivery.status.is_pre_pickup() {
        Ok(())
    } else {
        Err(LifecycleError::AssignmentLocked {
            status: order.delivery.status,
        })
    }
}
