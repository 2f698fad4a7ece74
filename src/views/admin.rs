//! Admin table

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    lifecycle::LifecycleController,
    orders::{DriverId, OrderFilter, OrderId, OrderRecord},
    views::{Action, Board, Role, ViewError, available_actions, table},
};

/// Every order, with staff actions.
#[derive(Debug)]
pub struct AdminTable {
    controller: LifecycleController,
    filter: OrderFilter,
    board: Board,
}

impl AdminTable {
    /// An empty table listing every order once refreshed.
    pub fn new(controller: LifecycleController) -> Self {
        Self::with_filter(controller, OrderFilter::All)
    }

    /// An empty table listing the orders matching `filter` once refreshed.
    pub fn with_filter(controller: LifecycleController, filter: OrderFilter) -> Self {
        Self {
            controller,
            filter,
            board: Board::default(),
        }
    }

    /// Cached orders, newest first.
    pub fn orders(&self) -> &[OrderRecord] {
        &self.board.orders
    }

    /// Reload the list from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Lifecycle`] if the backend is unavailable; the cached list is kept.
    pub async fn refresh(&mut self) -> Result<&[OrderRecord], ViewError> {
        self.board.orders = self.controller.list(self.filter).await?;

        debug!(count = self.board.orders.len(), "admin table refreshed");

        Ok(&self.board.orders)
    }

    /// Actions offered for a listed order.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotListed`] if the order is not cached.
    pub fn actions(&self, id: OrderId) -> Result<SmallVec<[Action; 6]>, ViewError> {
        Ok(available_actions(Role::Admin, self.board.get(id)?))
    }

    /// Apply a status action and cache the refreshed record.
    ///
    /// # Errors
    ///
    /// - [`ViewError::NotListed`]: the order is not cached.
    /// - [`ViewError::NotOffered`]: the action is not offered for the cached status, or is
    ///   [`Action::Assign`] (use [`AdminTable::assign`]).
    /// - [`ViewError::Lifecycle`]: the controller refused or failed; the cache is unchanged.
    pub async fn perform(&mut self, id: OrderId, action: Action) -> Result<OrderRecord, ViewError> {
        let Action::Transition { status, .. } = action else {
            return Err(self.board.not_offered(id, &action));
        };

        self.board.ensure_offered(Role::Admin, id, &action)?;

        let record = self
            .controller
            .transition(id, status, action.context())
            .await?;

        self.board.replace(record.clone());

        Ok(record)
    }

    /// Set or clear the driver of a listed order and cache the refreshed record.
    ///
    /// # Errors
    ///
    /// - [`ViewError::NotListed`]: the order is not cached.
    /// - [`ViewError::NotOffered`]: the cached delivery is past pickup.
    /// - [`ViewError::Lifecycle`]: the controller refused or failed; the cache is unchanged.
    pub async fn assign(
        &mut self,
        id: OrderId,
        driver: Option<DriverId>,
    ) -> Result<OrderRecord, ViewError> {
        self.board.ensure_offered(Role::Admin, id, &Action::Assign)?;

        let record = self.controller.assign(id, driver).await?;

        self.board.replace(record.clone());

        Ok(record)
    }

    /// Render the cached orders.
    pub fn render(&self) -> String {
        table::render(Role::Admin, &self.board.orders)
    }
}
