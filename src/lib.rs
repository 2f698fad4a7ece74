//! Tiffin
//!
//! Tiffin is the client-side state engine of a food-ordering platform: a persisted shopping cart
//! with derived pricing, and the order/delivery status lifecycle shared by customers, staff and
//! drivers.

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod fixtures;
pub mod lifecycle;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod status;
pub mod uuids;
pub mod views;
