//! Index-composition layer: the railway ticketing domain built on top of
//! the generic storage primitives in `crate::storage` and `crate::btree`.
//! Kept as contracts (signatures + pre/post conditions) rather than a
//! full fare-computation/transfer-search implementation.

pub mod order;
pub mod system;
pub mod train;
pub mod user;

pub use order::{Order, OrderStatus};
pub use system::TicketingEngine;
pub use train::{SeatMatrix, Train, TrainLite, TrainState};
pub use user::User;
