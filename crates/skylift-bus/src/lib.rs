//! Log bus abstraction for Skylift.
//!
//! The bus is the only medium shared between build workers and the control
//! plane: many concurrent publishers (one per worker) and a single long-lived
//! pattern subscriber (the relay). Publishing is fire-and-forget: there is no
//! delivery acknowledgment and no replay buffer, and subscriber slowness
//! never blocks a publisher.
//!
//! Two backends:
//!
//! - [`RedisLogBus`]: production backend over Redis/Valkey pub/sub.
//! - [`InMemoryLogBus`]: process-local backend for tests and local
//!   development.

mod error;
mod memory;
mod traits;
mod valkey;

pub use error::BusError;
pub use memory::InMemoryLogBus;
pub use traits::{BusEvent, BusSubscription, LogBus};
pub use valkey::RedisLogBus;
