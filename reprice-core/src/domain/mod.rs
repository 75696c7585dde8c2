//! Domain types: orders, ticks, clocks.

pub mod clock;
pub mod order;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemTime, TimeSource};
pub use order::{
    DesiredState, ExecutionReport, ObservedState, Order, OrderId, OrderKind, Role, Side,
};
pub use tick::Tick;
