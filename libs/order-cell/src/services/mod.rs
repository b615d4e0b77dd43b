pub mod fulfillment;
pub mod lifecycle;
pub mod pricing;
pub mod scheduler;

pub use fulfillment::{DistanceSource, FulfillmentRouter, RandomDistance, ShippingQuote};
pub use lifecycle::OrderLifecycleService;
pub use scheduler::AutoAdvanceScheduler;
