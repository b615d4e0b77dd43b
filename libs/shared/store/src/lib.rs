pub mod reference;
pub mod seed;
pub mod state;
pub mod store;

pub use reference::ReferenceData;
pub use state::AppState;
pub use store::{SessionStore, UpdateOutcome, UpdateRejected};
