pub mod ai;

pub use ai::AiDraftService;
