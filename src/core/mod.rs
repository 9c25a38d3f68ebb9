pub mod error;
pub mod models;
pub mod types;
pub mod view_state;

pub use error::InsightError;
pub use models::*;
pub use types::*;
pub use view_state::*;
