pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod sync;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use query::*;
pub use sync::*;
