//! Order data: what is submitted, what sits on shelves, and how it is reported.

pub mod error;
pub mod order;
pub mod prepared_order;
pub mod status;

pub use error::*;
pub use order::*;
pub use prepared_order::*;
pub use status::*;
