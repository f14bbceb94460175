pub mod error;
pub mod id;
pub mod tag;
pub mod wallet;

pub use error::*;
pub use id::*;
pub use tag::*;
pub use wallet::*;
