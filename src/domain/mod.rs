pub mod id;
pub mod order;
pub mod product;
pub mod user;

pub use id::*;
pub use order::*;
pub use product::*;
pub use user::*;
