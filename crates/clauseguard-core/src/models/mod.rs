pub mod analysis;
pub mod user;

pub use analysis::*;
pub use user::*;
