mod attendance;
mod class;
mod common;
mod message;
mod overview;
mod page;
mod payment;
mod people;
mod role;
mod user;

pub use attendance::*;
pub use class::*;
pub use common::*;
pub use message::*;
pub use overview::*;
pub use page::*;
pub use payment::*;
pub use people::*;
pub use role::*;
pub use user::*;
