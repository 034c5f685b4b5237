mod attendance;
mod classes;
mod messages;
mod parent_links;
mod payments;
mod subjects;
mod users;

pub use attendance::*;
pub use classes::*;
pub use messages::*;
pub use parent_links::*;
pub use payments::*;
pub use subjects::*;
pub use users::*;
