mod attendance;
mod classes;
mod messages;
mod parent_links;
mod payments;
mod subjects;
mod users;

pub use attendance::MemoryAttendanceRepo;
pub use classes::MemoryClassRepo;
pub use messages::MemoryMessageRepo;
pub use parent_links::MemoryParentLinkRepo;
pub use payments::MemoryPaymentRepo;
pub use subjects::MemorySubjectRepo;
pub use users::MemoryUserRepo;
