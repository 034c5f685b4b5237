//! Record storage.
//!
//! Each record type sits behind its own repository trait so services never
//! see the backing store. [`Repos`] bundles one of each for the app state.

mod error;
pub mod memory;
pub mod repos;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use memory::{
    MemoryAttendanceRepo, MemoryClassRepo, MemoryMessageRepo, MemoryParentLinkRepo,
    MemoryPaymentRepo, MemorySubjectRepo, MemoryUserRepo,
};
pub use repos::*;

/// One repository per record type.
#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn UserRepo>,
    pub classes: Arc<dyn ClassRepo>,
    pub subjects: Arc<dyn SubjectRepo>,
    pub attendance: Arc<dyn AttendanceRepo>,
    pub payments: Arc<dyn PaymentRepo>,
    pub messages: Arc<dyn MessageRepo>,
    pub parent_links: Arc<dyn ParentLinkRepo>,
}

impl Repos {
    /// Everything in process memory. State is lost on restart.
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepo::new()),
            classes: Arc::new(MemoryClassRepo::new()),
            subjects: Arc::new(MemorySubjectRepo::new()),
            attendance: Arc::new(MemoryAttendanceRepo::new()),
            payments: Arc::new(MemoryPaymentRepo::new()),
            messages: Arc::new(MemoryMessageRepo::new()),
            parent_links: Arc::new(MemoryParentLinkRepo::new()),
        }
    }
}
