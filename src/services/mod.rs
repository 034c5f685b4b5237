mod attendance;
mod avatars;
mod classes;
mod error;
mod lookup;
mod messages;
mod overview;
mod payments;
mod people;
mod users;

use std::sync::Arc;

pub use attendance::AttendanceService;
pub use avatars::{AvatarStore, AvatarStoreError};
pub use classes::ClassService;
pub use error::{ServiceError, ServiceResult};
pub use messages::MessageService;
pub use overview::OverviewService;
pub use payments::PaymentService;
pub use people::PeopleService;
pub use users::{UserService, UserServiceError, UserServiceResult};

use crate::{config::PortalConfig, db::Repos};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub avatars: Arc<AvatarStore>,
    pub classes: ClassService,
    pub people: PeopleService,
    pub attendance: AttendanceService,
    pub payments: PaymentService,
    pub messages: MessageService,
    pub overview: OverviewService,
}

impl Services {
    pub fn new(db: Repos, config: &PortalConfig) -> Self {
        let avatars = Arc::new(AvatarStore::new(config.storage.avatar_store_path.clone()));
        let users = UserService::new(
            db.users.clone(),
            avatars.clone(),
            config.auth.password_min_length,
        );
        let people = PeopleService::new(db.clone(), users.clone());
        let payments = PaymentService::new(db.clone());
        let messages = MessageService::new(db.clone());
        Self {
            overview: OverviewService::new(
                db.clone(),
                people.clone(),
                payments.clone(),
                messages.clone(),
            ),
            classes: ClassService::new(db.clone()),
            attendance: AttendanceService::new(db),
            users,
            avatars,
            people,
            payments,
            messages,
        }
    }
}
