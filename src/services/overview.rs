use uuid::Uuid;

use super::{
    MessageService, PaymentService, PeopleService, ServiceResult,
    lookup::{class_index, user_index},
};
use crate::{
    db::Repos,
    models::{
        AdminOverview, AttendanceStatus, AttendanceTally, ChildOverview, ClassSummary,
        LatestStudent, MessagePreview, OverviewStat, ParentIdentity, ParentOverview, Role,
        preview,
    },
};

const LATEST_STUDENTS: usize = 4;
const LATEST_MESSAGES: usize = 3;
const PARENT_PAYMENTS: usize = 5;
const PARENT_MESSAGES: usize = 5;
/// Attendance entries considered per child for the parent tally.
const ATTENDANCE_WINDOW: usize = 10;

/// Dashboard summaries built from the other record types.
#[derive(Clone)]
pub struct OverviewService {
    db: Repos,
    people: PeopleService,
    payments: PaymentService,
    messages: MessageService,
}

impl OverviewService {
    pub fn new(
        db: Repos,
        people: PeopleService,
        payments: PaymentService,
        messages: MessageService,
    ) -> Self {
        Self {
            db,
            people,
            payments,
            messages,
        }
    }

    pub async fn admin(&self) -> ServiceResult<AdminOverview> {
        let users = self.db.users.list().await?;
        let count = |role: Role| users.iter().filter(|u| u.role == role).count();
        let stats = vec![
            OverviewStat {
                title: "Total Students",
                value: count(Role::Student),
                key: "students",
            },
            OverviewStat {
                title: "Total Teachers",
                value: count(Role::Teacher),
                key: "teachers",
            },
            OverviewStat {
                title: "Total Classes",
                value: self.db.classes.count().await? as usize,
                key: "classes",
            },
            OverviewStat {
                title: "Total Subjects",
                value: self.db.subjects.count().await? as usize,
                key: "subjects",
            },
        ];

        let classes = class_index(self.db.classes.as_ref()).await?;
        let mut latest_students = Vec::new();
        for student in users.iter().filter(|u| u.role == Role::Student).take(LATEST_STUDENTS) {
            let class = self
                .db
                .classes
                .class_of(student.id)
                .await?
                .and_then(|id| classes.get(&id))
                .map(|c| c.name.clone());
            latest_students.push(LatestStudent {
                id: student.id,
                name: student.name.clone(),
                email: student.email.clone(),
                class: class.unwrap_or_else(|| "Unassigned".to_string()),
                registered: student.created_at,
                status: "Active",
            });
        }

        let by_id = user_index(self.db.users.as_ref()).await?;
        let latest_messages = self
            .db
            .messages
            .list(None, Some(LATEST_MESSAGES))
            .await?
            .into_iter()
            .map(|m| MessagePreview {
                id: m.id,
                sender: by_id
                    .get(&m.sender_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                preview: preview(&m.content),
                time: m.created_at,
            })
            .collect();

        Ok(AdminOverview {
            stats,
            latest_students,
            latest_messages,
        })
    }

    /// Children with attendance tallies, upcoming payments and recent
    /// messages for one parent.
    pub async fn parent(&self, parent_id: Uuid) -> ServiceResult<ParentOverview> {
        let parent = self.people.require_parent(parent_id).await?;
        let child_ids = self.db.parent_links.children_of(parent_id).await?;
        let classes = class_index(self.db.classes.as_ref()).await?;
        let recent = self
            .db
            .attendance
            .recent_for_students(&child_ids, child_ids.len() * ATTENDANCE_WINDOW)
            .await?;

        let mut children = Vec::with_capacity(child_ids.len());
        for id in &child_ids {
            let Some(student) = self.db.users.get_by_id(*id).await? else {
                continue;
            };
            let class = self
                .db
                .classes
                .class_of(student.id)
                .await?
                .and_then(|class_id| classes.get(&class_id))
                .map(ClassSummary::from);
            let mut attendance = AttendanceTally::default();
            for record in recent.iter().filter(|r| r.student_id == student.id) {
                attendance.total += 1;
                if record.status == AttendanceStatus::Present {
                    attendance.present += 1;
                }
            }
            children.push(ChildOverview {
                id: student.id,
                name: student.name,
                email: student.email,
                class,
                attendance,
            });
        }

        let mut payments = self.payments.for_parent(parent_id).await?;
        payments.truncate(PARENT_PAYMENTS);
        let messages = self
            .db
            .messages
            .list(Some(parent_id), Some(PARENT_MESSAGES))
            .await?;

        Ok(ParentOverview {
            parent: ParentIdentity {
                id: parent.id,
                name: parent.name,
                email: parent.email,
                role: parent.role,
            },
            children,
            payments: self.payments.views(payments).await?,
            messages: self.messages.views(messages).await?,
        })
    }
}
