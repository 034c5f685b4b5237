//! Dashboard navigation derived from the session mirror.
//!
//! Display only: a link showing up here says nothing about whether the gate
//! will let the caller through.

use serde::Serialize;

use super::SessionUser;
use crate::models::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

impl NavLink {
    const fn new(href: &'static str, label: &'static str) -> Self {
        Self { href, label }
    }

    /// Highlighted when the current path is this link or below it.
    pub fn is_active(&self, pathname: &str) -> bool {
        pathname == self.href || (self.href != "/dashboard" && pathname.starts_with(self.href))
    }
}

const COMMON_LINKS: &[NavLink] = &[
    NavLink::new("/dashboard/attendance", "Attendance"),
    NavLink::new("/dashboard/classes", "Classes"),
    NavLink::new("/dashboard/messages", "Messages"),
    NavLink::new("/dashboard/payments", "Payments"),
];

const FALLBACK_LINKS: &[NavLink] = &[
    NavLink::new("/dashboard/admin", "Admin Panel"),
    NavLink::new("/dashboard/teacher", "Teacher Panel"),
    NavLink::new("/dashboard/student", "Student Panel"),
];

const ADMIN_LINKS: &[NavLink] = &[
    NavLink::new("/dashboard/admin", "Admin Panel"),
    NavLink::new("/dashboard/admin/users", "User Management"),
    NavLink::new("/dashboard/teacher", "Teacher Oversight"),
    NavLink::new("/dashboard/student", "Student Overview"),
];

const TEACHER_LINKS: &[NavLink] = &[NavLink::new("/dashboard/teacher", "Teacher Panel")];

const STUDENT_LINKS: &[NavLink] = &[NavLink::new("/dashboard/student", "Student Panel")];

const PARENT_LINKS: &[NavLink] = &[
    NavLink::new("/dashboard/parent", "Parent Portal"),
    NavLink::new("/dashboard/student", "Children Records"),
];

pub const SETTINGS_LINK: NavLink = NavLink::new("/dashboard/settings", "Settings");

fn role_links(role: Role) -> &'static [NavLink] {
    match role {
        Role::Admin => ADMIN_LINKS,
        Role::Teacher => TEACHER_LINKS,
        Role::Student => STUDENT_LINKS,
        Role::Parent => PARENT_LINKS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    /// "Signed in as NAME (ROLE)".
    pub signed_in_as: String,
    pub links: Vec<NavLink>,
    pub settings: NavLink,
}

/// Build the sidebar for the mirrored user, or for a guest.
pub fn menu_for(user: Option<&SessionUser>) -> Menu {
    let role = user.and_then(SessionUser::role);
    let primary = role.map(role_links).unwrap_or(FALLBACK_LINKS);

    let name = user
        .map(|u| u.name.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("Guest");
    let role_label = user
        .map(|u| u.role.to_uppercase())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "GUEST".to_string());

    Menu {
        signed_in_as: format!("Signed in as {} ({})", name, role_label),
        links: primary.iter().chain(COMMON_LINKS).cloned().collect(),
        settings: SETTINGS_LINK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, role: &str) -> SessionUser {
        SessionUser {
            name: name.into(),
            role: role.into(),
            ..Default::default()
        }
    }

    fn hrefs(menu: &Menu) -> Vec<&'static str> {
        menu.links.iter().map(|l| l.href).collect()
    }

    #[test]
    fn test_guest_menu() {
        let menu = menu_for(None);
        assert_eq!(menu.signed_in_as, "Signed in as Guest (GUEST)");
        assert_eq!(menu.links.len(), FALLBACK_LINKS.len() + COMMON_LINKS.len());
        assert_eq!(menu.links[0].label, "Admin Panel");
    }

    #[test]
    fn test_admin_menu() {
        let menu = menu_for(Some(&user("Ada", "ADMIN")));
        assert_eq!(menu.signed_in_as, "Signed in as Ada (ADMIN)");
        assert_eq!(
            hrefs(&menu)[..4],
            [
                "/dashboard/admin",
                "/dashboard/admin/users",
                "/dashboard/teacher",
                "/dashboard/student"
            ]
        );
        assert_eq!(hrefs(&menu).last(), Some(&"/dashboard/payments"));
    }

    #[test]
    fn test_parent_menu_lists_children_records() {
        let menu = menu_for(Some(&user("Pat", "parent")));
        assert_eq!(menu.links[1].label, "Children Records");
        assert_eq!(menu.signed_in_as, "Signed in as Pat (PARENT)");
    }

    #[test]
    fn test_unknown_role_uses_fallback_links() {
        let menu = menu_for(Some(&user("", "7")));
        assert_eq!(menu.links[..3], FALLBACK_LINKS[..]);
        assert_eq!(menu.signed_in_as, "Signed in as Guest (7)");
    }

    #[test]
    fn test_active_link() {
        let link = NavLink::new("/dashboard/classes", "Classes");
        assert!(link.is_active("/dashboard/classes"));
        assert!(link.is_active("/dashboard/classes/3"));
        assert!(!link.is_active("/dashboard/messages"));
    }
}
