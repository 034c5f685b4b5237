//! Route permission table.
//!
//! | Section | Allowed roles |
//! |---------|---------------|
//! | `admin` | ADMIN |
//! | `teacher` | ADMIN, TEACHER |
//! | `student` | ADMIN, TEACHER, STUDENT |
//! | `parent` | ADMIN, PARENT |
//! | `classes` | ADMIN, TEACHER |
//! | `attendance` | ADMIN, TEACHER |
//! | `payments` | ADMIN, PARENT |
//! | `messages` | all roles |
//! | `settings` | all roles |
//! | `profile` | all roles |

use regex::Regex;

use crate::{config::RuleConfig, models::Role};

#[derive(Debug, Clone)]
pub struct RoutePermissionRule {
    pattern: Regex,
    allowed: Vec<Role>,
}

impl RoutePermissionRule {
    pub fn new(pattern: &str, allowed: Vec<Role>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            allowed,
        })
    }

    /// Rule covering `{prefix}/{section}` and everything below it.
    pub fn section(prefix: &str, section: &str, allowed: &[Role]) -> Result<Self, regex::Error> {
        let pattern = format!(
            "^{}/{}(/.*)?$",
            regex::escape(prefix),
            regex::escape(section)
        );
        Self::new(&pattern, allowed.to_vec())
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

/// Outcome of checking a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// No rule matched the path.
    Unmatched,
    /// At least one rule matched and none excluded the role.
    Allowed,
    /// The first matching rule that excludes the role.
    Denied { pattern: String },
}

/// Ordered, immutable list of permission rules.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    rules: Vec<RoutePermissionRule>,
}

/// Role sets of the built-in dashboard sections. The JSON API checks the
/// same sets so a page and the data behind it agree on who may see them.
pub mod sections {
    use crate::models::Role;

    pub const ADMIN: &[Role] = &[Role::Admin];
    pub const TEACHER: &[Role] = &[Role::Admin, Role::Teacher];
    pub const STUDENT: &[Role] = &[Role::Admin, Role::Teacher, Role::Student];
    pub const PARENT: &[Role] = &[Role::Admin, Role::Parent];
    pub const CLASSES: &[Role] = &[Role::Admin, Role::Teacher];
    pub const ATTENDANCE: &[Role] = &[Role::Admin, Role::Teacher];
    pub const PAYMENTS: &[Role] = &[Role::Admin, Role::Parent];
    pub const EVERYONE: &[Role] = &Role::ALL;
}

const DEFAULT_SECTIONS: &[(&str, &[Role])] = &[
    ("admin", sections::ADMIN),
    ("teacher", sections::TEACHER),
    ("student", sections::STUDENT),
    ("parent", sections::PARENT),
    ("classes", sections::CLASSES),
    ("attendance", sections::ATTENDANCE),
    ("payments", sections::PAYMENTS),
    ("messages", sections::EVERYONE),
    ("settings", sections::EVERYONE),
    ("profile", sections::EVERYONE),
];

impl PermissionTable {
    pub fn new(rules: Vec<RoutePermissionRule>) -> Self {
        Self { rules }
    }

    /// The built-in table for the dashboard sections under `prefix`.
    pub fn default_for(prefix: &str) -> Result<Self, regex::Error> {
        let rules = DEFAULT_SECTIONS
            .iter()
            .map(|(section, allowed)| RoutePermissionRule::section(prefix, section, allowed))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    /// Build from configured rules. Unknown role names are skipped with a
    /// warning; config validation rejects them before this point.
    pub fn from_config(rules: &[RuleConfig]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|rule| {
                let allowed = rule
                    .allow
                    .iter()
                    .filter_map(|name| {
                        Role::parse(name).or_else(|| {
                            tracing::warn!(role = %name, pattern = %rule.pattern, "Unknown role in gate rule, skipping");
                            None
                        })
                    })
                    .collect();
                RoutePermissionRule::new(&rule.pattern, allowed)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[RoutePermissionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Walk the rules in order; the first matching rule that excludes `role`
    /// decides. A later matching rule never overrides an earlier denial.
    pub fn check(&self, path: &str, role: Role) -> RuleOutcome {
        let mut matched = false;
        for rule in self.rules.iter().filter(|rule| rule.matches(path)) {
            if !rule.allows(role) {
                return RuleOutcome::Denied {
                    pattern: rule.pattern().to_string(),
                };
            }
            matched = true;
        }
        if matched {
            RuleOutcome::Allowed
        } else {
            RuleOutcome::Unmatched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PermissionTable {
        PermissionTable::default_for("/dashboard").unwrap()
    }

    #[test]
    fn test_default_table_has_ten_rules_in_order() {
        let table = table();
        assert_eq!(table.len(), 10);
        assert_eq!(table.rules()[0].pattern(), r"^/dashboard/admin(/.*)?$");
        assert_eq!(table.rules()[9].pattern(), r"^/dashboard/profile(/.*)?$");
    }

    #[test]
    fn test_section_matching_respects_segments() {
        let rule = RoutePermissionRule::section("/dashboard", "admin", &[Role::Admin]).unwrap();
        assert!(rule.matches("/dashboard/admin"));
        assert!(rule.matches("/dashboard/admin/"));
        assert!(rule.matches("/dashboard/admin/users"));
        assert!(!rule.matches("/dashboard/administrator"));
        assert!(!rule.matches("/dashboard"));
    }

    #[test]
    fn test_default_permissions() {
        let table = table();
        let cases: &[(&str, &[Role])] = &[
            ("/dashboard/admin/users", &[Role::Admin]),
            ("/dashboard/teacher", &[Role::Admin, Role::Teacher]),
            ("/dashboard/student", &[Role::Admin, Role::Teacher, Role::Student]),
            ("/dashboard/parent", &[Role::Admin, Role::Parent]),
            ("/dashboard/classes/7", &[Role::Admin, Role::Teacher]),
            ("/dashboard/attendance", &[Role::Admin, Role::Teacher]),
            ("/dashboard/payments", &[Role::Admin, Role::Parent]),
            ("/dashboard/messages", &Role::ALL),
            ("/dashboard/settings", &Role::ALL),
            ("/dashboard/profile", &Role::ALL),
        ];

        for (path, allowed) in cases {
            for role in Role::ALL {
                let outcome = table.check(path, role);
                if allowed.contains(&role) {
                    assert_eq!(outcome, RuleOutcome::Allowed, "{role} on {path}");
                } else {
                    assert!(
                        matches!(outcome, RuleOutcome::Denied { .. }),
                        "{role} on {path}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_unlisted_section_is_unmatched() {
        assert_eq!(
            table().check("/dashboard/reports", Role::Admin),
            RuleOutcome::Unmatched
        );
    }

    #[test]
    fn test_earlier_denial_wins_over_later_allow() {
        let table = PermissionTable::new(vec![
            RoutePermissionRule::new("^/dashboard/shared", vec![Role::Admin]).unwrap(),
            RoutePermissionRule::new("^/dashboard/shared", Role::ALL.to_vec()).unwrap(),
        ]);
        assert_eq!(
            table.check("/dashboard/shared", Role::Student),
            RuleOutcome::Denied {
                pattern: "^/dashboard/shared".into()
            }
        );
        assert_eq!(
            table.check("/dashboard/shared", Role::Admin),
            RuleOutcome::Allowed
        );
    }

    #[test]
    fn test_later_denial_still_applies_after_earlier_allow() {
        let table = PermissionTable::new(vec![
            RoutePermissionRule::new("^/dashboard/", Role::ALL.to_vec()).unwrap(),
            RoutePermissionRule::new("^/dashboard/admin", vec![Role::Admin]).unwrap(),
        ]);
        assert!(matches!(
            table.check("/dashboard/admin", Role::Teacher),
            RuleOutcome::Denied { .. }
        ));
    }

    #[test]
    fn test_from_config() {
        let table = PermissionTable::from_config(&[RuleConfig {
            pattern: "^/dashboard/reports(/.*)?$".into(),
            allow: vec!["teacher".into(), "JANITOR".into()],
        }])
        .unwrap();
        assert_eq!(table.rules()[0].allowed(), &[Role::Teacher]);
        assert_eq!(
            table.check("/dashboard/reports/2024", Role::Teacher),
            RuleOutcome::Allowed
        );
    }
}
