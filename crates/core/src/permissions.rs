//! Role-based permission model.
//!
//! Every platform user has exactly one [`Role`]. A role maps to a fixed set of
//! `resource.action` permission strings; there are no per-user overrides and nothing is
//! mutated at runtime. A role holding [`ADMIN_FULL_ACCESS`] is granted every permission.
//!
//! Query functions take `impl Into<Option<Role>>` so that a role string that failed to parse
//! can be passed as `None`. An unknown role holds no permissions, but can still reach the
//! dashboard.

use crate::constants::ADMIN_FULL_ACCESS;
use crate::CoreError;
use std::fmt;
use std::str::FromStr;

/// Category of platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Receptionist,
    Pharmacist,
    Patient,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Doctor,
        Role::Nurse,
        Role::Receptionist,
        Role::Pharmacist,
        Role::Patient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Nurse => "NURSE",
            Role::Receptionist => "RECEPTIONIST",
            Role::Pharmacist => "PHARMACIST",
            Role::Patient => "PATIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownRole(s.to_owned()))
    }
}

const ADMIN_PERMISSIONS: &[&str] = &[
    "users.view",
    "users.create",
    "users.edit",
    "users.delete",
    "patients.view",
    "patients.create",
    "patients.edit",
    "patients.delete",
    "doctors.view",
    "doctors.create",
    "doctors.edit",
    "doctors.delete",
    "appointments.view",
    "appointments.create",
    "appointments.edit",
    "appointments.delete",
    "appointments.approve",
    "appointments.cancel",
    "billing.view",
    "billing.create",
    "billing.edit",
    "billing.delete",
    "billing.refund",
    "billing.reports",
    "prescriptions.view",
    "prescriptions.create",
    "prescriptions.edit",
    "prescriptions.delete",
    "inventory.view",
    "inventory.create",
    "inventory.edit",
    "inventory.delete",
    "reports.view",
    "reports.create",
    "reports.export",
    "reports.schedule",
    "settings.view",
    "settings.edit",
    "system.manage",
    "departments.view",
    "departments.create",
    "departments.edit",
    "departments.delete",
    ADMIN_FULL_ACCESS,
];

const DOCTOR_PERMISSIONS: &[&str] = &[
    "patients.view",
    "patients.create",
    "patients.edit",
    "appointments.view",
    "appointments.create",
    "appointments.edit",
    "appointments.cancel",
    "prescriptions.view",
    "prescriptions.create",
    "prescriptions.edit",
    "billing.view",
    "reports.view",
    "reports.create",
    "departments.view",
    "settings.view",
];

const NURSE_PERMISSIONS: &[&str] = &[
    "patients.view",
    "patients.edit",
    "appointments.view",
    "appointments.edit",
    "prescriptions.view",
    "billing.view",
    "departments.view",
    "settings.view",
];

const RECEPTIONIST_PERMISSIONS: &[&str] = &[
    "patients.view",
    "patients.create",
    "patients.edit",
    "appointments.view",
    "appointments.create",
    "appointments.edit",
    "appointments.cancel",
    "billing.view",
    "billing.create",
    "departments.view",
    "settings.view",
];

const PHARMACIST_PERMISSIONS: &[&str] = &[
    "patients.view",
    "prescriptions.view",
    "prescriptions.edit",
    "inventory.view",
    "inventory.create",
    "inventory.edit",
    "billing.view",
    "settings.view",
];

const PATIENT_PERMISSIONS: &[&str] = &[
    "appointments.view",
    "appointments.create",
    "prescriptions.view",
    "billing.view",
    "settings.view",
];

/// Returns the static permission set for a role. Unknown roles (`None`) hold nothing.
pub fn role_permissions(role: impl Into<Option<Role>>) -> &'static [&'static str] {
    match role.into() {
        Some(Role::Admin) => ADMIN_PERMISSIONS,
        Some(Role::Doctor) => DOCTOR_PERMISSIONS,
        Some(Role::Nurse) => NURSE_PERMISSIONS,
        Some(Role::Receptionist) => RECEPTIONIST_PERMISSIONS,
        Some(Role::Pharmacist) => PHARMACIST_PERMISSIONS,
        Some(Role::Patient) => PATIENT_PERMISSIONS,
        None => &[],
    }
}

/// True iff the role holds `permission` exactly, or holds the full-access sentinel.
pub fn has_permission(role: impl Into<Option<Role>>, permission: &str) -> bool {
    let granted = role_permissions(role);
    granted.contains(&permission) || granted.contains(&ADMIN_FULL_ACCESS)
}

pub fn has_any_permission(role: impl Into<Option<Role>>, permissions: &[&str]) -> bool {
    let role = role.into();
    permissions.iter().any(|p| has_permission(role, p))
}

/// An empty `permissions` slice is vacuously satisfied.
pub fn has_all_permissions(role: impl Into<Option<Role>>, permissions: &[&str]) -> bool {
    let role = role.into();
    permissions.iter().all(|p| has_permission(role, p))
}

pub fn can_access_resource(role: impl Into<Option<Role>>, resource: &str, action: &str) -> bool {
    has_permission(role, &format!("{resource}.{action}"))
}

/// Whether `user_id` may act on a resource owned by `owner_id`.
///
/// Full-access roles may act on anything. Patients may only act on their own resources. Other
/// staff are trusted with the resources assigned to them by the backend.
pub fn can_access_own_resource(
    role: impl Into<Option<Role>>,
    user_id: &str,
    owner_id: &str,
) -> bool {
    let role = role.into();
    if has_permission(role, ADMIN_FULL_ACCESS) {
        return true;
    }
    match role {
        Some(Role::Patient) => user_id == owner_id,
        Some(_) => true,
        None => false,
    }
}

/// Top-level screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Dashboard,
    Patients,
    Doctors,
    Appointments,
    Billing,
    Prescriptions,
    Inventory,
    Reports,
    Departments,
    Settings,
    Admin,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Dashboard,
        Route::Patients,
        Route::Doctors,
        Route::Appointments,
        Route::Billing,
        Route::Prescriptions,
        Route::Inventory,
        Route::Reports,
        Route::Departments,
        Route::Settings,
        Route::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Route::Dashboard => "dashboard",
            Route::Patients => "patients",
            Route::Doctors => "doctors",
            Route::Appointments => "appointments",
            Route::Billing => "billing",
            Route::Prescriptions => "prescriptions",
            Route::Inventory => "inventory",
            Route::Reports => "reports",
            Route::Departments => "departments",
            Route::Settings => "settings",
            Route::Admin => "admin",
        }
    }

    fn is_accessible(self, role: Option<Role>) -> bool {
        match self {
            // Every signed-in user has a dashboard, whatever their role.
            Route::Dashboard => true,
            Route::Patients => has_any_permission(role, &["patients.view", "patients.create"]),
            Route::Doctors => has_any_permission(role, &["doctors.view", "doctors.create"]),
            Route::Appointments => {
                has_any_permission(role, &["appointments.view", "appointments.create"])
            }
            Route::Billing => has_any_permission(role, &["billing.view", "billing.create"]),
            Route::Prescriptions => {
                has_any_permission(role, &["prescriptions.view", "prescriptions.create"])
            }
            Route::Inventory => has_any_permission(role, &["inventory.view", "inventory.create"]),
            Route::Reports => has_any_permission(role, &["reports.view", "reports.create"]),
            Route::Departments => has_permission(role, "departments.view"),
            Route::Settings => has_permission(role, "settings.view"),
            Route::Admin => has_permission(role, ADMIN_FULL_ACCESS),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes the role may open, in navigation order.
pub fn accessible_routes(role: impl Into<Option<Role>>) -> Vec<Route> {
    let role = role.into();
    Route::ALL
        .into_iter()
        .filter(|route| route.is_accessible(role))
        .collect()
}

/// Permission groups as shown on the role management screen.
const PERMISSION_GROUPS: &[(&str, &[&str])] = &[
    (
        "User Management",
        &["users.view", "users.create", "users.edit", "users.delete"],
    ),
    (
        "Patient Management",
        &[
            "patients.view",
            "patients.create",
            "patients.edit",
            "patients.delete",
        ],
    ),
    (
        "Appointments",
        &[
            "appointments.view",
            "appointments.create",
            "appointments.edit",
            "appointments.delete",
        ],
    ),
    (
        "Billing",
        &[
            "billing.view",
            "billing.create",
            "billing.edit",
            "billing.delete",
        ],
    ),
    (
        "Prescriptions",
        &[
            "prescriptions.view",
            "prescriptions.create",
            "prescriptions.edit",
            "prescriptions.delete",
        ],
    ),
    (
        "Inventory",
        &[
            "inventory.view",
            "inventory.create",
            "inventory.edit",
            "inventory.delete",
        ],
    ),
    ("Reports", &["reports.view", "reports.create", "reports.export"]),
    ("System", &["settings.view", "settings.edit", "system.manage"]),
];

pub fn permission_groups() -> &'static [(&'static str, &'static [&'static str])] {
    PERMISSION_GROUPS
}

/// `"patients.view"` becomes `"View Patients"`. Strings without a dot are capitalised as-is.
pub fn format_permission_name(permission: &str) -> String {
    fn capitalise(word: &str) -> String {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    match permission.split_once('.') {
        Some((resource, action)) => format!("{} {}", capitalise(action), capitalise(resource)),
        None => capitalise(permission),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_wildcard_grants_anything() {
        assert!(has_permission(Role::Admin, "anything.at_all"));
        assert!(has_permission(Role::Admin, "patients.delete"));
    }

    #[test]
    fn test_patient_lacks_full_access() {
        assert!(!has_permission(Role::Patient, ADMIN_FULL_ACCESS));
        assert!(has_permission(Role::Patient, "prescriptions.view"));
        assert!(!has_permission(Role::Patient, "prescriptions.edit"));
    }

    #[test]
    fn test_unknown_role_is_denied_everything() {
        assert!(role_permissions(None::<Role>).is_empty());
        assert!(!has_permission(None::<Role>, "settings.view"));
        assert!(!has_any_permission(None::<Role>, &["patients.view", "billing.view"]));
    }

    #[test]
    fn test_any_and_all_fold_semantics() {
        assert!(has_any_permission(
            Role::Pharmacist,
            &["users.delete", "inventory.edit"]
        ));
        assert!(!has_all_permissions(
            Role::Pharmacist,
            &["users.delete", "inventory.edit"]
        ));
        assert!(has_all_permissions(
            Role::Pharmacist,
            &["prescriptions.view", "prescriptions.edit"]
        ));
        assert!(has_all_permissions(Role::Nurse, &[]));
        assert!(!has_any_permission(Role::Nurse, &[]));
    }

    #[test]
    fn test_dashboard_is_always_accessible() {
        assert_eq!(accessible_routes(None::<Role>), vec![Route::Dashboard]);
        for role in Role::ALL {
            assert_eq!(accessible_routes(role).first(), Some(&Route::Dashboard));
        }
    }

    #[test]
    fn test_pharmacist_routes() {
        assert_eq!(
            accessible_routes(Role::Pharmacist),
            vec![
                Route::Dashboard,
                Route::Patients,
                Route::Billing,
                Route::Prescriptions,
                Route::Inventory,
                Route::Settings,
            ]
        );
    }

    #[test]
    fn test_admin_reaches_every_route() {
        assert_eq!(accessible_routes(Role::Admin), Route::ALL.to_vec());
    }

    #[test]
    fn test_can_access_resource_builds_permission() {
        assert!(can_access_resource(Role::Doctor, "prescriptions", "create"));
        assert!(!can_access_resource(Role::Nurse, "prescriptions", "create"));
    }

    #[test]
    fn test_can_access_own_resource() {
        assert!(can_access_own_resource(Role::Admin, "1", "2"));
        assert!(can_access_own_resource(Role::Patient, "7", "7"));
        assert!(!can_access_own_resource(Role::Patient, "7", "8"));
        assert!(can_access_own_resource(Role::Nurse, "7", "8"));
        assert!(!can_access_own_resource(None::<Role>, "7", "7"));
    }

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("pharmacist".parse::<Role>().unwrap(), Role::Pharmacist);
        assert_eq!(" ADMIN ".parse::<Role>().unwrap(), Role::Admin);
        assert!(matches!(
            "JANITOR".parse::<Role>(),
            Err(CoreError::UnknownRole(r)) if r == "JANITOR"
        ));
    }

    #[test]
    fn test_format_permission_name() {
        assert_eq!(format_permission_name("patients.view"), "View Patients");
        assert_eq!(format_permission_name("admin.full_access"), "Full_access Admin");
        assert_eq!(format_permission_name("system"), "System");
    }

    #[test]
    fn test_permission_groups_only_name_known_permissions() {
        for (_, perms) in permission_groups() {
            for p in perms.iter() {
                assert!(has_permission(Role::Admin, p));
                assert!(ADMIN_PERMISSIONS.contains(p), "{p} missing from admin table");
            }
        }
    }
}
