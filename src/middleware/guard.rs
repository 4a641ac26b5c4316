use crate::models::user::{Claims, Role};

pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::Superadmin];
pub const SUPERADMIN_ONLY: &[Role] = &[Role::Superadmin];

/// Navigation gate over a decoded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    Authenticated,
    Restricted(&'static [Role]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    RedirectToLogin,
    RedirectToUnauthorized,
}

impl RouteGuard {
    pub const ADMIN: RouteGuard = RouteGuard::Restricted(ADMIN_ROLES);
    pub const SUPERADMIN: RouteGuard = RouteGuard::Restricted(SUPERADMIN_ONLY);

    /// `session` is `None` when the token was missing, invalid or expired.
    pub fn check(&self, session: Option<&Claims>, now_unix: i64) -> GuardOutcome {
        let claims = match session {
            Some(claims) if claims.exp > now_unix => claims,
            _ => return GuardOutcome::RedirectToLogin,
        };

        match self {
            RouteGuard::Authenticated => GuardOutcome::Allow,
            RouteGuard::Restricted(roles) if roles.contains(&claims.role) => GuardOutcome::Allow,
            RouteGuard::Restricted(_) => GuardOutcome::RedirectToUnauthorized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, exp: i64) -> Claims {
        Claims {
            sub: "65f0c0ffee0000000000abcd".to_string(),
            email: "owner@example.com".to_string(),
            role,
            iat: exp - 3600,
            exp,
        }
    }

    #[test]
    fn test_missing_or_expired_session_goes_to_login() {
        for guard in [RouteGuard::Authenticated, RouteGuard::ADMIN, RouteGuard::SUPERADMIN] {
            assert_eq!(guard.check(None, 1_000), GuardOutcome::RedirectToLogin);
            assert_eq!(
                guard.check(Some(&claims(Role::Superadmin, 1_000)), 1_000),
                GuardOutcome::RedirectToLogin
            );
        }
    }

    #[test]
    fn test_role_requirements() {
        let admin = claims(Role::Admin, 2_000);
        let owner = claims(Role::Superadmin, 2_000);

        assert_eq!(RouteGuard::Authenticated.check(Some(&admin), 1_000), GuardOutcome::Allow);
        assert_eq!(RouteGuard::ADMIN.check(Some(&admin), 1_000), GuardOutcome::Allow);
        assert_eq!(RouteGuard::ADMIN.check(Some(&owner), 1_000), GuardOutcome::Allow);
        assert_eq!(
            RouteGuard::SUPERADMIN.check(Some(&admin), 1_000),
            GuardOutcome::RedirectToUnauthorized
        );
        assert_eq!(RouteGuard::SUPERADMIN.check(Some(&owner), 1_000), GuardOutcome::Allow);
    }
}
