//! Session and routing constants

use crate::session::Role;

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// Cookie holding the durable session record
    pub const SESSION_COOKIE: &'static str = "session";

    /// Lifetime of the session cookie in days
    pub const SESSION_COOKIE_DAYS: i64 = 7;

    /// Where a terminated session is sent
    pub const SIGN_IN_ROUTE: &'static str = "/anonymous/signin";

    /// Where the route guard sends a mismatched or anonymous visitor
    pub const SIGN_UP_ROUTE: &'static str = "/anonymous/signup";

    /// Application root, target of sign-out
    pub const ROOT_ROUTE: &'static str = "/";

    /// Protected route namespaces and the role each one requires
    pub const PROTECTED_NAMESPACES: [(&'static str, Role); 3] = [
        ("/jobseeker", Role::Jobseeker),
        ("/employer", Role::Employer),
        ("/admin", Role::Admin),
    ];
}
