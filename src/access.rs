//! Access gate: what a visitor may see, derived from the session on every read.
//!
//! Nothing here is stored. Callers pass the current [`SessionState`] and get
//! a decision back, so an admin-side status change shows up as soon as the
//! session is re-checked.

use crate::models::{Identity, MemberStatus};
use crate::stores::SessionState;

/// Content-visibility state of the member slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessState {
    Anonymous,
    Pending,
    Approved,
    Blocked,
}

impl AccessState {
    /// Pure mapping of an optional identity to one of the four states.
    pub fn of(identity: Option<&Identity>) -> Self {
        match identity {
            None => AccessState::Anonymous,
            Some(identity) => Self::from_status(identity.status),
        }
    }

    pub fn from_status(status: MemberStatus) -> Self {
        match status {
            MemberStatus::Pending => AccessState::Pending,
            MemberStatus::Approved => AccessState::Approved,
            MemberStatus::Blocked => AccessState::Blocked,
        }
    }
}

/// Gate outcome, distinguishing "not checked yet" from "checked, anonymous".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Loading,
    Ready(AccessState),
}

impl Gate {
    pub fn evaluate(session: &SessionState) -> Self {
        if !session.member_checked() {
            return Gate::Loading;
        }
        Gate::Ready(AccessState::of(session.member.as_ref()))
    }
}

/// What a click on a listing card does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingClick {
    /// Session still resolving: do nothing visible yet
    Wait,
    OpenRegistration,
    ShowAwaitingApproval,
    ShowBlocked,
    OpenDetail,
}

impl ListingClick {
    pub fn decide(gate: Gate) -> Self {
        match gate {
            Gate::Loading => ListingClick::Wait,
            Gate::Ready(AccessState::Anonymous) => ListingClick::OpenRegistration,
            Gate::Ready(AccessState::Pending) => ListingClick::ShowAwaitingApproval,
            Gate::Ready(AccessState::Blocked) => ListingClick::ShowBlocked,
            Gate::Ready(AccessState::Approved) => ListingClick::OpenDetail,
        }
    }

    pub fn reveals_content(&self) -> bool {
        matches!(self, ListingClick::OpenDetail)
    }
}

/// Routed pages of the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Portfolio,
    Rentals,
    Leisure,
    MemberPanel,
    Admin(String),
    Legal(String),
    NotFound(String),
}

impl Route {
    pub const MEMBER_PANEL_PATH: &'static str = "/member-panel";

    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/portfolio" => Route::Portfolio,
            "/rentals" => Route::Rentals,
            "/leisure" => Route::Leisure,
            Self::MEMBER_PANEL_PATH => Route::MemberPanel,
            "/admin" => Route::Admin(String::new()),
            other => {
                if let Some(rest) = other.strip_prefix("/admin/") {
                    Route::Admin(rest.to_string())
                } else if let Some(doc) = other.strip_prefix("/legal/") {
                    Route::Legal(doc.to_string())
                } else {
                    Route::NotFound(other.to_string())
                }
            }
        }
    }

    pub fn is_member_panel(&self) -> bool {
        matches!(self, Route::MemberPanel)
    }
}

/// What the application root renders for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Blocked,
    /// Admin area requested without an admin session
    AdminLogin,
    Page(Route),
}

/// Resolve the screen for `path`. The Blocked check runs before route matching
/// and overrides every path, the admin area included.
pub fn resolve_screen(session: &SessionState, path: &str) -> Screen {
    match Gate::evaluate(session) {
        Gate::Loading => return Screen::Loading,
        Gate::Ready(AccessState::Blocked) => return Screen::Blocked,
        Gate::Ready(_) => {}
    }

    let route = Route::from_path(path);
    if let Route::Admin(_) = route {
        if !session.admin_checked() {
            return Screen::Loading;
        }
        if !can_use_admin(session) {
            return Screen::AdminLogin;
        }
    }
    Screen::Page(route)
}

/// Admin surface access is decided by the role in the admin slot only.
pub fn can_use_admin(session: &SessionState) -> bool {
    session
        .admin
        .as_ref()
        .map(Identity::is_staff)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::stores::CheckState;

    fn identity(role: Role, status: MemberStatus) -> Identity {
        Identity {
            id: 1,
            email: "member@example.com".to_string(),
            full_name: "Member".to_string(),
            phone: String::new(),
            role,
            status,
            purpose: None,
            created_at: None,
        }
    }

    fn session(member: Option<Identity>) -> SessionState {
        SessionState {
            member,
            admin: None,
            member_check: CheckState::Checked,
            admin_check: CheckState::Checked,
            ..SessionState::default()
        }
    }

    #[test]
    fn test_gate_is_total_over_status() {
        assert_eq!(AccessState::of(None), AccessState::Anonymous);
        for (status, expected) in [
            (MemberStatus::Pending, AccessState::Pending),
            (MemberStatus::Approved, AccessState::Approved),
            (MemberStatus::Blocked, AccessState::Blocked),
        ] {
            let id = identity(Role::User, status);
            assert_eq!(AccessState::of(Some(&id)), expected);
            assert_eq!(AccessState::of(Some(&id)), AccessState::of(Some(&id)));
        }
    }

    #[test]
    fn test_unchecked_session_is_loading_not_anonymous() {
        let state = SessionState::default();
        assert_eq!(Gate::evaluate(&state), Gate::Loading);
        assert_eq!(ListingClick::decide(Gate::evaluate(&state)), ListingClick::Wait);
        assert_eq!(resolve_screen(&state, "/"), Screen::Loading);
    }

    #[test]
    fn test_click_decision_table() {
        let anonymous = session(None);
        assert_eq!(
            ListingClick::decide(Gate::evaluate(&anonymous)),
            ListingClick::OpenRegistration
        );

        let pending = session(Some(identity(Role::User, MemberStatus::Pending)));
        assert_eq!(
            ListingClick::decide(Gate::evaluate(&pending)),
            ListingClick::ShowAwaitingApproval
        );

        let approved = session(Some(identity(Role::User, MemberStatus::Approved)));
        let click = ListingClick::decide(Gate::evaluate(&approved));
        assert_eq!(click, ListingClick::OpenDetail);
        assert!(click.reveals_content());
    }

    #[test]
    fn test_blocked_overrides_every_route() {
        let mut blocked = session(Some(identity(Role::User, MemberStatus::Blocked)));
        blocked.admin = Some(identity(Role::Admin, MemberStatus::Approved));

        for path in ["/", "/member-panel", "/admin", "/admin/categories", "/nowhere"] {
            assert_eq!(resolve_screen(&blocked, path), Screen::Blocked, "path {}", path);
        }
    }

    #[test]
    fn test_admin_area_requires_admin_slot() {
        let mut state = session(Some(identity(Role::Admin, MemberStatus::Approved)));
        assert_eq!(resolve_screen(&state, "/admin"), Screen::AdminLogin);

        state.admin = Some(identity(Role::Admin, MemberStatus::Approved));
        assert_eq!(
            resolve_screen(&state, "/admin/listings"),
            Screen::Page(Route::Admin("listings".to_string()))
        );
        assert_eq!(
            resolve_screen(&state, "/member-panel/"),
            Screen::Page(Route::MemberPanel)
        );
    }

    #[test]
    fn test_route_parsing() {
        assert_eq!(Route::from_path("/?tab=1"), Route::Home);
        assert_eq!(Route::from_path("/legal/terms"), Route::Legal("terms".to_string()));
        assert_eq!(Route::from_path("/x"), Route::NotFound("/x".to_string()));
        assert!(Route::from_path("/member-panel").is_member_panel());
    }
}
