//! Navigation
//!
//! The kiosk screens, addressed by path so that nested children (for
//! example `/select-reader/2`) resolve to their parent screen.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Whether `path` is `base` or one of its children.
pub fn matches_base(base: &str, path: &str) -> bool {
    path.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// A kiosk screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Splash screen.
    Root,

    /// Operator PIN entry.
    Login,

    /// Card-reader choice after login.
    SelectReader,

    /// Idle screen between donors.
    Start,

    /// Donation category and account browsing.
    SelectAccounts,

    /// Cart review and card checkout.
    Cart,

    /// Member search and attribution.
    SelectMember,

    /// Member registration.
    AddMember,
}

impl Route {
    const ALL: [Self; 8] = [
        Self::Root,
        Self::Login,
        Self::SelectReader,
        Self::Start,
        Self::SelectAccounts,
        Self::Cart,
        Self::SelectMember,
        Self::AddMember,
    ];

    /// Canonical path.
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::SelectReader => "/select-reader",
            Self::Start => "/start",
            Self::SelectAccounts => "/select-accounts",
            Self::Cart => "/cart",
            Self::SelectMember => "/select-member",
            Self::AddMember => "/add-member",
        }
    }

    /// Resolve a path, including nested children, to its screen.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);

        if path.is_empty() || path == "/" {
            return Some(Self::Root);
        }

        Self::ALL
            .into_iter()
            .filter(|route| *route != Self::Root)
            .find(|route| matches_base(route.path(), path))
    }

    /// Screens that never time out.
    pub fn is_idle_exempt(self) -> bool {
        matches!(self, Self::Start | Self::Login)
    }

    /// Where an inactivity timeout sends the operator from this screen.
    ///
    /// Reader selection happens before a reader is chosen, so the session is
    /// sent back to login; every other screen returns to the start screen.
    pub fn idle_redirect(self) -> Self {
        if self == Self::SelectReader {
            Self::Login
        } else {
            Self::Start
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.path())
    }
}
