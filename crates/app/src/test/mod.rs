//! Test Fixtures

use std::sync::Arc;

use kiosk::ids::MemberId;

use crate::{
    backend::MockKioskBackend,
    session::{DefaultMembers, KioskSession},
};

mod helpers;

pub(crate) use helpers::*;

/// PIN stored by [`logged_in_session`].
pub(crate) const TEST_PIN: &str = "123456";

/// Token stored by [`logged_in_session`]; a refresh replaces it.
pub(crate) const STALE_TOKEN: &str = "stale";

/// Reader selected by [`checkout_session`].
pub(crate) const TEST_READER: &str = "front-desk";

/// Placeholder member selected by [`checkout_session`].
pub(crate) const DEFAULT_MEMBER: MemberId = MemberId::new(100);

/// Anonymous member selected by [`checkout_session`].
pub(crate) const ANONYMOUS_MEMBER: MemberId = MemberId::new(200);

/// A session that already holds a PIN and a token.
pub(crate) async fn logged_in_session(backend: MockKioskBackend) -> KioskSession {
    let session = KioskSession::new(Arc::new(backend));

    session.restore(TEST_PIN, STALE_TOKEN).await;

    session
}

/// A logged-in session with a reader and default members, ready to check out.
pub(crate) async fn checkout_session(backend: MockKioskBackend) -> Arc<KioskSession> {
    let session = logged_in_session(backend).await;

    session.select_reader(TEST_READER).await;
    session
        .set_default_members(DefaultMembers {
            default_member: DEFAULT_MEMBER,
            anonymous_member: ANONYMOUS_MEMBER,
        })
        .await;

    Arc::new(session)
}
