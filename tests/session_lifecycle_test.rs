//! Integration tests for session issuance, validation, eviction, and
//! termination.

mod common;

use common::TestHarness;
use taskhub_security::session::manager::{REASON_EXPIRED, REASON_LIMIT_EXCEEDED, REASON_LOGOUT};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_create_then_validate_round_trip() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();

    let session = h
        .sessions
        .create_session(user, TestHarness::unique_ip(), Some(common::BROWSER_UA))
        .await
        .unwrap();

    assert!(session.is_active);
    assert_eq!(session.token.len(), 43);
    assert_eq!(session.device_type, "Desktop");
    assert_eq!(session.browser, "Firefox");
    assert!(!session.suspicious);

    assert!(h.sessions.validate_session(&session.token).await.unwrap());

    // Validation slid the expiry forward.
    let renewed = h
        .sessions
        .find_by_token(&session.token)
        .await
        .unwrap()
        .unwrap();
    assert!(renewed.expires_at >= session.expires_at);

    // After the full timeout of inactivity the session is gone.
    h.expire_session(&session.token).await;
    assert!(!h.sessions.validate_session(&session.token).await.unwrap());

    let expired = h
        .sessions
        .find_by_token(&session.token)
        .await
        .unwrap()
        .unwrap();
    assert!(!expired.is_active);
    assert_eq!(expired.termination_reason.as_deref(), Some(REASON_EXPIRED));

    // A second validation is still false and changes nothing further.
    assert!(!h.sessions.validate_session(&session.token).await.unwrap());
    let again = h
        .sessions
        .find_by_token(&session.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.terminated_at, expired.terminated_at);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_sixth_session_evicts_least_recently_active() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let ip = TestHarness::unique_ip();

    let mut tokens = Vec::new();
    for _ in 0..5 {
        let s = h
            .sessions
            .create_session(user, ip, Some(common::BROWSER_UA))
            .await
            .unwrap();
        tokens.push(s.token);
    }

    // Pin strictly increasing activity; tokens[2] is the stalest.
    h.set_last_activity_minutes_ago(&tokens[2], 50).await;
    h.set_last_activity_minutes_ago(&tokens[0], 40).await;
    h.set_last_activity_minutes_ago(&tokens[1], 30).await;
    h.set_last_activity_minutes_ago(&tokens[3], 20).await;
    h.set_last_activity_minutes_ago(&tokens[4], 10).await;

    let sixth = h
        .sessions
        .create_session(user, ip, Some(common::BROWSER_UA))
        .await
        .unwrap();
    assert!(sixth.is_active);

    let active = h.sessions.active_sessions(Some(user)).await.unwrap();
    assert_eq!(active.len(), h.session_config.max_concurrent_sessions as usize);

    let evicted = h
        .sessions
        .find_by_token(&tokens[2])
        .await
        .unwrap()
        .unwrap();
    assert!(!evicted.is_active);
    assert_eq!(
        evicted.termination_reason.as_deref(),
        Some(REASON_LIMIT_EXCEEDED)
    );

    // Everyone else survived.
    for token in [&tokens[0], &tokens[1], &tokens[3], &tokens[4], &sixth.token] {
        let s = h.sessions.find_by_token(token).await.unwrap().unwrap();
        assert!(s.is_active, "session {token} should still be active");
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_terminate_session_is_idempotent() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();

    let session = h
        .sessions
        .create_session(user, TestHarness::unique_ip(), Some(common::BROWSER_UA))
        .await
        .unwrap();

    h.sessions
        .terminate_session(&session.token, REASON_LOGOUT)
        .await
        .unwrap();

    let terminated = h
        .sessions
        .find_by_token(&session.token)
        .await
        .unwrap()
        .unwrap();
    assert!(!terminated.is_active);
    assert_eq!(terminated.termination_reason.as_deref(), Some(REASON_LOGOUT));

    // Terminating again, or terminating garbage, is a quiet no-op.
    h.sessions
        .terminate_session(&session.token, "whatever")
        .await
        .unwrap();
    h.sessions
        .terminate_session("no-such-token", REASON_LOGOUT)
        .await
        .unwrap();

    let unchanged = h
        .sessions
        .find_by_token(&session.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.termination_reason.as_deref(), Some(REASON_LOGOUT));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_terminate_all_spares_the_excluded_token() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let ip = TestHarness::unique_ip();

    let keep = h
        .sessions
        .create_session(user, ip, Some(common::BROWSER_UA))
        .await
        .unwrap();
    for _ in 0..2 {
        h.sessions
            .create_session(user, ip, Some(common::BROWSER_UA))
            .await
            .unwrap();
    }

    let terminated = h
        .sessions
        .terminate_all_user_sessions(user, "Password changed", Some(&keep.token))
        .await
        .unwrap();
    assert_eq!(terminated, 2);

    let active = h.sessions.active_sessions(Some(user)).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].token, keep.token);

    let history = h.sessions.session_history(user).await.unwrap();
    assert_eq!(history.len(), 3);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_rapid_creation_flags_the_burst() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let ip = TestHarness::unique_ip();

    let first = h
        .sessions
        .create_session(user, ip, Some(common::BROWSER_UA))
        .await
        .unwrap();
    let second = h
        .sessions
        .create_session(user, ip, Some(common::BROWSER_UA))
        .await
        .unwrap();
    let third = h
        .sessions
        .create_session(user, ip, Some(common::BROWSER_UA))
        .await
        .unwrap();

    assert!(!first.suspicious);
    assert!(!second.suspicious);
    assert!(third.suspicious);
    assert!(third
        .suspicious_notes
        .as_deref()
        .unwrap_or_default()
        .contains("Rapid session creation"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_missing_user_agent_flags_the_session() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();

    let session = h
        .sessions
        .create_session(user, TestHarness::unique_ip(), None)
        .await
        .unwrap();

    assert!(session.suspicious);
    assert_eq!(session.device_type, "Unknown");
    assert!(session
        .suspicious_notes
        .as_deref()
        .unwrap_or_default()
        .contains("Unusual or missing user agent"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_manual_suspicious_flagging() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();

    let session = h
        .sessions
        .create_session(user, TestHarness::unique_ip(), Some(common::BROWSER_UA))
        .await
        .unwrap();

    assert!(!h
        .sessions
        .is_suspicious_session(&session.token)
        .await
        .unwrap());

    assert!(h
        .sessions
        .mark_session_suspicious(&session.token, "Reported by user")
        .await
        .unwrap());
    assert!(h
        .sessions
        .is_suspicious_session(&session.token)
        .await
        .unwrap());

    // Absent sessions are false, not errors.
    assert!(!h
        .sessions
        .is_suspicious_session("no-such-token")
        .await
        .unwrap());
    assert!(!h
        .sessions
        .mark_session_suspicious("no-such-token", "nope")
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_cleanup_sweeps_expired_sessions_only() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let ip = TestHarness::unique_ip();

    let stale = h
        .sessions
        .create_session(user, ip, Some(common::BROWSER_UA))
        .await
        .unwrap();
    let fresh = h
        .sessions
        .create_session(user, ip, Some(common::BROWSER_UA))
        .await
        .unwrap();

    h.expire_session(&stale.token).await;

    let cleaned = h.cleanup.run_cleanup().await.unwrap();
    assert!(cleaned >= 1);

    let stale = h.sessions.find_by_token(&stale.token).await.unwrap().unwrap();
    assert!(!stale.is_active);
    assert_eq!(
        stale.termination_reason.as_deref(),
        Some("Automatic cleanup")
    );

    let fresh = h.sessions.find_by_token(&fresh.token).await.unwrap().unwrap();
    assert!(fresh.is_active);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_security_summary_reflects_created_sessions() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();

    h.sessions
        .create_session(user, TestHarness::unique_ip(), None)
        .await
        .unwrap();

    let summary = h.sessions.security_summary(None).await.unwrap();
    assert!(summary.total_sessions >= 1);
    assert!(summary.suspicious_sessions >= 1);
    assert!(summary
        .device_breakdown
        .iter()
        .any(|d| d.device_type == "Unknown"));
}
