//! Session identity resolution from ambient page state.
//!
//! The platform exposes the current user's secUid in several places in the
//! page's global state, depending on app version and hydration timing. The
//! resolver probes a fixed ordered list of locations and returns the first
//! non-empty hit; earlier locations are fresher and win.

use crate::error::ClientError;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use unrepost_core::SecUid;

/// Read-only source of the ambient page-state snapshot.
///
/// The state may still be hydrating when the first resolution attempt runs,
/// so retries take a fresh snapshot each time.
pub trait PageStateSource: Send + Sync {
    /// Take a snapshot of the page's global state.
    fn snapshot(&self) -> Value;
}

/// A fixed snapshot; for contexts where the state cannot change.
struct StaticSnapshot(Value);

impl PageStateSource for StaticSnapshot {
    fn snapshot(&self) -> Value {
        self.0.clone()
    }
}

/// One strategy for extracting an identity string from page state.
pub trait IdentityProbe: Send + Sync {
    /// Name of the probed location, for diagnostics.
    fn name(&self) -> &'static str;

    /// Attempt to read a secUid; `None` when this location has nothing.
    fn probe(&self, state: &Value) -> Option<String>;
}

/// Reads a string at a JSON pointer path.
fn string_at<'a>(state: &'a Value, pointer: &str) -> Option<&'a str> {
    state
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// The hydration payload of current app versions.
struct UniversalDataProbe;

impl IdentityProbe for UniversalDataProbe {
    fn name(&self) -> &'static str {
        "universal-data"
    }

    fn probe(&self, state: &Value) -> Option<String> {
        string_at(
            state,
            "/__$UNIVERSAL_DATA__/__DEFAULT_SCOPE__/webapp.app-context/user/secUid",
        )
        .map(str::to_string)
    }
}

/// The SIGI app context of older app versions.
struct AppContextProbe;

impl IdentityProbe for AppContextProbe {
    fn name(&self) -> &'static str {
        "sigi-app-context"
    }

    fn probe(&self, state: &Value) -> Option<String> {
        string_at(state, "/SIGI_STATE/AppContext/user/secUid").map(str::to_string)
    }
}

/// The SIGI user module, keyed by the uid found in the app context.
struct UserModuleProbe;

impl IdentityProbe for UserModuleProbe {
    fn name(&self) -> &'static str {
        "sigi-user-module"
    }

    fn probe(&self, state: &Value) -> Option<String> {
        let uid = string_at(state, "/SIGI_STATE/AppContext/user/uid")?;
        string_at(state, &format!("/SIGI_STATE/UserModule/users/{uid}/secUid"))
            .map(str::to_string)
    }
}

/// Legacy app data global.
struct LegacyAppDataProbe;

impl IdentityProbe for LegacyAppDataProbe {
    fn name(&self) -> &'static str {
        "legacy-app-data"
    }

    fn probe(&self, state: &Value) -> Option<String> {
        string_at(state, "/__TikTokAppData/user/secUid").map(str::to_string)
    }
}

/// Resolves the session identity by probing ambient page state.
pub struct IdentityResolver {
    source: Arc<dyn PageStateSource>,
    probes: Vec<Box<dyn IdentityProbe>>,
}

impl IdentityResolver {
    /// Create a resolver over a live page-state source with the default
    /// probe order.
    #[must_use]
    pub fn new(source: Arc<dyn PageStateSource>) -> Self {
        Self {
            source,
            probes: Self::default_probes(),
        }
    }

    /// Create a resolver over a fixed snapshot.
    #[must_use]
    pub fn from_snapshot(state: Value) -> Self {
        Self::new(Arc::new(StaticSnapshot(state)))
    }

    /// Create a resolver with a custom probe list. Order matters: earlier
    /// probes are more authoritative.
    #[must_use]
    pub fn with_probes(source: Arc<dyn PageStateSource>, probes: Vec<Box<dyn IdentityProbe>>) -> Self {
        Self { source, probes }
    }

    fn default_probes() -> Vec<Box<dyn IdentityProbe>> {
        vec![
            Box::new(UniversalDataProbe),
            Box::new(AppContextProbe),
            Box::new(UserModuleProbe),
            Box::new(LegacyAppDataProbe),
        ]
    }

    /// Resolve the session identity.
    ///
    /// Probes each location in order and returns the first non-empty match.
    /// Read-only; no side effects.
    ///
    /// # Errors
    /// [`ClientError::IdentityNotFound`] when no location yields a usable
    /// value.
    pub fn resolve(&self) -> Result<SecUid, ClientError> {
        let state = self.source.snapshot();

        for probe in &self.probes {
            if let Some(candidate) = probe.probe(&state) {
                match SecUid::new(&candidate) {
                    Ok(sec_uid) => {
                        tracing::debug!(location = probe.name(), "resolved secUid");
                        return Ok(sec_uid);
                    }
                    Err(e) => {
                        tracing::warn!(
                            location = probe.name(),
                            error = %e,
                            "ignoring malformed secUid candidate"
                        );
                    }
                }
            }
        }

        Err(ClientError::IdentityNotFound(
            "no page-state location yielded a secUid; ensure you are logged in or reload"
                .to_string(),
        ))
    }

    /// Resolve with bounded retry for the page-still-loading case.
    ///
    /// Takes a fresh snapshot per attempt, waiting `wait` between attempts.
    /// Returns the last [`ClientError::IdentityNotFound`] once `attempts`
    /// are exhausted.
    pub async fn resolve_with_retry(
        &self,
        attempts: u32,
        wait: Duration,
    ) -> Result<SecUid, ClientError> {
        let attempts = attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.resolve() {
                Ok(sec_uid) => return Ok(sec_uid),
                Err(e) => {
                    if attempt < attempts {
                        tracing::debug!(
                            attempt,
                            attempts,
                            "identity not available yet, retrying in {:?}",
                            wait
                        );
                        tokio::time::sleep(wait).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.expect("last_error must be set after the attempt loop"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UID: &str = "MS4wLjABAAAA_universal";
    const SIGI_UID: &str = "MS4wLjABAAAA_appcontext";
    const MODULE_UID: &str = "MS4wLjABAAAA_usermodule";
    const LEGACY_UID: &str = "MS4wLjABAAAA_legacy";

    fn full_state() -> Value {
        json!({
            "__$UNIVERSAL_DATA__": {
                "__DEFAULT_SCOPE__": {
                    "webapp.app-context": {"user": {"secUid": UID}}
                }
            },
            "SIGI_STATE": {
                "AppContext": {"user": {"secUid": SIGI_UID, "uid": "42"}},
                "UserModule": {"users": {"42": {"secUid": MODULE_UID}}}
            },
            "__TikTokAppData": {"user": {"secUid": LEGACY_UID}}
        })
    }

    #[test]
    fn test_probe_priority_order() {
        let resolver = IdentityResolver::from_snapshot(full_state());
        let sec_uid = resolver.resolve().expect("resolve identity");
        assert_eq!(sec_uid.as_str(), UID);
    }

    #[test]
    fn test_falls_through_to_app_context() {
        let mut state = full_state();
        state
            .as_object_mut()
            .expect("object state")
            .remove("__$UNIVERSAL_DATA__");

        let resolver = IdentityResolver::from_snapshot(state);
        assert_eq!(resolver.resolve().expect("resolve").as_str(), SIGI_UID);
    }

    #[test]
    fn test_user_module_lookup_via_uid() {
        let state = json!({
            "SIGI_STATE": {
                "AppContext": {"user": {"uid": "42"}},
                "UserModule": {"users": {"42": {"secUid": MODULE_UID}}}
            }
        });

        let resolver = IdentityResolver::from_snapshot(state);
        assert_eq!(resolver.resolve().expect("resolve").as_str(), MODULE_UID);
    }

    #[test]
    fn test_legacy_location_is_last() {
        let state = json!({
            "__TikTokAppData": {"user": {"secUid": LEGACY_UID}}
        });

        let resolver = IdentityResolver::from_snapshot(state);
        assert_eq!(resolver.resolve().expect("resolve").as_str(), LEGACY_UID);
    }

    #[test]
    fn test_empty_state_not_found() {
        let resolver = IdentityResolver::from_snapshot(json!({}));
        assert!(matches!(
            resolver.resolve(),
            Err(ClientError::IdentityNotFound(_))
        ));
    }

    #[test]
    fn test_empty_string_is_not_a_match() {
        let state = json!({
            "SIGI_STATE": {"AppContext": {"user": {"secUid": ""}}},
            "__TikTokAppData": {"user": {"secUid": LEGACY_UID}}
        });

        let resolver = IdentityResolver::from_snapshot(state);
        assert_eq!(resolver.resolve().expect("resolve").as_str(), LEGACY_UID);
    }

    #[test]
    fn test_malformed_candidate_skipped() {
        let state = json!({
            "SIGI_STATE": {"AppContext": {"user": {"secUid": "bad id!"}}},
            "__TikTokAppData": {"user": {"secUid": LEGACY_UID}}
        });

        let resolver = IdentityResolver::from_snapshot(state);
        assert_eq!(resolver.resolve().expect("resolve").as_str(), LEGACY_UID);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_sees_late_state() {
        use std::sync::Mutex;

        struct LateState {
            calls: Mutex<u32>,
        }

        impl PageStateSource for LateState {
            fn snapshot(&self) -> Value {
                let mut calls = self.calls.lock().expect("lock calls");
                *calls += 1;
                if *calls < 3 {
                    json!({})
                } else {
                    json!({"__TikTokAppData": {"user": {"secUid": LEGACY_UID}}})
                }
            }
        }

        let source = Arc::new(LateState {
            calls: Mutex::new(0),
        });
        let resolver = IdentityResolver::new(source.clone());

        let start = tokio::time::Instant::now();
        let sec_uid = resolver
            .resolve_with_retry(3, Duration::from_millis(2755))
            .await
            .expect("resolve on third attempt");

        assert_eq!(sec_uid.as_str(), LEGACY_UID);
        assert_eq!(*source.calls.lock().expect("lock calls"), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(5510));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion() {
        let resolver = IdentityResolver::from_snapshot(json!({}));
        let result = resolver
            .resolve_with_retry(3, Duration::from_millis(100))
            .await;
        assert!(matches!(result, Err(ClientError::IdentityNotFound(_))));
    }
}
