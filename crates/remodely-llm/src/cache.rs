//! Short-TTL response cache
//!
//! Memoizes recent chat responses to absorb duplicate rapid-fire
//! requests (UI double-submits). The key is a fingerprint of the
//! conversation tail plus the routing parameters; the TTL is
//! deliberately short because chat replies must not be served stale.

use crate::chat::{ChatResponse, Message, MessageRole};
use crate::routing::RouteStrategy;
use crate::util::truncate_safe;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Characters of the last system message included in the fingerprint.
///
/// Together with [`USER_KEY_CHARS`] this bounds the key material:
/// larger bounds lower the collision risk across long conversations,
/// smaller bounds raise the hit rate when prompts share a long common
/// prefix.
pub const SYSTEM_KEY_CHARS: usize = 120;

/// Characters of the last user message included in the fingerprint
pub const USER_KEY_CHARS: usize = 400;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Build the cache key for a conversation tail plus routing parameters
///
/// Only the last system and last user message participate — earlier
/// turns change the answer far less than the tail does, and hashing
/// the whole history would make hits vanishingly rare.
#[must_use]
pub fn fingerprint(
    messages: &[Message],
    strategy: RouteStrategy,
    provider: Option<&str>,
    temperature: Option<f32>,
) -> String {
    let last_system = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::System)
        .map(|m| truncate_safe(&m.content, SYSTEM_KEY_CHARS))
        .unwrap_or_default();
    let last_user = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| truncate_safe(&m.content, USER_KEY_CHARS))
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(last_system.as_bytes());
    hasher.update([0x1f]);
    hasher.update(last_user.as_bytes());
    hasher.update([0x1f]);
    hasher.update(format!("{strategy:?}").as_bytes());
    hasher.update([0x1f]);
    hasher.update(provider.unwrap_or("").as_bytes());
    hasher.update([0x1f]);
    if let Some(t) = temperature {
        hasher.update(t.to_le_bytes());
    }

    format!("{:x}", hasher.finalize())
}

struct CacheEntry {
    response: ChatResponse,
    expires: Instant,
}

/// In-process response cache with last-writer-wins semantics
///
/// Shared across concurrent requests; entries are idempotent
/// recomputations, so a plain mutex-guarded map is sufficient. Expired
/// entries are pruned on lookup — no background sweeper at this scale.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    /// Create a cache with the given entry lifetime
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a fresh entry
    ///
    /// On hit, returns a copy with `cache_hit` stamped; the stored
    /// entry is never mutated. An expired entry is removed and treated
    /// as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ChatResponse> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");

        match entries.get(key) {
            Some(entry) if entry.expires > Instant::now() => {
                let mut response = entry.response.clone();
                response.cache_hit = true;
                Some(response)
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a copy of the response under the key, replacing any
    /// previous entry
    pub fn set(&self, key: impl Into<String>, response: &ChatResponse) {
        let mut stored = response.clone();
        stored.cache_hit = false;

        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key.into(),
            CacheEntry {
                response: stored,
                expires: Instant::now() + self.ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Vec<Message> {
        vec![
            Message::system("You are a cost estimator"),
            Message::user("Estimate a kitchen remodel"),
        ]
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let messages = conversation();
        let a = fingerprint(&messages, RouteStrategy::Cost, None, Some(0.3));
        let b = fingerprint(&messages, RouteStrategy::Cost, None, Some(0.3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_varies_with_routing_params() {
        let messages = conversation();
        let base = fingerprint(&messages, RouteStrategy::Cost, None, None);

        assert_ne!(
            base,
            fingerprint(&messages, RouteStrategy::Quality, None, None)
        );
        assert_ne!(
            base,
            fingerprint(&messages, RouteStrategy::Cost, Some("openai"), None)
        );
        assert_ne!(
            base,
            fingerprint(&messages, RouteStrategy::Cost, None, Some(0.9))
        );
    }

    #[test]
    fn test_fingerprint_varies_with_last_user_message() {
        let a = fingerprint(
            &[Message::user("kitchen")],
            RouteStrategy::Balanced,
            None,
            None,
        );
        let b = fingerprint(
            &[Message::user("bathroom")],
            RouteStrategy::Balanced,
            None,
            None,
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_text_beyond_truncation_bound() {
        // Two user messages identical in the first USER_KEY_CHARS
        // chars collide by design: the bound trades collision risk for
        // hit rate.
        let shared: String = "x".repeat(USER_KEY_CHARS);
        let a = fingerprint(
            &[Message::user(format!("{shared}-tail-one"))],
            RouteStrategy::Balanced,
            None,
            None,
        );
        let b = fingerprint(
            &[Message::user(format!("{shared}-tail-two"))],
            RouteStrategy::Balanced,
            None,
            None,
        );
        assert_eq!(a, b);

        // But text inside the bound still differentiates keys
        let c = fingerprint(
            &[Message::user(format!("y{shared}"))],
            RouteStrategy::Balanced,
            None,
            None,
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_fingerprint_uses_last_of_each_role() {
        let long_conversation = vec![
            Message::system("old system"),
            Message::user("old question"),
            Message::assistant("old answer"),
            Message::system("new system"),
            Message::user("new question"),
        ];
        let tail_only = vec![
            Message::system("new system"),
            Message::user("new question"),
        ];
        assert_eq!(
            fingerprint(&long_conversation, RouteStrategy::Cost, None, None),
            fingerprint(&tail_only, RouteStrategy::Cost, None, None)
        );
    }

    #[test]
    fn test_get_miss() {
        let cache = ResponseCache::default();
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_hit_stamps_copy_not_stored_entry() {
        let cache = ResponseCache::default();
        let response = ChatResponse::new("hello", "test-model");
        cache.set("k", &response);

        let first = cache.get("k").unwrap();
        assert!(first.cache_hit);
        assert_eq!(first.reply, "hello");

        // Stored entry was not mutated by the first hit
        let second = cache.get("k").unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.reply, "hello");
    }

    #[test]
    fn test_set_clears_stale_hit_flag() {
        let cache = ResponseCache::default();
        let mut response = ChatResponse::new("hello", "test-model");
        response.cache_hit = true;
        cache.set("k", &response);

        // The stored copy must not claim a hit it didn't have
        let got = cache.get("k").unwrap();
        assert!(got.cache_hit); // stamped by get, not carried from set
    }

    #[test]
    fn test_expired_entry_treated_as_absent() {
        let cache = ResponseCache::new(Duration::from_millis(10));
        cache.set("k", &ChatResponse::new("hello", "m"));

        std::thread::sleep(Duration::from_millis(25));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = ResponseCache::default();
        cache.set("k", &ChatResponse::new("first", "m"));
        cache.set("k", &ChatResponse::new("second", "m"));

        assert_eq!(cache.get("k").unwrap().reply, "second");
    }
}
