//! Collection paths in the hosted document database.
//!
//! These names are the contract with the backend rules and serverless
//! functions; do not rename them.

pub const RATE_LIMITS: &str = "rate_limits";
pub const AB_TESTS: &str = "ai_ab_tests";
pub const CONVERSATIONS: &str = "conversations";
pub const VOICE_PROFILES: &str = "voice_profiles";

pub fn ai_cache_collection(uid: &str) -> String {
    format!("users/{}/ai_cache", uid)
}

pub fn ai_cache(uid: &str, key: &str) -> String {
    format!("users/{}/ai_cache/{}", uid, key)
}

pub fn rate_limit(window_key: &str) -> String {
    format!("{}/{}", RATE_LIMITS, window_key)
}

pub fn metrics_collection(uid: &str) -> String {
    format!("users/{}/ai_performance_metrics", uid)
}

pub fn metric(uid: &str, id: &str) -> String {
    format!("users/{}/ai_performance_metrics/{}", uid, id)
}

pub fn ab_test(test_id: &str) -> String {
    format!("{}/{}", AB_TESTS, test_id)
}

pub fn conversation(conversation_id: &str) -> String {
    format!("{}/{}", CONVERSATIONS, conversation_id)
}

pub fn messages_collection(conversation_id: &str) -> String {
    format!("{}/{}/messages", CONVERSATIONS, conversation_id)
}

pub fn message(conversation_id: &str, message_id: &str) -> String {
    format!("{}/{}/messages/{}", CONVERSATIONS, conversation_id, message_id)
}

pub fn voice_profile(uid: &str) -> String {
    format!("{}/{}", VOICE_PROFILES, uid)
}
