//! Per-session conversation identifier
//!
//! The endpoint correlates turns through an opaque id that is created once
//! per session and sent with every request.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Storage key under which the identifier is kept for the session
pub const CONVERSATION_ID_KEY: &str = "supportfy_conversation_id";

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Key/value storage that lives exactly as long as one session
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Session storage held in memory, dropped together with the session
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Return the session's conversation id, creating and storing one on first use.
pub fn conversation_id(store: &mut impl SessionStore) -> String {
    if let Some(existing) = store.get(CONVERSATION_ID_KEY) {
        return existing;
    }

    let id = generate_conversation_id();
    log::debug!("Started conversation {}", id);
    store.set(CONVERSATION_ID_KEY, id.clone());
    id
}

/// `conv_<unix millis>_<9 random base36 chars>`. Not cryptographic.
pub fn generate_conversation_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("conv_{}_{}", millis, suffix)
}
