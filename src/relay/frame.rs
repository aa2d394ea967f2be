//! Helpers for assembling outgoing request frames (component B/D boundary).

use ed25519_dalek::SigningKey;
use rand::RngCore;
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::signing::attach_signature;

/// Builds `{type, ...fields, timestamp, nonce}` and, if `sign` is set,
/// attaches a `signature` computed over the object.
pub fn build(frame_type: &str, fields: Vec<(&str, Value)>, key: Option<&SigningKey>) -> Value {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(frame_type.to_string()));
    for (k, v) in fields {
        map.insert(k.to_string(), v);
    }

    if let Some(key) = key {
        map.insert("timestamp".to_string(), Value::from(now_millis()));
        map.insert("nonce".to_string(), Value::String(random_nonce()));
        attach_signature(key, &mut map);
    }

    Value::Object(map)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the Unix epoch")
        .as_millis() as i64
}

fn random_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bs58::encode(bytes).into_string()
}
