//! Structural comparison of JSON documents.
//!
//! Object key order never matters, array order always does. Numbers compare by value,
//! so an editor that rewrites `1` as `1.0` does not count as an edit.

use serde_json::{Number, Value};
use std::fmt;

/// One difference between two documents, addressed by JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(String),
    Removed(String),
    Modified(String),
}

impl Change {
    pub fn pointer(&self) -> &str {
        match self {
            Change::Added(p) | Change::Removed(p) | Change::Modified(p) => p,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self {
            Change::Added(_) => '+',
            Change::Removed(_) => '-',
            Change::Modified(_) => '~',
        };
        let pointer = if self.pointer().is_empty() {
            "/"
        } else {
            self.pointer()
        };
        write!(f, "{} {}", marker, pointer)
    }
}

/// Lists every change needed to turn `old` into `new`. Empty means equivalent.
pub fn diff(old: &Value, new: &Value) -> Vec<Change> {
    let mut changes = Vec::new();
    walk("", old, new, &mut changes);
    changes
}

fn walk(pointer: &str, old: &Value, new: &Value, changes: &mut Vec<Change>) {
    match (old, new) {
        (Value::Object(before), Value::Object(after)) => {
            for (key, value) in before {
                let child = child_pointer(pointer, key);
                match after.get(key) {
                    Some(other) => walk(&child, value, other, changes),
                    None => changes.push(Change::Removed(child)),
                }
            }
            for key in after.keys().filter(|key| !before.contains_key(*key)) {
                changes.push(Change::Added(child_pointer(pointer, key)));
            }
        }
        (Value::Array(before), Value::Array(after)) => {
            for index in 0..before.len().max(after.len()) {
                let child = child_pointer(pointer, &index.to_string());
                match (before.get(index), after.get(index)) {
                    (Some(a), Some(b)) => walk(&child, a, b, changes),
                    (Some(_), None) => changes.push(Change::Removed(child)),
                    (None, Some(_)) => changes.push(Change::Added(child)),
                    (None, None) => {}
                }
            }
        }
        (Value::Number(a), Value::Number(b)) => {
            if !same_number(a, b) {
                changes.push(Change::Modified(pointer.to_string()));
            }
        }
        _ => {
            if old != new {
                changes.push(Change::Modified(pointer.to_string()));
            }
        }
    }
}

fn same_number(a: &Number, b: &Number) -> bool {
    if a == b {
        return true;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn child_pointer(parent: &str, token: &str) -> String {
    format!("{}/{}", parent, token.replace('~', "~0").replace('/', "~1"))
}
