//! Recorded calls.
//!
//! Every call into a mock becomes an [`Invocation`] in that mock's
//! [`InvocationLog`], grouped by method and kept in call order.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::scope::Receiver;
use crate::value::Value;

// Shared by every mock so that calls can be ordered across mocks.
static SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::SeqCst)
}

/// A record of a single call.
#[derive(Debug, Clone)]
pub struct Invocation {
    method: String,
    args: Vec<Value>,
    receiver: Receiver,
    sequence: u64,
}

impl Invocation {
    /// The method that was called.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The arguments exactly as passed, `Undefined` entries included.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The receiver the call was made against.
    #[must_use]
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Process-wide call order. Strictly increasing.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Render as `label.method(args)` using argument literals.
    #[must_use]
    pub fn render(&self, label: &str) -> String {
        let args: Vec<_> = self.args.iter().map(|a| a.literal().to_string()).collect();
        let mut out = format!("{label}.{}({})", self.method, args.join(", "));
        if let Receiver::Value(value) = &self.receiver {
            out.push_str(&format!(", 'this' being {value}"));
        }
        out
    }
}

/// Per-mock call history.
#[derive(Debug, Default)]
pub(crate) struct InvocationLog {
    by_method: HashMap<String, Vec<Invocation>>,
    verified: HashSet<u64>,
}

impl InvocationLog {
    /// Append a call and return its sequence number.
    pub(crate) fn record(&mut self, method: &str, args: Vec<Value>, receiver: Receiver) -> u64 {
        let sequence = next_sequence();
        self.by_method
            .entry(method.to_string())
            .or_default()
            .push(Invocation {
                method: method.to_string(),
                args,
                receiver,
                sequence,
            });
        sequence
    }

    pub(crate) fn for_method(&self, method: &str) -> &[Invocation] {
        self.by_method
            .get(method)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every call across all methods, in call order.
    pub(crate) fn all(&self) -> Vec<Invocation> {
        let mut all: Vec<_> = self.by_method.values().flatten().cloned().collect();
        all.sort_by_key(Invocation::sequence);
        all
    }

    pub(crate) fn mark_verified(&mut self, sequences: impl IntoIterator<Item = u64>) {
        self.verified.extend(sequences);
    }

    /// Calls no successful verification has accounted for, in call order.
    pub(crate) fn unverified(&self) -> Vec<Invocation> {
        let mut pending = self.all();
        pending.retain(|inv| !self.verified.contains(&inv.sequence));
        pending
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.by_method.values().map(Vec::len).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.by_method.clear();
        self.verified.clear();
    }
}
