// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

/// Predicate evaluated by a validation check.
///
/// Arguments arrive positionally in the order the check's ports were listed.
/// Only `Value::Bool(true)` counts as a pass; any other result, boolean or
/// not, is treated as a failure by the caller.
pub trait Predicate: Send + Sync {
    fn evaluate(&self, args: &[Value]) -> Value;
}

impl<F> Predicate for F
where
    F: Fn(&[Value]) -> Value + Send + Sync,
{
    fn evaluate(&self, args: &[Value]) -> Value {
        self(args)
    }
}
