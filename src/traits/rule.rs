// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

/// Conversion of a port value towards one declared type.
///
/// Returning `None` means "no conversion available"; the registry then keeps
/// the original value.
pub trait CoercionRule: Send + Sync {
    fn convert(&self, value: &Value) -> Option<Value>;
}

impl<F> CoercionRule for F
where
    F: Fn(&Value) -> Option<Value> + Send + Sync,
{
    fn convert(&self, value: &Value) -> Option<Value> {
        self(value)
    }
}
