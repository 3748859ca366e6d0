// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

/// Executable body of a process.
///
/// The body receives one argument per declared input, in input-declaration
/// order, already coerced to the declared port types. It must return a JSON
/// object keyed by output port name.
#[async_trait]
pub trait ProcessBody: Send + Sync {
    /// Number of positional arguments `invoke` expects.
    fn arity(&self) -> usize;

    async fn invoke(&self, args: Vec<Value>) -> anyhow::Result<Value>;
}

/// Adapter turning a synchronous closure into a [`ProcessBody`].
///
/// Closures cannot report their parameter count, so it is declared up front
/// and checked against the process inputs when the process is built.
///
/// ```
/// use pipeweave::traits::{FnBody, ProcessBody};
/// use serde_json::json;
///
/// let body = FnBody::new(2, |args| {
///     let a = args[0].as_str().unwrap_or_default();
///     let b = args[1].as_str().unwrap_or_default();
///     Ok(json!({ "sum": format!("{a}{b}") }))
/// });
/// assert_eq!(body.arity(), 2);
/// ```
pub struct FnBody<F> {
    arity: usize,
    f: F,
}

impl<F> FnBody<F>
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync,
{
    pub fn new(arity: usize, f: F) -> Self {
        Self { arity, f }
    }
}

#[async_trait]
impl<F> ProcessBody for FnBody<F>
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync,
{
    fn arity(&self) -> usize {
        self.arity
    }

    async fn invoke(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        (self.f)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_body_invokes_closure() {
        let body = FnBody::new(1, |args| Ok(json!({ "echo": args[0].clone() })));

        let out = body.invoke(vec![json!(42)]).await.unwrap();
        assert_eq!(out, json!({ "echo": 42 }));
        assert_eq!(body.arity(), 1);
    }

    #[tokio::test]
    async fn test_fn_body_propagates_error() {
        let body = FnBody::new(0, |_| Err(anyhow::anyhow!("boom")));

        let err = body.invoke(vec![]).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
