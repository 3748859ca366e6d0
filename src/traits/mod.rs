// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod body;
pub mod predicate;
pub mod rule;

pub use body::{FnBody, ProcessBody};
pub use predicate::Predicate;
pub use rule::CoercionRule;
