//! Small control-flow helpers for futures.
//!
//! None of these depend on `Rfetch`; they compose with it (or with anything
//! else async) by wrapping futures and closures.

mod assert;
mod delay;
mod never;
mod retry;

pub use assert::{assert, assert_defined, Defined, DEFAULT_MESSAGE};
pub use delay::{
    delay, delay_for, delay_value, delay_value_for, fallback, set_fallback, try_delay_value,
    try_delay_value_for, DEFAULT_FALLBACK,
};
pub use never::{never, never_with};
pub use retry::retry;
