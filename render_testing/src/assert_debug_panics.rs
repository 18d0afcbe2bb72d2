// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use std::panic::{AssertUnwindSafe, catch_unwind};

/// Asserts that `$expr` panics with a message containing `$needle`, if debug assertions
/// are enabled.
///
/// This is for checking the bugs reported by `debug_panic!`, which only panics in debug
/// builds. In release builds `$expr` isn't evaluated at all.
#[macro_export]
macro_rules! assert_debug_panics {
    ($expr:expr, $needle:expr $(,)?) => {
        $crate::assert_debug_panics_inner(
            || {
                $expr;
            },
            &$needle,
        )
    };
}

#[track_caller]
#[doc(hidden)]
pub fn assert_debug_panics_inner(callback: impl FnOnce(), needle: &str) {
    if !cfg!(debug_assertions) {
        return;
    }

    let payload = match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(()) => panic!("expected a panic containing `{needle}`, but nothing panicked"),
        Err(payload) => payload,
    };
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    assert!(
        message.contains(needle),
        "expected a panic containing `{needle}`, got `{message}`"
    );
}

#[cfg(test)]
mod tests {
    #[test]
    fn matching_panic_passes() {
        assert_debug_panics!(panic!("Component `Counter` needs a key"), "needs a key");
    }

    #[test]
    #[should_panic(expected = "expected a panic containing `needs a key`")]
    #[cfg_attr(not(debug_assertions), ignore = "Nothing is checked without debug assertions")]
    fn other_panic_fails() {
        assert_debug_panics!(panic!("something else"), "needs a key");
    }
}
