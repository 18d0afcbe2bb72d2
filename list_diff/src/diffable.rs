// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;

/// An item which can be matched across two snapshots of a list.
///
/// Two items represent the same logical item if and only if their identifiers are equal.
/// The identifier must therefore be stable across rebuilds of the list.
pub trait Diffable {
    /// The identifier used by the diffing algorithm.
    fn diff_identifier(&self) -> Cow<'_, str>;
}

impl<T: Diffable + ?Sized> Diffable for &T {
    fn diff_identifier(&self) -> Cow<'_, str> {
        (**self).diff_identifier()
    }
}

impl Diffable for str {
    fn diff_identifier(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Diffable for String {
    fn diff_identifier(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

macro_rules! impl_diffable_display {
    ($($ty:ty),*) => {
        $(
            impl Diffable for $ty {
                fn diff_identifier(&self) -> Cow<'_, str> {
                    Cow::Owned(format!("{self}"))
                }
            }
        )*
    };
}

impl_diffable_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char, bool
);
