// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use core::error::Error;
use core::fmt;

/// A reconciliation pass which couldn't run to completion.
///
/// The pass is not rolled back: the backing hierarchy is left partially updated, and the
/// retained tree which was passed in is consumed.
/// Callers should remount from scratch on the next pass (as [`Hierarchy`](crate::Hierarchy) does),
/// after clearing any stale elements from the container.
#[derive(Debug)]
#[non_exhaustive]
pub enum ReconcileError<E> {
    /// The backend failed to create an element.
    Create {
        /// The reuse identifier of the node being mounted.
        reuse_identifier: String,
        /// The backend's error.
        source: E,
    },
}

impl<E: fmt::Display> fmt::Display for ReconcileError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create {
                reuse_identifier,
                source,
            } => write!(
                f,
                "failed to create an element for reuse identifier `{reuse_identifier}`: {source}"
            ),
        }
    }
}

impl<E: Error + 'static> Error for ReconcileError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Create { source, .. } => Some(source),
        }
    }
}
