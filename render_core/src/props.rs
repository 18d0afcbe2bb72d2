// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use core::any::Any;
use core::fmt::Debug;

use std::rc::Rc;

/// Opt-in description of a value, for diagnostic display.
///
/// This is how the [inspector](crate::NodeDescription) and the
/// [state registry](crate::StateRegistry) describe props and component state,
/// without any run-time reflection.
///
/// The default implementation describes nothing.
pub trait Describe {
    /// An ordered list of `(name, value)` pairs.
    fn describe(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

macro_rules! describe_as_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe(&self) -> Vec<(String, String)> {
                    vec![("value".to_owned(), self.to_string())]
                }
            }
        )*
    };
}

describe_as_value!(
    String,
    &'static str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
);

impl Describe for () {}

impl<T: Describe> Describe for Option<T> {
    fn describe(&self) -> Vec<(String, String)> {
        self.as_ref().map(Describe::describe).unwrap_or_default()
    }
}

/// The captured content of a [`Node`](crate::Node).
///
/// When a node is matched against its previous version, the backing element is only
/// reconfigured if the props compare unequal.
///
/// This is implemented for every `PartialEq + Describe + 'static` type.
pub trait Props: PartialEq + Describe + 'static {}

impl<T> Props for T where T: PartialEq + Describe + 'static {}

/// Type erased [`Props`].
pub(crate) trait AnyProps {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn AnyProps) -> bool;
    fn describe_props(&self) -> Vec<(String, String)>;
    fn type_name(&self) -> &'static str;
}

impl<P: Props> AnyProps for P {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn AnyProps) -> bool {
        other
            .as_any()
            .downcast_ref::<P>()
            .is_some_and(|other| self == other)
    }

    fn describe_props(&self) -> Vec<(String, String)> {
        self.describe()
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<P>()
    }
}

impl Debug for dyn AnyProps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Props")
            .field("type", &self.type_name())
            .field("properties", &self.describe_props())
            .finish()
    }
}

/// Whether a matched pair of nodes has the same content.
///
/// Nodes without props never compare equal, so are always reconfigured.
pub(crate) fn props_equal(old: Option<&Rc<dyn AnyProps>>, new: Option<&Rc<dyn AnyProps>>) -> bool {
    match (old, new) {
        (Some(old), Some(new)) => Rc::ptr_eq(old, new) || old.dyn_eq(&**new),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(PartialEq)]
    struct Label {
        text: String,
    }

    impl Describe for Label {
        fn describe(&self) -> Vec<(String, String)> {
            vec![("text".to_owned(), self.text.clone())]
        }
    }

    fn erase<P: Props>(props: P) -> Rc<dyn AnyProps> {
        Rc::new(props)
    }

    #[test]
    fn equal_props_of_the_same_type() {
        let a = erase(Label { text: "a".into() });
        let b = erase(Label { text: "a".into() });
        let c = erase(Label { text: "c".into() });
        assert!(props_equal(Some(&a), Some(&b)));
        assert!(!props_equal(Some(&a), Some(&c)));
    }

    #[test]
    fn different_types_are_never_equal() {
        let a = erase(1_u32);
        let b = erase(1_u64);
        assert!(!props_equal(Some(&a), Some(&b)));
    }

    #[test]
    fn missing_props_are_never_equal() {
        let a = erase(());
        assert!(!props_equal(None, None));
        assert!(!props_equal(Some(&a), None));
        assert!(!props_equal(None, Some(&a)));
    }

    #[test]
    fn describes_through_the_erased_type() {
        let props = erase(Label {
            text: "Hello".into(),
        });
        assert_eq!(
            props.describe_props(),
            [("text".to_owned(), "Hello".to_owned())]
        );
        assert_eq!(
            erase("plain").describe_props(),
            [("value".to_owned(), "plain".to_owned())]
        );
    }
}
