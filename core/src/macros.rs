/// Builds a `Vec<Child>` from heterogeneous values.
///
/// Each expression goes through `Child::from`, so strings, integers, floats and
/// nested elements can be mixed freely.
///
/// ```
/// use rivulet_core::children;
///
/// let list = children!["count: ", 3];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! children {
    () => {
        $crate::__private::Vec::<$crate::Child>::new()
    };
    ($($child:expr),+ $(,)?) => {
        $crate::__private::vec![$($crate::Child::from($child)),+]
    };
}

/// Builds an effect dependency list.
///
/// `deps![]` is the "first pass only" list, `deps![a, b]` converts each
/// expression into a [`Value`](crate::Value). Pass `None` to `use_effect`
/// instead to run the effect on every pass.
///
/// ```
/// use rivulet_core::{Value, deps};
///
/// let count = 2;
/// assert_eq!(deps![count], Some(vec![Value::Int(2)]));
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        ::core::option::Option::Some($crate::__private::Vec::<$crate::Value>::new())
    };
    ($($dep:expr),+ $(,)?) => {
        ::core::option::Option::Some($crate::__private::vec![$($crate::Value::from($dep)),+])
    };
}
