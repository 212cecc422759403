/// Builds a bucket [`Node`](crate::linked_list::Node) out of anything
/// convertible into a `String`.
///
/// `node!(boxed k, v)` returns it already boxed, ready to be linked into a list.
#[macro_export]
macro_rules! node {
    (boxed $key: expr, $value: expr) => {
        Box::new($crate::node!($key, $value))
    };
    ( $key: expr, $value: expr) => {
        $crate::linked_list::Node {
            key: $key.into(),
            value: $value.into(),
            next: None,
        }
    };
}
