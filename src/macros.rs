pub use enclose::*;

/// Build a `move` listener closure, cloning the listed captures first.
///
/// ```ignore
/// let total = ObservableValue::new(0);
/// price.observe_forever(listener!((total) p => { total.set(*p * 2); }));
/// ```
#[macro_export]
macro_rules! listener {
    (( $($d_tt:tt)* ) => $($b:tt)*) => {
        $crate::macros::enclose!(($( $d_tt )*) move || { $($b)* })
    };
    (( $($d_tt:tt)* ) $arg:pat_param => $($b:tt)*) => {
        $crate::macros::enclose!(($( $d_tt )*) move |$arg| { $($b)* })
    };
    ($arg:pat_param => $($b:tt)*) => {
        move |$arg| { $($b)* }
    };
}
