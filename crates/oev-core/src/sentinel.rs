use std::ops::ControlFlow;

/// Reserved integer result that stops a [`SequentialController`](crate::SequentialController)
/// before its remaining jobs run.
pub const QUIT: i32 = 1;

/// Result types that can carry the reserved "quit" value.
pub trait Sentinel {
    /// Whether this result asks the enclosing sequence to stop.
    fn is_quit(&self) -> bool;
}

macro_rules! int_sentinel {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sentinel for $t {
                #[inline]
                fn is_quit(&self) -> bool {
                    *self == QUIT as $t
                }
            }
        )*
    };
}

int_sentinel!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Sentinel for () {
    #[inline]
    fn is_quit(&self) -> bool {
        false
    }
}

impl<B, C> Sentinel for ControlFlow<B, C> {
    #[inline]
    fn is_quit(&self) -> bool {
        self.is_break()
    }
}

impl<T, E> Sentinel for Result<T, E> {
    #[inline]
    fn is_quit(&self) -> bool {
        self.is_err()
    }
}
