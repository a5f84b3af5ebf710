// Null and status predicates behind verify_null / verify_succeeded.

use std::process::ExitStatus;

/// Values that have a null or empty sentinel.
pub trait Nullable {
    fn is_null_ref(&self) -> bool;
}

impl<T> Nullable for Option<T> {
    fn is_null_ref(&self) -> bool {
        self.is_none()
    }
}

impl<T: ?Sized> Nullable for *const T {
    fn is_null_ref(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> Nullable for *mut T {
    fn is_null_ref(&self) -> bool {
        self.is_null()
    }
}

/// Status or result codes with a success predicate.
pub trait Status {
    fn succeeded(&self) -> bool;
}

impl<T, E> Status for Result<T, E> {
    fn succeeded(&self) -> bool {
        self.is_ok()
    }
}

/// Signed status codes: negative values are failures.
impl Status for i32 {
    fn succeeded(&self) -> bool {
        *self >= 0
    }
}

impl Status for ExitStatus {
    fn succeeded(&self) -> bool {
        self.success()
    }
}
