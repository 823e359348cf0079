use crate::error::{rx_error, CallbackPanic, RxError};
use std::panic::{catch_unwind, AssertUnwindSafe};

pub mod amb;
pub mod concat;
pub mod filter;
pub mod filter_map;
pub mod finalize;
pub mod first;
pub mod map;
pub mod map_to;
pub mod materialize;
pub mod merge_all;
pub mod observe_on;
pub mod of_type;
pub mod pipe;
pub mod repeat;
pub mod rescue;
pub mod subscribe_on;
pub mod synchronize;
pub mod take;
pub mod tap;
pub mod take_until;
pub mod timeout;
pub mod to_iter;

pub use of_type::AnyItem;
pub use to_iter::ToIter;

/// Runs a user transform, converting a panic into an in-band error so
/// the stream terminates with `onError` instead of unwinding through
/// the producer.
pub(crate) fn guard<T, R, F>(f: &F, value: T) -> Result<R, RxError>
where
  F: Fn(T) -> R + ?Sized,
{
  catch_unwind(AssertUnwindSafe(|| f(value)))
    .map_err(|payload| rx_error(CallbackPanic::from_payload(payload)))
}
