use std::sync::Arc;
use thiserror::Error;

/// The error payload carried by `Observer::error`.
///
/// Errors travel in-band through a stream, may be observed by several
/// subscribers and may cross thread boundaries, so they are reference
/// counted rather than boxed.
pub type RxError = Arc<dyn std::error::Error + Send + Sync>;

/// Wraps any error into an [`RxError`].
pub fn rx_error<E>(err: E) -> RxError
where
  E: std::error::Error + Send + Sync + 'static,
{
  Arc::new(err)
}

/// No value arrived before the deadline and no fallback was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timeout expired before the sequence produced a value")]
pub struct TimeoutError;

/// The sequence completed without producing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sequence is empty")]
pub struct EmptyError;

/// A user-supplied transform panicked while processing a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("callback panicked: {0}")]
pub struct CallbackPanic(pub String);

impl CallbackPanic {
  /// Recovers the panic message from a `catch_unwind` payload.
  pub fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
      (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
      s.clone()
    } else {
      "callback panicked".to_string()
    };
    CallbackPanic(msg)
  }
}
