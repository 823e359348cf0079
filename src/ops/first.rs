use crate::error::{rx_error, EmptyError, RxError};
use crate::observable::Observable;
use crate::subscription::SubscriptionLike;
use std::sync::mpsc;

impl<Item: Send + 'static> Observable<Item> {
  /// Blocks the calling thread until the first notification arrives:
  /// the value, the stream's error, or [`EmptyError`] when the source
  /// completes without a value. The subscription is closed once the
  /// latch resolves.
  pub fn first(&self) -> Result<Item, RxError> {
    let (tx, rx) = mpsc::channel();
    let tx_value = tx.clone();
    let tx_error = tx.clone();
    let tx_empty = tx;

    let mut subscription = self.subscribe_all(
      move |value| {
        let _ = tx_value.send(Ok(value));
      },
      move |err| {
        let _ = tx_error.send(Err(err));
      },
      move || {
        let _ = tx_empty.send(Err(rx_error(EmptyError)));
      },
    );

    let result = rx
      .recv()
      .unwrap_or_else(|_| Err(rx_error(EmptyError)));
    subscription.unsubscribe();
    result
  }
}

#[cfg(test)]
mod test {
  use crate::error::{rx_error, EmptyError, TimeoutError};
  use crate::observable;
  use crate::scheduler::thread_pool;
  use std::time::Duration;

  #[test]
  fn returns_the_first_value() {
    assert_eq!(observable::from_iter(vec![7, 8, 9]).first().unwrap(), 7);
  }

  #[test]
  fn empty_source_reports_empty() {
    let err = observable::empty::<i32>().first().unwrap_err();
    assert_eq!(err.to_string(), EmptyError.to_string());
  }

  #[test]
  fn stream_error_is_returned() {
    let err = observable::throw::<i32>(rx_error(TimeoutError))
      .first()
      .unwrap_err();
    assert_eq!(err.to_string(), TimeoutError.to_string());
  }

  #[test]
  fn blocks_across_threads() {
    let value = observable::timer(Duration::from_millis(20), thread_pool())
      .map_to(42)
      .first()
      .unwrap();
    assert_eq!(value, 42);
  }
}
