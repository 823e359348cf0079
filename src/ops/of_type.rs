use crate::observable::Observable;
use std::any::Any;
use std::sync::Arc;

/// A dynamically typed stream element, the carrier `of_type` selects
/// from.
pub type AnyItem = Arc<dyn Any + Send + Sync>;

impl Observable<AnyItem> {
  /// Emits only the values of runtime type `Out`, downcast.
  pub fn of_type<Out>(&self) -> Observable<Arc<Out>>
  where
    Out: Any + Send + Sync + 'static,
  {
    self.filter_map(|value: AnyItem| value.downcast::<Out>().ok())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::observable;
  use std::sync::Mutex;

  #[test]
  fn selects_matching_runtime_type() {
    let items: Vec<AnyItem> = vec![
      Arc::new(1i32),
      Arc::new("text"),
      Arc::new(2i32),
      Arc::new(4.5f64),
    ];

    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    observable::from_iter(items)
      .of_type::<i32>()
      .subscribe(move |v| s.lock().unwrap().push(*v));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
  }
}
