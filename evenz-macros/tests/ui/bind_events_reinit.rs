use evenz::{Event, EventError, Handler, bind_events, observable};

#[derive(Debug)]
enum AppError {
    Events(EventError),
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        AppError::Events(err)
    }
}

#[observable]
struct Counter {
    value: u32,
    #[event]
    changed: Event<u32>,
}

impl Counter {
    #[bind_events]
    fn new() -> Result<Self, AppError> {
        Ok(Self {
            value: 0,
            changed: Event::default(),
        })
    }

    #[bind_events]
    fn restart(&mut self, value: u32) -> Result<u32, AppError> {
        let previous = self.value;
        self.value = value;
        Ok(previous)
    }
}

fn main() {
    let mut counter = Counter::new().unwrap();
    counter.changed.subscribe(Handler::infallible(|_: &u32| {}));
    assert_eq!(counter.changed.len(), 1);

    let previous = counter.restart(9).unwrap();
    assert_eq!(previous, 0);
    assert_eq!(counter.value, 9);
    assert!(counter.changed.is_empty());
    if let Err(AppError::Events(err)) = Counter::new() {
        panic!("{err}");
    }
}
