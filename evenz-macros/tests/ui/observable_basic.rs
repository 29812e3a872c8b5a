use evenz::{Event, EventResult, Handler, Observable, bind_events, observable};

#[observable]
struct Door {
    /// Opened by someone.
    #[event]
    opened: Event<String>,
    #[event]
    closed: Event<()>,
    label: &'static str,
}

impl Door {
    #[bind_events]
    fn new(label: &'static str) -> EventResult<Self> {
        Ok(Self {
            opened: Event::default(),
            closed: Event::default(),
            label,
        })
    }
}

fn main() {
    let door = Door::new("front").unwrap();
    assert_eq!(door.label, "front");
    assert_eq!(Door::event_declarations().len(), 2);

    door.opened.subscribe(Handler::infallible(|who: &String| assert_eq!(who, "alice")));
    door.opened.trigger(&"alice".to_string()).unwrap();
    door.closed.trigger(&()).unwrap();
    assert_eq!(door.opened.describe().doc.as_deref(), Some("Opened by someone."));
    assert!(door.closed.describe().doc.is_none());
}
