use anyhow::Result as AnyResult;
use evenz::{
    BoundEvent, Event, EventError, EventResult, Handler, Observable, bind_events, observable,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, PartialEq)]
struct Bark {
    sender: u32,
    count: u32,
}

#[observable]
struct Dog {
    id: u32,
    /// The dog barked `count` times.
    #[event]
    barked: Event<Bark>,
}

impl Dog {
    #[bind_events]
    fn new(id: u32) -> EventResult<Self> {
        Ok(Self {
            id,
            barked: Event::default(),
        })
    }

    fn bark(&self, count: u32) -> EventResult<()> {
        self.barked.trigger(&Bark {
            sender: self.id,
            count,
        })
    }

    // 重新初始化：丢弃全部订阅
    #[bind_events]
    fn reset(&mut self, id: u32) -> EventResult<()> {
        self.id = id;
        Ok(())
    }
}

fn accumulate(counter: &Arc<AtomicU32>) -> Handler<Bark> {
    let counter = counter.clone();
    Handler::named("accumulate", move |bark: &Bark| {
        counter.fetch_add(bark.count, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn single_dog_counts_until_unsubscribed() -> AnyResult<()> {
    let dog = Dog::new(1)?;
    let counter = Arc::new(AtomicU32::new(0));
    let handler = accumulate(&counter);

    dog.barked.subscribe(handler.clone());
    dog.bark(5)?;
    assert_eq!(counter.load(Ordering::SeqCst), 5);

    dog.barked.unsubscribe(&handler)?;
    dog.bark(5)?;
    assert_eq!(counter.load(Ordering::SeqCst), 5);
    Ok(())
}

#[test]
fn two_dogs_keep_separate_subscriptions() -> AnyResult<()> {
    let rex = Dog::new(1)?;
    let fido = Dog::new(2)?;
    let counter = Arc::new(AtomicU32::new(0));
    let on_rex = accumulate(&counter);
    let on_fido = accumulate(&counter);

    rex.barked.subscribe(on_rex.clone());
    fido.barked.subscribe(on_fido);
    rex.bark(5)?;
    fido.bark(5)?;
    assert_eq!(counter.load(Ordering::SeqCst), 10);

    rex.barked.unsubscribe(&on_rex)?;
    rex.bark(5)?;
    fido.bark(5)?;
    assert_eq!(counter.load(Ordering::SeqCst), 15);
    Ok(())
}

#[test]
fn subscribing_on_one_dog_never_fires_for_another() -> AnyResult<()> {
    let first = Dog::new(1)?;
    let second = Dog::new(2)?;
    let counter = Arc::new(AtomicU32::new(0));

    first.barked.subscribe(accumulate(&counter));
    first.bark(1)?;
    second.bark(1)?;

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(second.barked.is_empty());
    Ok(())
}

#[test]
fn handler_receives_sender() -> AnyResult<()> {
    let dog = Dog::new(42)?;
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    dog.barked.subscribe(Handler::infallible(move |bark: &Bark| {
        sink.lock().unwrap().push(bark.clone());
    }));

    dog.bark(3)?;
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Bark {
            sender: 42,
            count: 3
        }]
    );
    Ok(())
}

#[test]
fn same_handler_twice_counts_twice() -> AnyResult<()> {
    let dog = Dog::new(1)?;
    let counter = Arc::new(AtomicU32::new(0));
    let handler = accumulate(&counter);

    dog.barked.subscribe(handler.clone()).subscribe(handler);
    dog.bark(5)?;
    assert_eq!(counter.load(Ordering::SeqCst), 10);
    Ok(())
}

#[test]
fn reinitialization_drops_previous_handlers() -> AnyResult<()> {
    let mut dog = Dog::new(1)?;
    let counter = Arc::new(AtomicU32::new(0));
    dog.barked.subscribe(accumulate(&counter));

    dog.reset(7)?;
    dog.bark(5)?;

    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(dog.id, 7);
    assert!(dog.barked.is_bound());
    Ok(())
}

#[test]
fn unsubscribing_a_stranger_fails() -> AnyResult<()> {
    let dog = Dog::new(1)?;
    let counter = Arc::new(AtomicU32::new(0));
    let kept = accumulate(&counter);
    dog.barked.subscribe(kept.clone());

    let err = dog.barked.unsubscribe(&accumulate(&counter)).unwrap_err();
    assert!(matches!(err, EventError::HandlerNotFound { ref event, .. } if event == "barked"));
    assert_eq!(dog.barked.handlers().to_vec(), vec![kept]);
    Ok(())
}

#[test]
fn bound_event_carries_declaration_doc() -> AnyResult<()> {
    let dog = Dog::new(1)?;
    let d = dog.barked.describe();
    assert_eq!(d.name, "barked");
    assert_eq!(d.owner.as_deref(), Some("Dog"));
    assert_eq!(d.signature.as_deref(), Some("Bark"));
    assert_eq!(d.doc.as_deref(), Some("The dog barked `count` times."));
    Ok(())
}

#[test]
fn installing_an_undeclared_name_is_rejected() -> AnyResult<()> {
    let mut dog = Dog::new(1)?;
    let counter = Arc::new(AtomicU32::new(0));
    dog.barked.subscribe(accumulate(&counter));

    let err = dog
        .install_event(BoundEvent::new("nope", Event::<u32>::new()))
        .unwrap_err();
    assert!(matches!(
        err,
        EventError::UnknownEvent { type_name, ref event } if event == "nope" && type_name.ends_with("Dog")
    ));
    assert_eq!(dog.barked.len(), 1);
    Ok(())
}
