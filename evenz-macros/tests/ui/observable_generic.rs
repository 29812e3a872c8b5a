use evenz::{Binder, Event, observable};

#[observable]
struct Channel<T, const N: usize>
where
    T: Clone,
{
    #[event]
    sent: Event<[T; N]>,
}

fn main() {
    let channel = Binder::global()
        .construct(Channel::<u8, 2> {
            sent: Event::default(),
        })
        .unwrap();
    assert!(channel.sent.is_bound());
    channel.sent.trigger(&[1, 2]).unwrap();
}
