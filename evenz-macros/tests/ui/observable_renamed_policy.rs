use evenz::{DispatchPolicy, Event, EventResult, Observable, bind_events, observable};

#[observable]
pub struct Job {
    #[event(name = "done")]
    finished: evenz::Event<u64>,
    #[event(name = "failed", policy = "continue_on_error")]
    errored: Event<String>,
    #[event(policy = "fail_fast")]
    progress: Event<(u32, u32)>,
}

impl Job {
    #[bind_events]
    pub fn new() -> EventResult<Self> {
        Ok(Self {
            finished: Event::default(),
            errored: Event::default(),
            progress: Event::default(),
        })
    }
}

fn main() {
    let job = Job::new().unwrap();
    assert_eq!(job.finished.name(), "done");
    assert_eq!(job.errored.name(), "failed");
    assert_eq!(job.errored.policy(), DispatchPolicy::ContinueOnError);
    assert_eq!(job.progress.policy(), DispatchPolicy::FailFast);
    assert!(job.event("finished").is_none());
    assert!(job.event("done").is_some());
    assert_eq!(Job::event_declarations()[2].name(), "progress");
}
