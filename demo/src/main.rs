use anyhow::{Context, Result as AnyResult, anyhow};
use evenz::{
    Args, Binder, DispatchPolicy, Event, EventConfig, EventError, Handler, Observable, bind_events,
    observable,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct Bark {
    sender: u32,
    count: u32,
}

#[derive(Debug, thiserror::Error)]
enum KennelError {
    #[error("dog id must be positive")]
    InvalidId,
    #[error(transparent)]
    Events(#[from] EventError),
}

#[observable]
struct Dog {
    id: u32,
    /// 狗叫了 `count` 声
    #[event]
    barked: Event<Bark>,
    /// 狗睡着了；所有处理器都会被通知
    #[event(name = "slept", policy = "continue_on_error")]
    fell_asleep: Event<Args<u32>>,
}

impl Dog {
    #[bind_events]
    fn new(id: u32) -> Result<Self, KennelError> {
        if id == 0 {
            return Err(KennelError::InvalidId);
        }
        Ok(Self {
            id,
            barked: Event::default(),
            fell_asleep: Event::default(),
        })
    }

    fn bark(&self, count: u32) -> Result<(), KennelError> {
        self.barked.trigger(&Bark {
            sender: self.id,
            count,
        })?;
        Ok(())
    }
}

fn main() -> AnyResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evenz=debug,demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 命令行第一个参数或 EVENZ_POLICY 指定默认分发策略
    let policy: DispatchPolicy = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("EVENZ_POLICY").ok())
        .map(|raw| raw.parse::<DispatchPolicy>())
        .transpose()
        .context("parse dispatch policy")?
        .unwrap_or_default();
    tracing::info!(%policy, "starting kennel");

    let total = Arc::new(AtomicU32::new(0));
    let counter = {
        let total = total.clone();
        Handler::named("counter", move |bark: &Bark| {
            total.fetch_add(bark.count, Ordering::SeqCst);
            tracing::info!(sender = bark.sender, count = bark.count, "woof");
            Ok(())
        })
    };

    // 单只狗：订阅、叫、退订、再叫
    let rex = Dog::new(1)?;
    rex.barked.subscribe(counter.clone());
    rex.bark(5)?;
    rex.barked.unsubscribe(&counter)?;
    rex.bark(5)?;
    tracing::info!(total = total.load(Ordering::SeqCst), "after single dog");

    // 两只狗：同一个处理器分别订阅，各自独立
    let fido = Dog::new(2)?;
    rex.barked.subscribe(counter.clone());
    fido.barked.subscribe(counter.clone());
    rex.bark(5)?;
    fido.bark(5)?;
    rex.barked.unsubscribe(&counter)?;
    rex.bark(5)?;
    fido.bark(5)?;
    tracing::info!(total = total.load(Ordering::SeqCst), "after two dogs");

    // 使用自定义默认策略的绑定器
    let binder = Binder::builder()
        .config(EventConfig::builder().policy(policy).build())
        .build();
    let odie = binder.construct(Dog {
        id: 3,
        barked: Event::default(),
        fell_asleep: Event::default(),
    })?;
    odie.barked
        .subscribe(Handler::named("grumpy", |_: &Bark| Err(anyhow!("too loud"))))
        .subscribe(counter.clone());
    match odie.bark(1) {
        Ok(()) => tracing::info!("odie barked quietly"),
        Err(err) => tracing::warn!(error = %err, "odie's bark was not welcome"),
    }

    // 按名称访问：`slept` 是 `fell_asleep` 字段声明的事件名
    let slept = odie
        .event("slept")
        .ok_or_else(|| anyhow!("dog declares no 'slept' event"))?;
    slept.subscribe_erased(
        Handler::infallible(|args: &Args<u32>| tracing::info!(id = args.sender, "zzz")).into(),
    )?;
    slept.trigger_erased(&Args::from_sender(odie.id))?;

    for event in odie.events() {
        let descriptor = event.describe();
        tracing::info!(
            name = %descriptor.name,
            handlers = descriptor.handlers,
            policy = %descriptor.policy,
            "event"
        );
    }

    if let Err(err) = Dog::new(0) {
        tracing::warn!(error = %err, "rejected dog");
    }

    tracing::info!(total = total.load(Ordering::SeqCst), "done");
    Ok(())
}
