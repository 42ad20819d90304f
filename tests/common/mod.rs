//! Shared capabilities and fixture producers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use capability_runner::{
    BoxError, Capability, Close, CloseNotifier, Closer, DelayClose, Main, Producer,
};

pub trait Alpha: Send + Sync {
    fn label(&self) -> String;
}
impl Capability for dyn Alpha {}

pub trait Beta: Send + Sync {
    fn label(&self) -> String;
}
impl Capability for dyn Beta {}

/// Plain value implementing both test capabilities.
pub struct Labelled(pub String);

impl Alpha for Labelled {
    fn label(&self) -> String {
        self.0.clone()
    }
}

impl Beta for Labelled {
    fn label(&self) -> String {
        self.0.clone()
    }
}

/// Shared record of events, in the order they happened.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A value whose synchronous close is journaled and may fail.
pub struct Closing {
    pub name: &'static str,
    pub journal: Journal,
    pub fail: bool,
}

impl Beta for Closing {
    fn label(&self) -> String {
        self.name.to_string()
    }
}

impl Close for Closing {
    fn close(&self) -> Result<(), BoxError> {
        self.journal.push(format!("close {}", self.name));
        if self.fail {
            Err(format!("{} close failed", self.name).into())
        } else {
            Ok(())
        }
    }
}

/// A value that finishes its close on another thread after `delay`.
pub struct Delayed {
    pub name: &'static str,
    pub journal: Journal,
    pub delay: Duration,
    pub fail: bool,
}

impl Beta for Delayed {
    fn label(&self) -> String {
        self.name.to_string()
    }
}

impl DelayClose for Delayed {
    fn close(&self, done: CloseNotifier) {
        let name = self.name;
        let journal = self.journal.clone();
        let delay = self.delay;
        let fail = self.fail;
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            journal.push(format!("delayed {name}"));
            if fail {
                done.notify(Err(format!("{name} delayed close failed").into()));
            } else {
                done.notify(Ok(()));
            }
        });
    }
}

/// A `Main` that journals its run and returns the configured outcome.
pub struct Scripted {
    pub journal: Journal,
    pub fail: Option<&'static str>,
}

impl Main for Scripted {
    fn run(&self) -> Result<(), BoxError> {
        self.journal.push("main");
        match self.fail {
            Some(msg) => Err(msg.into()),
            None => Ok(()),
        }
    }
}

/// Makes `dyn Alpha` from one `dyn Beta`.
pub fn alpha_from_beta() -> Producer {
    Producer::builder("alpha-from-beta")
        .needs::<dyn Beta>()
        .makes::<dyn Alpha>()
        .factory(|deps, out| {
            let beta = deps.one::<dyn Beta>()?;
            out.provide::<dyn Alpha>(Arc::new(Labelled(beta.label())));
            Ok(())
        })
        .build()
}

/// Makes `dyn Beta` from one `dyn Alpha`.
pub fn beta_from_alpha() -> Producer {
    Producer::builder("beta-from-alpha")
        .needs::<dyn Alpha>()
        .makes::<dyn Beta>()
        .factory(|deps, out| {
            deps.one::<dyn Alpha>()?;
            out.provide::<dyn Beta>(Arc::new(Labelled("beta".into())));
            Ok(())
        })
        .build()
}

/// Makes `dyn Alpha` from every `dyn Beta`, journaling their labels.
pub fn alpha_from_all_betas(journal: &Journal) -> Producer {
    let journal = journal.clone();
    Producer::builder("alpha-from-all-betas")
        .needs_all::<dyn Beta>()
        .makes::<dyn Alpha>()
        .factory(move |deps, out| {
            let labels: Vec<String> = deps.all::<dyn Beta>()?.iter().map(|b| b.label()).collect();
            journal.push(format!("betas {}", labels.join(",")));
            out.provide::<dyn Alpha>(Arc::new(Labelled("alpha".into())));
            Ok(())
        })
        .build()
}

pub fn beta(name: &'static str) -> Producer {
    Producer::value::<dyn Beta>(name, Arc::new(Labelled(name.into())))
}

pub fn closing_beta(name: &'static str, journal: &Journal, fail: bool) -> Producer {
    let value = Arc::new(Closing {
        name,
        journal: journal.clone(),
        fail,
    });
    Producer::closing_value::<dyn Beta>(name, value.clone(), Closer::immediate(value))
}

pub fn delayed_beta(
    name: &'static str,
    journal: &Journal,
    delay: Duration,
    fail: bool,
) -> Producer {
    let value = Arc::new(Delayed {
        name,
        journal: journal.clone(),
        delay,
        fail,
    });
    Producer::closing_value::<dyn Beta>(name, value.clone(), Closer::delayed(value))
}

/// A `Main` needing `dyn Alpha`.
pub fn main_needing_alpha(journal: &Journal, fail: Option<&'static str>) -> Producer {
    let journal = journal.clone();
    Producer::builder("main")
        .needs::<dyn Alpha>()
        .makes::<dyn Main>()
        .factory(move |deps, out| {
            deps.one::<dyn Alpha>()?;
            out.provide::<dyn Main>(Arc::new(Scripted { journal, fail }));
            Ok(())
        })
        .build()
}

/// A `Main` with no inputs.
pub fn main_alone(journal: &Journal, fail: Option<&'static str>) -> Producer {
    Producer::value::<dyn Main>(
        "main",
        Arc::new(Scripted {
            journal: journal.clone(),
            fail,
        }),
    )
}
