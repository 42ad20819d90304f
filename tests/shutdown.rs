//! Shutdown coordination inside a running assembly.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use capability_runner::{
    run_producers, Error, Producer, ShutdownMain, ShutdownRequest, SignalInterrupt,
};

mod common;
use common::*;

/// Requests shutdown from a background thread once produced.
fn requester(err: Option<&'static str>, delay: Duration) -> Producer {
    Producer::builder("requester")
        .needs::<dyn ShutdownRequest>()
        .makes::<dyn Alpha>()
        .factory(move |deps, out| {
            let shutdown = deps.one::<dyn ShutdownRequest>()?;
            thread::spawn(move || {
                thread::sleep(delay);
                shutdown.shutdown(err.map(Into::into));
                shutdown.shutdown(Some("ignored".into()));
            });
            out.provide::<dyn Alpha>(Arc::new(Labelled("requester".into())));
            Ok(())
        })
        .build()
}

#[test]
fn test_shutdown_without_error() {
    let errors = run_producers([
        ShutdownMain::producer(),
        requester(None, Duration::from_millis(10)),
    ]);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn test_first_shutdown_error_is_returned() {
    let errors = run_producers([
        requester(Some("worker gave up"), Duration::from_millis(10)),
        ShutdownMain::producer(),
    ]);

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::Main(_)));
    assert_eq!(errors[0].to_string(), "worker gave up");
}

#[test]
fn test_signal_listener_is_closed_after_main() {
    let journal = Journal::new();
    let errors = run_producers([
        closing_beta("resource", &journal, false),
        ShutdownMain::producer(),
        SignalInterrupt::producer(),
        requester(None, Duration::from_millis(20)),
    ]);

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(journal.entries(), vec!["close resource"]);
}
