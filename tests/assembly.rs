//! End-to-end assembly tests: registration, resolution and entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use capability_runner::{
    run_producers, Assembly, EmptySequencePolicy, Error, Main, Param, Producer, TypeKey,
};

mod common;
use common::*;

#[test]
fn test_no_producers_is_no_main() {
    let errors = run_producers(Vec::<Producer>::new());
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::NoMain));
}

#[test]
fn test_nil_producer() {
    let errors = run_producers([None::<Producer>]);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::ProducerNil));
}

#[test]
fn test_producer_without_factory() {
    let errors = run_producers([Producer::builder("hollow").makes::<dyn Alpha>().build()]);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::ProducerNotFunc));
}

#[test]
fn test_non_capability_output_is_rejected() {
    let mut assembly = Assembly::new();
    let err = assembly
        .add(
            Producer::builder("number")
                .output(TypeKey::concrete::<u32>())
                .factory(|_, _| Ok(()))
                .build(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::ProducerInvalidReturns { .. }));
    assert!(assembly.is_empty());
}

#[test]
fn test_non_capability_input_is_rejected() {
    let mut assembly = Assembly::new();
    let err = assembly
        .add(
            Producer::builder("takes-number")
                .input(Param::One(TypeKey::concrete::<u32>()))
                .makes::<dyn Alpha>()
                .factory(|_, _| Ok(()))
                .build(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::ProducerInvalidInputs { .. }));
    assert_eq!(err.producer(), Some("takes-number"));
}

#[test]
fn test_missing_supplier() {
    let errors = run_producers([alpha_from_beta()]);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::NoProducerMakes { .. }));
}

#[test]
fn test_mutual_dependency_reports_both() {
    let errors = run_producers([alpha_from_beta(), beta_from_alpha()]);
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, Error::MissingDependency { .. })));
    assert_eq!(errors[0].producer(), Some("alpha-from-beta"));
    assert_eq!(errors[1].producer(), Some("beta-from-alpha"));
}

#[test]
fn test_bare_request_of_sequence() {
    let errors = run_producers([alpha_from_beta(), beta("b1"), beta("b2")]);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::NoProducerMakes { .. }));
}

#[test]
fn test_returned_nil_stops_resolution() {
    let later_ran = Arc::new(AtomicBool::new(false));
    let flag = later_ran.clone();
    let nil = Producer::builder("nil")
        .makes::<dyn Alpha>()
        .factory(|_, _| Ok(()))
        .build();
    let later = Producer::builder("later")
        .makes::<dyn Beta>()
        .factory(move |_, out| {
            flag.store(true, Ordering::SeqCst);
            out.provide::<dyn Beta>(Arc::new(Labelled("later".into())));
            Ok(())
        })
        .build();

    let errors = run_producers([nil, later]);

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::ProducerReturnedNil { .. }));
    assert!(!later_ran.load(Ordering::SeqCst));
}

#[test]
fn test_factory_error_is_attributed() {
    let broken = Producer::builder("broken")
        .makes::<dyn Alpha>()
        .factory(|_, _| Err("no connection".into()))
        .build();

    let errors = run_producers([broken]);

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::Producer { .. }));
    assert_eq!(errors[0].producer(), Some("broken"));
    assert!(errors[0].to_string().contains("no connection"));
}

#[test]
fn test_main_error_is_returned() {
    let journal = Journal::new();
    let errors = run_producers([main_alone(&journal, Some("error from Main"))]);

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::Main(_)));
    assert_eq!(errors[0].to_string(), "error from Main");
}

#[test]
fn test_main_runs_after_dependencies() {
    let journal = Journal::new();
    let errors = run_producers([
        main_needing_alpha(&journal, None),
        alpha_from_all_betas(&journal),
        beta("b1"),
        beta("b2"),
    ]);

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(journal.entries(), vec!["betas b1,b2", "main"]);
}

#[test]
fn test_lone_value_of_sequence_is_not_bare() {
    let journal = Journal::new();
    let errors = run_producers([
        main_needing_alpha(&journal, None),
        alpha_from_beta(),
        alpha_from_all_betas(&journal),
        beta("only"),
    ]);

    // `dyn Beta` is list-marked, so its one value is only reachable as a sequence.
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::NoProducerMakes { .. }));
    assert_eq!(errors[0].producer(), Some("alpha-from-beta"));
}

#[test]
fn test_list_marked_main_is_no_main() {
    let journal = Journal::new();
    let lister = Producer::builder("lister")
        .needs_all::<dyn Main>()
        .makes::<dyn Alpha>()
        .factory(|deps, out| {
            assert_eq!(deps.all::<dyn Main>()?.len(), 1);
            out.provide::<dyn Alpha>(Arc::new(Labelled("lister".into())));
            Ok(())
        })
        .build();

    let errors = run_producers([main_alone(&journal, None), lister]);

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::NoMain));
    assert!(journal.entries().is_empty());
}

#[test]
fn test_two_mains_is_no_main() {
    let journal = Journal::new();
    let errors = run_producers([main_alone(&journal, None), main_alone(&journal, None)]);

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::NoMain));
    assert!(journal.entries().is_empty());
}

#[test]
fn test_empty_sequence_default_binds() {
    let journal = Journal::new();
    let errors = run_producers([
        main_needing_alpha(&journal, None),
        alpha_from_all_betas(&journal),
    ]);

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(journal.entries(), vec!["betas ", "main"]);
}

#[test]
fn test_empty_sequence_can_fail() {
    let journal = Journal::new();
    let mut assembly = Assembly::new();
    assembly.set_empty_sequence(EmptySequencePolicy::Fail);
    assembly.add(main_needing_alpha(&journal, None)).unwrap();
    assembly.add(alpha_from_all_betas(&journal)).unwrap();

    let errors = assembly.run();

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::NoProducerMakes { .. }));
    assert_eq!(errors[0].producer(), Some("alpha-from-all-betas"));
}

#[test]
fn test_main_then_closer_errors() {
    let journal = Journal::new();
    let errors = run_producers([
        alpha_from_all_betas(&journal),
        beta("plain"),
        closing_beta("closer", &journal, true),
        delayed_beta("delayed", &journal, Duration::from_millis(5), true),
        main_needing_alpha(&journal, None),
    ]);

    assert_eq!(errors.len(), 2, "{errors:?}");
    assert_eq!(errors[0].to_string(), "delayed delayed close failed");
    assert_eq!(errors[1].to_string(), "closer close failed");
    assert_eq!(
        journal.entries(),
        vec![
            "betas plain,closer,delayed",
            "main",
            "delayed delayed",
            "close closer",
        ]
    );
}

#[test]
fn test_main_is_located_by_capability() {
    struct Quiet;
    impl Main for Quiet {
        fn run(&self) -> Result<(), capability_runner::BoxError> {
            Ok(())
        }
    }

    let errors = run_producers([Producer::value::<dyn Main>("quiet", Arc::new(Quiet))]);
    assert!(errors.is_empty());
}
