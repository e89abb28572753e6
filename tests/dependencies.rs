use std::error::Error;

use taskstate::{Completion, Operation, TaskError, TaskOptions};
use taskstate_test_utils::init_tracing;
use taskstate_test_utils::recording::CountingHook;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn dependent_becomes_ready_once_dependency_finishes() -> TestResult {
    init_tracing();

    let a = Operation::new(TaskOptions::named("A"), CountingHook::finishing());
    let b = Operation::new(TaskOptions::named("B"), CountingHook::finishing());
    a.add_dependency(&b.handle())?;

    assert!(b.is_ready());
    assert!(!a.is_ready());
    assert_eq!(a.unfinished_dependencies(), vec![b.id()]);

    b.start()?;

    assert!(a.is_ready());
    assert!(a.unfinished_dependencies().is_empty());
    a.start()?;
    assert!(a.is_finished());
    Ok(())
}

#[test]
fn readiness_waits_for_every_dependency() -> TestResult {
    let sink = Operation::new(TaskOptions::named("sink"), CountingHook::finishing());
    let left = Operation::new(TaskOptions::named("left"), CountingHook::finishing());
    let right = Operation::new(TaskOptions::named("right"), CountingHook::finishing());
    sink.add_dependency(&left.handle())?;
    sink.add_dependency(&right.handle())?;

    left.start()?;
    assert!(!sink.is_ready());

    right.start()?;
    assert!(sink.is_ready());
    Ok(())
}

#[test]
fn cancelled_dependency_counts_as_finished_once_retired() -> TestResult {
    let a = Operation::new(TaskOptions::named("A"), CountingHook::finishing());
    let b = Operation::new(TaskOptions::named("B"), CountingHook::finishing());
    a.add_dependency(&b.handle())?;

    b.cancel();
    assert!(!b.is_ready());
    b.start()?;

    assert_eq!(b.hook().runs(), 0);
    assert!(a.is_ready());
    Ok(())
}

#[test]
fn adding_the_same_dependency_twice_keeps_one_edge() -> TestResult {
    let a = Operation::new(TaskOptions::named("A"), CountingHook::finishing());
    let b = Operation::new(TaskOptions::named("B"), CountingHook::finishing());

    a.add_dependency(&b.handle())?;
    a.add_dependency(&b.handle())?;

    assert_eq!(a.dependencies(), vec![b.id()]);
    Ok(())
}

#[test]
fn removing_a_dependency_restores_readiness() -> TestResult {
    let a = Operation::new(TaskOptions::named("A"), CountingHook::finishing());
    let b = Operation::new(TaskOptions::named("B"), CountingHook::finishing());
    a.add_dependency(&b.handle())?;
    assert!(!a.is_ready());

    assert!(a.remove_dependency(b.id())?);
    assert!(!a.remove_dependency(b.id())?);

    assert!(a.dependencies().is_empty());
    assert!(a.is_ready());
    Ok(())
}

#[test]
fn self_dependency_is_rejected() {
    let a = Operation::new(TaskOptions::named("A"), CountingHook::finishing());

    let err = a.add_dependency(&a.handle()).unwrap_err();
    assert!(matches!(err, TaskError::SelfDependency { .. }));
    assert!(a.dependencies().is_empty());
}

#[test]
fn dependency_edits_after_start_are_rejected() -> TestResult {
    init_tracing();

    let b = Operation::new(TaskOptions::named("B"), CountingHook::finishing());
    let c = Operation::new(TaskOptions::named("C"), CountingHook::finishing());
    let a = Operation::new(TaskOptions::named("A").asynchronous(), |_: Completion| {});
    a.add_dependency(&b.handle())?;
    b.start()?;
    a.start()?;
    assert!(a.is_executing());

    let err = a.add_dependency(&c.handle()).unwrap_err();
    assert!(matches!(err, TaskError::DependencyAfterStart { .. }));

    let err = a.remove_dependency(b.id()).unwrap_err();
    assert!(matches!(err, TaskError::DependencyAfterStart { .. }));
    assert_eq!(a.dependencies(), vec![b.id()]);
    Ok(())
}

#[test]
fn dropped_dependency_is_unsatisfied() -> TestResult {
    init_tracing();

    let a = Operation::new(TaskOptions::named("A"), CountingHook::finishing());
    {
        let b = Operation::new(TaskOptions::named("B"), CountingHook::finishing());
        a.add_dependency(&b.handle())?;
    }

    assert!(!a.dependencies_finished());
    assert!(!a.is_ready());
    Ok(())
}

#[test]
fn edges_do_not_keep_dependencies_alive() -> TestResult {
    let a = Operation::new(TaskOptions::named("A"), CountingHook::finishing());
    let b = Operation::new(TaskOptions::named("B"), CountingHook::finishing());
    let handle = b.handle();
    a.add_dependency(&handle)?;

    // `b` and `handle` are the only strong references.
    assert_eq!(std::sync::Arc::strong_count(handle.core()), 2);
    Ok(())
}
