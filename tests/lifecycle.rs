use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use taskstate::{
    Completion, FinishPolicy, Operation, TaskCore, TaskError, TaskOptions, TaskState,
};
use taskstate_test_utils::init_tracing;
use taskstate_test_utils::recording::{CountingHook, ParkedHook};

type TestResult = Result<(), Box<dyn Error>>;

fn exactly_one_predicate(core: &TaskCore) -> bool {
    [core.is_ready(), core.is_executing(), core.is_finished()]
        .iter()
        .filter(|b| **b)
        .count()
        == 1
}

#[test]
fn uncancelled_task_runs_hook_and_finishes() -> TestResult {
    init_tracing();

    let op = Operation::new(TaskOptions::named("t"), CountingHook::finishing());
    assert!(op.is_ready());
    assert!(exactly_one_predicate(op.core()));

    op.start()?;

    assert_eq!(op.hook().runs(), 1);
    assert!(op.is_finished());
    assert!(!op.is_executing());
    assert!(exactly_one_predicate(op.core()));
    Ok(())
}

#[test]
fn cancelled_before_start_skips_hook() -> TestResult {
    init_tracing();

    let op = Operation::new(TaskOptions::named("t"), CountingHook::finishing());
    op.cancel();
    assert!(!op.is_ready(), "cancelled task must not be reported ready");
    assert!(op.core().is_ready(), "state is still Ready until started");

    op.start()?;

    assert_eq!(op.hook().runs(), 0);
    assert!(op.is_finished());
    Ok(())
}

#[test]
fn cancellation_after_begin_does_not_abort_hook() -> TestResult {
    init_tracing();

    let saw_cancel = Arc::new(AtomicBool::new(false));
    let saw = Arc::clone(&saw_cancel);
    let op = Operation::new(TaskOptions::named("t"), move |done: Completion| {
        // Cancel ourselves mid-flight; the hook keeps going.
        done.task().cancel();
        saw.store(done.is_cancelled(), Ordering::SeqCst);
        assert_eq!(done.state(), TaskState::Executing);
        done.finish().unwrap();
    });

    op.start()?;

    assert!(saw_cancel.load(Ordering::SeqCst));
    assert!(op.is_cancelled());
    assert!(op.is_finished());
    Ok(())
}

#[test]
fn synchronous_hook_returning_without_finish_is_finished_on_exit() -> TestResult {
    init_tracing();

    let op = Operation::new(TaskOptions::named("t"), CountingHook::returning());
    op.start()?;

    assert_eq!(op.hook().runs(), 1);
    assert!(op.is_finished());
    Ok(())
}

#[test]
fn synchronous_hook_panicking_still_finishes() {
    init_tracing();

    let op = Operation::new(TaskOptions::named("panics"), |_: Completion| {
        panic!("boom");
    });

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| op.start()));

    assert!(result.is_err());
    assert!(op.is_finished());
}

#[test]
fn starting_twice_is_a_protocol_violation() -> TestResult {
    init_tracing();

    let op = Operation::new(TaskOptions::named("t"), CountingHook::finishing());
    op.start()?;

    let err = op.start().unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(matches!(
        err,
        TaskError::IllegalTransition {
            from: TaskState::Finished,
            to: TaskState::Executing,
            ..
        }
    ));
    assert_eq!(op.hook().runs(), 1);
    Ok(())
}

#[test]
fn restarting_a_cancelled_running_task_leaves_it_running() -> TestResult {
    init_tracing();

    let op = Operation::new(TaskOptions::named("a").asynchronous(), ParkedHook::default());
    op.start()?;
    op.cancel();

    let err = op.start().unwrap_err();
    assert!(matches!(
        err,
        TaskError::IllegalTransition {
            from: TaskState::Executing,
            to: TaskState::Finished,
            ..
        }
    ));
    assert!(op.is_executing(), "cancellation must not cut a running hook short");
    assert_eq!(op.hook().runs(), 1);

    // The hook still owns completion.
    let completion = op.hook().take().expect("hook did not run");
    completion.finish()?;
    assert!(op.is_finished());
    Ok(())
}

#[test]
fn restarting_a_cancelled_finished_task_is_rejected_even_when_ignoring_repeats() -> TestResult {
    init_tracing();

    let op = Operation::new(
        TaskOptions::named("done").repeated_finish(FinishPolicy::Ignore),
        CountingHook::finishing(),
    );
    op.start()?;
    op.cancel();

    let err = op.start().unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(matches!(
        err,
        TaskError::IllegalTransition {
            from: TaskState::Finished,
            ..
        }
    ));
    assert_eq!(op.hook().runs(), 1);
    Ok(())
}

#[test]
fn skip_execution_only_applies_to_unstarted_tasks() -> TestResult {
    let core = TaskCore::new(TaskOptions::named("t"));
    core.begin_executing()?;

    assert!(core.skip_execution().is_err());
    assert!(core.is_executing());

    let fresh = TaskCore::new(TaskOptions::named("fresh"));
    fresh.skip_execution()?;
    assert!(fresh.is_finished());
    Ok(())
}

#[test]
fn begin_executing_from_executing_is_rejected() -> TestResult {
    let core = TaskCore::new(TaskOptions::named("t"));
    core.begin_executing()?;

    let err = core.begin_executing().unwrap_err();
    assert!(matches!(
        err,
        TaskError::IllegalTransition {
            from: TaskState::Executing,
            ..
        }
    ));
    assert!(core.is_executing());
    Ok(())
}

#[test]
fn repeated_finish_is_rejected_by_default() -> TestResult {
    let core = TaskCore::new(TaskOptions::named("t"));
    core.begin_executing()?;
    core.finish()?;

    let err = core.finish().unwrap_err();
    assert!(matches!(err, TaskError::AlreadyFinished { .. }));
    assert!(core.is_finished());
    Ok(())
}

#[test]
fn repeated_finish_is_a_no_op_when_ignored() -> TestResult {
    let core = TaskCore::new(TaskOptions::named("t").repeated_finish(FinishPolicy::Ignore));
    core.begin_executing()?;
    core.finish()?;
    core.finish()?;

    assert!(core.is_finished());
    Ok(())
}

#[test]
fn finish_from_ready_skips_executing() -> TestResult {
    let core = TaskCore::new(TaskOptions::named("t"));
    core.finish()?;

    assert!(core.is_finished());
    assert!(core.begin_executing().is_err());
    Ok(())
}

#[test]
fn schedulable_only_while_ready_and_not_cancelled() -> TestResult {
    let core = TaskCore::new(TaskOptions::named("t"));
    assert!(core.is_schedulable());
    assert!(!core.has_started());

    core.begin_executing()?;
    assert!(!core.is_schedulable());
    assert!(core.has_started());

    let cancelled = TaskCore::new(TaskOptions::named("c"));
    cancelled.cancel();
    assert!(!cancelled.is_schedulable());
    Ok(())
}

#[test]
fn task_ids_are_unique() {
    let a = TaskCore::new(TaskOptions::named("a"));
    let b = TaskCore::new(TaskOptions::named("a"));
    assert_ne!(a.id(), b.id());
}
