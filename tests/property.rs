use proptest::prelude::*;
use taskstate::{FinishPolicy, TaskCore, TaskOptions, TaskState};
use taskstate_test_utils::recording::RecordingObserver;

#[derive(Debug, Clone, Copy)]
enum Op {
    Begin,
    Finish,
    Cancel,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Begin), Just(Op::Finish), Just(Op::Cancel)]
}

fn policy_strategy() -> impl Strategy<Value = FinishPolicy> {
    prop_oneof![Just(FinishPolicy::Reject), Just(FinishPolicy::Ignore)]
}

proptest! {
    #[test]
    fn random_operation_sequences_respect_the_state_machine(
        ops in proptest::collection::vec(op_strategy(), 0..20),
        policy in policy_strategy(),
    ) {
        let core = std::sync::Arc::new(TaskCore::new(TaskOptions::named("prop").repeated_finish(policy)));
        let recorder = RecordingObserver::new();
        core.observe(recorder.clone());

        let mut expected = TaskState::Ready;

        for op in ops {
            let before = core.state();
            let result = match op {
                Op::Begin => core.begin_executing(),
                Op::Finish => core.finish(),
                Op::Cancel => {
                    core.cancel();
                    Ok(())
                }
            };

            // Model of the legal transitions.
            match (op, before) {
                (Op::Begin, TaskState::Ready) => {
                    prop_assert!(result.is_ok());
                    expected = TaskState::Executing;
                }
                (Op::Begin, _) => prop_assert!(result.is_err()),
                (Op::Finish, TaskState::Finished) => {
                    prop_assert_eq!(result.is_ok(), policy == FinishPolicy::Ignore);
                }
                (Op::Finish, _) => {
                    prop_assert!(result.is_ok());
                    expected = TaskState::Finished;
                }
                (Op::Cancel, _) => prop_assert!(result.is_ok()),
            }

            prop_assert_eq!(core.state(), expected);
            let flags = [core.is_ready(), core.is_executing(), core.is_finished()];
            prop_assert_eq!(flags.iter().filter(|b| **b).count(), 1);
        }

        // Announced transitions are strictly increasing and paired.
        let sequence = recorder.sequence();
        prop_assert_eq!(sequence.len() % 2, 0);
        for pair in sequence.chunks(2) {
            prop_assert_eq!(pair[0].1, pair[1].1);
            prop_assert_eq!(pair[0].2, pair[1].2);
            prop_assert!(pair[0].1 < pair[0].2);
        }
        for window in sequence.chunks(2).collect::<Vec<_>>().windows(2) {
            prop_assert_eq!(window[0][0].2, window[1][0].1);
        }
    }
}
