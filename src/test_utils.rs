//! Test utilities
//!
//! Fakes for the runner and event sink, and proptest generators.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// One step in a simulated watch session
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Op {
        /// Something changed
        Trigger,
        /// The running process exits with this code
        Exit(Option<i32>),
    }

    /// Exit codes: mostly success, some failures, some signal terminations
    pub fn exit_code() -> impl Strategy<Value = Option<i32>> {
        prop_oneof![
            6 => Just(Some(0)),
            2 => (1i32..128).prop_map(Some),
            1 => Just(None),
        ]
    }

    /// Interleaved triggers and exits, biased toward bursts of triggers
    pub fn trigger_ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(
            prop_oneof![
                3 => Just(Op::Trigger),
                2 => exit_code().prop_map(Op::Exit),
            ],
            0..max_len,
        )
    }
}

#[cfg(test)]
pub mod fakes {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use crate::core::command::RebuildCommand;
    use crate::core::events::{EventSink, RebuildEvent};
    use crate::core::runner::{CompletionCallback, ProcessRunner};
    use crate::error::RunnerError;

    #[derive(Default)]
    struct FakeRunnerState {
        launched: Vec<RebuildCommand>,
        running: VecDeque<CompletionCallback>,
        fail_spawns: bool,
    }

    /// Runner that records launches and lets tests decide when they exit
    #[derive(Clone, Default)]
    pub struct FakeRunner {
        inner: Arc<Mutex<FakeRunnerState>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent launches fail as if the program were missing
        pub fn fail_spawns(&self, fail: bool) {
            self.inner.lock().unwrap().fail_spawns = fail;
        }

        /// Number of successful launches
        pub fn launches(&self) -> usize {
            self.inner.lock().unwrap().launched.len()
        }

        /// Number of launched processes that have not exited yet
        pub fn running(&self) -> usize {
            self.inner.lock().unwrap().running.len()
        }

        /// Commands launched so far
        pub fn launched(&self) -> Vec<RebuildCommand> {
            self.inner.lock().unwrap().launched.clone()
        }

        /// Let the oldest running process exit with `code`
        ///
        /// Returns false if nothing is running.
        pub fn finish(&self, code: Option<i32>) -> bool {
            let callback = self.inner.lock().unwrap().running.pop_front();
            match callback {
                Some(callback) => {
                    callback(code);
                    true
                }
                None => false,
            }
        }
    }

    impl ProcessRunner for FakeRunner {
        fn launch(
            &mut self,
            command: &RebuildCommand,
            on_exit: CompletionCallback,
        ) -> Result<(), RunnerError> {
            let mut state = self.inner.lock().unwrap();
            if state.fail_spawns {
                return Err(RunnerError::Spawn {
                    program: command.program.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                });
            }
            state.launched.push(command.clone());
            state.running.push_back(on_exit);
            Ok(())
        }
    }

    /// Sink that keeps every event
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<RebuildEvent>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<RebuildEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &RebuildEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_trigger_ops_generator(ops in trigger_ops(32)) {
            prop_assert!(ops.len() < 32);
        }

        #[test]
        fn test_exit_code_generator(code in exit_code()) {
            if let Some(code) = code {
                prop_assert!((0..128).contains(&code));
            }
        }
    }
}
