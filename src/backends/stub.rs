// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::traits::{Arity, Postcondition, Work};

/// Shared, ordered record of `(node, index)` invocations across work units.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<(String, Option<usize>)>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, Option<usize>)> {
        self.0.lock().unwrap().clone()
    }

    pub fn nodes(&self) -> Vec<String> {
        self.calls().into_iter().map(|(node, _)| node).collect()
    }

    fn push(&self, node: &str, index: Option<usize>) {
        self.0.lock().unwrap().push((node.to_string(), index));
    }
}

/// Work that records each invocation and succeeds
pub struct RecordingWork {
    label: String,
    log: CallLog,
    arity: Arity,
}

impl RecordingWork {
    pub fn new() -> Self {
        Self::logged("anonymous", &CallLog::new())
    }

    pub fn logged(label: &str, log: &CallLog) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
            arity: Arity::Nullary,
        }
    }

    pub fn indexed(mut self) -> Self {
        self.arity = Arity::Indexed;
        self
    }
}

impl Work for RecordingWork {
    fn invoke(&self, index: Option<usize>) -> anyhow::Result<()> {
        self.log.push(&self.label, index);
        Ok(())
    }

    fn arity(&self) -> Arity {
        self.arity
    }
}

/// Work that fails, optionally only for one fan-out index
pub struct FailingWork {
    label: String,
    log: CallLog,
    fail_on: Option<usize>,
}

impl FailingWork {
    pub fn always(label: &str, log: &CallLog) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
            fail_on: None,
        }
    }

    pub fn on_index(label: &str, log: &CallLog, index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::always(label, log)
        }
    }
}

impl Work for FailingWork {
    fn invoke(&self, index: Option<usize>) -> anyhow::Result<()> {
        self.log.push(&self.label, index);
        match self.fail_on {
            Some(fail_on) if index != Some(fail_on) => Ok(()),
            _ => anyhow::bail!("simulated failure"),
        }
    }

    fn arity(&self) -> Arity {
        Arity::Indexed
    }
}

/// Postcondition with a value the test can flip
pub struct FixedPostcondition {
    value: Arc<AtomicBool>,
}

#[derive(Clone)]
pub struct FixedHandle(Arc<AtomicBool>);

impl FixedHandle {
    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::SeqCst);
    }
}

impl FixedPostcondition {
    pub fn new(value: bool) -> Self {
        Self {
            value: Arc::new(AtomicBool::new(value)),
        }
    }

    pub fn handle(&self) -> FixedHandle {
        FixedHandle(self.value.clone())
    }
}

impl Postcondition for FixedPostcondition {
    fn check(&self) -> anyhow::Result<bool> {
        Ok(self.value.load(Ordering::SeqCst))
    }

    fn describe(&self) -> String {
        format!("fixed({})", self.value.load(Ordering::SeqCst))
    }
}

/// Postcondition that errors instead of answering
pub struct FailingPostcondition;

impl Postcondition for FailingPostcondition {
    fn check(&self) -> anyhow::Result<bool> {
        anyhow::bail!("predicate blew up")
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}
