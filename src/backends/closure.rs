// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Work units backed by Rust closures.
//!
//! Closures cannot be serialized, so their [`WorkSpec`] is a reference by
//! node name: the runner process re-declares the workflow and looks the
//! closure up in its own graph.

use std::sync::Arc;

use anyhow::bail;

use crate::traits::{Arity, Work};

type Callable = dyn Fn(Option<usize>) -> anyhow::Result<()> + Send + Sync;

pub struct FnWork {
    f: Box<Callable>,
    arity: Arity,
}

impl Work for FnWork {
    fn invoke(&self, index: Option<usize>) -> anyhow::Result<()> {
        (self.f)(index)
    }

    fn arity(&self) -> Arity {
        self.arity
    }
}

/// Wrap a closure that takes no arguments.
///
/// Fan-out instances of a nullary closure all run the same call.
pub fn work_fn<F>(f: F) -> Arc<dyn Work>
where
    F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(FnWork {
        f: Box::new(move |_| f()),
        arity: Arity::Nullary,
    })
}

/// Wrap a closure that receives its fan-out index.
pub fn indexed_fn<F>(f: F) -> Arc<dyn Work>
where
    F: Fn(usize) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(FnWork {
        f: Box::new(move |index| match index {
            Some(index) => f(index),
            None => bail!("indexed work invoked without a task index"),
        }),
        arity: Arity::Indexed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::WorkSpec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_work_fn_ignores_index() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let work = work_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        work.invoke(None).unwrap();
        work.invoke(Some(4)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(work.arity(), Arity::Nullary);
    }

    #[test]
    fn test_indexed_fn_receives_index() {
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = seen.clone();
        let work = indexed_fn(move |i| {
            sink.store(i, Ordering::SeqCst);
            Ok(())
        });

        work.invoke(Some(7)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert!(work.invoke(None).is_err());
        assert_eq!(work.arity(), Arity::Indexed);
    }

    #[test]
    fn test_closure_spec_is_registered_by_node_name() {
        let work = work_fn(|| Ok(()));
        assert_eq!(
            work.spec("merge_train"),
            WorkSpec::Registered {
                name: "merge_train".to_string()
            }
        );
    }
}
