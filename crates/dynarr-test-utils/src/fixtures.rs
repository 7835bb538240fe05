//! Instrumented element types.
//!
//! - [`Tracked`] counts its drops through a shared [`DropCounter`].
//! - [`Flaky`] succeeds a configurable number of constructions (new or
//!   clone) and then fails, either by returning [`ConstructFailure`] or, from
//!   `Clone::clone`, by unwinding with it as the payload.
//!
//! Everything here uses `Rc`/`Cell`: the containers under test are
//! single-threaded, and so are these fixtures.

use std::cell::Cell;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Shared count of drops across a family of values.
#[derive(Clone, Debug, Default)]
pub struct DropCounter(Rc<Cell<usize>>);

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops recorded so far.
    pub fn get(&self) -> usize {
        self.0.get()
    }

    /// Create a value that reports its drop to this counter.
    pub fn tracked(&self, id: usize) -> Tracked {
        Tracked {
            id,
            drops: self.clone(),
        }
    }

    fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// A value that records its drop.
///
/// Clones share the counter, so every clone's drop is counted too.
#[derive(Clone)]
pub struct Tracked {
    pub id: usize,
    drops: DropCounter,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.bump();
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.id)
    }
}

/// Construction failure raised by [`Flaky`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstructFailure {
    /// Which construction attempt failed, counting from 1.
    pub attempt: usize,
}

impl fmt::Display for ConstructFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "construction attempt {} refused", self.attempt)
    }
}

impl Error for ConstructFailure {}

/// Number of constructions allowed to succeed before the next one fails.
///
/// Shared by every [`Flaky`] built from it. An unlimited budget never fails.
#[derive(Clone, Debug)]
pub struct CloneBudget {
    remaining: Rc<Cell<Option<usize>>>,
    attempts: Rc<Cell<usize>>,
}

impl CloneBudget {
    /// A budget that never runs out.
    pub fn unlimited() -> Self {
        Self {
            remaining: Rc::new(Cell::new(None)),
            attempts: Rc::new(Cell::new(0)),
        }
    }

    /// A budget that lets `successes` constructions through, then fails
    /// every later one.
    pub fn failing_after(successes: usize) -> Self {
        let budget = Self::unlimited();
        budget.remaining.set(Some(successes));
        budget
    }

    /// Re-arm the budget with `successes` more constructions.
    pub fn rearm(&self, successes: usize) {
        self.remaining.set(Some(successes));
    }

    /// Stop failing.
    pub fn disarm(&self) {
        self.remaining.set(None);
    }

    /// Construction attempts made so far, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    /// Spend one construction, failing if the budget is exhausted.
    pub fn spend(&self) -> Result<(), ConstructFailure> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        match self.remaining.get() {
            None => Ok(()),
            Some(0) => Err(ConstructFailure { attempt }),
            Some(n) => {
                self.remaining.set(Some(n - 1));
                Ok(())
            }
        }
    }
}

/// An element whose construction fails once its [`CloneBudget`] runs out.
pub struct Flaky {
    pub value: u32,
    budget: CloneBudget,
    drops: DropCounter,
}

impl Flaky {
    /// Construct without spending budget.
    pub fn new(value: u32, budget: &CloneBudget, drops: &DropCounter) -> Self {
        Self {
            value,
            budget: budget.clone(),
            drops: drops.clone(),
        }
    }

    /// Construct, spending one unit of budget.
    pub fn try_new(
        value: u32,
        budget: &CloneBudget,
        drops: &DropCounter,
    ) -> Result<Self, ConstructFailure> {
        budget.spend()?;
        Ok(Self::new(value, budget, drops))
    }

    /// Clone, spending one unit of budget.
    pub fn try_clone(&self) -> Result<Self, ConstructFailure> {
        Self::try_new(self.value, &self.budget, &self.drops)
    }
}

impl Clone for Flaky {
    /// Unwinds with a [`ConstructFailure`] payload when the budget is spent.
    ///
    /// Uses `resume_unwind`, so no panic hook runs and nothing is printed
    /// or allocated beyond the payload box.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(failure) => panic::resume_unwind(Box::new(failure)),
        }
    }
}

impl Drop for Flaky {
    fn drop(&mut self) {
        self.drops.bump();
    }
}

impl fmt::Debug for Flaky {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flaky({})", self.value)
    }
}

/// Run `f`, catching an unwind carrying a [`ConstructFailure`].
///
/// Any other panic is propagated unchanged.
pub fn catch_construct_failure<R>(f: impl FnOnce() -> R) -> Result<R, ConstructFailure> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<ConstructFailure>() {
            Ok(failure) => Err(*failure),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_counts_drops_of_clones() {
        let drops = DropCounter::new();
        let a = drops.tracked(1);
        let b = a.clone();
        drop(a);
        drop(b);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn budget_fails_after_allowance() {
        let budget = CloneBudget::failing_after(2);
        assert!(budget.spend().is_ok());
        assert!(budget.spend().is_ok());
        assert_eq!(budget.spend(), Err(ConstructFailure { attempt: 3 }));
        assert_eq!(budget.spend(), Err(ConstructFailure { attempt: 4 }));
        budget.disarm();
        assert!(budget.spend().is_ok());
        assert_eq!(budget.attempts(), 5);
    }

    #[test]
    fn flaky_clone_unwinds_with_failure() {
        let budget = CloneBudget::failing_after(0);
        let drops = DropCounter::new();
        let original = Flaky::new(7, &budget, &drops);
        let result = catch_construct_failure(|| original.clone());
        assert_eq!(result.err(), Some(ConstructFailure { attempt: 1 }));
        assert_eq!(drops.get(), 0);
    }

    #[test]
    fn flaky_try_new_spends_budget() {
        let budget = CloneBudget::failing_after(1);
        let drops = DropCounter::new();
        let first = Flaky::try_new(1, &budget, &drops);
        assert!(first.is_ok());
        assert!(Flaky::try_new(2, &budget, &drops).is_err());
        drop(first);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    #[should_panic(expected = "unrelated")]
    fn other_panics_propagate() {
        let _ = catch_construct_failure(|| panic!("unrelated"));
    }
}
