//! Key path recorder.
//!
//! Records the member reads performed on cooperating objects while `capture` evaluates an
//! expression, and turns them into a `KeyPath`.
use crate::{Error, KeyPath, Object, Result, Value};
use keypath_common::{Atom, Data};
use smallvec::SmallVec;
use std::cell::RefCell;
use tracing::{debug, trace};

/// Start point and end point of the recorded member chain.
struct Terminals {
    /// Receiver of the first recorded access.
    start: Object,
    /// Value produced by the last recorded access.
    end: Value,
}

/// State of a capture in progress.
#[derive(Default)]
struct Session {
    terminals: Option<Terminals>,
    keys: SmallVec<[Atom; 4]>,
    /// Set while a recorded member is being read. Reads performed by the member itself
    /// (computed members) are not recorded.
    busy: bool,
}

thread_local! {
    // Each thread has its own session, so concurrent captures never see each other's reads.
    // `None` when no capture is running on this thread.
    static SESSION: RefCell<Option<Session>> = RefCell::new(None);
}

/// Closes the session of the current thread when dropped.
///
/// Covers every way out of `capture`, including errors and panics in the expression.
struct SessionGuard;

impl SessionGuard {
    fn open() -> Result<SessionGuard> {
        SESSION.with(|cell| {
            let mut session = cell.borrow_mut();
            if session.is_some() {
                return Err(Error::ReentrantCapture);
            }
            *session = Some(Session::default());
            Ok(SessionGuard)
        })
    }

    fn take(&self) -> Option<Session> {
        SESSION.with(|cell| cell.borrow_mut().take())
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        // the TLS slot may already be gone if the thread is exiting
        let _ = SESSION.try_with(|cell| cell.borrow_mut().take());
    }
}

/// Clears the `busy` flag of the current session when dropped.
struct BusyGuard;

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let _ = SESSION.try_with(|cell| {
            if let Some(session) = cell.borrow_mut().as_mut() {
                session.busy = false;
            }
        });
    }
}

/// Runs `f` without recording any member read it performs.
pub(crate) fn suppressed<R>(f: impl FnOnce() -> R) -> R {
    let was_busy = SESSION.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .map(|session| std::mem::replace(&mut session.busy, true))
    });
    match was_busy {
        Some(false) => {
            let _busy = BusyGuard;
            f()
        }
        // no session, or reads are already suppressed
        _ => f(),
    }
}

/// Returns whether a capture is running on the current thread.
pub fn is_capturing() -> bool {
    SESSION.with(|cell| cell.borrow().is_some())
}

/// Evaluates `expr` once and returns the key path of the member chain it performed.
///
/// The root of the path is the receiver of the first recorded access.
///
/// # Errors
///
/// * `ReentrantCapture` if a capture is already running on this thread.
/// * `NoAccessRecorded` if `expr` did not read any member of a cooperating object, or if its
///   result is not the value produced by the last member read (e.g. a comparison).
/// * `BrokenChain` if a member was read from something that is not the result of the
///   previous read.
/// * any error returned by `expr` itself, unchanged.
pub fn capture(expr: impl FnOnce() -> Result<Value>) -> Result<KeyPath> {
    let guard = SessionGuard::open()?;
    trace!("key path capture started");

    let result = expr();
    let session = guard.take();
    drop(guard);

    let value = match result {
        Ok(value) => value,
        Err(err) => {
            debug!("key path capture failed: {err}");
            return Err(err);
        }
    };

    let Session { terminals, keys, .. } = session.unwrap_or_default();

    let Some(Terminals { start, end }) = terminals else {
        debug_assert!(keys.is_empty());
        debug!("key path capture failed: no key recorded");
        return Err(Error::NoAccessRecorded);
    };

    if !end.same(&value) {
        debug!(?keys, "key path capture failed: the captured value is not the end of the member chain");
        return Err(Error::NoAccessRecorded);
    }

    trace!(?keys, "key path captured");
    Ok(KeyPath::from_recorded(start, keys.into_iter().collect()))
}

/// Reads a member of `receiver`, recording it if a capture is running on this thread.
pub(crate) fn read(receiver: &Object, key: &str) -> Result<Value> {
    let recording = SESSION.with(|cell| {
        let mut session = cell.borrow_mut();
        let Some(session) = session.as_mut() else {
            return Ok(false);
        };
        if session.busy {
            return Ok(false);
        }
        if let Some(ref terminals) = session.terminals {
            if !terminals.end.is_object(receiver) {
                return Err(Error::BrokenChain { key: key.into() });
            }
        }
        session.busy = true;
        Ok(true)
    })?;

    if !recording {
        return receiver.read_member(key);
    }

    let _busy = BusyGuard;
    // no borrow of the session is held here: computed members may read other members
    let value = receiver.read_member(key)?;

    SESSION.with(|cell| {
        if let Some(session) = cell.borrow_mut().as_mut() {
            match session.terminals {
                Some(ref mut terminals) => terminals.end = value.clone(),
                None => {
                    session.terminals = Some(Terminals {
                        start: receiver.clone(),
                        end: value.clone(),
                    })
                }
            }
            trace!(key, "recorded key");
            session.keys.push(key.into());
        }
    });

    Ok(value)
}
