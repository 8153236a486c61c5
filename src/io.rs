//! I/O-failure adapters.
//!
//! Turn "did this I/O call fail?" into a plain `bool` for call sites that
//! only care about success, e.g. best-effort flushes inside a per-item action.

use std::io;

/// Runs `action` and reports whether it failed with an I/O error.
///
/// Panics are not caught.
///
/// # Example
/// ```
/// use std::io;
/// use batchvisor::did_raise_io_failure;
///
/// assert!(!did_raise_io_failure(|| Ok(())));
/// assert!(did_raise_io_failure(|| Err(io::Error::other("broken pipe"))));
/// ```
pub fn did_raise_io_failure<F>(action: F) -> bool
where
    F: FnOnce() -> io::Result<()>,
{
    action().is_err()
}

/// Like [`did_raise_io_failure`] for actions that may fail in other ways too.
///
/// Returns `Ok(true)` when the root cause of the error is an [`io::Error`],
/// `Ok(false)` on success, and hands every other error back unchanged.
pub fn try_did_raise_io_failure<F>(action: F) -> anyhow::Result<bool>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match action() {
        Ok(()) => Ok(false),
        Err(e) if e.root_cause().downcast_ref::<io::Error>().is_some() => Ok(true),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn test_io_error_is_reported() {
        assert!(did_raise_io_failure(|| Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "reset"
        ))));
        assert!(!did_raise_io_failure(|| Ok(())));
    }

    #[test]
    fn test_wrapped_io_error_is_reported() {
        let res = try_did_raise_io_failure(|| {
            Err(io::Error::other("disk gone")).context("flushing batch")
        });
        assert!(res.unwrap());
    }

    #[test]
    fn test_other_errors_propagate() {
        let err = try_did_raise_io_failure(|| Err(anyhow!("schema mismatch"))).unwrap_err();
        assert_eq!(err.to_string(), "schema mismatch");
        assert!(!try_did_raise_io_failure(|| Ok(())).unwrap());
    }

    #[test]
    #[should_panic(expected = "not an io failure")]
    fn test_panics_are_not_swallowed() {
        did_raise_io_failure(|| panic!("not an io failure"));
    }
}
