//! Bounded polling primitive shared by all interaction flows

use std::thread;
use std::time::Duration;

use crate::error::Result;

/// Repeatedly evaluate `predicate` until it reports true, sleeping
/// `interval` between attempts.
///
/// Exhausting `max_attempts` is a soft timeout reported as `Ok(false)`;
/// callers retry or fall back. The predicate runs exactly `max_attempts`
/// times in the worst case. Errors from the predicate propagate immediately.
pub fn poll_until<F>(mut predicate: F, interval: Duration, max_attempts: u32) -> Result<bool>
where
    F: FnMut() -> Result<bool>,
{
    let mut attempt = 0;
    while attempt < max_attempts {
        if predicate()? {
            return Ok(true);
        }
        attempt += 1;
        if attempt < max_attempts {
            thread::sleep(interval);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_always_false_predicate_runs_exactly_max_attempts() {
        let mut evaluations = 0;
        let result = poll_until(
            || {
                evaluations += 1;
                Ok(false)
            },
            Duration::ZERO,
            7,
        )
        .unwrap();

        assert!(!result);
        assert_eq!(evaluations, 7);
    }

    #[test]
    fn test_returns_on_first_success() {
        let mut evaluations = 0;
        let result = poll_until(
            || {
                evaluations += 1;
                Ok(evaluations == 3)
            },
            Duration::ZERO,
            10,
        )
        .unwrap();

        assert!(result);
        assert_eq!(evaluations, 3);
    }

    #[test]
    fn test_zero_attempts_never_evaluates() {
        let mut evaluations = 0;
        let result = poll_until(
            || {
                evaluations += 1;
                Ok(true)
            },
            Duration::ZERO,
            0,
        )
        .unwrap();

        assert!(!result);
        assert_eq!(evaluations, 0);
    }

    #[test]
    fn test_predicate_error_propagates() {
        let result = poll_until(
            || Err(Error::Capture("screen gone".to_string())),
            Duration::ZERO,
            5,
        );
        assert!(matches!(result, Err(Error::Capture(_))));
    }
}
