//! Standard trimmers for scalar values.

use crate::dissect::Trimmer;
use crate::stream::Stream;
use std::rc::Rc;

/// Fraction steps tried per float shrink.
const FRACTION_STEPS: usize = 10;

/// Integer candidates moving toward `target`.
///
/// For `v` at distance `d` from the target the candidates are
/// `v - d, v - d/2, v - d/4, ...` ending at `v - 1` (or `v + 1`): the
/// target itself first, then ever closer to `v`. A greedy walk over these
/// candidates settles on the exact boundary of a failing region.
pub fn towards(target: i64) -> Trimmer<i64> {
    Rc::new(move |value: &i64| {
        let value = *value;
        let distance = i128::from(value) - i128::from(target);
        Stream::unfold(distance, move |d| {
            if d == 0 {
                return None;
            }
            Some(((i128::from(value) - d) as i64, d / 2))
        })
    })
}

/// Shrink toward `false`.
pub fn falsify() -> Trimmer<bool> {
    Rc::new(|value: &bool| {
        if *value {
            Stream::singleton(false)
        } else {
            Stream::empty()
        }
    })
}

/// Float candidates moving the integer part toward that of `target`,
/// keeping the fraction.
pub fn integer_part(target: f64) -> Trimmer<f64> {
    let goal = target.trunc();
    Rc::new(move |value: &f64| {
        let (whole, fraction) = (value.trunc(), value.fract());
        if !whole.is_finite() || whole == goal {
            return Stream::empty();
        }
        Stream::unfold(whole - goal, move |d: f64| {
            if d == 0.0 {
                return None;
            }
            Some((whole - d + fraction, (d / 2.0).trunc()))
        })
    })
}

/// Float candidates moving the fraction toward that of `target`, keeping
/// the integer part. At most a fixed number of steps are offered.
pub fn fraction_part(target: f64) -> Trimmer<f64> {
    let goal = target.fract();
    Rc::new(move |value: &f64| {
        let (whole, fraction) = (value.trunc(), value.fract());
        if !fraction.is_finite() || fraction == goal {
            return Stream::empty();
        }
        let steps = Stream::unfold((fraction - goal, 0usize), move |(d, step): (f64, usize)| {
            if step == FRACTION_STEPS {
                return None;
            }
            Some((whole + fraction - d, (d / 2.0, step + 1)))
        });
        let current = whole + fraction;
        steps.filter(move |candidate| *candidate != current)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates<T: Clone + 'static>(trimmer: &Trimmer<T>, value: T) -> Vec<T> {
        trimmer(&value).take(100)
    }

    #[test]
    fn test_towards_zero() {
        assert_eq!(candidates(&towards(0), 10), vec![0, 5, 8, 9]);
        assert_eq!(candidates(&towards(0), -7), vec![0, -4, -6]);
        assert!(candidates(&towards(0), 0).is_empty());
    }

    #[test]
    fn test_towards_ends_adjacent() {
        for v in [1i64, 2, 3, 17, 1000, 9999, -250] {
            let c = candidates(&towards(0), v);
            assert_eq!(c[0], 0);
            assert_eq!(*c.last().unwrap(), v - v.signum());
        }
    }

    #[test]
    fn test_towards_extremes() {
        let c = candidates(&towards(0), i64::MIN);
        assert_eq!(c[0], 0);
        assert_eq!(*c.last().unwrap(), i64::MIN + 1);
        let c = candidates(&towards(i64::MIN), i64::MAX);
        assert_eq!(c[0], i64::MIN);
    }

    #[test]
    fn test_towards_nonzero_target() {
        assert_eq!(candidates(&towards(5), 9), vec![5, 7, 8]);
        assert_eq!(candidates(&towards(5), 1), vec![5, 3, 2]);
    }

    #[test]
    fn test_falsify() {
        assert_eq!(candidates(&falsify(), true), vec![false]);
        assert!(candidates(&falsify(), false).is_empty());
    }

    #[test]
    fn test_integer_part() {
        let c = candidates(&integer_part(0.0), 8.25);
        assert_eq!(c, vec![0.25, 4.25, 6.25, 7.25]);
        assert!(candidates(&integer_part(0.0), 0.5).is_empty());
    }

    #[test]
    fn test_fraction_part() {
        let c = candidates(&fraction_part(0.0), 3.5);
        assert_eq!(c.len(), FRACTION_STEPS);
        assert_eq!(c[0], 3.0);
        assert_eq!(c[1], 3.25);
        assert!(c.iter().all(|x| (3.0..3.5).contains(x)));
        assert!(candidates(&fraction_part(0.0), 2.0).is_empty());
    }
}
