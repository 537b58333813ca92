//! Dominance kernel: the partial order every front decision is made with.
//!
//! All objectives are minimised. `a` dominates `b` when it is no worse in every
//! objective and strictly better in at least one. Equal vectors do not dominate
//! each other; they are treated as duplicates by the callers.

use super::ledger::Label;
use std::cmp::Ordering;

#[inline(always)]
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// `a` dominates `b` or is equal to it.
#[inline(always)]
pub fn covers(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y)
}

/// True iff no member of `front` dominates or equals `candidate`.
pub fn is_non_dominated(candidate: &[f64], front: &[Label]) -> bool {
    !front.iter().any(|label| covers(&label.cost, candidate))
}

/// Lexicographic order on cost vectors, used only to schedule expansion.
#[inline]
pub fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[1.0, 1.0], &[2.0, 2.0], true)]
    #[case(&[1.0, 2.0], &[1.0, 3.0], true)]
    #[case(&[1.0, 1.0], &[1.0, 1.0], false)] // Equal vectors never dominate
    #[case(&[1.0, 5.0], &[5.0, 1.0], false)] // Incomparable
    #[case(&[2.0, 2.0], &[1.0, 1.0], false)]
    #[case(&[3.0], &[4.0], true)]
    fn test_dominates(#[case] a: &[f64], #[case] b: &[f64], #[case] expected: bool) {
        assert_eq!(dominates(a, b), expected);
    }

    #[test]
    fn test_is_non_dominated_false_iff_covered() {
        let front = vec![Label::new([2.0, 6.0].into_iter().collect()), Label::new([6.0, 2.0].into_iter().collect())];
        assert!(!is_non_dominated(&[10.0, 10.0], &front)); // dominated
        assert!(!is_non_dominated(&[2.0, 6.0], &front));   // equal
        assert!(is_non_dominated(&[3.0, 3.0], &front));    // incomparable to both
        assert!(is_non_dominated(&[1.0, 1.0], &front));    // dominates both
        assert!(is_non_dominated(&[1.0, 1.0], &[]));
    }

    #[test]
    fn test_lexicographic_order() {
        assert_eq!(lexicographic(&[1.0, 9.0], &[2.0, 0.0]), Ordering::Less);
        assert_eq!(lexicographic(&[1.0, 2.0], &[1.0, 1.0]), Ordering::Greater);
        assert_eq!(lexicographic(&[1.0, 1.0], &[1.0, 1.0]), Ordering::Equal);
    }
}
