//! Win detector.

use std::collections::BTreeSet;

/// Five positions that win when all are stamped.
pub type Line = [usize; 5];

/// Rows, then columns, then the two diagonals.
pub const WINNING_LINES: [Line; 12] = [
    [0, 1, 2, 3, 4],
    [5, 6, 7, 8, 9],
    [10, 11, 12, 13, 14],
    [15, 16, 17, 18, 19],
    [20, 21, 22, 23, 24],
    [0, 5, 10, 15, 20],
    [1, 6, 11, 16, 21],
    [2, 7, 12, 17, 22],
    [3, 8, 13, 18, 23],
    [4, 9, 14, 19, 24],
    [0, 6, 12, 18, 24],
    [4, 8, 12, 16, 20],
];

/// First line fully covered by `stamped`.
///
/// The free space is not added here: callers pass a set that already holds it.
pub fn winning_line(stamped: &BTreeSet<usize>) -> Option<&'static Line> {
    WINNING_LINES
        .iter()
        .find(|line| line.iter().all(|position| stamped.contains(position)))
}

pub fn has_bingo(stamped: &BTreeSet<usize>) -> bool {
    winning_line(stamped).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(positions: &[usize]) -> BTreeSet<usize> {
        positions.iter().copied().collect()
    }

    #[test]
    fn test_row_with_free_space() {
        assert!(has_bingo(&set(&[0, 1, 2, 3, 12, 4])));
        assert!(has_bingo(&set(&[10, 11, 12, 13, 14])));
        assert!(!has_bingo(&set(&[0, 1, 2, 3])));
        assert!(!has_bingo(&set(&[0, 1, 2, 3, 12])));
    }

    #[test]
    fn test_columns_and_diagonals() {
        assert!(has_bingo(&set(&[2, 7, 12, 17, 22])));
        assert_eq!(
            winning_line(&set(&[0, 6, 12, 18, 24])),
            Some(&[0, 6, 12, 18, 24])
        );
        assert_eq!(
            winning_line(&set(&[4, 8, 12, 16, 20, 1])),
            Some(&[4, 8, 12, 16, 20])
        );
    }

    #[test]
    fn test_scattered_stamps_do_not_win() {
        // Every row, column and diagonal is one short
        assert!(!has_bingo(&set(&[0, 1, 2, 3, 5, 6, 7, 9, 12, 13, 14, 15, 19, 21, 22, 23])));
        assert!(!has_bingo(&set(&[12])));
    }

    #[test]
    fn test_lines_are_well_formed() {
        for line in WINNING_LINES.iter() {
            assert!(line.iter().all(|p| *p < 25));
            assert_eq!(set(line).len(), 5);
        }
        let through_centre = WINNING_LINES.iter().filter(|l| l.contains(&12)).count();
        assert_eq!(through_centre, 4);
    }

    proptest! {
        #[test]
        fn prop_full_line_always_wins(
            line in 0usize..12,
            extra in proptest::collection::btree_set(0usize..25, 0..20),
        ) {
            let mut stamped = extra;
            stamped.extend(WINNING_LINES[line]);
            prop_assert!(has_bingo(&stamped));
        }

        #[test]
        fn prop_four_stamps_never_win(stamped in proptest::collection::btree_set(0usize..25, 0..5)) {
            prop_assume!(stamped.len() < 5);
            prop_assert!(!has_bingo(&stamped));
        }

        #[test]
        fn prop_bingo_matches_some_line(stamped in proptest::collection::btree_set(0usize..25, 0..25)) {
            let covers = WINNING_LINES.iter().any(|l| l.iter().all(|p| stamped.contains(p)));
            prop_assert_eq!(has_bingo(&stamped), covers);
        }
    }
}
