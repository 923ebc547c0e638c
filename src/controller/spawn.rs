//! Spawn candidate ordering

use crate::profile::Point;

/// Primary spawn for a team plus its alternates in try order.
///
/// Candidates are authored as [team 0 primary, team 1 primary, alternates…]
/// with alternates sorted by decreasing likelihood that team 0 holds the
/// point, so the alternate order is reversed when selecting for team 1.
/// Returns `None` for a list shorter than the two primaries (the spawn table
/// rejects those at load time).
pub fn attempt_order(candidates: &[Point], team: u8) -> Option<(Point, Vec<Point>)> {
    let index = usize::from(team == 1);
    let primary = *candidates.get(index)?;

    let mut alternates: Vec<Point> = candidates.get(2..).unwrap_or(&[]).to_vec();
    if team == 1 {
        alternates.reverse();
    }

    Some((primary, alternates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[(i32, i32)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point { x, y }).collect()
    }

    #[test]
    fn test_primary_follows_team_index() {
        let candidates = points(&[(618, 218), (292, 296)]);

        let (primary_0, alternates_0) = attempt_order(&candidates, 0).unwrap();
        assert_eq!(primary_0, Point { x: 618, y: 218 });
        assert!(alternates_0.is_empty());

        let (primary_1, alternates_1) = attempt_order(&candidates, 1).unwrap();
        assert_eq!(primary_1, Point { x: 292, y: 296 });
        assert!(alternates_1.is_empty());
    }

    #[test]
    fn test_alternates_keep_authored_order_for_team_0() {
        let candidates = points(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        let (_, alternates) = attempt_order(&candidates, 0).unwrap();
        assert_eq!(alternates, points(&[(3, 3), (4, 4), (5, 5)]));
    }

    #[test]
    fn test_alternates_reverse_for_team_1() {
        let candidates = points(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        let (_, alternates) = attempt_order(&candidates, 1).unwrap();
        assert_eq!(alternates, points(&[(5, 5), (4, 4), (3, 3)]));
    }

    #[test]
    fn test_short_candidate_list_is_rejected() {
        let candidates = points(&[(1, 1)]);
        assert!(attempt_order(&candidates, 0).is_some());
        assert!(attempt_order(&candidates, 1).is_none());
        assert!(attempt_order(&[], 0).is_none());
    }
}
