//! Spawn Selection Properties
//!
//! Validates the bundled spawn table and the candidate ordering rules over
//! every entry: team 0 always targets index 0 first, team 1 index 1, and
//! alternate spawns are tried in authored order for team 0 and reversed
//! order for team 1.
//!
//! Run with: cargo test --test spawn_selection

use bf2_spectator::controller::attempt_order;
use bf2_spectator::error::Error;
use bf2_spectator::profile::{Point, SpawnTable};

#[test]
fn every_entry_has_two_primaries() {
    let table = SpawnTable::load_default().unwrap();

    let mut entries = 0;
    for (map, size, points) in table.iter() {
        assert!(
            points.len() >= 2,
            "{}/{} has fewer than two spawn points",
            map,
            size
        );
        entries += 1;
    }
    assert!(entries > 0);
}

#[test]
fn primary_targets_follow_team_index_for_every_entry() {
    let table = SpawnTable::load_default().unwrap();

    for (map, size, points) in table.iter() {
        let (primary_0, _) = attempt_order(points, 0)
            .unwrap_or_else(|| panic!("{}/{} rejected for team 0", map, size));
        let (primary_1, _) = attempt_order(points, 1)
            .unwrap_or_else(|| panic!("{}/{} rejected for team 1", map, size));

        assert_eq!(primary_0, points[0], "{}/{} team 0 primary", map, size);
        assert_eq!(primary_1, points[1], "{}/{} team 1 primary", map, size);
    }
}

#[test]
fn alternates_are_authored_order_for_team_0_and_reversed_for_team_1() {
    let table = SpawnTable::load_default().unwrap();

    for (map, size, points) in table.iter() {
        let (_, alternates_0) = attempt_order(points, 0).unwrap();
        let (_, alternates_1) = attempt_order(points, 1).unwrap();

        let authored: Vec<Point> = points[2..].to_vec();
        let mut reversed = authored.clone();
        reversed.reverse();

        assert_eq!(alternates_0, authored, "{}/{} team 0 alternates", map, size);
        assert_eq!(alternates_1, reversed, "{}/{} team 1 alternates", map, size);
    }
}

#[test]
fn dalian_plant_32_targets_match_the_table() {
    let table = SpawnTable::load_default().unwrap();
    let points = table.candidates("dalian-plant", 32).unwrap();

    let (primary_0, alternates_0) = attempt_order(points, 0).unwrap();
    let (primary_1, alternates_1) = attempt_order(points, 1).unwrap();

    assert_eq!(primary_0, Point { x: 618, y: 218 });
    assert_eq!(primary_1, Point { x: 292, y: 296 });
    assert!(alternates_0.is_empty());
    assert!(alternates_1.is_empty());
}

#[test]
fn absent_map_size_is_unsupported_for_both_teams() {
    let table = SpawnTable::load_default().unwrap();

    // Size 48 exists for no map; the lookup fails before any team logic runs
    for map in ["dalian-plant", "not-a-real-map"] {
        match table.candidates(map, 48) {
            Err(Error::UnsupportedMapSize { size, .. }) => assert_eq!(size, 48),
            other => panic!("expected UnsupportedMapSize, got {:?}", other.map(|p| p.len())),
        }
    }
}

#[test]
fn alternate_rich_entries_reverse_correctly() {
    let table = SpawnTable::load_default().unwrap();

    // strike-at-karkand/32 ships five alternates
    let points = table.candidates("strike-at-karkand", 32).unwrap();
    assert!(points.len() > 2);

    let (_, alternates_1) = attempt_order(points, 1).unwrap();
    assert_eq!(alternates_1.first(), points.last());
    assert_eq!(alternates_1.last(), points.get(2));
}
