//! Overpass QL query construction.

use crate::coord::GeoBounds;

/// Tag predicates selecting every element that can carry a consumption ban.
///
/// Each entry is one `nwr[...]` statement of the union block.
pub const BAN_PREDICATES: &[&str] = &[
    r#"["amenity"="school"]"#,
    r#"["building"="school"]"#,
    r#"["building"="university"]"#,
    r#"["leisure"="playground"]"#,
    r#"["amenity"="kindergarten"]"#,
    r#"["community_centre"="youth_centre"]"#,
    r#"["leisure"="sports_centre"]"#,
    r#"["leisure"="sports_hall"]"#,
    r#"["leisure"="stadium"]"#,
    r#"["leisure"="track"]"#,
    r#"["leisure"="pitch"]"#,
    r#"["sport"]["amenity"!="restaurant"]["amenity"!="pub"]["amenity"!="cafe"]["tourism"!="hotel"]"#,
    r#"["highway"="pedestrian"]["area"!="yes"]"#,
];

/// Build the query for all ban-relevant elements inside `bounds`.
///
/// Elements are requested with full geometry (`out geom`) so no second
/// round-trip is needed to resolve way nodes.
pub fn build_query(bounds: &GeoBounds, timeout_secs: u64) -> String {
    let mut query = format!(
        "[out:json][timeout:{}][bbox:{}];\n(\n",
        timeout_secs, bounds
    );
    for predicate in BAN_PREDICATES {
        query.push_str("  nwr");
        query.push_str(predicate);
        query.push_str(";\n");
    }
    query.push_str(");\nout geom;");
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_header_uses_south_west_north_east() {
        let bounds = GeoBounds::new(53.05, 53.09, 8.78, 8.84);
        let query = build_query(&bounds, 25);
        assert!(query.starts_with("[out:json][timeout:25][bbox:53.05,8.78,53.09,8.84];"));
        assert!(query.ends_with("out geom;"));
    }

    #[test]
    fn test_query_contains_every_predicate() {
        let query = build_query(&GeoBounds::new(0.0, 1.0, 0.0, 1.0), 10);
        for predicate in BAN_PREDICATES {
            assert!(
                query.contains(&format!("nwr{};", predicate)),
                "missing {}",
                predicate
            );
        }
    }
}
