//! Entity classification into ban categories.
//!
//! Classification is a pure function of an entity's tags. Rules are evaluated
//! top to bottom and the first match wins, so an entity tagged both
//! `amenity=school` and `highway=pedestrian` is a [`Category::School`].

use std::fmt;
use std::str::FromStr;

use crate::overpass::Tags;

/// `leisure` values that mark a sports facility.
const SPORT_LEISURE: &[&str] = &["sports_centre", "sports_hall", "stadium", "track", "pitch"];

/// Reason a location carries a consumption ban.
///
/// Declaration order is rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Schools, kindergartens, playgrounds and youth facilities.
    School,
    /// Universities.
    University,
    /// Sports facilities.
    Sport,
    /// Pedestrian zones (ban applies 7:00-20:00).
    Pedestrian,
    /// Anything matched by the upstream query but by no rule here.
    Other,
}

impl Category {
    /// All categories in rule order.
    pub const ALL: [Category; 5] = [
        Category::School,
        Category::University,
        Category::Sport,
        Category::Pedestrian,
        Category::Other,
    ];

    /// Stable index into per-category arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short machine name used on the command line and in output.
    pub fn name(self) -> &'static str {
        match self {
            Category::School => "school",
            Category::University => "university",
            Category::Sport => "sport",
            Category::Pedestrian => "pedestrian",
            Category::Other => "other",
        }
    }

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            Category::School => "Schule, Kindergarten, Spielplätze, Jugendeinrichtungen",
            Category::University => "Hochschule",
            Category::Sport => "Sportanlagen",
            Category::Pedestrian => "Fußgängerzonen (7-20 Uhr)",
            Category::Other => "Andere",
        }
    }

    /// Legend fill colour.
    pub fn color(self) -> &'static str {
        match self {
            Category::School => "red",
            Category::University => "orange",
            Category::Sport => "yellow",
            Category::Pedestrian => "green",
            Category::Other => "blue",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "school" => Ok(Category::School),
            "university" => Ok(Category::University),
            "sport" => Ok(Category::Sport),
            "pedestrian" => Ok(Category::Pedestrian),
            "other" => Ok(Category::Other),
            _ => Err(format!(
                "unknown category '{}', expected one of: school, university, sport, pedestrian, other",
                s
            )),
        }
    }
}

fn has(tags: &Tags, key: &str, value: &str) -> bool {
    tags.get(key).is_some_and(|v| v == value)
}

/// Classify an entity by its tags.
pub fn classify(tags: &Tags) -> Category {
    if has(tags, "amenity", "school")
        || has(tags, "building", "school")
        || has(tags, "amenity", "kindergarten")
        || has(tags, "leisure", "playground")
        || has(tags, "community_centre", "youth_centre")
    {
        return Category::School;
    }
    if has(tags, "building", "university") {
        return Category::University;
    }
    if tags.contains_key("sport")
        || tags
            .get("leisure")
            .is_some_and(|v| SPORT_LEISURE.contains(&v.as_str()))
    {
        return Category::Sport;
    }
    if tags.contains_key("highway") {
        return Category::Pedestrian;
    }
    Category::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overpass::tags;

    #[test]
    fn test_school_rules() {
        for (k, v) in [
            ("amenity", "school"),
            ("building", "school"),
            ("amenity", "kindergarten"),
            ("leisure", "playground"),
            ("community_centre", "youth_centre"),
        ] {
            assert_eq!(classify(&tags([(k, v)])), Category::School, "{}={}", k, v);
        }
    }

    #[test]
    fn test_university() {
        assert_eq!(
            classify(&tags([("building", "university")])),
            Category::University
        );
        // amenity=university is not a rule
        assert_eq!(
            classify(&tags([("amenity", "university")])),
            Category::Other
        );
    }

    #[test]
    fn test_sport_any_value_or_leisure() {
        assert_eq!(classify(&tags([("sport", "soccer")])), Category::Sport);
        assert_eq!(classify(&tags([("sport", "")])), Category::Sport);
        for leisure in SPORT_LEISURE {
            assert_eq!(classify(&tags([("leisure", *leisure)])), Category::Sport);
        }
        assert_eq!(classify(&tags([("leisure", "park")])), Category::Other);
    }

    #[test]
    fn test_highway_any_value_is_pedestrian() {
        assert_eq!(
            classify(&tags([("highway", "pedestrian")])),
            Category::Pedestrian
        );
        assert_eq!(
            classify(&tags([("highway", "footway")])),
            Category::Pedestrian
        );
    }

    #[test]
    fn test_school_precedes_pedestrian() {
        let t = tags([("amenity", "school"), ("highway", "pedestrian")]);
        assert_eq!(classify(&t), Category::School);
    }

    #[test]
    fn test_university_precedes_sport() {
        let t = tags([("building", "university"), ("sport", "rowing")]);
        assert_eq!(classify(&t), Category::University);
    }

    #[test]
    fn test_empty_tags_are_other() {
        assert_eq!(classify(&Tags::new()), Category::Other);
    }

    #[test]
    fn test_category_parse_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>().unwrap(), category);
            assert_eq!(Category::ALL[category.index()], category);
        }
        assert!("SPORT".parse::<Category>().is_ok());
        assert!("park".parse::<Category>().is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn tag_strategy() -> impl Strategy<Value = Tags> {
            let keys = prop::sample::select(vec![
                "amenity",
                "building",
                "leisure",
                "community_centre",
                "sport",
                "highway",
                "name",
                "tourism",
            ]);
            let values = prop::sample::select(vec![
                "school",
                "kindergarten",
                "university",
                "playground",
                "youth_centre",
                "pitch",
                "stadium",
                "pedestrian",
                "soccer",
                "cafe",
                "yes",
            ]);
            prop::collection::hash_map(
                keys.prop_map(String::from),
                values.prop_map(String::from),
                0..6,
            )
        }

        proptest! {
            #[test]
            fn test_classify_deterministic(t in tag_strategy()) {
                prop_assert_eq!(classify(&t), classify(&t.clone()));
            }

            #[test]
            fn test_classify_total(t in tag_strategy()) {
                prop_assert!(Category::ALL.contains(&classify(&t)));
            }

            #[test]
            fn test_school_tag_always_wins(mut t in tag_strategy()) {
                t.insert("amenity".to_string(), "school".to_string());
                prop_assert_eq!(classify(&t), Category::School);
            }
        }
    }
}
