use std::fmt;

use serde::{Deserialize, Serialize};

/// Drill level of the map, ordered from coarsest to finest.
///
/// Descent only ever moves one level at a time; `County` is terminal.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NavigationLevel {
    World,
    Country,
    Province,
    City,
    County,
}

impl NavigationLevel {
    /// The level one step down, or `None` at the bottom of the ladder.
    ///
    /// This is pure ordering; whether a descent is actually legal for a
    /// given region is the resolver's call.
    pub fn next_down(self) -> Option<Self> {
        match self {
            NavigationLevel::World => Some(NavigationLevel::Country),
            NavigationLevel::Country => Some(NavigationLevel::Province),
            NavigationLevel::Province => Some(NavigationLevel::City),
            NavigationLevel::City => Some(NavigationLevel::County),
            NavigationLevel::County => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == NavigationLevel::County
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NavigationLevel::World => "world",
            NavigationLevel::Country => "country",
            NavigationLevel::Province => "province",
            NavigationLevel::City => "city",
            NavigationLevel::County => "county",
        }
    }
}

impl fmt::Display for NavigationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::NavigationLevel;

    #[test]
    fn ladder_descends_one_step_at_a_time() {
        let mut level = NavigationLevel::World;
        let mut steps = 0;
        while let Some(next) = level.next_down() {
            assert!(next > level);
            level = next;
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert_eq!(level, NavigationLevel::County);
        assert!(level.is_terminal());
    }

    #[test]
    fn serializes_lowercase() {
        let s = serde_json::to_string(&NavigationLevel::Province).expect("serialize");
        assert_eq!(s, "\"province\"");
        let back: NavigationLevel = serde_json::from_str("\"city\"").expect("deserialize");
        assert_eq!(back, NavigationLevel::City);
    }
}
