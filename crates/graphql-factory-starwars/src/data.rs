//! In-memory roster of characters.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use futures_util::future::join_all;

use crate::model::{Character, Episode, Species};

const ALL_EPISODES: [Episode; 3] = [Episode::NewHope, Episode::Empire, Episode::Jedi];

static ROSTER: LazyLock<HashMap<String, Arc<Character>>> = LazyLock::new(|| {
    [
        human("1000", "Luke Skywalker", &["1002", "1003", "2000", "2001"], &ALL_EPISODES, Some("Tatooine")),
        human("1001", "Darth Vader", &["1004"], &ALL_EPISODES, Some("Tatooine")),
        human("1002", "Han Solo", &["1000", "1003", "2001"], &ALL_EPISODES, None),
        human("1003", "Leia Organa", &["1000", "1002", "2000", "2001"], &ALL_EPISODES, Some("Alderaan")),
        human("1004", "Wilhuff Tarkin", &["1001"], &[Episode::NewHope], None),
        droid("2000", "C-3PO", &["1000", "1002", "1003", "2001"], "Protocol"),
        droid("2001", "R2-D2", &["1000", "1002", "1003"], "Astromech"),
    ]
    .into_iter()
    .map(|c| (c.id.clone(), Arc::new(c)))
    .collect()
});

fn human(
    id: &str,
    name: &str,
    friends: &[&str],
    appears_in: &[Episode],
    home_planet: Option<&str>,
) -> Character {
    Character {
        species: Species::Human,
        id: id.to_string(),
        name: name.to_string(),
        friends: friends.iter().map(|f| f.to_string()).collect(),
        appears_in: appears_in.to_vec(),
        home_planet: home_planet.map(str::to_string),
        primary_function: None,
    }
}

fn droid(id: &str, name: &str, friends: &[&str], primary_function: &str) -> Character {
    Character {
        species: Species::Droid,
        id: id.to_string(),
        name: name.to_string(),
        friends: friends.iter().map(|f| f.to_string()).collect(),
        appears_in: ALL_EPISODES.to_vec(),
        home_planet: None,
        primary_function: Some(primary_function.to_string()),
    }
}

/// Looks up any character by id.
pub async fn character(id: &str) -> Option<Arc<Character>> {
    ROSTER.get(id).cloned()
}

/// Looks up several characters concurrently, keeping the order of `ids`.
pub async fn characters(ids: &[String]) -> Vec<Option<Arc<Character>>> {
    join_all(ids.iter().map(|id| character(id))).await
}

/// Luke is the hero of The Empire Strikes Back; R2-D2 of every other film.
pub fn hero(episode: Option<Episode>) -> Option<Arc<Character>> {
    let id = if episode == Some(Episode::Empire) {
        "1000"
    } else {
        "2001"
    };
    ROSTER.get(id).cloned()
}

pub fn human_by_id(id: &str) -> Option<Arc<Character>> {
    ROSTER.get(id).filter(|c| c.is_human()).cloned()
}

pub fn droid_by_id(id: &str) -> Option<Arc<Character>> {
    ROSTER.get(id).filter(|c| c.is_droid()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_by_episode() {
        assert_eq!(hero(Some(Episode::Empire)).unwrap().name, "Luke Skywalker");
        assert_eq!(hero(Some(Episode::Jedi)).unwrap().name, "R2-D2");
        assert_eq!(hero(None).unwrap().name, "R2-D2");
    }

    #[test]
    fn test_lookup_filters_species() {
        assert!(human_by_id("1003").is_some());
        assert!(human_by_id("2000").is_none());
        assert_eq!(droid_by_id("2000").unwrap().name, "C-3PO");
        assert!(droid_by_id("9999").is_none());
    }

    #[tokio::test]
    async fn test_friends_keep_order() {
        let han = character("1002").await.unwrap();
        let names: Vec<_> = characters(&han.friends)
            .await
            .into_iter()
            .map(|c| c.unwrap().name.clone())
            .collect();
        assert_eq!(names, ["Luke Skywalker", "Leia Organa", "R2-D2"]);
    }
}
