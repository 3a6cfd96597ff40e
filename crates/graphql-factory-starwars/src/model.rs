//! Backing models of the sample schema.

use std::sync::Arc;

use graphql_factory::{Model, OutputValue, Property, Resolved, Shape};

/// A film of the original trilogy; the discriminant is its episode number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Episode {
    NewHope = 4,
    Empire = 5,
    Jedi = 6,
}

graphql_factory::enum_value!(Episode);

/// What kind of being a character is. Not exposed in the schema; the
/// `Human` and `Droid` types tell characters apart with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Human,
    Droid,
}

/// A person or droid of the roster.
///
/// Both schema types share this model, so fields specific to one of them are
/// optional here.
#[derive(Debug, Clone)]
pub struct Character {
    pub species: Species,
    pub id: String,
    pub name: String,
    pub friends: Vec<String>,
    pub appears_in: Vec<Episode>,
    pub home_planet: Option<String>,
    pub primary_function: Option<String>,
}

impl Character {
    pub fn is_human(&self) -> bool {
        self.species == Species::Human
    }

    pub fn is_droid(&self) -> bool {
        self.species == Species::Droid
    }
}

impl Model for Character {
    fn properties() -> Vec<Property> {
        vec![
            Property::new("id", String::shape()),
            Property::new("name", String::shape()),
            Property::new("friends", Vec::<String>::shape()),
            Property::new("appearsIn", Vec::<Episode>::shape()),
            Property::new("homePlanet", Option::<String>::shape()),
            Property::new("primaryFunction", Option::<String>::shape()),
        ]
    }

    fn property(&self, name: &str) -> Option<Resolved> {
        let value = match name {
            "id" => self.id.clone().into_resolved(),
            "name" => self.name.clone().into_resolved(),
            "friends" => self.friends.clone().into_resolved(),
            "appearsIn" => self.appears_in.clone().into_resolved(),
            "homePlanet" => self.home_planet.clone().into_resolved(),
            "primaryFunction" => self.primary_function.clone().into_resolved(),
            _ => return None,
        };
        Some(value)
    }
}

impl OutputValue for Character {
    fn shape() -> Shape {
        Shape::model::<Character>()
    }

    fn into_resolved(self) -> Resolved {
        Arc::new(self).into_resolved()
    }
}

/// Per-request context handed to every resolver.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub content: String,
}

impl Context {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_properties() {
        let names: Vec<_> = Character::properties().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            ["id", "name", "friends", "appearsIn", "homePlanet", "primaryFunction"]
        );

        let droid = Character {
            species: Species::Droid,
            id: "2001".into(),
            name: "R2-D2".into(),
            friends: Vec::new(),
            appears_in: vec![Episode::NewHope],
            home_planet: None,
            primary_function: Some("Astromech".into()),
        };
        assert!(droid.is_droid());
        assert!(droid.property("homePlanet").is_some_and(|v| v.is_null()));
        assert!(droid.property("species").is_none());
    }
}
