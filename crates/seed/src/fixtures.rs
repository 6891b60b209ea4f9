//! Fixture documents bundled into the seeder at compile time.

use fitlog_domain::model::{Document, Exercise, Resource, User, Workout};

use crate::SeedError;

const USERS_JSON: &str = include_str!("../data/users.json");
const EXERCISES_JSON: &str = include_str!("../data/exercises.json");
const WORKOUTS_JSON: &str = include_str!("../data/workouts.json");

/// Typed documents for every collection, with fixed ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixtures {
    pub users: Vec<Document<User>>,
    pub exercises: Vec<Document<Exercise>>,
    pub workouts: Vec<Document<Workout>>,
}

impl Fixtures {
    /// Parses the fixture files shipped with the crate.
    pub fn bundled() -> Result<Self, SeedError> {
        Self::from_json(USERS_JSON, EXERCISES_JSON, WORKOUTS_JSON)
    }

    pub fn from_json(users: &str, exercises: &str, workouts: &str) -> Result<Self, SeedError> {
        Ok(Self {
            users: parse_collection(users)?,
            exercises: parse_collection(exercises)?,
            workouts: parse_collection(workouts)?,
        })
    }
}

fn parse_collection<R: Resource>(raw: &str) -> Result<Vec<Document<R>>, SeedError> {
    let collection = R::KIND.collection();
    let documents: Vec<Document<R>> =
        serde_json::from_str(raw).map_err(|source| SeedError::Fixture { collection, source })?;
    for document in &documents {
        document
            .fields
            .check_required()
            .map_err(|source| SeedError::InvalidFixture {
                collection,
                id: document.id.to_hex(),
                source,
            })?;
    }
    Ok(documents)
}
