//! Save/Load functionality for persisting engine state.
//!
//! Uses bincode for binary serialization of the whole world. Components
//! are serialized individually as optionals then reconstructed on load.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::{Aboard, CrewHealth, HealthModule, Location, Name, RosterStatus};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the engine state.
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulated seconds elapsed
    pub sim_time: f64,
    /// Next persistent id to hand out
    pub next_id: u32,
    /// All entities with their components
    pub entities: Vec<SerializableEntity>,
}

/// All possible components for an entity, serialized as optionals.
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    pub name: Option<Name>,
    pub roster: Option<RosterStatus>,
    pub health: Option<CrewHealth>,
    pub aboard: Option<Aboard>,
    pub location: Option<Location>,
    pub module: Option<HealthModule>,
}

fn serialize_entities(world: &World) -> Vec<SerializableEntity> {
    let mut entities = Vec::new();

    for entity_ref in world.iter() {
        let mut se = SerializableEntity::default();

        if let Some(c) = entity_ref.get::<&Name>() {
            se.name = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&RosterStatus>() {
            se.roster = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&CrewHealth>() {
            se.health = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Aboard>() {
            se.aboard = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Location>() {
            se.location = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&HealthModule>() {
            se.module = Some((*c).clone());
        }

        entities.push(se);
    }

    entities
}

fn spawn_entity(world: &mut World, se: SerializableEntity) {
    let entity = world.spawn(());

    if let Some(c) = se.name {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.roster {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.health {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.aboard {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.location {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.module {
        let _ = world.insert_one(entity, c);
    }
}

/// Engine state reconstructed from a save.
pub struct LoadedEngine {
    pub world: World,
    pub sim_time: f64,
    pub next_id: u32,
}

/// Serialize the engine state to a writer.
pub fn save_engine<W: Write>(
    writer: W,
    world: &World,
    sim_time: f64,
    next_id: u32,
) -> Result<(), SaveError> {
    let data = SaveData {
        version: SAVE_VERSION,
        sim_time,
        next_id,
        entities: serialize_entities(world),
    };
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

/// Rebuild engine state from a reader.
pub fn load_engine<R: Read>(reader: R) -> Result<LoadedEngine, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            found: data.version,
            expected: SAVE_VERSION,
        });
    }
    let mut world = World::new();
    for se in data.entities {
        spawn_entity(&mut world, se);
    }
    Ok(LoadedEngine {
        world,
        sim_time: data.sim_time,
        next_id: data.next_id,
    })
}

/// Errors that can occur during save/load.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("save version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneralSettings;

    #[test]
    fn round_trip_preserves_components() {
        let mut world = World::new();
        let general = GeneralSettings::default();
        let mut record = CrewHealth::new("Pilot", 2, &general);
        record.hp = 73.5;
        record.last_change = -2.5;
        world.spawn((
            Name::new("Ada", "Reyes"),
            RosterStatus::Assigned,
            record,
            Aboard::new(7),
        ));
        world.spawn((Location::new(7, "Station", "Earth"),));
        world.spawn((
            HealthModule::new(9, "Hab").with_space(10.0),
            Aboard::new(7),
        ));

        let mut buffer = Vec::new();
        save_engine(&mut buffer, &world, 1234.5, 10).unwrap();
        let loaded = load_engine(buffer.as_slice()).unwrap();

        assert!((loaded.sim_time - 1234.5).abs() < f64::EPSILON);
        assert_eq!(loaded.next_id, 10);

        let mut crew = loaded
            .world
            .query::<(&Name, &CrewHealth, &RosterStatus, &Aboard)>();
        let (_, (name, health, roster, aboard)) = crew.iter().next().unwrap();
        assert_eq!(name.full(), "Ada Reyes");
        assert!((health.hp - 73.5).abs() < f64::EPSILON);
        assert!((health.last_change + 2.5).abs() < f64::EPSILON);
        assert_eq!(*roster, RosterStatus::Assigned);
        assert_eq!(aboard.location, 7);
        drop(crew);

        assert_eq!(loaded.world.query::<&Location>().iter().count(), 1);
        assert_eq!(loaded.world.query::<&HealthModule>().iter().count(), 1);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let data = SaveData {
            version: SAVE_VERSION + 1,
            sim_time: 0.0,
            next_id: 1,
            entities: Vec::new(),
        };
        let buffer = bincode::serialize(&data).unwrap();
        match load_engine(buffer.as_slice()) {
            Err(SaveError::VersionMismatch { found, expected }) => {
                assert_eq!(found, SAVE_VERSION + 1);
                assert_eq!(expected, SAVE_VERSION);
            }
            other => panic!("expected version mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_world_round_trips() {
        let world = World::new();
        let mut buffer = Vec::new();
        save_engine(&mut buffer, &world, 0.0, 1).unwrap();
        let loaded = load_engine(buffer.as_slice()).unwrap();
        assert_eq!(loaded.world.iter().count(), 0);
    }
}
