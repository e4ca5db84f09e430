//! Per-tick module resource draw and starvation marking.
//!
//! Active modules request their resource from the location's store each
//! tick. A module that receives less than half of what it asked for is
//! starving: it silently stops contributing until flow resumes. This is a
//! recoverable condition, not an error.

use std::collections::HashMap;

use hecs::{Entity, World};
use tracing::{debug, warn};

use crate::components::{Aboard, CrewHealth, HealthModule, Location};
use crate::config::HealthConfig;

/// Run resource consumption for every powered module.
pub fn resource_system(world: &mut World, config: &HealthConfig, interval: f64) {
    let locations: HashMap<u32, Entity> = world
        .query::<&Location>()
        .iter()
        .map(|(entity, location)| (location.id, entity))
        .collect();

    let mut crew_counts: HashMap<u32, u32> = HashMap::new();
    for (_, (record, aboard)) in world.query::<(&CrewHealth, &Aboard)>().iter() {
        if !record.condition.is_dead() {
            *crew_counts.entry(aboard.location).or_insert(0) += 1;
        }
    }

    struct Request {
        module: Entity,
        location: Entity,
        resource: String,
        needed: f64,
    }

    let mut requests = Vec::new();
    for (entity, (module, aboard)) in world.query::<(&HealthModule, &Aboard)>().iter() {
        if module.is_always_active() || !module.active {
            continue;
        }
        if !config.resources.is_known(&module.resource) {
            // flagged at registration; the module simply draws nothing
            continue;
        }
        let Some(&location) = locations.get(&aboard.location) else {
            continue;
        };
        let crew = crew_counts.get(&aboard.location).copied().unwrap_or(0);
        requests.push(Request {
            module: entity,
            location,
            resource: module.resource.clone(),
            needed: module.resource_needed(crew, interval),
        });
    }

    for request in requests {
        let delivered = {
            let Ok(mut location) = world.get::<&mut Location>(request.location) else {
                continue;
            };
            location.resources.request(&request.resource, request.needed)
        };
        let Ok(mut module) = world.get::<&mut HealthModule>(request.module) else {
            continue;
        };
        let starving = delivered * 2.0 < request.needed;
        if starving && !module.starving {
            warn!(
                module = %module.title,
                resource = %request.resource,
                needed = request.needed,
                delivered,
                "module starving, contributions suspended"
            );
        } else if !starving && module.starving {
            debug!(module = %module.title, "module resource flow restored");
        }
        module.starving = starving;
    }
}
