//! Ordered execution of gameplay systems.

use std::{fmt, time::Duration};

use isoworld_core::{Command, Event, System};
use tracing::trace;

use crate::{apply, query, World};

/// Runs registered systems once per tick in registration order.
///
/// Each system observes the live entity table. The commands it emits are
/// applied before the next system runs, so later systems see the effects of
/// earlier ones within the same tick.
#[derive(Default)]
pub struct SystemDispatcher {
    systems: Vec<Box<dyn System>>,
    pending: Vec<Command>,
}

impl SystemDispatcher {
    /// Creates a dispatcher without systems.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a system to the execution order.
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// Runs every system once against the world.
    ///
    /// The world clock is not advanced; drivers issue [`Command::Tick`]
    /// separately.
    pub fn tick(&mut self, world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
        for system in &mut self.systems {
            system.update(query::entity_view(world), dt, &mut self.pending);
            trace!(system = system.name(), commands = self.pending.len(), "system updated");
            for command in self.pending.drain(..) {
                apply(world, command, out_events);
            }
        }
    }

    /// Names of the registered systems in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.iter().map(|system| system.name())
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Reports whether no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Removes every system.
    pub fn clear(&mut self) {
        self.systems.clear();
    }
}

impl fmt::Debug for SystemDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDispatcher")
            .field("systems", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
