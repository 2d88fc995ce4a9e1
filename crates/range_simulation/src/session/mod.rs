//! VR session lifecycle
//!
//! XR runtime (или desktop эмуляция в клиенте) присылает SessionEvent,
//! симуляция держит только флаг `in_vr`. Pointer системы читают его как guard.

use bevy::prelude::*;

use crate::logger;
use crate::RangeSet;

/// Event: XR session началась / закончилась
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Started,
    Ended,
}

/// Текущее состояние XR session
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct VrSession {
    pub in_vr: bool,
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VrSession>()
            .add_event::<SessionEvent>()
            .add_systems(Update, apply_session_events.in_set(RangeSet::Session));
    }
}

/// System: применить SessionEvent к VrSession
pub fn apply_session_events(
    mut events: EventReader<SessionEvent>,
    mut session: ResMut<VrSession>,
) {
    for event in events.read() {
        match event {
            SessionEvent::Started => {
                session.in_vr = true;
                logger::log_info("🥽 Entered VR mode");
            }
            SessionEvent::Ended => {
                session.in_vr = false;
                logger::log_info("Exited VR mode");
            }
        }
    }
}
