use bevy_ecs::prelude::Resource;

/// Simulation clock advanced once per backend step.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub step_count: u64,
}
