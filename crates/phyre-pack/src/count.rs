//! Counting the active bodies that occupy mask and feature slots.

use phyre_core::{Scene, TaskSimulation, UserInputStatus};

/// Number of active bodies across `bodies` and `user_input_bodies`.
pub fn count_objects_in_scene(scene: &Scene) -> usize {
    scene.active_bodies().count()
}

/// Object count of a simulation, fixed from its first frame.
///
/// Zero when the simulation produced no frames.
pub fn count_objects(simulation: &TaskSimulation) -> usize {
    simulation.first_frame().map_or(0, count_objects_in_scene)
}

/// Whether the first frame recorded occlusions during input merge.
///
/// `false` when the simulation produced no frames.
pub fn had_occlusions(simulation: &TaskSimulation) -> bool {
    simulation
        .first_frame()
        .is_some_and(|scene| scene.user_input_status == UserInputStatus::HadOcclusions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phyre_core::ShapeType;
    use phyre_test_utils::{ball, bar, scene_with, undefined_body};
    use proptest::prelude::*;

    #[test]
    fn empty_simulation_counts_zero() {
        let sim = TaskSimulation::default();
        assert_eq!(count_objects(&sim), 0);
        assert!(!had_occlusions(&sim));
    }

    #[test]
    fn only_first_frame_is_counted() {
        let first = scene_with(32, 32, vec![ball(4.0, 4.0, 2.0), undefined_body()]);
        let later = scene_with(32, 32, vec![ball(4.0, 4.0, 2.0), bar(8.0, 8.0, 6.0, 2.0)]);
        let sim = TaskSimulation {
            scene_list: vec![first, later],
            ..TaskSimulation::default()
        };
        assert_eq!(count_objects(&sim), 1);
    }

    #[test]
    fn occlusion_flag_read_from_first_frame() {
        let mut first = scene_with(8, 8, vec![]);
        first.user_input_status = UserInputStatus::HadOcclusions;
        let sim = TaskSimulation {
            scene_list: vec![first, scene_with(8, 8, vec![])],
            ..TaskSimulation::default()
        };
        assert!(had_occlusions(&sim));
    }

    fn body_of(shape_type: ShapeType) -> phyre_core::Body {
        let mut body = ball(1.0, 1.0, 1.0);
        body.shape_type = shape_type;
        body
    }

    fn shape_type() -> impl Strategy<Value = ShapeType> {
        prop_oneof![
            Just(ShapeType::Undefined),
            Just(ShapeType::Ball),
            Just(ShapeType::Bar),
            Just(ShapeType::Jar),
            Just(ShapeType::StandingSticks),
        ]
    }

    proptest! {
        #[test]
        fn counts_every_defined_body(
            bodies in prop::collection::vec(shape_type(), 0..24),
            user in prop::collection::vec(shape_type(), 0..24),
        ) {
            let mut scene = scene_with(16, 16, bodies.iter().copied().map(body_of).collect());
            scene.user_input_bodies = user.iter().copied().map(body_of).collect();
            let expected = bodies
                .iter()
                .chain(user.iter())
                .filter(|t| **t != ShapeType::Undefined)
                .count();
            prop_assert_eq!(count_objects_in_scene(&scene), expected);
        }
    }
}
