//! Frame pipeline tests
//!
//! Drive the tree and the registry the way a game loop would and check the
//! resolved matrices, visible sets and counters.

use crate::config::WorldConfig;
use crate::coords::{screen_to_world, world_to_screen, Camera2D, Coord, Rect, YAxis};
use crate::foundation::logging;
use crate::foundation::math::{affine, KernelKind, Mat3, Vec2};
use crate::scene::{prepare_world_all, Culler, FrameStats, NodeId, NodeTransform, SceneTree};
use crate::transform::Transform2D;
use crate::world::{ObjectId, SceneObject, TransformWorld};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Sprite {
        id: u64,
        pos: Vec2,
    }

    impl SceneObject for Sprite {
        fn object_id(&self) -> ObjectId {
            ObjectId(self.id)
        }

        fn position(&self) -> Vec2 {
            self.pos
        }
    }

    fn at(x: f64, y: f64) -> NodeTransform {
        NodeTransform::new(Transform2D::from_position(Vec2::new(x, y)), Rect::local(0.0, 0.0, 10.0, 10.0))
    }

    /// Root at (10,0) with one child at (5,0)
    fn root_and_child() -> (SceneTree, NodeId) {
        let mut tree = SceneTree::new();
        let root = tree.root();
        if let Some(t) = tree.transform_mut(root) {
            t.set_pos(Vec2::new(10.0, 0.0));
        }
        let child = tree.spawn(root, at(5.0, 0.0)).unwrap();
        (tree, child)
    }

    fn world_matrices(tree: &SceneTree) -> Vec<(NodeId, Mat3)> {
        tree.iter().map(|(id, n)| (id, *n.transform.cached_world())).collect()
    }

    #[test]
    fn test_prepare_twice_is_bit_identical() {
        logging::init_for_tests();
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.spawn(root, at(3.0, -2.0)).unwrap();
        let b = tree.spawn(a, at(1.5, 0.25)).unwrap();
        if let Some(t) = tree.transform_mut(b) {
            t.set_rot(0.7);
            t.set_scale(Vec2::new(1.3, 0.4));
            t.set_shear(Vec2::new(0.2, -0.1));
        }
        tree.spawn(b, at(-4.0, 9.0)).unwrap();

        let mut stats = FrameStats::default();
        prepare_world_all(&mut tree, &mut stats);
        let first = world_matrices(&tree);

        stats.reset();
        prepare_world_all(&mut tree, &mut stats);
        let second = world_matrices(&tree);

        assert_eq!(first, second);
        assert_eq!(stats.matrix_multiplications, 0);
        assert_eq!(stats.nodes_updated, 4);
    }

    #[test]
    fn test_child_composes_with_root() {
        let (mut tree, child) = root_and_child();
        let mut stats = FrameStats::default();
        prepare_world_all(&mut tree, &mut stats);

        let world = tree.get(child).unwrap().transform.cached_world();
        let t = affine::translation(world);
        assert_relative_eq!(t.x, 15.0);
        assert_relative_eq!(t.y, 0.0);
    }

    #[test]
    fn test_moving_root_reaches_clean_child() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let child = tree.spawn(root, at(5.0, 0.0)).unwrap();
        let mut stats = FrameStats::default();
        prepare_world_all(&mut tree, &mut stats);
        assert_relative_eq!(tree.get(child).unwrap().transform.cached_world().m13, 5.0);

        // Only the root is touched; the child's own cache stays clean
        tree.transform_mut(root).unwrap().set_pos(Vec2::new(10.0, 0.0));
        assert!(!tree.get(child).unwrap().transform.world_stale());

        prepare_world_all(&mut tree, &mut stats);
        assert_relative_eq!(tree.get(child).unwrap().transform.cached_world().m13, 15.0);
    }

    #[test]
    fn test_screen_round_trip_across_cameras() {
        let positions = [Vec2::zeros(), Vec2::new(250.0, -80.0), Vec2::new(-1e4, 3e3)];
        let zooms = [0.1, 1.0, 2.5, 16.0];
        let points = [Coord::world(0.0, 0.0), Coord::world(12.5, -7.75), Coord::world(-900.0, 440.0)];

        for &pos in &positions {
            for &zoom in &zooms {
                let camera = Camera2D::new(pos, Vec2::new(1024.0, 768.0)).with_zoom(zoom);
                for y_axis in [YAxis::Up, YAxis::Down] {
                    for &c in &points {
                        let back = screen_to_world(&camera, world_to_screen(&camera, c, y_axis), y_axis);
                        assert_relative_eq!(back.x, c.x, epsilon = 1e-7);
                        assert_relative_eq!(back.y, c.y, epsilon = 1e-7);
                    }
                }
            }
        }
    }

    #[test]
    fn test_visibility_against_100_square_view() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let outside = tree.spawn(root, at(60.0, 60.0)).unwrap();
        let inside = tree.spawn(root, at(0.0, 0.0)).unwrap();

        let camera = Camera2D::new(Vec2::zeros(), Vec2::new(100.0, 100.0));
        let culler = Culler::new(&camera);
        assert_eq!(culler.view_rect(), Rect::world(-50.0, -50.0, 100.0, 100.0));

        let mut stats = FrameStats::default();
        assert_eq!(tree.world_aabb(outside, &mut stats).unwrap(), Rect::world(60.0, 60.0, 10.0, 10.0));
        assert_eq!(tree.world_aabb(inside, &mut stats).unwrap(), Rect::world(0.0, 0.0, 10.0, 10.0));

        prepare_world_all(&mut tree, &mut stats);
        let visible = culler.collect(&mut tree, root, &mut stats);
        assert_eq!(visible, vec![inside]);
    }

    #[test]
    fn test_closer_node_comes_first() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        // Spawned far-first so the order cannot come from traversal
        let far = tree.spawn(root, at(-40.0, 30.0)).unwrap();
        let near = tree.spawn(root, at(5.0, -5.0)).unwrap();

        let camera = Camera2D::new(Vec2::zeros(), Vec2::new(100.0, 100.0));
        let mut stats = FrameStats::default();
        prepare_world_all(&mut tree, &mut stats);
        let visible = Culler::new(&camera).collect(&mut tree, root, &mut stats);
        assert_eq!(visible, vec![near, far]);
    }

    #[test]
    fn test_empty_world_is_silent() {
        let mut world = TransformWorld::new();
        let camera = Camera2D::new(Vec2::zeros(), Vec2::new(100.0, 100.0));
        let visible = world.visible(&camera);
        assert!(visible.is_empty());
        assert!(world.stats().is_zero());
    }

    #[test]
    fn test_reparent_keeps_single_membership() {
        let mut world = TransformWorld::new();
        for id in 1..=3 {
            world.register(&Sprite { id, pos: Vec2::new(id as f64, 0.0) });
        }
        world.set_parent(ObjectId(3), Some(ObjectId(1))).unwrap();
        world.set_parent(ObjectId(3), Some(ObjectId(2))).unwrap();

        let node = world.node_of(ObjectId(3)).unwrap();
        let owners: Vec<_> = world.tree().iter().filter(|(_, n)| n.children().contains(&node)).map(|(id, _)| id).collect();
        assert_eq!(owners, vec![world.node_of(ObjectId(2)).unwrap()]);

        world.prepare();
        // 2 + 3 along x
        assert_relative_eq!(world.world_matrix(ObjectId(3)).unwrap().m13, 5.0);
    }

    #[test]
    fn test_registry_frame_loop_tracks_moving_objects() {
        let config = WorldConfig::default()
            .with_kernel(KernelKind::Batched)
            .with_default_bounds(Rect::local(-1.0, -1.0, 2.0, 2.0));
        let mut world = TransformWorld::with_config(config);
        let mut ship = Sprite { id: 10, pos: Vec2::new(0.0, 0.0) };
        let moon = Sprite { id: 11, pos: Vec2::new(30.0, 0.0) };
        world.register(&ship);
        world.register(&moon);
        world.set_parent(ObjectId(11), Some(ObjectId(10))).unwrap();

        let camera = Camera2D::new(Vec2::zeros(), Vec2::new(100.0, 100.0));
        world.prepare();
        assert_eq!(world.visible_objects(&camera), vec![ObjectId(10), ObjectId(11)]);

        // Ship moves out of view; the moon follows
        ship.pos = Vec2::new(200.0, 0.0);
        world.update(&ship).unwrap();
        world.prepare();
        assert!(world.visible_objects(&camera).is_empty());
        assert_eq!(world.stats().culling_tested, 2);
        assert_eq!(world.stats().culled_objects, 2);

        let moon_world = world.local_to_world(ObjectId(11), Coord::local(0.0, 0.0)).unwrap();
        assert_relative_eq!(moon_world.x, 230.0);
    }

    #[test]
    fn test_independent_worlds_do_not_share_state() {
        let mut a = TransformWorld::new();
        let b = TransformWorld::new();
        a.register(&Sprite { id: 1, pos: Vec2::zeros() });
        a.prepare();
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert!(b.stats().is_zero());
        assert_ne!(a.stats().nodes_updated, b.stats().nodes_updated);
    }

    #[test]
    fn test_replacing_parent_transform_moves_child() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.spawn(root, at(0.0, 0.0)).unwrap();
        let b = tree.spawn(a, at(5.0, 0.0)).unwrap();
        let mut stats = FrameStats::default();
        prepare_world_all(&mut tree, &mut stats);

        *tree.transform_mut(a).unwrap() = Transform2D::from_position(Vec2::new(100.0, 0.0));
        prepare_world_all(&mut tree, &mut stats);

        assert_relative_eq!(tree.get(a).unwrap().transform.cached_world().m13, 100.0);
        assert_relative_eq!(tree.get(b).unwrap().transform.cached_world().m13, 105.0);
    }

    #[test]
    fn test_replaced_transform_in_registry_keeps_moon_visible() {
        let mut world = TransformWorld::new();
        world.register_with_bounds(&Sprite { id: 1, pos: Vec2::zeros() }, Rect::local(-1.0, -1.0, 2.0, 2.0));
        world.register_with_bounds(&Sprite { id: 2, pos: Vec2::new(5.0, 0.0) }, Rect::local(-1.0, -1.0, 2.0, 2.0));
        world.set_parent(ObjectId(2), Some(ObjectId(1))).unwrap();
        world.prepare();

        *world.transform_mut(ObjectId(1)).unwrap() = Transform2D::from_position(Vec2::new(500.0, 0.0));
        world.prepare();

        let camera = Camera2D::new(Vec2::new(500.0, 0.0), Vec2::new(100.0, 100.0));
        assert_eq!(world.visible_objects(&camera), vec![ObjectId(1), ObjectId(2)]);
        assert_relative_eq!(world.world_matrix(ObjectId(2)).unwrap().m13, 505.0);
    }

    #[test]
    fn test_non_finite_positions_do_not_panic() {
        let mut world = TransformWorld::new();
        world.register_with_bounds(&Sprite { id: 1, pos: Vec2::new(f64::NAN, 0.0) }, Rect::local(0.0, 0.0, 10.0, 10.0));
        world.register_with_bounds(&Sprite { id: 2, pos: Vec2::new(f64::INFINITY, 0.0) }, Rect::local(0.0, 0.0, 10.0, 10.0));
        world.register_with_bounds(&Sprite { id: 3, pos: Vec2::zeros() }, Rect::local(0.0, 0.0, 10.0, 10.0));
        let camera = Camera2D::new(Vec2::zeros(), Vec2::new(100.0, 100.0));

        world.prepare();
        let visible = world.visible_objects(&camera);
        assert!(visible.contains(&ObjectId(3)));

        let stats = *world.stats();
        assert_eq!(stats.total_objects, 3);
        assert_eq!(stats.culling_drawn + stats.culling_rejected, stats.culling_tested);
        assert_eq!(stats.culled_objects, stats.total_objects - stats.visible_objects);
        assert_eq!(stats.visible_objects, visible.len());
    }
}
