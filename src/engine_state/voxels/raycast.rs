//! # Raycast Module
//!
//! Block picking by walking the voxel grid along a ray (Amanatides & Woo, "A Fast Voxel
//! Traversal Algorithm for Ray Tracing").
//!
//! The walk visits every cell the ray passes through, in order, stepping across one cell
//! boundary at a time. The starting cell itself is never reported. Unloaded space reads
//! as air, so rays simply pass through it.

use cgmath::{InnerSpace, Point3, Vector3};

use super::block::{block_side::BlockSide, Block};
use super::coords::BlockCoord;
use super::world::BlockSource;

/// The first interactable block along a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastHit {
    /// The block that was hit
    pub block: BlockCoord,
    /// The face the ray entered the block through
    pub side: BlockSide,
    /// What the block is
    pub block_value: Block,
    /// Distance from the origin to the face that was hit
    pub distance: f32,
}

impl RaycastHit {
    /// The empty cell in front of the hit face, where a placed block would go.
    pub fn adjacent_block(&self) -> BlockCoord {
        self.block + self.side.normal()
    }
}

/// Casts a ray through `world` and returns the first interactable block it meets.
///
/// # Arguments
/// * `world` - Block lookups
/// * `origin` - Start of the ray, in world space
/// * `direction` - Direction of the ray; does not need to be normalised
/// * `max_distance` - Length of the ray, in blocks
///
/// # Returns
/// `None` if the ray runs out before hitting anything, has no direction, or its length
/// is not finite.
pub fn raycast(
    world: &impl BlockSource,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<RaycastHit> {
    if !max_distance.is_finite() || direction.magnitude2() == 0.0 {
        return None;
    }
    let direction = direction.normalize();

    let start = BlockCoord::from_world_position(origin);
    let mut cell = [start.x, start.y, start.z];
    let mut step = [0i32; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];

    for axis in 0..3 {
        let d = direction[axis];
        step[axis] = if d > 0.0 { 1 } else { -1 };
        if d != 0.0 {
            let boundary = origin[axis].floor() + if d > 0.0 { 1.0 } else { 0.0 };
            t_max[axis] = (boundary - origin[axis]) / d;
            t_delta[axis] = (1.0 / d).abs();
        }
    }

    loop {
        let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
            0
        } else if t_max[1] <= t_max[2] {
            1
        } else {
            2
        };

        let distance = t_max[axis];
        if distance > max_distance {
            return None;
        }
        t_max[axis] += t_delta[axis];
        cell[axis] += step[axis];

        let coord = BlockCoord::new(cell[0], cell[1], cell[2]);
        let block = world.block_at(coord);
        if block.is_interactable() {
            return Some(RaycastHit {
                block: coord,
                side: BlockSide::entered_from(axis, step[axis]),
                block_value: block,
                distance,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    struct Floor;

    impl BlockSource for Floor {
        fn block_at(&self, coord: BlockCoord) -> Block {
            match coord.y {
                y if y < 0 => Block::new(BlockType::STONE),
                0 if coord.x == 3 => Block::new(BlockType::WATER),
                _ => Block::AIR,
            }
        }
    }

    #[test]
    fn test_downward_ray_hits_top_face() {
        let hit = raycast(&Floor, Point3::new(0.5, 4.5, 0.5), Vector3::new(0.0, -1.0, 0.0), 10.0)
            .expect("the floor is within reach");

        assert_eq!(hit.block, BlockCoord::new(0, -1, 0));
        assert_eq!(hit.side, BlockSide::TOP);
        assert_eq!(hit.adjacent_block(), BlockCoord::new(0, 0, 0));
        assert!((hit.distance - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_ray_passes_through_water() {
        let hit = raycast(&Floor, Point3::new(3.5, 2.5, 0.5), Vector3::new(0.0, -1.0, 0.0), 10.0)
            .unwrap();
        assert_eq!(hit.block, BlockCoord::new(3, -1, 0));
    }

    #[test]
    fn test_short_or_degenerate_rays_miss() {
        assert!(raycast(&Floor, Point3::new(0.5, 4.5, 0.5), Vector3::new(0.0, -1.0, 0.0), 3.0).is_none());
        assert!(raycast(&Floor, Point3::new(0.5, 4.5, 0.5), Vector3::new(0.0, 0.0, 0.0), 3.0).is_none());
        assert!(raycast(&Floor, Point3::new(0.5, 4.5, 0.5), Vector3::new(1.0, 0.0, 0.0), 50.0).is_none());
    }

    #[test]
    fn test_unbounded_rays_miss_instead_of_walking_forever() {
        let origin = Point3::new(0.5, 4.5, 0.5);
        let sideways = Vector3::new(1.0, 0.0, 0.0);
        assert!(raycast(&Floor, origin, sideways, f32::NAN).is_none());
        assert!(raycast(&Floor, origin, sideways, f32::INFINITY).is_none());
        assert!(raycast(&Floor, origin, Vector3::new(0.0, -1.0, 0.0), f32::INFINITY).is_none());
    }

    #[test]
    fn test_sideways_ray_reports_entered_face() {
        struct Wall;
        impl BlockSource for Wall {
            fn block_at(&self, coord: BlockCoord) -> Block {
                if coord.x >= 5 {
                    Block::new(BlockType::LOG)
                } else {
                    Block::AIR
                }
            }
        }

        let hit = raycast(&Wall, Point3::new(0.2, 0.5, 0.5), Vector3::new(1.0, 0.1, 0.0), 20.0).unwrap();
        assert_eq!(hit.block.x, 5);
        assert_eq!(hit.side, BlockSide::LEFT);
    }
}
