use argus::map::{BoundingBox, MapConfig, OccupancyMap, VoxelKey};
use argus::sensor::{SensorConfig, SensorModel};
use argus::view::{EvaluationConfig, GainEvaluator, SamplingConfig, ViewCandidate, ViewSampler};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use rstest::rstest;

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_sensor() -> SensorModel {
        SensorModel::new(SensorConfig {
            horizontal_fov_deg: 90.0,
            vertical_fov_deg: 90.0,
            horizontal_rays: 15,
            vertical_rays: 15,
            max_range: 3.0,
        })
        .unwrap()
    }

    #[test]
    fn sampler_places_rings_around_the_bounds() {
        let sampler = ViewSampler::new(SamplingConfig {
            ring_count: 8,
            elevation_levels: 3,
            standoff: 0.5,
            radius: None,
        })
        .unwrap();
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 1.0));

        let candidates = sampler.generate(&bounds);
        assert_eq!(candidates.len(), 24);

        let center = bounds.center();
        let radius = (2.0_f64 * 2.0 + 2.0 * 2.0).sqrt() / 2.0 + 0.5;
        for candidate in &candidates {
            let dx = candidate.position.x - center.x;
            let dy = candidate.position.y - center.y;
            assert!((dx.hypot(dy) - radius).abs() < 1e-9);
        }

        // Level-major order: the first ring sits at the bottom of the
        // bounds, the last at the top.
        for candidate in &candidates[..8] {
            assert!(candidate.position.z.abs() < 1e-9);
        }
        for candidate in &candidates[16..] {
            assert!((candidate.position.z - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn a_single_level_ring_sits_at_the_bounds_center() {
        let sampler = ViewSampler::new(SamplingConfig {
            elevation_levels: 1,
            ..SamplingConfig::default()
        })
        .unwrap();
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 1.0, 3.0));

        for candidate in sampler.generate(&bounds) {
            assert!((candidate.position.z - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn a_fixed_radius_overrides_the_derived_ring() {
        let sampler = ViewSampler::new(SamplingConfig {
            radius: Some(2.0),
            ..SamplingConfig::default()
        })
        .unwrap();
        let bounds = BoundingBox::new(Point3::new(-4.0, -4.0, 0.0), Point3::new(4.0, 4.0, 2.0));
        assert!((sampler.ring_radius(&bounds) - 2.0).abs() < 1e-12);

        let center = bounds.center();
        for candidate in sampler.generate(&bounds) {
            let dx = candidate.position.x - center.x;
            let dy = candidate.position.y - center.y;
            assert!((dx.hypot(dy) - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn candidates_face_the_bounds_center_without_roll() {
        let sampler = ViewSampler::new(SamplingConfig::default()).unwrap();
        let bounds = BoundingBox::new(Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, 1.0, 2.0));
        let center = bounds.center();

        for candidate in sampler.generate(&bounds) {
            let toward = (center - candidate.position).normalize();
            assert!(candidate.forward().dot(&toward) > 1.0 - 1e-9);

            // Zero roll: the body y axis stays horizontal.
            let left = candidate.orientation * Vector3::y();
            assert!(left.z.abs() < 1e-9);
        }
    }

    #[test]
    fn looking_at_the_own_position_falls_back_to_identity() {
        let position = Point3::new(1.0, 2.0, 3.0);
        let candidate = ViewCandidate::looking_at(position, position);
        assert_eq!(candidate.orientation, UnitQuaternion::identity());
    }

    #[rstest]
    #[case(SamplingConfig { ring_count: 0, ..SamplingConfig::default() })]
    #[case(SamplingConfig { elevation_levels: 0, ..SamplingConfig::default() })]
    #[case(SamplingConfig { standoff: -0.1, ..SamplingConfig::default() })]
    #[case(SamplingConfig { radius: Some(0.0), ..SamplingConfig::default() })]
    fn unusable_sampling_configs_are_rejected(#[case] config: SamplingConfig) {
        assert!(ViewSampler::new(config).is_err());
    }

    #[rstest]
    #[case(1, 1)]
    #[case(5, 1)]
    #[case(20, 15)]
    fn ray_lattice_has_one_unit_ray_per_cell(#[case] horizontal: usize, #[case] vertical: usize) {
        let sensor = SensorModel::new(SensorConfig {
            horizontal_rays: horizontal,
            vertical_rays: vertical,
            ..SensorConfig::default()
        })
        .unwrap();

        let directions = sensor.ray_directions();
        assert_eq!(directions.len(), horizontal * vertical);
        assert_eq!(sensor.ray_count(), horizontal * vertical);
        for direction in &directions {
            assert!((direction.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn a_single_ray_points_straight_ahead() {
        let sensor = SensorModel::new(SensorConfig {
            horizontal_rays: 1,
            vertical_rays: 1,
            ..SensorConfig::default()
        })
        .unwrap();

        let directions = sensor.ray_directions();
        assert_eq!(directions.len(), 1);
        assert!((directions[0] - Vector3::x()).norm() < 1e-12);
    }

    #[test]
    fn the_lattice_spans_the_full_field_of_view() {
        let sensor = SensorModel::new(SensorConfig {
            horizontal_fov_deg: 90.0,
            vertical_fov_deg: 60.0,
            horizontal_rays: 3,
            vertical_rays: 3,
            max_range: 3.5,
        })
        .unwrap();

        let directions = sensor.ray_directions();
        assert_eq!(directions.len(), 9);

        // Corner rays land on the FOV extremes.
        let first = directions[0];
        assert!((first.y.atan2(first.x) + 45.0_f64.to_radians()).abs() < 1e-9);
        assert!((first.z.asin() + 30.0_f64.to_radians()).abs() < 1e-9);

        let last = directions[8];
        assert!((last.y.atan2(last.x) - 45.0_f64.to_radians()).abs() < 1e-9);
        assert!((last.z.asin() - 30.0_f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn world_rays_follow_the_view_orientation() {
        let sensor = SensorModel::new(SensorConfig {
            horizontal_rays: 1,
            vertical_rays: 1,
            ..SensorConfig::default()
        })
        .unwrap();

        let yaw = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let rays = sensor.world_rays(&yaw);
        assert_eq!(rays.len(), 1);
        assert!((rays[0] - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn unknown_space_yields_positive_gain() {
        let map = OccupancyMap::new(MapConfig::default()).unwrap();
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.6, 0.6, 0.6));
        let evaluator = GainEvaluator::new(wide_sensor());
        let view = ViewCandidate::looking_at(Point3::new(-0.5, 0.3, 0.3), bounds.center());

        let gain = evaluator.gain(&map, &view, &bounds);
        assert!(gain > 0.0);
        // Never more than the volume holds.
        assert!(gain <= 216.0);
    }

    #[test]
    fn a_fully_known_volume_has_zero_gain() {
        let mut map = OccupancyMap::new(MapConfig::default()).unwrap();
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.6, 0.6, 0.6));
        for x in 0..6 {
            for y in 0..6 {
                for z in 0..6 {
                    map.mark_free(VoxelKey::new(x, y, z));
                }
            }
        }
        let evaluator = GainEvaluator::new(wide_sensor());
        let view = ViewCandidate::looking_at(Point3::new(-0.5, 0.3, 0.3), bounds.center());

        // Rays keep going into unknown space outside the bounds; none of
        // that counts.
        assert_eq!(evaluator.gain(&map, &view, &bounds), 0.0);
    }

    #[test]
    fn an_occluding_wall_reduces_gain() {
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let evaluator = GainEvaluator::new(wide_sensor());
        let view = ViewCandidate::looking_at(Point3::new(-0.4, 0.5, 0.5), bounds.center());

        let open = OccupancyMap::new(MapConfig::default()).unwrap();
        let open_gain = evaluator.gain(&open, &view, &bounds);

        let mut walled = OccupancyMap::new(MapConfig::default()).unwrap();
        for y in -5..15 {
            for z in -5..15 {
                walled.mark_occupied(VoxelKey::new(5, y, z));
            }
        }
        let walled_gain = evaluator.gain(&walled, &view, &bounds);

        assert!(walled_gain > 0.0);
        assert!(walled_gain < open_gain);
    }

    #[test]
    fn a_view_inside_an_occupied_voxel_scores_zero() {
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let mut map = OccupancyMap::new(MapConfig::default()).unwrap();
        let position = Point3::new(-0.35, 0.5, 0.5);
        map.mark_occupied(VoxelKey::of_point(&position, map.resolution()));

        let evaluator = GainEvaluator::new(wide_sensor());
        let view = ViewCandidate::looking_at(position, bounds.center());
        assert_eq!(evaluator.gain(&map, &view, &bounds), 0.0);
    }

    #[test]
    fn ranking_prefers_views_of_the_unexplored_side() {
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let pocket = |x: i32, y: i32, z: i32| {
            (7..10).contains(&x) && (3..7).contains(&y) && (3..7).contains(&z)
        };

        // Everything known except a pocket behind a wall on the +x side.
        let mut map = OccupancyMap::new(MapConfig::default()).unwrap();
        for x in -2..13 {
            for y in -2..13 {
                for z in -2..13 {
                    if pocket(x, y, z) {
                        continue;
                    }
                    map.mark_free(VoxelKey::new(x, y, z));
                }
            }
        }
        for y in -2..13 {
            for z in -2..13 {
                map.mark_occupied(VoxelKey::new(5, y, z));
            }
        }

        let sampler = ViewSampler::new(SamplingConfig {
            ring_count: 8,
            elevation_levels: 1,
            standoff: 0.3,
            radius: None,
        })
        .unwrap();
        let evaluator = GainEvaluator::new(wide_sensor());

        let ranked = evaluator.rank(&map, sampler.generate(&bounds), &bounds);
        assert_eq!(ranked.len(), 8);
        for pair in ranked.windows(2) {
            assert!(pair[0].gain >= pair[1].gain);
        }

        // Only candidates on the +x side can see past the wall into the
        // pocket; everyone else scores zero.
        let best = &ranked[0];
        assert!(best.gain > 0.0);
        assert!(best.view.position.x > bounds.center().x);
        assert_eq!(ranked.last().unwrap().gain, 0.0);
    }

    #[test]
    fn ranking_keeps_sampler_order_for_equal_gains() {
        // Everything known, so every candidate ties at zero gain.
        let mut map = OccupancyMap::new(MapConfig::default()).unwrap();
        for x in -1..11 {
            for y in -1..11 {
                for z in -1..11 {
                    map.mark_free(VoxelKey::new(x, y, z));
                }
            }
        }
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let sampler = ViewSampler::new(SamplingConfig {
            ring_count: 6,
            elevation_levels: 1,
            standoff: 0.3,
            radius: None,
        })
        .unwrap();
        let evaluator = GainEvaluator::new(wide_sensor());

        let candidates = sampler.generate(&bounds);
        let ranked = evaluator.rank(&map, candidates.clone(), &bounds);

        assert_eq!(ranked.len(), candidates.len());
        for (scored, original) in ranked.iter().zip(&candidates) {
            assert_eq!(scored.gain, 0.0);
            assert_eq!(scored.view.position, original.position);
        }
    }

    #[test]
    fn negative_gain_thresholds_are_rejected() {
        assert!(EvaluationConfig { gain_threshold: -1.0 }.validate().is_err());
        assert!(
            EvaluationConfig {
                gain_threshold: f64::NAN
            }
            .validate()
            .is_err()
        );
    }
}
