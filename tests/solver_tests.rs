use argus::map::{BoundingBox, OccupancyMap, VoxelKey};
use argus::{ArgusConfig, ArgusError, NbvSolver};
use nalgebra::Point3;

#[cfg(test)]
mod tests {
    use super::*;

    fn exploration_config() -> ArgusConfig {
        let mut config = ArgusConfig::default();
        config.bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        config.sensor.horizontal_fov_deg = 90.0;
        config.sensor.vertical_fov_deg = 60.0;
        config.sensor.horizontal_rays = 9;
        config.sensor.vertical_rays = 7;
        config.sampling.ring_count = 8;
        config.sampling.elevation_levels = 2;
        config
    }

    #[test]
    fn an_unexplored_volume_keeps_exploration_going() {
        let config = exploration_config();
        let solver = NbvSolver::new(&config).unwrap();
        let map = OccupancyMap::new(config.map).unwrap();

        let solution = solver.solve(&map).unwrap();

        assert_eq!(solution.unknown.len(), 1000);
        assert_eq!(solution.views.len(), 16);
        assert!(!solution.exploration_done);
        assert!(solution.best().unwrap().gain >= config.evaluation.gain_threshold);
        for pair in solution.views.windows(2) {
            assert!(pair[0].gain >= pair[1].gain);
        }
    }

    #[test]
    fn a_fully_observed_volume_finishes_exploration() {
        let config = exploration_config();
        let solver = NbvSolver::new(&config).unwrap();
        let mut map = OccupancyMap::new(config.map).unwrap();
        for x in 0..10 {
            for y in 0..10 {
                for z in 0..10 {
                    map.mark_free(VoxelKey::new(x, y, z));
                }
            }
        }

        let solution = solver.solve(&map).unwrap();

        assert!(solution.unknown.is_empty());
        assert!(solution.exploration_done);
        assert_eq!(solution.best().unwrap().gain, 0.0);
    }

    #[test]
    fn a_high_threshold_ends_exploration_early() {
        let mut config = exploration_config();
        config.evaluation.gain_threshold = 1e9;
        let solver = NbvSolver::new(&config).unwrap();
        let map = OccupancyMap::new(config.map).unwrap();

        let solution = solver.solve(&map).unwrap();

        assert!(solution.exploration_done);
        assert!(!solution.unknown.is_empty());
    }

    #[test]
    fn per_request_bounds_override_the_configured_volume() {
        let config = exploration_config();
        let solver = NbvSolver::new(&config).unwrap();
        let map = OccupancyMap::new(config.map).unwrap();
        let small = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.3, 0.3, 0.3));

        let solution = solver.solve_in(&map, &small).unwrap();
        assert_eq!(solution.unknown.len(), 27);
    }

    #[test]
    fn empty_request_bounds_are_rejected() {
        let config = exploration_config();
        let solver = NbvSolver::new(&config).unwrap();
        let map = OccupancyMap::new(config.map).unwrap();
        let empty = BoundingBox::new(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 2.0, 2.0));

        let err = solver.solve_in(&map, &empty).unwrap_err();
        assert!(matches!(err, ArgusError::Planning(_)));
    }

    #[test]
    fn the_best_view_is_the_first_ranked_one() {
        let config = exploration_config();
        let solver = NbvSolver::new(&config).unwrap();
        let map = OccupancyMap::new(config.map).unwrap();

        let solution = solver.solve(&map).unwrap();
        let best = solution.best().unwrap();
        assert_eq!(best.gain, solution.views[0].gain);
        assert_eq!(best.view.position, solution.views[0].view.position);
    }

    #[test]
    fn solver_construction_validates_the_whole_config() {
        let mut config = exploration_config();
        config.sampling.ring_count = 0;
        assert!(matches!(NbvSolver::new(&config), Err(ArgusError::Config(_))));

        let mut config = exploration_config();
        config.bounds = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0));
        assert!(matches!(NbvSolver::new(&config), Err(ArgusError::Config(_))));

        let mut config = exploration_config();
        config.sensor.max_range = 0.0;
        assert!(matches!(NbvSolver::new(&config), Err(ArgusError::Config(_))));
    }

    #[test]
    fn config_files_override_only_what_they_name() {
        let yaml = r#"
io:
  bind_address: "127.0.0.1:9000"
  map_timeout_ms: 250
map:
  resolution: 0.05
sampling:
  ring_count: 4
bounds:
  min: [0.0, 0.0, 0.0]
  max: [1.0, 1.0, 0.5]
"#;
        let path =
            std::env::temp_dir().join(format!("argus-config-{}.yaml", std::process::id()));
        std::fs::write(&path, yaml).unwrap();
        let config = ArgusConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.io.bind_address, "127.0.0.1:9000");
        assert_eq!(config.io.map_timeout_ms, 250);
        assert_eq!(config.map.resolution, 0.05);
        assert_eq!(config.sampling.ring_count, 4);
        assert_eq!(config.bounds.max.z, 0.5);

        // Untouched sections keep their defaults.
        assert_eq!(config.sensor.horizontal_rays, 20);
        assert_eq!(config.map.prob_hit, 0.7);
    }

    #[test]
    fn invalid_config_files_are_rejected() {
        let yaml = "map:\n  resolution: -1.0\n";
        let path =
            std::env::temp_dir().join(format!("argus-bad-config-{}.yaml", std::process::id()));
        std::fs::write(&path, yaml).unwrap();
        let err = ArgusConfig::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ArgusError::Config(_)));
    }

    #[test]
    fn missing_config_files_are_reported_as_config_errors() {
        let err = ArgusConfig::from_file("/nonexistent/argus.yaml").unwrap_err();
        assert!(matches!(err, ArgusError::Config(_)));
    }
}
