use ablation_targets::targeter::SPOT_COLOR;
use ablation_targets::{
    AlignmentMetadata, CalibrationError, FinderKind, PipelineConfig, PipelineError, RgbImage,
    SpotReport, TargeterKind, Workbench,
};
use approx::assert_relative_eq;
use nalgebra::Point2;

const CENTERS: [(f64, f64); 2] = [(120.0, 120.0), (380.0, 120.0)];

/// Bright disks on a dark background, optionally with extra small disks.
fn disks(extra: &[(f64, f64, f64)]) -> RgbImage {
    let mut img = RgbImage::filled(500, 240, [30, 30, 30]);
    let all = CENTERS
        .iter()
        .map(|&(x, y)| (x, y, 50.0))
        .chain(extra.iter().copied())
        .collect::<Vec<_>>();
    for y in 0..img.height {
        for x in 0..img.width {
            let inside = all.iter().any(|&(cx, cy, r)| {
                (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2) <= r * r
            });
            if inside {
                img.set(x, y, [200, 200, 200]);
            }
        }
    }
    img
}

fn nearest_center(p: Point2<f64>) -> (usize, f64) {
    CENTERS
        .iter()
        .enumerate()
        .map(|(i, &(cx, cy))| (i, ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .expect("centers")
}

fn unit_metadata() -> AlignmentMetadata {
    AlignmentMetadata::from_fields("0", "0, 0", "500, 240").expect("metadata")
}

fn bench_with(targeter: TargeterKind) -> Workbench {
    let mut bench = Workbench::new();
    bench
        .set_source(disks(&[]).into(), Some(unit_metadata()))
        .expect("source");
    bench.set_targeter(targeter);
    bench
}

#[test]
fn core_points_sit_deep_inside_each_disk() {
    let mut bench = bench_with(TargeterKind::Core);
    assert_eq!(bench.boundaries().expect("boundaries").len(), 2);
    let out = bench.spots().expect("spots").clone();
    let spot_size = out.spot_size.expect("auto spot size");
    assert!((45..=55).contains(&spot_size), "spot size {spot_size}");
    assert_eq!(bench.last_spot_size(), Some(spot_size));

    assert_eq!(out.spots.len(), 2);
    let mut hit = [false; 2];
    for s in &out.spots {
        let (i, d) = nearest_center(s.pixel);
        // depth inside a radius-50 disk is 50 - d
        assert!(50.0 - d > spot_size as f64 / 2.0, "spot {:?} too shallow", s.pixel);
        hit[i] = true;
    }
    assert_eq!(hit, [true, true]);
}

#[test]
fn repeated_runs_are_identical() {
    let mut a = bench_with(TargeterKind::Core);
    let mut b = bench_with(TargeterKind::Core);
    assert_eq!(a.spots().expect("a").clone(), b.spots().expect("b").clone());

    let first = a.spots().expect("a").clone();
    a.set_finder_setting("kernel_size", 5.into()).expect("kernel");
    a.set_finder_setting("kernel_size", 7.into()).expect("kernel");
    assert_eq!(a.spots().expect("a").clone(), first);
}

#[test]
fn rim_points_hug_the_boundary_from_inside() {
    let mut bench = bench_with(TargeterKind::Rim);
    let out = bench.spots().expect("spots").clone();
    assert_eq!(out.spot_size, Some(30));
    assert_eq!(out.spots.len(), 2);
    for s in &out.spots {
        let (_, d) = nearest_center(s.pixel);
        // band at inset 10 + spot/2 from the rim
        assert!(d < 50.0, "spot {:?} outside", s.pixel);
        assert!(d > 15.0, "spot {:?} not near the rim", s.pixel);
    }
}

#[test]
fn moments_skip_regions_smaller_than_a_spot() {
    let mut bench = Workbench::new();
    bench
        .set_source(disks(&[(250.0, 200.0, 24.0)]).into(), None)
        .expect("source");
    bench.set_targeter(TargeterKind::Moments);
    bench
        .set_targeter_setting("auto_spot", false.into())
        .expect("auto");
    bench
        .set_targeter_setting("spot_size", 50.into())
        .expect("size");

    assert_eq!(bench.boundaries().expect("boundaries").len(), 3);
    let out = bench.spots().expect("spots").clone();
    assert_eq!(out.spots.len(), 2);
    for s in &out.spots {
        let (_, d) = nearest_center(s.pixel);
        assert!(d <= 1.5, "centroid {:?}", s.pixel);
    }
}

#[test]
fn otsu_finder_segments_bimodal_image() {
    let mut bench = bench_with(TargeterKind::Moments);
    bench.set_finder(FinderKind::Otsu);
    assert_eq!(bench.boundaries().expect("boundaries").len(), 2);
    assert_eq!(bench.spots().expect("spots").spots.len(), 2);
}

#[test]
fn spots_map_to_stage_coordinates() {
    let mut bench = bench_with(TargeterKind::Moments);
    assert_relative_eq!(bench.scale().expect("scale"), 1.0);
    let spots = bench.physical_spots().expect("physical");
    assert_eq!(spots.len(), 2);
    for s in &spots {
        let p = s.physical.expect("physical coordinate");
        assert_relative_eq!(p.x, s.pixel.x - 250.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 120.0 - s.pixel.y, epsilon = 1e-6);
    }
}

#[test]
fn missing_source_is_reported_not_defaulted() {
    let mut bench = Workbench::new();
    assert!(matches!(bench.spots(), Err(PipelineError::NoSource)));

    bench.set_source(disks(&[]).into(), None).expect("source");
    assert_eq!(bench.spots().expect("spots").spots.len(), 2);
    assert!(matches!(
        bench.physical_spots(),
        Err(PipelineError::Calibration(CalibrationError::NoSource { .. }))
    ));

    let empty = RgbImage::filled(0, 0, [0, 0, 0]);
    assert!(bench.set_source(empty.into(), Some(unit_metadata())).is_err());
    assert!(bench.image().is_none());
}

#[test]
fn overlays_mark_spots_and_boundaries() {
    let mut bench = bench_with(TargeterKind::Moments);
    let spots = bench.spots().expect("spots").spots.clone();
    let overlay = bench.render_spots().expect("overlay");
    for s in &spots {
        assert_eq!(overlay.get(s.pixel.x as usize, s.pixel.y as usize), SPOT_COLOR);
    }
    let canvas = bench.render_boundaries(7).expect("canvas");
    assert_eq!((canvas.width, canvas.height), (500, 240));
    assert_eq!(canvas.get(120, 120), [255, 255, 255]);
    assert_ne!(canvas.get(170, 120), [255, 255, 255]);
}

#[test]
fn report_is_written_where_the_config_says() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_path = dir.path().join("report.json");
    let config = PipelineConfig {
        targeter: TargeterKind::Moments.into(),
        output_path: Some(out_path.to_string_lossy().into_owned()),
        ..PipelineConfig::default()
    };

    let mut bench = Workbench::from_config(&config);
    bench
        .set_source(disks(&[]).into(), Some(unit_metadata()))
        .expect("source");
    let report = bench.write_report(&config).expect("report");
    assert_eq!(report.boundaries.len(), 2);
    assert_eq!(report.spots.len(), 2);
    assert!(report.spots.iter().all(|s| s.physical.is_some()));

    let loaded = SpotReport::load_json(&out_path).expect("load");
    assert_eq!(loaded.targeter, TargeterKind::Moments);
    assert_eq!(loaded.spot_size, report.spot_size);
    assert_eq!(loaded.spots.len(), 2);
    for (a, b) in loaded.spots.iter().zip(&report.spots) {
        assert_relative_eq!(a.pixel.x, b.pixel.x, epsilon = 1e-9);
        assert_relative_eq!(a.pixel.y, b.pixel.y, epsilon = 1e-9);
    }
    assert_eq!(bench.config().targeter, config.targeter);
}
