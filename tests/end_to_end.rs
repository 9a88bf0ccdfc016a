//! Whole runs through the public API.

use layered_mcrt::output::save_results_to_file;
use layered_mcrt::{
    AbsorptionScoring, CrossingMode, GridSpec, LayerSpec, LayerStack, LayeredSlab, McRng,
    SimulationConfig, SimulationParams,
};

fn slab(n_ambient: f64, specs: &[LayerSpec]) -> LayeredSlab {
    let layers = LayerStack::new(n_ambient, specs, n_ambient).unwrap();
    LayeredSlab::new(layers, SimulationParams::new(GridSpec::new(0.005, 0.01, 40, 50, 30)))
}

fn energy_balance(slab: &LayeredSlab, photons: u64, seed: u64) -> f64 {
    let histogram = slab.run_mcrt(photons, 8, seed, false);
    histogram.rsp + histogram.total_weight() / photons as f64
}

#[test]
fn pure_absorber_absorbs_everything() {
    let slab = slab(1.0, &[LayerSpec { n: 1.0, mua: 1.0, mus: 0.0, g: 0.0, thickness: 1e6 }]);
    let photons = 100_000;
    let histogram = slab.run_mcrt(photons, 8, 1, false);

    assert_eq!(histogram.num_photons, photons);
    assert_eq!(histogram.rsp, 0.0);
    assert!((histogram.absorbed() - photons as f64).abs() <= 1e-9 * photons as f64);
    assert!(histogram.rd_ra.iter().all(|&v| v == 0.0));
    assert!(histogram.tt_ra.iter().all(|&v| v == 0.0));
}

#[test]
fn glass_slide_specular_reflectance() {
    let slab = slab(
        1.0,
        &[
            LayerSpec { n: 1.52, mua: 0.0, mus: 0.0, g: 0.0, thickness: 0.1 },
            LayerSpec { n: 1.37, mua: 1.0, mus: 100.0, g: 0.9, thickness: 0.1 },
        ],
    );
    let r1 = f64::powi((1.0 - 1.52) / (1.0 + 1.52), 2);
    let r2 = f64::powi((1.52 - 1.37) / (1.52 + 1.37), 2);
    let expected = r1 + (1.0 - r1) * (1.0 - r1) * r2 / (1.0 - r1 * r2);

    assert!((slab.specular_reflectance() - expected).abs() < 1e-9);
    let histogram = slab.run_mcrt(1000, 4, 2, false);
    assert!((histogram.rsp - expected).abs() < 1e-9);
}

#[test]
fn van_de_hulst_slab() {
    let slab = slab(1.0, &[LayerSpec { n: 1.0, mua: 10.0, mus: 90.0, g: 0.75, thickness: 0.02 }]);
    let photons = 50_000;
    let results = slab.run_mcrt(photons, 8, 3, false).scaled(slab.layers());

    assert!((results.rd - 0.09739).abs() < 0.01, "Rd = {}", results.rd);
    assert!((results.tt - 0.66096).abs() < 0.01, "Tt = {}", results.tt);
    assert!((results.rsp + results.rd + results.a + results.tt - 1.0).abs() < 0.02);
}

#[test]
fn weight_is_conserved_with_mismatched_layers() {
    let slab = slab(
        1.0,
        &[
            LayerSpec { n: 1.52, mua: 0.0, mus: 0.0, g: 0.0, thickness: 0.05 },
            LayerSpec { n: 1.37, mua: 1.0, mus: 100.0, g: 0.9, thickness: 0.1 },
            LayerSpec { n: 1.4, mua: 5.0, mus: 20.0, g: 0.5, thickness: 0.05 },
        ],
    );
    let balance = energy_balance(&slab, 20_000, 4);
    assert!((balance - 1.0).abs() < 0.02, "balance = {}", balance);
}

#[test]
fn partial_reflection_conserves_weight() {
    let layers = LayerStack::new(1.0, &[LayerSpec { n: 1.4, mua: 1.0, mus: 50.0, g: 0.8, thickness: 0.1 }], 1.0).unwrap();
    let mut params = SimulationParams::new(GridSpec::new(0.005, 0.01, 40, 50, 30));
    params.crossing = CrossingMode::PartialReflection;
    let slab = LayeredSlab::new(layers, params);

    let balance = energy_balance(&slab, 20_000, 5);
    assert!((balance - 1.0).abs() < 0.02, "balance = {}", balance);
}

#[test]
fn discarded_absorption_leaves_grid_empty() {
    let layers = LayerStack::new(1.0, &[LayerSpec { n: 1.4, mua: 1.0, mus: 50.0, g: 0.8, thickness: 0.1 }], 1.0).unwrap();
    let mut params = SimulationParams::new(GridSpec::new(0.005, 0.01, 40, 50, 30));
    params.absorption = AbsorptionScoring::Discarded;
    let slab = LayeredSlab::new(layers, params);

    let histogram = slab.run_mcrt(2_000, 4, 6, false);
    assert_eq!(histogram.absorbed(), 0.0);
    assert!(histogram.reflected() > 0.0);
    assert!(histogram.reflected() + histogram.transmitted() < 2_000.0);
}

#[test]
fn seed_fixes_the_run() {
    let slab = slab(1.0, &[LayerSpec { n: 1.37, mua: 1.0, mus: 100.0, g: 0.9, thickness: 0.1 }]);
    let a = slab.run_mcrt(5_000, 4, 10, false);
    let b = slab.run_mcrt(5_000, 4, 10, false);
    let c = slab.run_mcrt(5_000, 4, 11, false);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn single_stream_simulation() {
    let slab = slab(1.0, &[LayerSpec { n: 1.37, mua: 1.0, mus: 100.0, g: 0.9, thickness: 0.1 }]);
    let mut rng = McRng::seeded(12);
    let mut histogram = slab.new_histogram();
    slab.simulate(500, &mut rng, &mut histogram);
    slab.simulate(500, &mut rng, &mut histogram);
    assert_eq!(histogram.num_photons, 1000);
    assert!(histogram.total_weight() > 0.0);
}

#[test]
fn config_to_results_file() {
    let dir = std::env::temp_dir().join("layered_mcrt_end_to_end");
    std::fs::create_dir_all(&dir).unwrap();
    let config_path = dir.join("config.json");
    let results_path = dir.join("results.txt");

    let config = SimulationConfig { num_photons: 2_000, jobs: 4, seed: Some(8), ..SimulationConfig::default() };
    config.to_file(&config_path).unwrap();

    let loaded = SimulationConfig::from_file(&config_path).unwrap();
    let slab = loaded.build().unwrap();
    let histogram = slab.run_mcrt(loaded.num_photons, loaded.jobs, 8, false);
    save_results_to_file(&histogram.scaled(slab.layers()), &results_path, true).unwrap();

    let text = std::fs::read_to_string(&results_path).unwrap();
    assert!(text.starts_with("# photons\t2000\n"));
    assert!(text.contains("#Tt_ra[1/(cm2 sr)]"));
    std::fs::remove_dir_all(&dir).ok();
}
