use std::sync::Arc;

use critmc_geometry::{Boundary, BoundaryCondition, Mesh};
use critmc_material::Material;
use critmc_transport::{
    run, sampler, source_neutron, write_flux_ascii, Error, Settings, Simulation,
};
use nalgebra::Vector3;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rstest::{fixture, rstest};

fn fuel() -> Arc<Material> {
    Arc::new(
        Material::new(vec![2.0], vec![vec![1.0]], vec![0.5], 2.4, vec![1.0])
            .unwrap()
            .with_name("fuel"),
    )
}

fn scatterer() -> Arc<Material> {
    Arc::new(
        Material::new(vec![2.0], vec![vec![2.0]], vec![0.0], 0.0, vec![0.0])
            .unwrap()
            .with_name("scatterer"),
    )
}

fn absorber() -> Arc<Material> {
    Arc::new(
        Material::new(vec![1.0], vec![vec![0.5]], vec![0.0], 0.0, vec![0.0])
            .unwrap()
            .with_name("absorber"),
    )
}

#[fixture]
fn settings() -> Settings {
    Settings::new().seed(7).disable_progress(true)
}

#[fixture]
fn reflective_box() -> Boundary {
    Boundary::cube(1.0)
        .unwrap()
        .with_all_conditions(BoundaryCondition::Reflective)
}

#[rstest]
fn reflective_scatterer_never_terminates(settings: Settings, reflective_box: Boundary) {
    let mut mesh = Mesh::new(reflective_box.clone(), [2.0 / 3.0; 3], scatterer()).unwrap();
    let settings = settings.histories(1000).batches(1).max_collisions(200);

    let summary = run(&settings, &reflective_box, &mut mesh).unwrap();
    let batch = &summary.batches[0];

    assert_eq!(batch.absorption, 0.0);
    assert_eq!(batch.leakage, 0.0);
    assert_eq!(batch.lost, 0);
    assert_eq!(batch.truncated, 1000);
    assert_eq!(batch.k, 0.0);
    assert!(mesh.flux().total() > 0.0);
}

#[rstest]
fn vacuum_box_ends_every_history(settings: Settings) {
    let boundary = Boundary::cube(10.0).unwrap();
    let mut mesh = Mesh::new(boundary.clone(), [2.0; 3], fuel()).unwrap();
    let settings = settings.histories(10_000).batches(1);

    let summary = run(&settings, &boundary, &mut mesh).unwrap();
    let batch = &summary.batches[0];

    assert_eq!(batch.histories, 10_000);
    assert_eq!(batch.leakage + batch.absorption, 10_000.0);
    assert_eq!(batch.lost, 0);
    assert_eq!(batch.fission_sites, batch.fission as usize);

    // half of absorptions are fission, each releasing 2.4 neutrons on average
    let per_absorption = batch.fission / batch.absorption;
    assert!((per_absorption - 1.2).abs() < 0.06, "{per_absorption}");
    assert!(summary.mean_crow_distance > 0.0);
}

#[rstest]
fn reflective_fuel_converges_to_k_infinity(settings: Settings, reflective_box: Boundary) {
    let fuel = fuel();
    let mut mesh = Mesh::new(reflective_box.clone(), [1.0; 3], fuel.clone()).unwrap();
    let settings = settings.histories(5000).batches(3).inactive(1);

    let summary = run(&settings, &reflective_box, &mut mesh).unwrap();
    let k_inf = fuel.k_infinity().unwrap();

    for batch in &summary.batches {
        assert_eq!(batch.leakage, 0.0);
        assert_eq!(batch.absorption + batch.lost as f64, 5000.0);
        assert!((batch.k - k_inf).abs() < 0.08, "{} vs {}", batch.k, k_inf);
    }
    assert_eq!(summary.active_k_estimates().len(), 2);
}

#[test]
fn fission_neutrons_follow_chi() {
    let material = Arc::new(
        Material::new(
            vec![1.0, 2.0],
            vec![vec![0.5, 0.25], vec![0.0, 1.5]],
            vec![0.1, 0.3],
            2.5,
            vec![1.0, 0.0],
        )
        .unwrap(),
    );
    let boundary = Boundary::cube(5.0).unwrap();
    let mesh = Mesh::new(boundary.clone(), [1.0; 3], material).unwrap();

    let mut rng = Pcg64::seed_from_u64(99);
    for _ in 0..10_000 {
        let position = sampler::uniform_position(&mut rng, &boundary);
        let neutron = source_neutron(&mut rng, &mesh, position).unwrap();
        assert_eq!(neutron.group, 0);
    }
}

#[rstest]
fn fixed_seed_is_reproducible(settings: Settings) {
    let boundary = Boundary::cube(3.0).unwrap();
    let settings = settings.histories(500).batches(4).inactive(1);

    let mut results = Vec::new();
    for threads in [1, 1, 4] {
        let mut mesh = Mesh::new(boundary.clone(), [1.0; 3], fuel()).unwrap();
        let summary = run(&settings.clone().threads(threads), &boundary, &mut mesh).unwrap();
        results.push((summary, mesh.flux().total()));
    }

    let (first, first_flux) = &results[0];
    for (summary, flux) in &results[1..] {
        assert_eq!(summary.k_estimates(), first.k_estimates());
        for (a, b) in summary.batches.iter().zip(&first.batches) {
            assert_eq!(a.leakage, b.leakage);
            assert_eq!(a.absorption, b.absorption);
            assert_eq!(a.fission_sites, b.fission_sites);
        }
        assert!((flux - first_flux).abs() <= 1e-9 * first_flux);
    }

    // a different seed gives a different chain
    let mut mesh = Mesh::new(boundary.clone(), [1.0; 3], fuel()).unwrap();
    let other = run(&settings.clone().seed(8), &boundary, &mut mesh).unwrap();
    assert_ne!(other.k_estimates(), first.k_estimates());
}

#[rstest]
fn chain_dies_without_fission(settings: Settings) {
    let boundary = Boundary::cube(2.0).unwrap();
    let mut mesh = Mesh::new(boundary.clone(), [1.0; 3], absorber()).unwrap();
    let settings = settings.histories(100).batches(3);

    let mut simulation = Simulation::new(settings.clone(), &boundary, &mut mesh).unwrap();
    let first = simulation.run_batch().unwrap();
    assert_eq!(first.fission_sites, 0);
    assert!(simulation.source().is_empty());
    assert!(matches!(
        simulation.run_batch(),
        Err(Error::EmptyFissionBank { batch: 1 })
    ));

    let mut mesh = Mesh::new(boundary.clone(), [1.0; 3], absorber()).unwrap();
    assert!(matches!(
        run(&settings, &boundary, &mut mesh),
        Err(Error::EmptyFissionBank { batch: 1 })
    ));
}

#[rstest]
fn stepping_through_batches(settings: Settings) {
    let boundary = Boundary::cube(3.0).unwrap();
    let mut mesh = Mesh::new(boundary.clone(), [1.0; 3], fuel()).unwrap();
    let settings = settings.histories(200).batches(2);

    let mut simulation = Simulation::new(settings, &boundary, &mut mesh).unwrap();
    assert_eq!(simulation.batch(), 0);

    while !simulation.is_complete() {
        let result = simulation.run_batch().unwrap();
        assert_eq!(simulation.source().len(), result.fission_sites);
        assert!(simulation.flux().total() > 0.0);
    }

    assert_eq!(simulation.results().len(), 2);
    assert!(matches!(
        simulation.run_batch(),
        Err(Error::SimulationComplete { batches: 2 })
    ));

    let summary = simulation.finish();
    assert_eq!(summary.batches.len(), 2);
    assert!(summary.batches.iter().all(|b| b.active));
}

#[rstest]
fn mismatched_boundary_is_rejected(settings: Settings, reflective_box: Boundary) {
    let mut mesh = Mesh::new(Boundary::cube(2.0).unwrap(), [1.0; 3], fuel()).unwrap();
    assert!(matches!(
        Simulation::new(settings, &reflective_box, &mut mesh),
        Err(Error::BoundaryMismatch)
    ));
}

#[rstest]
fn invalid_settings_are_rejected(settings: Settings, reflective_box: Boundary) {
    let mut mesh = Mesh::new(reflective_box.clone(), [1.0; 3], fuel()).unwrap();
    let settings = settings.batches(2).inactive(2);
    assert!(matches!(
        run(&settings, &reflective_box, &mut mesh),
        Err(Error::InvalidSettings(_))
    ));
}

#[rstest]
fn heterogeneous_mesh(settings: Settings) {
    let boundary = Boundary::cube(3.0).unwrap();
    let mut mesh = Mesh::new(boundary.clone(), [1.0; 3], absorber()).unwrap();
    let filled = mesh
        .fill_material(
            fuel(),
            Vector3::new(-1.0, -1.0, -1.0),
            Vector3::new(1.0, 1.0, 1.0),
        )
        .unwrap();
    assert_eq!(filled, 8);

    let settings = settings.histories(2000).batches(2);
    let summary = run(&settings, &boundary, &mut mesh).unwrap();

    for batch in &summary.batches {
        assert_eq!(batch.leakage + batch.absorption, 2000.0);
        assert_eq!(batch.lost, 0);
    }

    // the second batch starts only from fuel cells
    assert!(summary.batches[1].k > summary.batches[0].k);
}

#[rstest]
fn flux_dump_has_every_value(settings: Settings) {
    let boundary = Boundary::cube(1.0).unwrap();
    let mut mesh = Mesh::new(boundary.clone(), [0.5, 1.0, 2.0], fuel()).unwrap();
    let settings = settings.histories(100).batches(1);
    run(&settings, &boundary, &mut mesh).unwrap();

    let path = std::env::temp_dir().join("critmc_power_iteration_flux.txt");
    write_flux_ascii(mesh.flux(), &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let values: Vec<f64> = text
        .split_whitespace()
        .map(|v| v.parse().unwrap())
        .collect();
    assert_eq!(values.len(), 4 * 2);
    assert!((values.iter().sum::<f64>() - mesh.flux().total()).abs() < 1e-9);
}
