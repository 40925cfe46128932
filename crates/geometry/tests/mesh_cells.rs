use std::sync::Arc;

use critmc_geometry::{Axis, Boundary, BoundaryCondition, CellIndex, Error, Mesh, Side};
use critmc_material::Material;
use nalgebra::Vector3;
use rstest::{fixture, rstest};

fn material(name: &str, sigma_f: f64) -> Arc<Material> {
    let chi = if sigma_f > 0.0 { 1.0 } else { 0.0 };
    Arc::new(
        Material::new(vec![2.0], vec![vec![1.0]], vec![sigma_f], 2.4, vec![chi])
            .unwrap()
            .with_name(name),
    )
}

#[fixture]
fn mesh() -> Mesh {
    let boundary = Boundary::new(-1.0, 1.0, 0.0, 3.0, -2.0, 2.0)
        .unwrap()
        .with_all_conditions(BoundaryCondition::Reflective);
    Mesh::new(boundary, [2.0 / 3.0, 0.5, 4.0 / 7.0], material("water", 0.0)).unwrap()
}

#[rstest]
fn dimensions(mesh: Mesh) {
    assert_eq!(mesh.dims(), [3, 6, 7]);
    assert_eq!(mesh.n_cells(), 126);
    assert_eq!(mesh.cells().count(), 126);
    assert_eq!(mesh.flux().shape(), [1, 3, 6, 7]);
}

#[rstest]
#[case::positive(Vector3::new(1.0, 1.0, 1.0))]
#[case::negative(Vector3::new(-1.0, -1.0, -1.0))]
#[case::stationary(Vector3::zeros())]
fn cell_centre_round_trip(mesh: Mesh, #[case] direction: Vector3<f64>) {
    for cell in mesh.cells() {
        let centre = mesh.cell_center(cell).unwrap();
        assert_eq!(mesh.cell_of(&centre, &direction).unwrap(), cell);
    }
}

#[rstest]
fn cell_bounds_contain_position(mesh: Mesh) {
    let p = Vector3::new(0.1, 2.9, -1.99);
    let (lower, upper) = mesh.cell_bounds(&p, &Vector3::x()).unwrap();
    for a in 0..3 {
        assert!(lower[a] <= p[a] && p[a] < upper[a]);
    }
    assert_eq!(upper[1], 3.0);
}

#[rstest]
fn every_interior_face_is_resolved_by_direction(mesh: Mesh) {
    for axis in Axis::ALL {
        let n = mesh.dims()[axis.index()];
        for i in 1..n {
            let mut p = mesh.cell_center(CellIndex::default()).unwrap();
            p[axis.index()] = mesh.face(axis, i);

            let mut up = Vector3::zeros();
            up[axis.index()] = 1.0;
            let down = -up;

            assert_eq!(mesh.cell_of(&p, &up).unwrap()[axis], i);
            assert_eq!(mesh.cell_of(&p, &down).unwrap()[axis], i - 1);
        }
    }
}

#[rstest]
fn full_fill_covers_every_cell(mut mesh: Mesh) {
    let fuel = material("fuel", 0.5);
    let boundary = mesh.boundary().clone();

    for _ in 0..2 {
        let filled = mesh
            .fill_material(fuel.clone(), boundary.min_corner(), boundary.max_corner())
            .unwrap();
        assert_eq!(filled, mesh.n_cells());
    }

    for cell in mesh.cells() {
        assert_eq!(mesh.material_of(cell).unwrap().name(), "fuel");
    }
}

#[rstest]
fn partial_fill_stops_at_faces(mut mesh: Mesh) {
    let fuel = material("fuel", 0.5);
    let filled = mesh
        .fill_material(
            fuel,
            Vector3::new(-1.0 / 3.0, 1.0, -2.0),
            Vector3::new(1.0 / 3.0, 2.0, 2.0),
        )
        .unwrap();

    // one x cell, two y cells, all z cells
    assert_eq!(filled, 14);
    assert_eq!(mesh.material_of(CellIndex::new(1, 2, 0)).unwrap().name(), "fuel");
    assert_eq!(mesh.material_of(CellIndex::new(1, 4, 0)).unwrap().name(), "water");
    assert_eq!(mesh.material_of(CellIndex::new(0, 2, 0)).unwrap().name(), "water");
}

#[rstest]
fn fill_outside_of_mesh(mut mesh: Mesh) {
    let result = mesh.fill_material(
        material("fuel", 0.5),
        Vector3::new(-1.0, 0.0, -2.0),
        Vector3::new(1.0, 4.0, 2.0),
    );
    assert!(matches!(result, Err(Error::PositionOutOfBounds { .. })));
}

#[rstest]
fn flux_accumulates_and_clears(mut mesh: Mesh) {
    let cell = CellIndex::new(2, 5, 6);
    mesh.add_flux(cell, 0, 0.25);
    mesh.add_flux(cell, 0, 0.5);
    assert_eq!(mesh.flux().get(cell, 0), 0.75);
    assert_eq!(mesh.flux().slice_z(0, 6)[2][5], 0.75);

    mesh.clear_flux();
    assert_eq!(mesh.flux().total(), 0.0);
}

#[rstest]
fn boundary_is_kept(mesh: Mesh) {
    assert_eq!(
        mesh.boundary().surface_condition(Axis::Y, Side::Max),
        BoundaryCondition::Reflective
    );
    assert_eq!(mesh.face(Axis::Z, 7), 2.0);
}
