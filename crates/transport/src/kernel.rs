//! Transport of a single neutron history through the mesh

// crate modules
use crate::particle::{Fate, Neutron};
use crate::sampler;
use crate::tally::BatchAccumulator;

// critmc modules
use critmc_geometry::{Axis, Boundary, BoundaryCondition, CellIndex, Mesh, Side};
use critmc_material::Material;

// external crates
use log::{trace, warn};
use nalgebra::Vector3;
use rand::Rng;

/// Face crossings allowed in a single flight before the neutron is abandoned
///
/// Only reachable when a neutron streams through void between reflective
/// faces with nothing to collide with.
const MAX_CROSSINGS_PER_FLIGHT: usize = 1_000_000;

/// Read-only environment shared by every history in a batch
#[derive(Debug, Clone, Copy)]
pub struct HistoryContext<'a> {
    /// Mesh with materials assigned
    pub mesh: &'a Mesh,
    /// Boundary conditions applied at the edge of the mesh
    pub boundary: &'a Boundary,
    /// Collisions allowed before the history is cut short
    pub max_collisions: Option<usize>,
}

impl<'a> HistoryContext<'a> {
    /// Context for a mesh and its boundary, with no collision limit
    pub fn new(mesh: &'a Mesh, boundary: &'a Boundary) -> Self {
        Self {
            mesh,
            boundary,
            max_collisions: None,
        }
    }

    /// Cut histories short after this many collisions, `None` for no limit
    pub fn max_collisions(mut self, max_collisions: Option<usize>) -> Self {
        self.max_collisions = max_collisions;
        self
    }
}

/// Track a neutron from its current state to the end of its history
///
/// The neutron moves in straight segments, each ending at the nearest face
/// of its current cell or at a collision, whichever is closer. The flux of the
/// cell a segment starts in is scored with the segment length.
///
/// On reaching cell faces:
///
/// - Every face at the minimum distance is crossed together, so a neutron
///   reaching an edge or corner crosses all of the faces meeting there
/// - The position is set exactly onto every crossed face
/// - A crossed face on the edge of the mesh applies the boundary condition.
///   Any vacuum face ends the history as leaked, otherwise every reflective
///   face flips the matching direction component
///
/// A collision at exactly the same distance as a face happens after crossing
/// the face, in the cell entered.
///
/// On collision the neutron either scatters into a new direction and group,
/// or is absorbed. An absorption may cause fission, in which case a copy of
/// the absorption site is added to the fission bank for every neutron
/// emitted.
///
/// Histories that cannot be resolved geometrically are not an error. They end
/// as [Fate::Lost] with a warning, keeping whatever flux was already scored.
///
/// Every history, however it ends, scores its crow-fly distance.
pub fn transport_neutron<R: Rng + ?Sized>(
    neutron: &mut Neutron,
    ctx: &HistoryContext,
    rng: &mut R,
    acc: &mut BatchAccumulator,
) -> Fate {
    let fate = track(neutron, ctx, rng, acc);
    neutron.fate = fate;
    trace!(
        "History ended {} after {} collisions at {:?}",
        fate,
        neutron.collisions,
        neutron.position.as_slice()
    );
    acc.tallies.score_fate(fate, neutron.crow_distance());
    fate
}

/// Alternate between flights and collisions until the history ends
fn track<R: Rng + ?Sized>(
    neutron: &mut Neutron,
    ctx: &HistoryContext,
    rng: &mut R,
    acc: &mut BatchAccumulator,
) -> Fate {
    if let Err(e) = locate(neutron, ctx.mesh) {
        warn!("Lost neutron at start of history: {e}");
        return Fate::Lost;
    }

    loop {
        if let Some(fate) = fly(neutron, ctx, rng, acc) {
            return fate;
        }

        if let Some(fate) = collide(neutron, ctx, rng, acc) {
            return fate;
        }
    }
}

/// Move the neutron until it reaches a collision site
///
/// The flight length is sampled in mean free paths so that it carries over
/// correctly between cells of different materials. Returns a fate only if the
/// history ends before the collision.
fn fly<R: Rng + ?Sized>(
    neutron: &mut Neutron,
    ctx: &HistoryContext,
    rng: &mut R,
    acc: &mut BatchAccumulator,
) -> Option<Fate> {
    let mut tau = sampler::optical_depth(rng);
    let mut crossings = 0;

    loop {
        let sigma_t = match ctx.mesh.material_of(neutron.cell) {
            Ok(m) => m.sigma_t(neutron.group),
            Err(e) => {
                warn!("Lost neutron during flight: {e}");
                return Some(Fate::Lost);
            }
        };

        let collision = if sigma_t > 0.0 {
            tau / sigma_t
        } else {
            f64::INFINITY
        };
        if collision <= 0.0 {
            return None;
        }

        // a zero step is a neutron sitting on the face it is moving through
        let (step, distances) = face_distances(neutron, ctx.mesh);
        if !(step >= 0.0 && step.is_finite()) {
            warn!(
                "Lost neutron with no face ahead in cell {} at {:?}, direction {:?}",
                neutron.cell,
                neutron.position.as_slice(),
                neutron.direction.as_slice()
            );
            return Some(Fate::Lost);
        }

        // collision inside the current cell
        if collision < step {
            advance_within_cell(neutron, ctx.mesh, collision);
            acc.flux.add(neutron.cell, neutron.group, collision);
            return None;
        }

        crossings += 1;
        if crossings > MAX_CROSSINGS_PER_FLIGHT {
            warn!("Lost neutron after {crossings} face crossings without a collision");
            return Some(Fate::Lost);
        }

        let start = neutron.cell;
        let crossed = cross_faces(neutron, ctx.mesh, step, &distances);
        acc.flux.add(start, neutron.group, step);

        tau = if collision == step {
            0.0
        } else {
            (tau - step * sigma_t).max(0.0)
        };

        if let Some(fate) = apply_boundaries(neutron, ctx, &crossed) {
            return Some(fate);
        }

        if let Err(e) = locate(neutron, ctx.mesh) {
            warn!("Lost neutron after crossing out of cell {start}: {e}");
            return Some(Fate::Lost);
        }
    }
}

/// Scatter or absorb at the current position
///
/// Returns a fate if the history ends here.
fn collide<R: Rng + ?Sized>(
    neutron: &mut Neutron,
    ctx: &HistoryContext,
    rng: &mut R,
    acc: &mut BatchAccumulator,
) -> Option<Fate> {
    let material: &Material = match ctx.mesh.material_of(neutron.cell) {
        Ok(m) => m.as_ref(),
        Err(e) => {
            warn!("Lost neutron at collision: {e}");
            return Some(Fate::Lost);
        }
    };

    neutron.collisions += 1;
    let g = neutron.group;

    if sampler::is_scatter(rng, material, g) {
        neutron.direction = sampler::isotropic_direction(rng);
        neutron.group = sampler::scatter_group(rng, material, g);

        if let Err(e) = locate(neutron, ctx.mesh) {
            warn!("Lost neutron after scatter: {e}");
            return Some(Fate::Lost);
        }

        return match ctx.max_collisions {
            Some(max) if neutron.collisions >= max => Some(Fate::Truncated),
            _ => None,
        };
    }

    acc.tallies.absorption.add(1.0);

    if sampler::is_fission(rng, material, g) {
        let n = sampler::fission_multiplicity(rng, material.nu());
        for _ in 0..n {
            acc.bank.push(neutron.position);
        }
        acc.tallies.fission.add(n as f64);
    }

    Some(Fate::Absorbed)
}

/// Refresh the cached cell index for the current position and direction
fn locate(neutron: &mut Neutron, mesh: &Mesh) -> critmc_geometry::Result<CellIndex> {
    neutron.cell = mesh.cell_of(&neutron.position, &neutron.direction)?;
    Ok(neutron.cell)
}

/// Distance to the face ahead on each axis, and the smallest of them
///
/// Axes with a zero direction component never reach a face and are left as
/// infinite rather than divided by zero.
fn face_distances(neutron: &Neutron, mesh: &Mesh) -> (f64, [f64; 3]) {
    let mut distances = [f64::INFINITY; 3];

    for axis in Axis::ALL {
        let a = axis.index();
        let u = neutron.direction[a];
        let target = match Side::towards(u) {
            Some(Side::Max) => mesh.face(axis, neutron.cell[axis] + 1),
            Some(Side::Min) => mesh.face(axis, neutron.cell[axis]),
            None => continue,
        };
        distances[a] = (target - neutron.position[a]) / u;
    }

    let step = distances.iter().copied().fold(f64::INFINITY, f64::min);
    (step, distances)
}

/// Move to a collision site inside the current cell
fn advance_within_cell(neutron: &mut Neutron, mesh: &Mesh, distance: f64) {
    neutron.position += neutron.direction * distance;

    // rounding must never carry the position out of the cell
    for axis in Axis::ALL {
        let a = axis.index();
        let i = neutron.cell[axis];
        neutron.position[a] = neutron.position[a].clamp(mesh.face(axis, i), mesh.face(axis, i + 1));
    }
}

/// Move onto the nearest faces and report which side was crossed on each axis
///
/// Faces at exactly the minimum distance are crossed, as is any face that the
/// updated position has reached or passed through rounding.
fn cross_faces(
    neutron: &mut Neutron,
    mesh: &Mesh,
    step: f64,
    distances: &[f64; 3],
) -> [Option<Side>; 3] {
    let mut crossed = [None; 3];
    let cell = neutron.cell;
    neutron.position += neutron.direction * step;

    for axis in Axis::ALL {
        let a = axis.index();
        let i = cell[axis];
        let (lower, upper) = (mesh.face(axis, i), mesh.face(axis, i + 1));

        let reached = match Side::towards(neutron.direction[a]) {
            Some(Side::Max) => distances[a] == step || neutron.position[a] >= upper,
            Some(Side::Min) => distances[a] == step || neutron.position[a] <= lower,
            None => false,
        };

        if reached {
            let side = Side::towards(neutron.direction[a]);
            neutron.position[a] = if side == Some(Side::Max) { upper } else { lower };
            crossed[a] = side;
        } else {
            neutron.position[a] = neutron.position[a].clamp(lower, upper);
        }
    }

    crossed
}

/// Apply conditions for crossed faces on the edge of the mesh
///
/// Vacuum wins over reflection when a corner mixes the two.
fn apply_boundaries(
    neutron: &mut Neutron,
    ctx: &HistoryContext,
    crossed: &[Option<Side>; 3],
) -> Option<Fate> {
    let dims = ctx.mesh.dims();
    let mut reflect: Vec<(Axis, Side)> = Vec::new();

    for axis in Axis::ALL {
        let Some(side) = crossed[axis.index()] else {
            continue;
        };

        let on_edge = match side {
            Side::Min => neutron.cell[axis] == 0,
            Side::Max => neutron.cell[axis] == dims[axis.index()] - 1,
        };
        if !on_edge {
            continue;
        }

        match ctx.boundary.surface_condition(axis, side) {
            BoundaryCondition::Vacuum => return Some(Fate::Leaked),
            BoundaryCondition::Reflective => reflect.push((axis, side)),
        }
    }

    for (axis, side) in reflect {
        let a = axis.index();
        neutron.direction[a] = -neutron.direction[a];
        neutron.position[a] = ctx.boundary.coordinate(axis, side);
    }

    None
}

/// Starting state for a history
///
/// The position is either sampled uniformly in the mesh or taken from a
/// fission bank by the caller. The group is drawn from the fission spectrum of
/// the material at that position.
pub fn source_neutron<R: Rng + ?Sized>(
    rng: &mut R,
    mesh: &Mesh,
    position: Vector3<f64>,
) -> critmc_geometry::Result<Neutron> {
    let direction = sampler::isotropic_direction(rng);
    let material = mesh.material_at(&position, &direction)?;
    let group = sampler::fission_group(rng, material.chi());
    Ok(Neutron::new(position, direction, group))
}
