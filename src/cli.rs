use std::f32::consts::FRAC_PI_4;

use anyhow::{Context as _, ensure};
use gridtrace::{
    Grid, Hit, MaterialIdx, Node, Object,
    geometry::{FloatType, Ray, WorldMatrix, WorldPoint, WorldVector},
    scene::{Group, Plane, Sphere, Transform, Triangle},
};
use log::info;
use nalgebra::{Rotation3, Vector3};
use rand::{Rng, SeedableRng, rngs::SmallRng};

const TARGET_CELLS: usize = 4096;
const RAY_COUNT: usize = 100_000;
const SEED: u64 = 0x6772_6964;

/// Square pyramid with the apex at (0, 1, 0), base centered at origin.
fn pyramid(material: MaterialIdx) -> anyhow::Result<Group> {
    let apex = WorldPoint::new(0.0, 1.0, 0.0);
    let base = [
        WorldPoint::new(-1.0, 0.0, -1.0),
        WorldPoint::new(1.0, 0.0, -1.0),
        WorldPoint::new(1.0, 0.0, 1.0),
        WorldPoint::new(-1.0, 0.0, 1.0),
    ];

    let mut group = Group::new(base.len());
    for i in 0..base.len() {
        let side = Triangle::new(base[i], base[(i + 1) % base.len()], apex, material);
        group.add_object(i, side)?;
    }
    Ok(group)
}

fn demo_scene() -> anyhow::Result<Node> {
    let mut objects: Vec<Node> = vec![
        Plane::new(WorldVector::new(0.0, 1.0, 0.0), -1.0, MaterialIdx::from_raw(0)).into(),
        Transform::new(
            WorldMatrix::new_translation(&WorldVector::new(-3.0, 0.5, 2.0))
                * WorldMatrix::new_nonuniform_scaling(&WorldVector::new(2.0, 0.5, 1.0)),
            Sphere::new(WorldPoint::origin(), 1.0, MaterialIdx::from_raw(1)),
        )
        .into(),
        pyramid(MaterialIdx::from_raw(2))?.into(),
        Transform::new(
            WorldMatrix::new_translation(&WorldVector::new(3.0, 0.0, -2.0))
                * Rotation3::from_axis_angle(&Vector3::y_axis(), FRAC_PI_4).to_homogeneous()
                * WorldMatrix::new_scaling(1.5),
            pyramid(MaterialIdx::from_raw(3))?,
        )
        .into(),
    ];

    // A ring of spheres around the pyramids
    for i in 0..12 {
        let angle = i as FloatType * std::f32::consts::TAU / 12.0;
        let center = WorldPoint::new(
            6.0 * angle.cos(),
            0.5 * (i % 3) as FloatType,
            6.0 * angle.sin(),
        );
        let radius = 0.5 + 0.1 * (i % 4) as FloatType;
        objects.push(Sphere::new(center, radius, MaterialIdx::from_usize(4 + i)).into());
    }

    Ok(Group::from_iter(objects).into())
}

fn random_ray(rng: &mut impl Rng) -> Ray {
    let origin = WorldPoint::new(
        rng.random_range(-10.0..10.0),
        rng.random_range(-0.5..6.0),
        rng.random_range(-10.0..10.0),
    );
    let direction = WorldVector::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
    );
    Ray::new(origin, direction)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let scene = demo_scene()?;
    let bounding_box = scene.bounding_box().context("Scene has no bounding box")?;
    let resolution = Grid::suggest_resolution(&bounding_box, TARGET_CELLS);
    let grid = Grid::with_scene(&scene, resolution)?;
    grid.log_statistics();

    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut hits = 0usize;
    for i in 0..RAY_COUNT {
        let ray = random_ray(&mut rng);

        let mut expected = Hit::new();
        let expected_found = scene.intersect(&ray, &mut expected, 0.0);
        let mut actual = Hit::new();
        let found = grid.intersect(&ray, &mut actual, 0.0);

        ensure!(
            found == expected_found,
            "Ray #{i} {ray:?}: grid found {found}, whole scene found {expected_found}"
        );
        if found {
            ensure!(
                (actual.t() - expected.t()).abs() <= 1e-4 * expected.t().max(1.0)
                    && actual.material() == expected.material(),
                "Ray #{i} {ray:?}: grid hit {:?} at {}, whole scene hit {:?} at {}",
                actual.material(),
                actual.t(),
                expected.material(),
                expected.t()
            );
            hits += 1;
        }

        let shadow = grid.intersect_shadow_ray(&ray, &mut Hit::new(), 0.0);
        ensure!(
            shadow == expected_found,
            "Ray #{i} {ray:?}: shadow query disagrees with nearest hit query"
        );
    }

    info!("{RAY_COUNT} rays checked, {hits} hits, grid and whole scene agree");
    println!("{}", grid.statistics());

    Ok(())
}
