//! End-to-end tests of the hydrostatic initialization pipeline: config
//! parsing through decomposition, multi-rank relay, and state output.

use approx::assert_relative_eq;
use nalgebra::Point3;
use std::thread;

use tecton::{
    create_weak_points, initialize_hydrostatic, integrate_block, ChannelRelay, Decomposition,
    DomainBounds, Geometry, HydrostaticParams, LocalBlock, Material, Rheology, SeedingPlan,
    SimulationConfig,
};

fn uniform_rock(density: f64) -> Material {
    Material {
        lambda: 30e9,
        mu: 30e9,
        density,
        alpha: 0.0,
        beta: 0.0,
        ref_temp: 0.0,
        ten_off: 1e9,
        rheology: Rheology::ELASTIC,
        plstrain: vec![],
        cohesion: vec![],
        friction_angle: vec![],
        dilation_angle: vec![],
    }
}

fn params(materials: &[Material], min_y: f64, max_y: f64) -> HydrostaticParams<'_> {
    HydrostaticParams {
        materials,
        gravity: 9.8,
        geometry: Geometry::Cartesian,
        bounds: DomainBounds {
            min: Point3::new(0.0, min_y, 0.0),
            max: Point3::new(1.0, max_y, 1.0),
        },
    }
}

#[test]
fn three_stacked_ranks_reproduce_single_rank_block() {
    // A 2x6x2 element grid split across three vertical processor layers
    // must produce exactly the same pressures as the undecomposed run,
    // up to floating-point accumulation order.
    let materials = vec![uniform_rock(3300.0)];
    let decomp = Decomposition::new([1, 3, 1], [2, 6, 2]).unwrap();

    let mut reference = LocalBlock::regular([2, 6, 2], Point3::origin(), [1.0; 3], 0);
    integrate_block(&mut reference, &params(&materials, 0.0, 6.0), &vec![0.0; 4], true).unwrap();

    let relays = ChannelRelay::stack(3);
    let mut handles = Vec::new();
    for (layer, mut relay) in relays.into_iter().enumerate() {
        let rank = decomp.rank_of([0, layer, 0]);
        let decomp = decomp.clone();
        let materials = materials.clone();
        handles.push(thread::spawn(move || {
            let mut block = LocalBlock::regular(
                [2, 2, 2],
                Point3::new(0.0, 2.0 * layer as f64, 0.0),
                [1.0; 3],
                0,
            );
            let summary = initialize_hydrostatic(
                &mut block,
                &decomp,
                rank,
                &params(&materials, 0.0, 6.0),
                &mut relay,
            )
            .unwrap();
            (layer, block, summary)
        }));
    }

    let mut pisos_seen = None;
    for handle in handles {
        let (layer, block, summary) = handle.join().unwrap();
        for k in 0..2 {
            for j in 0..2 {
                for i in 0..2 {
                    assert_relative_eq!(
                        block.element(i, j, k).hydro_pressure,
                        reference.element(i, 2 * layer + j, k).hydro_pressure,
                        epsilon = 1e-9
                    );
                }
            }
        }
        if let Some(p) = summary.pisos {
            assert!(pisos_seen.is_none(), "pisos captured on more than one rank");
            pisos_seen = Some((layer, p));
        }
    }

    // Only the bottom layer captures the isostatic reference
    let (layer, pisos) = pisos_seen.unwrap();
    assert_eq!(layer, 0);
    assert_relative_eq!(pisos, 6.0 * 3300.0 * 9.8, epsilon = 1e-9);
}

#[test]
fn layered_materials_accumulate_per_element_density() {
    // Light crust over dense mantle in one column
    let materials = vec![uniform_rock(2700.0), uniform_rock(3300.0)];
    let mut block = LocalBlock::regular([1, 4, 1], Point3::origin(), [1.0; 3], 0);
    block.assign_material_layer(0, 2, 1); // bottom two elements: mantle

    integrate_block(&mut block, &params(&materials, 0.0, 4.0), &[0.0], true).unwrap();

    let dp_crust = 2700.0 * 9.8;
    let dp_mantle = 3300.0 * 9.8;
    assert_relative_eq!(block.element(0, 3, 0).hydro_pressure, -0.5 * dp_crust, epsilon = 1e-6);
    assert_relative_eq!(
        block.element(0, 2, 0).hydro_pressure,
        -(1.5 * dp_crust),
        epsilon = 1e-6
    );
    assert_relative_eq!(
        block.element(0, 1, 0).hydro_pressure,
        -(2.0 * dp_crust + 0.5 * dp_mantle),
        epsilon = 1e-6
    );
    assert_relative_eq!(
        block.element(0, 0, 0).hydro_pressure,
        -(2.0 * dp_crust + 1.5 * dp_mantle),
        epsilon = 1e-6
    );
}

#[test]
fn spherical_shell_matches_cartesian_of_equal_thickness() {
    // A radial column along +x with shell thickness 1: radii 997..1000.
    // Pressures must match a cartesian column of the same thicknesses.
    let materials = vec![uniform_rock(3300.0)];

    let mut cartesian = LocalBlock::regular([1, 3, 1], Point3::origin(), [1.0; 3], 0);
    integrate_block(&mut cartesian, &params(&materials, 0.0, 3.0), &[0.0], true).unwrap();

    // Build the radial block: local y maps to radius 997 + j
    let mut radial = LocalBlock::regular([1, 3, 1], Point3::origin(), [1e-3, 1.0, 1e-3], 0);
    for j in 0..4 {
        for k in 0..2 {
            for i in 0..2 {
                let idx = radial.node_index(i, j, k);
                let p = radial.nodes[idx];
                radial.nodes[idx] = Point3::new(997.0 + j as f64, p.x, p.z);
            }
        }
    }
    let radial_params = HydrostaticParams {
        geometry: Geometry::Spherical,
        ..params(&materials, 0.0, 3.0)
    };
    integrate_block(&mut radial, &radial_params, &[0.0], true).unwrap();

    for j in 0..3 {
        assert_relative_eq!(
            radial.element(0, j, 0).hydro_pressure,
            cartesian.element(0, j, 0).hydro_pressure,
            epsilon = 1.0
        );
    }
}

#[test]
fn config_drives_a_two_rank_run() {
    let config = SimulationConfig::from_str(
        r#"
        gravity = 9.8

        [domain]
        min = [0.0, 0.0, 0.0]
        max = [2.0, 4.0, 2.0]

        [grid]
        elements = [2, 4, 2]
        processors = [1, 2, 1]

        [[materials]]
        lambda = 30e9
        mu = 30e9
        density = 3300.0
        rheology = ["elastic"]
        "#,
    )
    .unwrap();

    let materials = config.build_materials().unwrap();
    let decomp = config.decomposition().unwrap();
    assert_eq!(decomp.local_extents(0), [2, 2, 2]);

    let shared = HydrostaticParams {
        materials: &materials,
        gravity: config.gravity,
        geometry: config.hydro_geometry(),
        bounds: config.bounds(),
    };

    let mut relays = ChannelRelay::stack(2);
    let mut top = LocalBlock::regular([2, 2, 2], Point3::new(0.0, 2.0, 0.0), [1.0; 3], 0);
    let mut bottom = LocalBlock::regular([2, 2, 2], Point3::origin(), [1.0; 3], 0);

    // Single-threaded drive, top layer first; the channel buffers the plane
    initialize_hydrostatic(&mut top, &decomp, 1, &shared, &mut relays[1]).unwrap();
    let summary = initialize_hydrostatic(&mut bottom, &decomp, 0, &shared, &mut relays[0]).unwrap();

    assert_relative_eq!(summary.pisos.unwrap(), 4.0 * 3300.0 * 9.8, epsilon = 1e-9);
    // rzbo propagated from the configured domain bounds
    assert_eq!(bottom.element(0, 0, 0).rzbo, 0.0);
}

#[test]
fn seeding_splits_consistently_across_ranks() {
    // The same plan on two vertically stacked ranks must partition the
    // global weak-point set without overlap or loss.
    let materials = vec![Material {
        rheology: Rheology::ELASTIC.union(Rheology::PLASTIC),
        plstrain: vec![0.0, 0.1, 0.5],
        cohesion: vec![40e6, 20e6, 4e6],
        friction_angle: vec![30.0, 15.0, 15.0],
        dilation_angle: vec![0.0, 0.0, 0.0],
        ..uniform_rock(2700.0)
    }];
    let decomp = Decomposition::new([1, 2, 1], [4, 4, 4]).unwrap();
    let plan = SeedingPlan {
        fraction_weak_points: 0.5,
        subdomain_fraction: [1.0, 1.0, 1.0],
        weak_point_cohesion: 30e6,
        rng_seed: 99,
        trigger_point: None,
    };

    let mut counts = 0;
    for rank in 0..2 {
        let mut block = LocalBlock::regular(
            [4, 2, 4],
            Point3::new(0.0, 2.0 * rank as f64, 0.0),
            [1.0; 3],
            0,
        );
        let report = create_weak_points(&mut block, &decomp, rank, &materials, &plan).unwrap();
        assert_eq!(report.weak_points_global, 32);
        counts += report.weak_points_local;
    }
    assert_eq!(counts, 32);
}
