//! Integration tests for the radiation kernel.
//!
//! Each test builds a small particle population, runs full kernel passes and
//! checks a physical or structural property of the output buffer.

use std::f64::consts::PI;

use farfield_radiation::constants::{ELECTRON_CHARGE, ELECTRON_MASS, SPEED_OF_LIGHT};
use farfield_radiation::prelude::*;

const WIDTH: usize = 8;
const CELL: f64 = 1.0e-7;
const DT: f64 = 1.0e-17;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 2 x 1 x 1 core super-cells of 2^3 cells, one guard layer.
fn mapping() -> SuperCellMapping {
    SuperCellMapping::new_3d([2, 2, 2], [4, 3, 3], [1, 1, 1], Float3::splat(CELL))
        .expect("valid mapping")
}

fn domain_size() -> Float3 {
    Float3::new(4.0 * CELL, 2.0 * CELL, 2.0 * CELL)
}

fn config() -> RadiationConfig {
    RadiationConfig::default()
        .with_block_width(WIDTH)
        .with_dt(DT)
        .with_window(WindowFunction::None)
}

fn directions() -> AngularGrid {
    AngularGrid::new(3, 4, (0.2, 2.9), (0.0, 1.5 * PI)).expect("valid grid")
}

fn frequencies() -> LinearFrequencies {
    LinearFrequencies::new(16, 0.0, 5.0e15).expect("valid table")
}

fn momentum(u: Float3) -> Float3 {
    u * (ELECTRON_MASS * SPEED_OF_LIGHT)
}

/// Deterministic accelerated particle number `i`.
fn particle(i: usize) -> Particle {
    let x = i as f64;
    let u_old = Float3::new(0.1 * x.sin(), 0.2 * (1.3 * x).cos(), 0.3);
    let kick = Float3::new(0.05 * x.cos(), 0.02, -0.03 * (0.7 * x).sin());
    Particle::new(ELECTRON_MASS, ELECTRON_CHARGE)
        .at_cell(
            (i % 8) as u32,
            Float3::new(0.1 + 0.1 * (i % 7) as f64, 0.5, 0.3),
        )
        .with_momentum(momentum(u_old), momentum(u_old + kick))
}

fn population(n: usize) -> Vec<(SuperCellIdx, Particle)> {
    (0..n)
        .map(|i| {
            let sc = SuperCellIdx::new(1 + (i % 2) as u32, 1, 1);
            (sc, particle(i))
        })
        .collect()
}

fn store_of<I>(particles: I) -> ParticleStore
where
    I: IntoIterator<Item = (SuperCellIdx, Particle)>,
{
    let mut store = ParticleStore::new(WIDTH);
    for (sc, p) in particles {
        store.insert(sc, p);
    }
    store
}

fn run<G, F>(
    config: &RadiationConfig,
    store: &ParticleStore,
    geometry: &G,
    freqs: &F,
    step: u64,
) -> AmplitudeBuffer
where
    G: ObserverGeometry,
    F: FrequencyTable,
{
    let kernel = RadiationKernel::new(config).expect("valid config");
    let buffer = AmplitudeBuffer::new(geometry.len(), freqs.len());
    kernel
        .run(
            store,
            &mapping(),
            geometry,
            freqs,
            &buffer,
            &KernelInputs::new(step, domain_size()),
        )
        .expect("kernel pass");
    buffer
}

fn assert_close(actual: &[Amplitude], expected: &[Amplitude]) {
    assert_eq!(actual.len(), expected.len());
    let scale = expected
        .iter()
        .flat_map(|a| a.to_parts())
        .fold(0.0f64, |m, v| m.max(v.abs()));
    assert!(scale > 0.0, "reference buffer is all zero");

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        for (x, y) in a.to_parts().iter().zip(e.to_parts()) {
            assert!(
                (x - y).abs() <= 1e-10 * scale,
                "entry {} differs: {:?} vs {:?}",
                i,
                a,
                e
            );
        }
    }
}

#[test]
fn test_unaccelerated_particles_contribute_nothing() {
    init_tracing();
    let still: Vec<_> = (0..20)
        .map(|i| {
            let p = momentum(Float3::new(0.3, -0.1 * i as f64, 0.2));
            let sc = SuperCellIdx::new(1 + (i % 2) as u32, 1, 1);
            (sc, Particle::new(ELECTRON_MASS, ELECTRON_CHARGE).with_momentum(p, p))
        })
        .collect();

    let buffer = run(&config(), &store_of(still.clone()), &directions(), &frequencies(), 3);
    assert!(buffer.snapshot().iter().all(Amplitude::is_zero));

    // Mixed in with accelerated particles they change nothing either
    let accelerated = population(13);
    let mixed = still.into_iter().zip(accelerated.clone()).flat_map(|(a, b)| [a, b]);
    let reference = run(&config(), &store_of(accelerated), &directions(), &frequencies(), 3);
    let with_still = run(&config(), &store_of(mixed), &directions(), &frequencies(), 3);
    assert_close(&with_still.snapshot(), &reference.snapshot());
}

#[test]
fn test_visitation_order_independent() {
    init_tracing();
    let particles = population(37);
    let mut reversed = particles.clone();
    reversed.reverse();

    let forward = run(&config(), &store_of(particles), &directions(), &frequencies(), 5);
    let backward = run(&config(), &store_of(reversed), &directions(), &frequencies(), 5);
    assert_close(&backward.snapshot(), &forward.snapshot());
}

#[test]
fn test_disjoint_sets_add_up() {
    init_tracing();
    let particles = population(29);
    let (even, odd): (Vec<_>, Vec<_>) = particles
        .iter()
        .enumerate()
        .partition(|(i, _)| i % 2 == 0);
    let even = even.into_iter().map(|(_, p)| *p);
    let odd = odd.into_iter().map(|(_, p)| *p);

    let union = run(&config(), &store_of(particles.clone()), &directions(), &frequencies(), 7);

    let summed = run(&config(), &store_of(even), &directions(), &frequencies(), 7);
    let part = run(&config(), &store_of(odd), &directions(), &frequencies(), 7);
    part.accumulate_into(&summed).expect("same shape");

    assert_close(&summed.snapshot(), &union.snapshot());
}

#[test]
fn test_parallel_and_sequential_agree() {
    init_tracing();
    let store = store_of(population(50));
    let parallel = run(&config(), &store, &directions(), &frequencies(), 2);
    let sequential = run(&config().sequential(), &store, &directions(), &frequencies(), 2);
    assert_close(&parallel.snapshot(), &sequential.snapshot());
}

#[test]
fn test_window_boundary_particle_is_silent() {
    init_tracing();
    let config = config().with_window(WindowFunction::Triangle);

    // First core cell, lower x face: global x = 0, exactly on the boundary
    let edge = particle(3).at_cell(0, Float3::new(0.0, 0.5, 0.5));
    let buffer = run(
        &config,
        &store_of([(SuperCellIdx::new(1, 1, 1), edge)]),
        &directions(),
        &frequencies(),
        1,
    );
    assert!(buffer.snapshot().iter().all(Amplitude::is_zero));

    // Domain centre: local cell (0, 1, 1) of the second core super-cell
    let centre = particle(3).at_cell(6, Float3::ZERO);
    let store = store_of([(SuperCellIdx::new(2, 1, 1), centre)]);
    let windowed = run(&config, &store, &directions(), &frequencies(), 1);
    let plain = run(&self::config(), &store, &directions(), &frequencies(), 1);
    assert_close(&windowed.snapshot(), &plain.snapshot());
}

#[test]
fn test_coherence_scaling() {
    init_tracing();
    let direction = DirectionList::single(Float3::new(0.0, 1.0, 0.0)).expect("direction");
    let freqs = FrequencyList::new(vec![2.0e15]);
    let sc = SuperCellIdx::new(1, 1, 1);

    let single = particle(4);
    let double = single.with_weighting(2.0);

    for (form_factor, expected_ratio) in [(FormFactor::Coherent, 4.0), (FormFactor::Incoherent, 2.0)] {
        let config = config().with_form_factor(form_factor);
        let one = run(&config, &store_of([(sc, single)]), &direction, &freqs, 4);
        let two = run(&config, &store_of([(sc, double)]), &direction, &freqs, 4);

        let ratio = two.spectral_intensity(0, 0) / one.spectral_intensity(0, 0);
        assert!(
            (ratio - expected_ratio).abs() < 1e-9,
            "{:?}: power ratio {}",
            form_factor,
            ratio
        );
    }

    // Coherent amplitude magnitude doubles
    let config = config().with_form_factor(FormFactor::Coherent);
    let one = run(&config, &store_of([(sc, single)]), &direction, &freqs, 4);
    let two = run(&config, &store_of([(sc, double)]), &direction, &freqs, 4);
    let magnitude = |b: &AmplitudeBuffer| b.get(0, 0).intensity().sqrt();
    assert!((magnitude(&two) / magnitude(&one) - 2.0).abs() < 1e-9);

    // Two identical weighting-1 particles on one trajectory add in phase
    let pair = run(&self::config(), &store_of([(sc, single), (sc, single)]), &direction, &freqs, 4);
    let alone = run(&self::config(), &store_of([(sc, single)]), &direction, &freqs, 4);
    assert!((pair.get(0, 0).intensity() / alone.get(0, 0).intensity() - 4.0).abs() < 1e-9);
}

#[test]
fn test_nyquist_gating() {
    init_tracing();
    let n = Float3::new(0.0, 0.0, 1.0);
    let direction = DirectionList::single(n).expect("direction");
    let p = particle(2);
    let omega_c = NyquistFilter::low_pass().cutoff(n, p.beta(), DT).omega();

    let freqs = FrequencyList::new(vec![2.0 * omega_c, 0.5 * omega_c]);
    let store = store_of([(SuperCellIdx::new(1, 1, 1), p)]);

    let gated = run(
        &config().with_nyquist(NyquistFilter::low_pass()),
        &store,
        &direction,
        &freqs,
        6,
    );
    assert!(gated.get(0, 0).is_zero());
    assert!(gated.get(0, 1).intensity() > 0.0);

    let open = run(&config(), &store, &direction, &freqs, 6);
    assert!(open.get(0, 0).intensity() > 0.0);
    assert!(open.get(0, 1).intensity() > 0.0);
}

#[test]
fn test_single_kicked_particle_matches_formula() {
    init_tracing();
    let n = Float3::new(0.6, 0.0, 0.8);
    let direction = DirectionList::single(n).expect("direction");
    let freqs = FrequencyList::new(vec![0.0]);

    // At rest, then kicked; sits at the global origin so n·r = 0
    let kick = momentum(Float3::new(0.4, 0.3, 0.0));
    let p = Particle::new(ELECTRON_MASS, ELECTRON_CHARGE)
        .at_cell(0, Float3::ZERO)
        .with_momentum(Float3::ZERO, kick);
    let store = store_of([(SuperCellIdx::new(1, 1, 1), p)]);

    let buffer = run(&config(), &store, &direction, &freqs, 0);

    let (expected, t_ret) = compute(
        Float3::ZERO,
        Float3::ZERO,
        kick,
        ELECTRON_MASS,
        ELECTRON_CHARGE,
        n,
        DT,
        0.0,
    );
    assert_eq!(t_ret, 0.0);

    let got = buffer.get(0, 0);
    let scale = expected.norm();
    assert!(scale > 0.0);
    assert!((got.x.re - expected.x).abs() < 1e-12 * scale);
    assert!((got.y.re - expected.y).abs() < 1e-12 * scale);
    assert!((got.z.re - expected.z).abs() < 1e-12 * scale);
    assert_eq!([got.x.im, got.y.im, got.z.im], [0.0, 0.0, 0.0]);
}

#[test]
fn test_guard_super_cells_do_not_radiate() {
    init_tracing();
    let guard = SuperCellIdx::new(0, 1, 1);
    let outside = SuperCellIdx::new(9, 9, 9);
    let store = store_of([(guard, particle(1)), (outside, particle(2))]);

    let buffer = run(&config(), &store, &directions(), &frequencies(), 0);
    assert!(buffer.snapshot().iter().all(Amplitude::is_zero));
}

#[test]
fn test_radiation_flag_filter() {
    init_tracing();
    let config = config().with_filters(FilterConfig::default().with_radiation_flag());
    let sc = SuperCellIdx::new(1, 1, 1);

    let unmarked = run(&config, &store_of([(sc, particle(5))]), &directions(), &frequencies(), 0);
    assert!(unmarked.snapshot().iter().all(Amplitude::is_zero));

    let marked = particle(5).with_radiation_flag(true);
    let flagged = run(&config, &store_of([(sc, marked)]), &directions(), &frequencies(), 0);
    let reference = run(&self::config(), &store_of([(sc, marked)]), &directions(), &frequencies(), 0);
    assert_close(&flagged.snapshot(), &reference.snapshot());
}

#[test]
fn test_two_dimensional_partition() {
    init_tracing();
    let mapping = SuperCellMapping::new_2d([4, 4], [3, 3], [1, 1], [CELL, CELL]).expect("mapping");
    let kernel = RadiationKernel::new(&config().with_block_width(16)).expect("kernel");
    let mut store = ParticleStore::new(16);
    store.insert(SuperCellIdx::new(1, 1, 0), particle(0).at_cell(5, Float3::splat(0.5)));

    let geometry = directions();
    let freqs = frequencies();
    let buffer = AmplitudeBuffer::new(geometry.len(), freqs.len());
    let inputs = KernelInputs::new(0, Float3::new(4.0 * CELL, 4.0 * CELL, 0.0))
        .with_global_offset([0, 0, 0]);
    kernel
        .run(&store, &mapping, &geometry, &freqs, &buffer, &inputs)
        .expect("kernel pass");

    assert!(buffer.get(0, 3).intensity() > 0.0);
}
