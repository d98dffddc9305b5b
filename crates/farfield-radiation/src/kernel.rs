//! Far-field radiation kernel.
//!
//! One block per observation direction, one thread per frame slot. Each block
//! walks every core super-cell of the local partition and, frame by frame:
//!
//! 1. compacts the radiating particles of the frame into block-shared scratch
//!    (windowed amplitude vector, retarded time, weighting, frequency cutoff),
//! 2. lets every thread sum the compacted contributions for a strided subset
//!    of frequencies and add the sums atomically into the output buffer,
//! 3. moves on to the previous frame of the chain.
//!
//! ```text
//! INIT -> per super-cell: LOAD_FRAME | while valid { PROCESS | ACCUMULATE | ADVANCE | }
//! ```
//!
//! `|` marks a block barrier. The kernel has no error path once launched.

use farfield_core::{CpuLauncher, LaunchOptions, LaunchReport, SharedArena};
use tracing::{debug, info, trace};

use crate::amplitude::{self, Amplitude};
use crate::buffer::AmplitudeBuffer;
use crate::config::RadiationConfig;
use crate::error::{RadiationError, Result};
use crate::filter::FilterChain;
use crate::form_factor::FormFactor;
use crate::frame::{FrameBatch, FrameSource};
use crate::frequency::FrequencyTable;
use crate::mapping::{SuperCellIdx, SuperCellMapping};
use crate::nyquist::{Cutoff, NyquistFilter};
use crate::observer::ObserverGeometry;
use crate::vector::Float3;
use crate::window::WindowFunction;

/// Per-invocation inputs that change every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelInputs {
    /// Cell offset of this partition's first core cell in the global domain.
    pub global_offset: [i64; 3],
    /// Current simulation step.
    pub step: u64,
    /// Physical extent of the global simulation domain [m].
    pub domain_size: Float3,
}

impl KernelInputs {
    /// Inputs for a partition at the origin of the global domain.
    pub fn new(step: u64, domain_size: Float3) -> Self {
        Self {
            global_offset: [0; 3],
            step,
            domain_size,
        }
    }

    /// Set the global cell offset.
    pub fn with_global_offset(mut self, offset: [i64; 3]) -> Self {
        self.global_offset = offset;
        self
    }
}

/// One compacted particle, as seen from the block's direction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StagedContribution {
    /// Windowed real amplitude vector.
    pub amplitude: Float3,
    /// Retarded time [s].
    pub t_ret: f64,
    /// Macro-particle weighting.
    pub weighting: f64,
    /// Frequency cutoff of the particle.
    pub cutoff: Cutoff,
}

/// Two block-shared compaction arenas.
///
/// Frame `k` compacts into bank `k mod 2`. Advancing to the next frame swaps
/// the banks and resets the incoming one.
///
/// The second bank mirrors the device-side staging layout. On the CPU
/// launcher phases run one after another, so the banks never overlap.
#[derive(Debug)]
pub struct StageBanks {
    banks: [SharedArena<StagedContribution>; 2],
    active: usize,
}

impl StageBanks {
    /// Create both banks with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            banks: [SharedArena::new(capacity), SharedArena::new(capacity)],
            active: 0,
        }
    }

    /// Index of the bank in use.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Bank of the current frame.
    #[inline]
    pub fn active(&self) -> &SharedArena<StagedContribution> {
        &self.banks[self.active]
    }

    /// Bank of the current frame, for compaction.
    #[inline]
    pub fn active_mut(&mut self) -> &mut SharedArena<StagedContribution> {
        &mut self.banks[self.active]
    }

    /// Swap banks and clear the one that becomes active.
    #[inline]
    pub fn advance(&mut self) {
        self.active ^= 1;
        self.banks[self.active].reset();
    }
}

/// Radiation kernel with its setup-time strategies.
#[derive(Debug)]
pub struct RadiationKernel {
    block_width: usize,
    dt: f64,
    parallel: bool,
    filters: FilterChain,
    nyquist: NyquistFilter,
    form_factor: FormFactor,
    window: WindowFunction,
    launcher: CpuLauncher,
}

impl RadiationKernel {
    /// Build the kernel from a validated configuration.
    pub fn new(config: &RadiationConfig) -> Result<Self> {
        config.validate()?;
        let filters = FilterChain::from_config(&config.filters);

        info!(
            "Radiation kernel: block_width={}, dt={:e}, nyquist={:?}, form_factor={:?}, window={:?}, filters={:?}",
            config.block_width,
            config.dt,
            config.nyquist,
            config.form_factor,
            config.window,
            filters.names()
        );

        Ok(Self {
            block_width: config.block_width,
            dt: config.dt,
            parallel: config.parallel,
            filters,
            nyquist: config.nyquist,
            form_factor: config.form_factor,
            window: config.window,
            launcher: CpuLauncher::new(),
        })
    }

    /// Replace the eligibility chain.
    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    /// Threads per block.
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    /// Time step [s].
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Eligibility chain.
    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// Launcher used for every pass.
    pub fn launcher(&self) -> &CpuLauncher {
        &self.launcher
    }

    fn check_preconditions<S, G, F>(
        &self,
        store: &S,
        mapping: &SuperCellMapping,
        geometry: &G,
        frequencies: &F,
        buffer: &AmplitudeBuffer,
    ) -> Result<()>
    where
        S: FrameSource,
        G: ObserverGeometry + ?Sized,
        F: FrequencyTable + ?Sized,
    {
        mapping.validate()?;
        if store.frame_capacity() != self.block_width {
            return Err(RadiationError::mismatch(
                "frame capacity",
                self.block_width,
                store.frame_capacity(),
            ));
        }
        if buffer.num_directions() != geometry.len() {
            return Err(RadiationError::mismatch(
                "buffer directions",
                geometry.len(),
                buffer.num_directions(),
            ));
        }
        if buffer.n_omega() != frequencies.len() {
            return Err(RadiationError::mismatch(
                "buffer frequencies",
                frequencies.len(),
                buffer.n_omega(),
            ));
        }
        Ok(())
    }

    /// Add this step's radiation of every particle in `store` into `buffer`.
    ///
    /// Fails before any block runs if the mapping is invalid, the frame
    /// capacity differs from the block width or the buffer shape does not
    /// match the direction and frequency tables.
    pub fn run<S, G, F>(
        &self,
        store: &S,
        mapping: &SuperCellMapping,
        geometry: &G,
        frequencies: &F,
        buffer: &AmplitudeBuffer,
        inputs: &KernelInputs,
    ) -> Result<LaunchReport>
    where
        S: FrameSource,
        G: ObserverGeometry + ?Sized,
        F: FrequencyTable + ?Sized,
    {
        self.check_preconditions(store, mapping, geometry, frequencies, buffer)?;

        let super_cells: Vec<SuperCellIdx> = mapping.core_super_cells().collect();
        let options = LaunchOptions::new(geometry.len() as u32, self.block_width as u32);
        let options = if self.parallel {
            options
        } else {
            options.sequential()
        };

        debug!(
            "Radiation pass step={}: {} directions x {} frequencies, {} super-cells",
            inputs.step,
            geometry.len(),
            frequencies.len(),
            super_cells.len()
        );

        let time = inputs.step as f64 * self.dt;
        let width = self.block_width;
        let n_omega = frequencies.len();

        let report = self.launcher.launch("radiation", options, |block| {
            // INIT
            let direction_index = block.block_index();
            let n = geometry.direction(direction_index);
            let mut banks = StageBanks::new(width);

            for &super_cell in &super_cells {
                // LOAD_FRAME
                let mut stream = store.frames(super_cell);
                let mut current: Option<FrameBatch<'_>> = block.single(|_| {
                    banks.active().reset();
                    stream.next()
                });
                block.sync_threads();

                let mut frames = 0usize;
                while let Some(batch) = current {
                    frames += 1;

                    // PROCESS_PARTICLES
                    let bank = banks.active_mut();
                    block.for_each_thread(|tid| {
                        let Some(particle) = batch.particle(tid.index()) else {
                            return;
                        };
                        if !self.filters.radiates(particle) {
                            return;
                        }

                        let position = mapping.global_position(
                            super_cell,
                            particle.cell_index,
                            particle.in_cell,
                            inputs.global_offset,
                        );
                        let (vector, t_ret) = amplitude::compute(
                            position,
                            particle.momentum_prev,
                            particle.momentum,
                            particle.mass,
                            particle.charge,
                            n,
                            self.dt,
                            time,
                        );
                        let window = self.window.weight(position, inputs.domain_size, mapping.dims);

                        bank.push(StagedContribution {
                            amplitude: vector * window,
                            t_ret,
                            weighting: particle.weighting,
                            cutoff: self.nyquist.cutoff(n, particle.beta(), self.dt),
                        });
                    });
                    block.sync_threads();

                    // ACCUMULATE_FREQUENCIES
                    let staged = banks.active().as_slice();
                    if !staged.is_empty() {
                        block.for_each_thread(|tid| {
                            for f in (tid.index()..n_omega).step_by(width) {
                                let omega = frequencies.omega(f);
                                let sum: Amplitude = staged
                                    .iter()
                                    .filter(|c| c.cutoff.passes(omega))
                                    .map(|c| {
                                        let a = Amplitude::from_phase(c.amplitude, c.t_ret * omega);
                                        if self.form_factor.is_enabled() {
                                            a.scale(self.form_factor.factor(
                                                c.weighting,
                                                omega,
                                                n,
                                                mapping.cell_size,
                                            ))
                                        } else {
                                            a
                                        }
                                    })
                                    .sum();
                                buffer.add(direction_index, f, sum);
                            }
                        });
                    }
                    block.sync_threads();

                    // ADVANCE_FRAME
                    current = block.single(|_| {
                        banks.advance();
                        stream.next()
                    });
                    block.sync_threads();
                }

                trace!(
                    "direction {} super-cell {:?}: {} frames",
                    direction_index,
                    super_cell.0,
                    frames
                );
            }
        })?;

        info!(
            "Radiation pass step={} done: {} blocks in {:?}",
            inputs.step, report.blocks, report.elapsed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ELECTRON_CHARGE, ELECTRON_MASS, SPEED_OF_LIGHT};
    use crate::frame::ParticleStore;
    use crate::frequency::LinearFrequencies;
    use crate::observer::DirectionList;
    use crate::particle::Particle;

    fn kernel(width: usize) -> RadiationKernel {
        let config = RadiationConfig::default()
            .with_block_width(width)
            .with_window(WindowFunction::None)
            .sequential();
        RadiationKernel::new(&config).unwrap()
    }

    fn mapping() -> SuperCellMapping {
        SuperCellMapping::new_3d([2, 2, 2], [3, 3, 3], [1, 1, 1], Float3::splat(1.0e-7)).unwrap()
    }

    fn inputs(step: u64) -> KernelInputs {
        KernelInputs::new(step, Float3::splat(1.0))
    }

    fn kicked() -> Particle {
        let p = Float3::new(0.0, 0.0, 0.5 * ELECTRON_MASS * SPEED_OF_LIGHT);
        Particle::new(ELECTRON_MASS, ELECTRON_CHARGE).with_momentum(Float3::ZERO, p)
    }

    #[test]
    fn test_stage_banks_alternate() {
        let mut banks = StageBanks::new(4);
        assert_eq!(banks.active_index(), 0);
        banks.active_mut().push(StagedContribution::default());
        assert_eq!(banks.active().len(), 1);

        banks.advance();
        assert_eq!(banks.active_index(), 1);
        assert!(banks.active().is_empty());

        banks.active_mut().push(StagedContribution::default());
        banks.active_mut().push(StagedContribution::default());
        banks.advance();
        assert_eq!(banks.active_index(), 0);
        assert!(banks.active().is_empty());
    }

    #[test]
    fn test_capacity_mismatch_rejected() {
        let kernel = kernel(8);
        let store = ParticleStore::new(4);
        let directions = DirectionList::single(Float3::new(1.0, 0.0, 0.0)).unwrap();
        let freqs = LinearFrequencies::new(2, 0.0, 1.0e15).unwrap();
        let buffer = AmplitudeBuffer::new(1, 2);

        let err = kernel
            .run(&store, &mapping(), &directions, &freqs, &buffer, &inputs(0))
            .unwrap_err();
        assert!(matches!(
            err,
            RadiationError::DimensionMismatch {
                what: "frame capacity",
                expected: 8,
                actual: 4
            }
        ));
        assert_eq!(kernel.launcher().metrics().total_launched, 0);
    }

    #[test]
    fn test_buffer_shape_mismatch_rejected() {
        let kernel = kernel(4);
        let store = ParticleStore::new(4);
        let directions = DirectionList::single(Float3::new(1.0, 0.0, 0.0)).unwrap();
        let freqs = LinearFrequencies::new(2, 0.0, 1.0e15).unwrap();

        let wrong_rows = AmplitudeBuffer::new(2, 2);
        assert!(kernel
            .run(&store, &mapping(), &directions, &freqs, &wrong_rows, &inputs(0))
            .is_err());

        let wrong_cols = AmplitudeBuffer::new(1, 3);
        assert!(kernel
            .run(&store, &mapping(), &directions, &freqs, &wrong_cols, &inputs(0))
            .is_err());
    }

    #[test]
    fn test_barrier_count() {
        let kernel = kernel(4);
        let m = mapping();
        let mut store = ParticleStore::new(4);
        let first = SuperCellIdx::new(1, 1, 1);
        // 6 particles -> two frames in the first super-cell
        store.extend(first, (0..6).map(|_| kicked()));

        let directions = DirectionList::new([Float3::new(1.0, 0.0, 0.0), Float3::new(0.0, 1.0, 0.0)])
            .unwrap();
        let freqs = LinearFrequencies::new(3, 0.0, 1.0e15).unwrap();
        let buffer = AmplitudeBuffer::new(2, 3);

        let report = kernel
            .run(&store, &m, &directions, &freqs, &buffer, &inputs(1))
            .unwrap();

        // One core super-cell: 1 load barrier + 2 frames x 3 barriers
        assert_eq!(m.core_super_cell_count(), 1);
        assert_eq!(report.blocks, 2);
        assert_eq!(report.barriers, 2 * (1 + 2 * 3));
    }

    #[test]
    fn test_strided_frequencies_cover_table() {
        // More frequencies than threads: every entry must be written
        let kernel = kernel(2);
        let mut store = ParticleStore::new(2);
        store.insert(SuperCellIdx::new(1, 1, 1), kicked());

        let directions = DirectionList::single(Float3::new(1.0, 0.0, 0.0)).unwrap();
        let freqs = LinearFrequencies::new(7, 1.0e14, 7.0e14).unwrap();
        let buffer = AmplitudeBuffer::new(1, 7);

        kernel
            .run(&store, &mapping(), &directions, &freqs, &buffer, &inputs(0))
            .unwrap();

        for f in 0..7 {
            assert!(buffer.get(0, f).intensity() > 0.0, "frequency {} not written", f);
        }
    }

    #[test]
    fn test_empty_store_leaves_buffer_untouched() {
        let kernel = kernel(4);
        let store = ParticleStore::new(4);
        let directions = DirectionList::single(Float3::new(0.0, 0.0, 1.0)).unwrap();
        let freqs = LinearFrequencies::new(4, 0.0, 1.0e15).unwrap();
        let buffer = AmplitudeBuffer::new(1, 4);

        let report = kernel
            .run(&store, &mapping(), &directions, &freqs, &buffer, &inputs(0))
            .unwrap();
        assert_eq!(report.barriers, 1);
        assert!(buffer.snapshot().iter().all(Amplitude::is_zero));
    }

    #[test]
    fn test_invalid_mapping_rejected() {
        let kernel = kernel(4);
        let store = ParticleStore::new(4);
        let directions = DirectionList::single(Float3::new(1.0, 0.0, 0.0)).unwrap();
        let freqs = LinearFrequencies::new(2, 0.0, 1.0e15).unwrap();
        let buffer = AmplitudeBuffer::new(1, 2);

        let mut m = mapping();
        m.guard_super_cells = [2, 1, 1];
        let err = kernel
            .run(&store, &m, &directions, &freqs, &buffer, &inputs(0))
            .unwrap_err();
        assert!(matches!(err, RadiationError::InvalidConfig(_)));
        assert_eq!(kernel.launcher().metrics().total_launched, 0);
    }
}
