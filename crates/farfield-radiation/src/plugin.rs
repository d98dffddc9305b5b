//! Step-driven radiation plugin.
//!
//! Owns the kernel, the direction and frequency tables and the output
//! buffers, and decides per simulation step whether a pass runs.

use tracing::{debug, info};

use crate::buffer::AmplitudeBuffer;
use crate::config::{AccumulationPolicy, RadiationConfig};
use crate::error::Result;
use crate::frame::FrameSource;
use crate::frequency::FrequencyTable;
use crate::kernel::{KernelInputs, RadiationKernel};
use crate::mapping::SuperCellMapping;
use crate::observer::ObserverGeometry;
use crate::vector::Float3;

/// Radiation diagnostic attached to a running simulation.
pub struct RadiationPlugin<G, F> {
    config: RadiationConfig,
    kernel: RadiationKernel,
    geometry: G,
    frequencies: F,
    step_buffer: AmplitudeBuffer,
    integrated: Option<AmplitudeBuffer>,
    passes: u64,
}

impl<G, F> RadiationPlugin<G, F>
where
    G: ObserverGeometry,
    F: FrequencyTable,
{
    /// Create a plugin and its buffers.
    pub fn new(config: RadiationConfig, geometry: G, frequencies: F) -> Result<Self> {
        let kernel = RadiationKernel::new(&config)?;
        let step_buffer = AmplitudeBuffer::new(geometry.len(), frequencies.len());
        let integrated = match config.accumulation {
            AccumulationPolicy::ResetEachStep => {
                Some(AmplitudeBuffer::new(geometry.len(), frequencies.len()))
            }
            AccumulationPolicy::Accumulate => None,
        };

        info!(
            "Radiation plugin: {} directions, {} frequencies, steps [{}, {}) every {}, {:?}",
            geometry.len(),
            frequencies.len(),
            config.start_step,
            config.end_step,
            config.period,
            config.accumulation
        );

        Ok(Self {
            config,
            kernel,
            geometry,
            frequencies,
            step_buffer,
            integrated,
            passes: 0,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &RadiationConfig {
        &self.config
    }

    /// Kernel in use.
    pub fn kernel(&self) -> &RadiationKernel {
        &self.kernel
    }

    /// Direction table.
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Frequency table.
    pub fn frequencies(&self) -> &F {
        &self.frequencies
    }

    /// Number of kernel passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Buffer written by the most recent pass.
    ///
    /// With [`AccumulationPolicy::Accumulate`] this holds the sum over every
    /// pass of the run.
    pub fn step_amplitudes(&self) -> &AmplitudeBuffer {
        &self.step_buffer
    }

    /// Sum over every pass of the run.
    pub fn integrated_amplitudes(&self) -> &AmplitudeBuffer {
        self.integrated.as_ref().unwrap_or(&self.step_buffer)
    }

    /// Run a pass for `step` if it is scheduled. Returns whether a pass ran.
    pub fn notify<S: FrameSource>(
        &mut self,
        step: u64,
        store: &S,
        mapping: &SuperCellMapping,
        domain_size: Float3,
        global_offset: [i64; 3],
    ) -> Result<bool> {
        if !self.config.is_active(step) {
            debug!("Radiation skipped at step {}", step);
            return Ok(false);
        }

        if self.config.accumulation == AccumulationPolicy::ResetEachStep {
            self.step_buffer.reset();
        }

        let inputs = KernelInputs::new(step, domain_size).with_global_offset(global_offset);
        self.kernel.run(
            store,
            mapping,
            &self.geometry,
            &self.frequencies,
            &self.step_buffer,
            &inputs,
        )?;

        if let Some(integrated) = &self.integrated {
            self.step_buffer.accumulate_into(integrated)?;
        }
        self.passes += 1;
        Ok(true)
    }

    /// Spectral intensity of the integrated amplitudes for every direction and
    /// frequency, row-major with the direction outer.
    pub fn integrated_spectrum(&self) -> Vec<f64> {
        let buffer = self.integrated_amplitudes();
        (0..buffer.num_directions())
            .flat_map(|d| (0..buffer.n_omega()).map(move |f| buffer.spectral_intensity(d, f)))
            .collect()
    }
}

impl<G, F> std::fmt::Debug for RadiationPlugin<G, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadiationPlugin")
            .field("config", &self.config)
            .field("passes", &self.passes)
            .field("num_directions", &self.step_buffer.num_directions())
            .field("n_omega", &self.step_buffer.n_omega())
            .finish()
    }
}
