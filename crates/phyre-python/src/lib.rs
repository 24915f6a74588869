//! Python bindings for the Phyre simulation bridge.
//!
//! The native extension is named `_phyre`. It exposes every bridge
//! operation on a `Simulator` class that wraps a Python engine object
//! (physics, rendering, featurization and input merge), plus the
//! process-wide engine constants.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use pyo3::prelude::*;

mod engine;
mod error;
mod simulator;

/// The native `_phyre` extension module.
#[pymodule]
fn _phyre(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let c = phyre_core::constants();
    m.add("FPS", c.fps)?;
    m.add("OBJECT_FEATURE_SIZE", c.object_feature_size)?;
    m.add("DEFAULT_MAX_STEPS", c.default_max_steps)?;
    m.add("STEPS_FOR_SOLUTION", c.steps_for_solution)?;

    m.add_class::<simulator::Simulator>()?;
    Ok(())
}
