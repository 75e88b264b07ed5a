//! Python bindings

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use std::time::Duration;

use crate::classify;
use crate::config::CodecConfig;
use crate::session::Session;

/// Python-facing editing session
#[pyclass]
pub struct GifEditor {
    session: Session,
}

#[pymethods]
impl GifEditor {
    #[new]
    #[pyo3(signature = (default_loops=0, default_frame_duration_ms=200, quantize_speed=10))]
    fn new(default_loops: u16, default_frame_duration_ms: u64, quantize_speed: i32) -> PyResult<Self> {
        let config = CodecConfig {
            default_loops,
            default_frame_duration_ms,
            quantize_speed,
            ..CodecConfig::default()
        };
        config.validate().map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            session: Session::new(config),
        })
    }

    /// Open an animated GIF, replacing the current project
    fn open<'py>(&mut self, data: &Bound<'py, PyBytes>) -> PyResult<()> {
        self.session
            .open(data.as_bytes())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Insert a GIF or still image at `index`, returns inserted frame count
    fn import_bytes<'py>(&mut self, data: &Bound<'py, PyBytes>, index: usize) -> PyResult<usize> {
        self.session
            .import(data.as_bytes(), index)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn replace_with_image<'py>(&mut self, index: usize, data: &Bound<'py, PyBytes>) -> PyResult<bool> {
        self.session
            .replace_with_image(index, data.as_bytes())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn remove(&mut self, index: usize) -> bool {
        self.session.timeline_mut().remove(index).is_some()
    }

    fn move_frame(&mut self, from_index: usize, drop_position: usize) -> bool {
        self.session.timeline_mut().move_frame(from_index, drop_position)
    }

    fn set_duration(&mut self, index: usize, seconds: f64) -> PyResult<bool> {
        let duration = Duration::try_from_secs_f64(seconds)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(self.session.set_duration(index, duration))
    }

    /// Frame durations in seconds
    fn durations(&self) -> Vec<f64> {
        self.session
            .timeline()
            .iter()
            .map(|f| f.duration().as_secs_f64())
            .collect()
    }

    fn frame_count(&self) -> usize {
        self.session.timeline().len()
    }

    fn is_placeholder(&self) -> bool {
        self.session.timeline().is_placeholder()
    }

    #[getter]
    fn loops(&self) -> u16 {
        self.session.loops()
    }

    #[setter]
    fn set_loops(&mut self, loops: u16) {
        self.session.set_loops(loops);
    }

    /// Encode to GIF bytes (releases GIL)
    fn encode<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let session = &self.session;
        let bytes = py
            .allow_threads(|| session.encode())
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PyBytes::new_bound(py, &bytes))
    }

    /// Encode and write to `path` (releases GIL)
    fn save(&self, py: Python<'_>, path: &str) -> PyResult<()> {
        let session = &self.session;
        py.allow_threads(|| session.save(path))
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __len__(&self) -> usize {
        self.session.timeline().len()
    }
}

#[pyfunction]
fn is_animated<'py>(data: &Bound<'py, PyBytes>) -> bool {
    classify::is_animated(data.as_bytes())
}

#[pyfunction]
fn frame_count<'py>(data: &Bound<'py, PyBytes>) -> usize {
    classify::frame_count(data.as_bytes())
}

/// Python module
#[pymodule]
fn gif_timeline(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<GifEditor>()?;

    m.add_function(wrap_pyfunction!(is_animated, m)?)?;
    m.add_function(wrap_pyfunction!(frame_count, m)?)?;

    // Version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__author__", "voraehita25-star")?;

    Ok(())
}
