//! Simulators running in the Python interpreter.
//!
//! [`PyGymSimulator`] wraps an environment created by `make` of a Python module
//! following the `gym` API, and [`PyGymLibrary`] describes the environments
//! registered in that module.
use crate::{Capabilities, GymLikeEnvConfig, SimulatorLibrary, NEXT_PREFIX, NEXT_OBSERVATION};
use anyhow::Result;
use gymlike_core::{
    error::GymLikeError,
    spaces::{ActionSpace, BoxSpace, DiscreteSpace, ObservationSpec},
    Options, SimValue, Simulator,
};
use log::{info, trace};
use ndarray::ArrayD;
use numpy::PyArrayDyn;
use pyo3::{
    types::{IntoPyDict, PyBool, PyDict, PyFloat, PyList, PyLong, PyString, PyTuple},
    IntoPy, PyAny, PyObject, Python, ToPyObject,
};

/// Converts a native value into a Python object.
///
/// Arrays become `numpy.ndarray`s of `float32`, tuples become Python tuples and
/// dicts become Python dicts.
pub fn to_pyobj(py: Python<'_>, value: &SimValue) -> Result<PyObject> {
    Ok(match value {
        SimValue::None => py.None(),
        SimValue::Bool(v) => v.to_object(py),
        SimValue::Int(v) => v.to_object(py),
        SimValue::Float(v) => v.to_object(py),
        SimValue::Str(v) => v.to_object(py),
        SimValue::Array(v) => PyArrayDyn::<f32>::from_array(py, v).into_py(py),
        SimValue::Tuple(items) => {
            let items = items
                .iter()
                .map(|v| to_pyobj(py, v))
                .collect::<Result<Vec<_>>>()?;
            PyTuple::new(py, items).into_py(py)
        }
        SimValue::Dict(items) => {
            let dict = PyDict::new(py);
            for (k, v) in items.iter() {
                dict.set_item(k, to_pyobj(py, v)?)?;
            }
            dict.into_py(py)
        }
    })
}

/// Converts a Python object into a native value.
///
/// Objects that are none of `None`, `bool`, `int`, `float`, `str`, a tuple, a list
/// or a dict are converted with `numpy.asarray(obj, "float32")`.
pub fn from_pyobj(obj: &PyAny) -> Result<SimValue> {
    if obj.is_none() {
        Ok(SimValue::None)
    } else if let Ok(v) = obj.downcast::<PyBool>() {
        Ok(SimValue::Bool(v.is_true()))
    } else if obj.downcast::<PyLong>().is_ok() {
        Ok(SimValue::Int(obj.extract()?))
    } else if obj.downcast::<PyFloat>().is_ok() {
        Ok(SimValue::Float(obj.extract()?))
    } else if obj.downcast::<PyString>().is_ok() {
        Ok(SimValue::Str(obj.extract()?))
    } else if let Ok(v) = obj.downcast::<PyTuple>() {
        Ok(SimValue::Tuple(v.iter().map(from_pyobj).collect::<Result<_>>()?))
    } else if let Ok(v) = obj.downcast::<PyList>() {
        Ok(SimValue::Tuple(v.iter().map(from_pyobj).collect::<Result<_>>()?))
    } else if let Ok(v) = obj.downcast::<PyDict>() {
        let items = v
            .iter()
            .map(|(k, v)| Ok((k.str()?.to_string(), from_pyobj(v)?)))
            .collect::<Result<_>>()?;
        Ok(SimValue::Dict(items))
    } else {
        Ok(SimValue::Array(to_arrayd(obj)?))
    }
}

fn to_arrayd(obj: &PyAny) -> Result<ArrayD<f32>> {
    let np = obj.py().import("numpy")?;
    let arr = np.getattr("asarray")?.call1((obj, "float32"))?;
    let arr: &PyArrayDyn<f32> = arr.extract()?;
    Ok(arr.to_owned_array())
}

fn read_action_space(space: &PyAny) -> Result<ActionSpace> {
    if let Ok(n) = space.getattr("n") {
        return Ok(ActionSpace::Discrete(DiscreteSpace { n: n.extract()? }));
    }
    let shape: Vec<usize> = space.getattr("shape")?.extract()?;
    let low = to_arrayd(space.getattr("low")?)?;
    let high = to_arrayd(space.getattr("high")?)?;
    Ok(ActionSpace::Box(BoxSpace::new(
        low.iter().cloned().collect(),
        high.iter().cloned().collect(),
        &shape,
    )?))
}

fn read_observation_spec(space: &PyAny) -> ObservationSpec {
    if let Ok(spaces) = space.getattr("spaces").and_then(|s| Ok(s.downcast::<PyDict>()?)) {
        spaces
            .iter()
            .fold(ObservationSpec::default(), |spec, (k, v)| {
                match (k.str(), v.getattr("shape").and_then(|s| s.extract::<Vec<usize>>())) {
                    (Ok(k), Ok(shape)) => spec.field(format!("{}{}", NEXT_PREFIX, k), &shape),
                    _ => spec,
                }
            })
    } else {
        match space.getattr("shape").and_then(|s| s.extract::<Vec<usize>>()) {
            Ok(shape) => ObservationSpec::default().field(NEXT_OBSERVATION, &shape),
            Err(_) => ObservationSpec::default(),
        }
    }
}

/// A `gym` environment running in the Python interpreter.
pub struct PyGymSimulator {
    env: PyObject,
    action_space: ActionSpace,
    observation_spec: ObservationSpec,
}

impl PyGymSimulator {
    /// Creates an environment with `<module>.make(name, **options)`.
    pub fn make(module: &str, name: &str, options: &Options) -> Result<Self> {
        Python::with_gil(|py| {
            // sys.argv can be empty depending on the interpreter, which breaks
            // rendering libraries reading it.
            let locals = [("sys", py.import("sys")?)].into_py_dict(py);
            let _ = py.eval("sys.argv.insert(0, 'PyGymSimulator')", None, Some(locals))?;
            let ver = py.eval("sys.version", None, Some(locals))?;
            info!("Python version = {}", ver);

            let kwargs = PyDict::new(py);
            for (k, v) in options.iter() {
                kwargs.set_item(k, to_pyobj(py, v)?)?;
            }
            let env = py.import(module)?.getattr("make")?.call((name,), Some(kwargs))?;
            let action_space = read_action_space(env.getattr("action_space")?)?;
            let observation_spec = match env.getattr("observation_space") {
                Ok(space) => read_observation_spec(space),
                Err(_) => ObservationSpec::default(),
            };
            info!("Action space of {} = {:?}", name, action_space);

            Ok(Self {
                env: env.into(),
                action_space,
                observation_spec,
            })
        })
    }
}

impl Simulator for PyGymSimulator {
    fn reset(&mut self, options: &Options) -> Result<SimValue> {
        trace!("PyGymSimulator::reset()");
        Python::with_gil(|py| {
            let ret = if options.is_empty() {
                self.env.call_method0(py, "reset")?
            } else {
                let kwargs = PyDict::new(py);
                for (k, v) in options.iter() {
                    kwargs.set_item(k, to_pyobj(py, v)?)?;
                }
                self.env.call_method(py, "reset", (), Some(kwargs))?
            };
            from_pyobj(ret.as_ref(py))
        })
    }

    fn step(&mut self, action: &SimValue) -> Result<SimValue> {
        Python::with_gil(|py| {
            let action = to_pyobj(py, action)?;
            let ret = self.env.call_method1(py, "step", (action,))?;
            from_pyobj(ret.as_ref(py))
        })
    }

    fn seed(&mut self, seed: Option<u64>) -> Result<()> {
        Python::with_gil(|py| {
            if !self.env.as_ref(py).hasattr("seed")? {
                return Err(GymLikeError::SeedNotImplemented("PyGymSimulator".to_string()).into());
            }
            self.env.call_method1(py, "seed", (seed.to_object(py),))?;
            Ok(())
        })
    }

    fn action_space(&self) -> ActionSpace {
        self.action_space.clone()
    }

    fn observation_spec(&self) -> ObservationSpec {
        self.observation_spec.clone()
    }
}

/// Environments registered in a Python module following the `gym` API.
pub struct PyGymLibrary {
    module: String,
    capabilities: Capabilities,
}

impl PyGymLibrary {
    /// Reads the registry of `module` after importing `imports`, which register
    /// their environments on import (e.g., `mj_envs`).
    pub fn new(module: &str, imports: &[&str]) -> Result<Self> {
        Python::with_gil(|py| {
            for m in imports.iter() {
                py.import(m)?;
            }
            let registry = py
                .import(module)?
                .getattr("envs")?
                .getattr("registration")?
                .getattr("registry")?;
            // Older versions keep specs in `env_specs`, newer ones are a dict.
            let specs = match registry.getattr("env_specs") {
                Ok(specs) => specs,
                Err(_) => registry,
            };
            let envs = specs
                .call_method0("keys")?
                .iter()?
                .map(|k| Ok(k?.extract::<String>()?))
                .collect::<Result<Vec<_>>>()?;
            info!("{} environments registered in {}", envs.len(), module);

            Ok(Self {
                module: module.to_string(),
                capabilities: Capabilities::flat(module, envs),
            })
        })
    }
}

impl SimulatorLibrary for PyGymLibrary {
    type Sim = PyGymSimulator;

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn make(&self, config: &GymLikeEnvConfig) -> Result<Self::Sim> {
        PyGymSimulator::make(&self.module, &config.env_name, &config.options)
    }
}
