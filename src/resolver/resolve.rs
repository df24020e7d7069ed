//! Memoized module resolution.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::core::{ConfigState, Params};
use crate::modules::ConfigModule;
use crate::probe::Probe;

use super::{ConfigError, Registry};

/// Identifies one configure call: a module and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub name: String,
    pub params: Params,
}

impl ResolutionKey {
    pub fn new(name: impl Into<String>, params: Params) -> Self {
        ResolutionKey {
            name: name.into(),
            params,
        }
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.params)
    }
}

/// Lifecycle of one resolution key within a build.
///
/// `Satisfied` and `Failed` are terminal: a key is never probed twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    NotStarted,
    Probing,
    Satisfied,
    Failed(ConfigError),
}

/// Resolves modules by name against one probe, for one build.
///
/// Resolution is strictly sequential: a module's `prepare` runs first, then
/// its dependencies in declared order, depth first, then its own `configure`.
pub struct Resolver<'a> {
    registry: &'a Registry,
    probe: &'a dyn Probe,
    states: HashMap<ResolutionKey, ResolutionState>,
    stack: Vec<ResolutionKey>,
    loaded: HashSet<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry, probe: &'a dyn Probe) -> Self {
        Resolver {
            registry,
            probe,
            states: HashMap::new(),
            stack: Vec::new(),
            loaded: HashSet::new(),
        }
    }

    /// Resolve `name` with `params`, appending to `state`.
    ///
    /// An unknown name fails before anything is touched. Any other failure
    /// leaves `state` with whatever was appended up to that point.
    pub fn resolve(
        &mut self,
        name: &str,
        state: &mut ConfigState,
        params: &Params,
    ) -> Result<(), ConfigError> {
        let registry = self.registry;
        let module = registry.get(name).ok_or_else(|| registry.unknown(name))?;
        let key = ResolutionKey::new(name, params.clone());

        match self.status(&key) {
            ResolutionState::Satisfied => {
                tracing::debug!("`{}` already satisfied", key);
                return Ok(());
            }
            ResolutionState::Failed(err) => {
                tracing::debug!("`{}` already failed", key);
                return Err(err);
            }
            ResolutionState::Probing => return Err(self.cycle_through(&key)),
            ResolutionState::NotStarted => {}
        }

        self.states.insert(key.clone(), ResolutionState::Probing);
        self.stack.push(key.clone());
        let result = self.run(module, state, params);
        self.stack.pop();

        match result {
            Ok(()) => {
                tracing::info!("configured `{}`", key);
                self.states.insert(key, ResolutionState::Satisfied);
                Ok(())
            }
            Err(err) => {
                tracing::debug!("`{}` failed: {}", key, err);
                self.states.insert(key, ResolutionState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        module: &dyn ConfigModule,
        state: &mut ConfigState,
        params: &Params,
    ) -> Result<(), ConfigError> {
        self.load(module)?;

        let platform = self.probe.platform();
        if !module.exists(platform) {
            return Err(ConfigError::ModuleUnavailable {
                name: module.name().to_string(),
                platform,
            });
        }

        module.prepare(state, self.probe);
        for dep in module.dependencies(params) {
            self.resolve(&dep.name, state, &dep.params)?;
        }

        module.configure(state, self.probe, params)
    }

    /// Check the companion tools of `module` the first time it is used.
    fn load(&mut self, module: &dyn ConfigModule) -> Result<(), ConfigError> {
        if !self.loaded.insert(module.name().to_string()) {
            return Ok(());
        }
        let tools = module.generate();
        for tool in &tools {
            if !self.registry.contains(tool) {
                return Err(self.registry.unknown(tool));
            }
        }
        if !tools.is_empty() {
            tracing::debug!("`{}` loads {}", module.name(), tools.join(", "));
        }
        Ok(())
    }

    fn cycle_through(&self, key: &ResolutionKey) -> ConfigError {
        let start = self.stack.iter().position(|k| k == key).unwrap_or(0);
        let mut cycle: Vec<String> = self.stack[start..].iter().map(|k| k.name.clone()).collect();
        cycle.push(key.name.clone());
        ConfigError::CyclicDependency { cycle }
    }

    /// Current state of `key`.
    pub fn status(&self, key: &ResolutionKey) -> ResolutionState {
        self.states
            .get(key)
            .cloned()
            .unwrap_or(ResolutionState::NotStarted)
    }

    /// The keys resolving `name` would visit, dependencies first, without
    /// probing anything.
    pub fn plan(&self, name: &str, params: &Params) -> Result<Vec<ResolutionKey>, ConfigError> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut path = Vec::new();
        self.visit(ResolutionKey::new(name, params.clone()), &mut order, &mut done, &mut path)?;
        Ok(order)
    }

    fn visit(
        &self,
        key: ResolutionKey,
        order: &mut Vec<ResolutionKey>,
        done: &mut HashSet<ResolutionKey>,
        path: &mut Vec<ResolutionKey>,
    ) -> Result<(), ConfigError> {
        if done.contains(&key) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|k| *k == key) {
            let mut cycle: Vec<String> = path[start..].iter().map(|k| k.name.clone()).collect();
            cycle.push(key.name);
            return Err(ConfigError::CyclicDependency { cycle });
        }

        let module = self
            .registry
            .get(&key.name)
            .ok_or_else(|| self.registry.unknown(&key.name))?;

        path.push(key.clone());
        for dep in module.dependencies(&key.params) {
            self.visit(ResolutionKey::new(dep.name, dep.params), order, done, path)?;
        }
        path.pop();

        done.insert(key.clone());
        order.push(key);
        Ok(())
    }
}
