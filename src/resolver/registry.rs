//! Module registry - the set of known configuration modules.
//!
//! Modules are registered once at startup and are immutable afterwards.
//! Registration performs no probing; availability is checked lazily when a
//! module is resolved.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

use crate::core::{ConfigState, Params, Platform};
use crate::modules::{ConfigModule, FnModule};
use crate::probe::Probe;

use super::ConfigError;

/// Registry of configuration modules, keyed by unique name.
#[derive(Default)]
pub struct Registry {
    modules: BTreeMap<String, Box<dyn ConfigModule>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry {
            modules: BTreeMap::new(),
        }
    }

    /// Register a module under its own name.
    pub fn register(&mut self, module: Box<dyn ConfigModule>) -> Result<(), ConfigError> {
        let name = module.name().to_string();
        if self.modules.contains_key(&name) {
            return Err(ConfigError::DuplicateModule { name });
        }
        tracing::trace!("registered module `{}`", name);
        self.modules.insert(name, module);
        Ok(())
    }

    /// Register a module from its three procedures.
    pub fn register_fn<C, E>(
        &mut self,
        name: &str,
        configure: C,
        generate: Vec<String>,
        exists: E,
    ) -> Result<(), ConfigError>
    where
        C: Fn(&mut ConfigState, &dyn Probe, &Params) -> Result<(), ConfigError> + 'static,
        E: Fn(Platform) -> bool + 'static,
    {
        let module = FnModule::new(name, configure)
            .with_tools(generate)
            .with_exists(exists);
        self.register(Box::new(module))
    }

    /// Get a module by name.
    pub fn get(&self, name: &str) -> Option<&dyn ConfigModule> {
        self.modules.get(name).map(|m| m.as_ref())
    }

    /// Check if a module is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.modules.keys().map(String::as_str)
    }

    /// Get the number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The error for an unregistered `name`, with close matches.
    pub fn unknown(&self, name: &str) -> ConfigError {
        ConfigError::UnknownModule {
            name: name.to_string(),
            suggestions: self.suggestions(name),
        }
    }

    /// Registered names that look like `name`.
    pub fn suggestions(&self, name: &str) -> Vec<String> {
        let name = name.to_ascii_lowercase();
        if name.is_empty() {
            return Vec::new();
        }
        self.names()
            .filter(|candidate| {
                let candidate = candidate.to_ascii_lowercase();
                candidate.contains(&name)
                    || name.contains(&candidate)
                    || common_prefix(&candidate, &name) >= 3
            })
            .take(3)
            .map(str::to_string)
            .collect()
    }

    /// Check that every declared dependency and tool is registered and that
    /// the declared dependency graph has no cycles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut graph = DiGraph::<&str, ()>::new();
        let nodes: HashMap<&str, _> = self
            .modules
            .keys()
            .map(|name| (name.as_str(), graph.add_node(name.as_str())))
            .collect();

        for (name, module) in &self.modules {
            for tool in module.generate() {
                if !self.contains(&tool) {
                    return Err(self.unknown(&tool));
                }
            }
            for dep in module.declared_dependencies() {
                let Some(&to) = nodes.get(dep.as_str()) else {
                    return Err(self.unknown(&dep));
                };
                graph.add_edge(nodes[name.as_str()], to, ());
            }
        }

        for scc in tarjan_scc(&graph) {
            let is_cycle = scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);
            if is_cycle {
                let mut cycle: Vec<String> = scc.iter().map(|n| graph[*n].to_string()).collect();
                cycle.push(cycle[0].clone());
                return Err(ConfigError::CyclicDependency { cycle });
            }
        }

        Ok(())
    }

    /// Summaries of every module for display.
    pub fn summaries(&self, platform: Platform) -> Vec<ModuleSummary> {
        self.modules
            .values()
            .map(|m| ModuleSummary {
                name: m.name().to_string(),
                available: m.exists(platform),
                dependencies: m.declared_dependencies(),
                tools: m.generate(),
            })
            .collect()
    }
}

fn common_prefix(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Summary of a module for display purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    /// Module name
    pub name: String,

    /// Whether the module is usable on the queried platform
    pub available: bool,

    /// Every module it may depend on
    pub dependencies: Vec<String>,

    /// Companion modules it loads
    pub tools: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{FnModule, Requirement};

    fn noop(name: &str) -> FnModule {
        FnModule::new(name, |_: &mut ConfigState, _: &dyn Probe, _: &Params| Ok(()))
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = Registry::new();
        registry.register(Box::new(noop("zlib"))).unwrap();

        assert!(registry.contains("zlib"));
        assert_eq!(registry.get("zlib").unwrap().name(), "zlib");
        assert!(registry.get("png").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = Registry::new();
        registry.register(Box::new(noop("zlib"))).unwrap();

        let err = registry.register(Box::new(noop("zlib"))).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateModule {
                name: "zlib".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_fn() {
        let mut registry = Registry::new();
        registry
            .register_fn(
                "osx",
                |_, _, _| Ok(()),
                Vec::new(),
                |p| p == Platform::MacOs,
            )
            .unwrap();

        let osx = registry.get("osx").unwrap();
        assert!(osx.exists(Platform::MacOs));
        assert!(!osx.exists(Platform::Windows));
    }

    #[test]
    fn test_suggestions() {
        let mut registry = Registry::new();
        for name in ["glut", "opengl", "fah-viewer", "fah-viewer-deps"] {
            registry.register(Box::new(noop(name))).unwrap();
        }

        assert_eq!(registry.suggestions("glu"), vec!["glut".to_string()]);
        assert_eq!(
            registry.suggestions("fah-view"),
            vec!["fah-viewer".to_string(), "fah-viewer-deps".to_string()]
        );
        assert!(registry.suggestions("nonexistent").is_empty());
    }

    #[test]
    fn test_validate_rejects_unknown_dependency() {
        let mut registry = Registry::new();
        registry
            .register(Box::new(noop("viewer").with_dependency(Requirement::new("gui"))))
            .unwrap();

        assert!(matches!(
            registry.validate(),
            Err(ConfigError::UnknownModule { ref name, .. }) if name == "gui"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_tool() {
        let mut registry = Registry::new();
        registry
            .register(Box::new(noop("viewer").with_tools(["osx"])))
            .unwrap();

        assert!(matches!(
            registry.validate(),
            Err(ConfigError::UnknownModule { ref name, .. }) if name == "osx"
        ));
    }

    #[test]
    fn test_validate_detects_cycle() {
        let mut registry = Registry::new();
        registry
            .register(Box::new(noop("a").with_dependency(Requirement::new("b"))))
            .unwrap();
        registry
            .register(Box::new(noop("b").with_dependency(Requirement::new("a"))))
            .unwrap();
        registry.register(Box::new(noop("c"))).unwrap();

        match registry.validate() {
            Err(ConfigError::CyclicDependency { cycle }) => {
                assert_eq!(cycle.len(), 3);
                assert!(cycle.contains(&"a".to_string()));
                assert!(cycle.contains(&"b".to_string()));
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_detects_self_loop() {
        let mut registry = Registry::new();
        registry
            .register(Box::new(noop("a").with_dependency(Requirement::new("a"))))
            .unwrap();

        assert_eq!(
            registry.validate(),
            Err(ConfigError::CyclicDependency {
                cycle: vec!["a".to_string(), "a".to_string()]
            })
        );
    }

    #[test]
    fn test_summaries() {
        let mut registry = Registry::new();
        registry
            .register(Box::new(
                noop("osx").with_exists(|p| p == Platform::MacOs).with_tools(["x"]),
            ))
            .unwrap();

        let summaries = registry.summaries(Platform::Other);
        assert_eq!(summaries.len(), 1);
        assert!(!summaries[0].available);
        assert_eq!(summaries[0].tools, vec!["x".to_string()]);
    }
}
