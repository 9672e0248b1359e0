//! Dependency graph validation.
//!
//! Walks type metadata from one key without constructing anything:
//! - Detects circular dependencies (bindings and constructors)
//! - Checks that every required type has metadata
//! - Checks that every parameter can get a value
//!
//! Cached instances and provider-backed keys are leaves: whatever
//! they need is decided at runtime.

use std::collections::HashSet;

use sanad_support::rendering::render_chain;
use tracing::{debug, warn};

use crate::container::Container;
use crate::error::{CircularDependencyError, Result, SanadError, UnresolvableParameterError};
use crate::key::DependencyKey;

/// Depth-first walk over the constructor graph of a container.
///
/// Keeps the current path for cycle reports and `required_by`, and a
/// set of keys already proven resolvable so shared dependencies
/// (diamonds) are visited once.
pub(crate) struct GraphValidator<'c> {
    container: &'c Container,
    validated: HashSet<DependencyKey>,
    path: Vec<DependencyKey>,
}

impl<'c> GraphValidator<'c> {
    pub fn new(container: &'c Container) -> Self {
        Self {
            container,
            validated: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Validates everything `key` needs.
    pub fn validate(&mut self, key: &DependencyKey) -> Result<()> {
        self.visit(key)?;
        debug!(key = %key, checked = self.validated.len(), "Dependency graph is valid");
        Ok(())
    }

    fn visit(&mut self, abstract_key: &DependencyKey) -> Result<()> {
        let key = self.container.concrete(abstract_key)?;

        if self.validated.contains(&key) {
            return Ok(());
        }

        if let Some(start) = self.path.iter().position(|k| *k == key) {
            let mut chain = self.path[start..].to_vec();
            chain.push(key);
            warn!(cycle = %render_chain(&chain), "Circular dependency detected");
            return Err(SanadError::CircularDependency(CircularDependencyError { chain }));
        }

        if self.container.cached(&key).is_some()
            || self.container.provider_fn(&key, self.path.last())?.is_some()
        {
            self.validated.insert(key);
            return Ok(());
        }

        let info = self.container.reflect(&key, self.path.last())?;
        if info.constructor_fn().is_none() {
            return Err(SanadError::construction(
                &key,
                "no constructor is registered for this type",
            ));
        }

        self.path.push(key.clone());
        for param in info.params() {
            if param.has_default() {
                continue;
            }
            match param.declared() {
                Some(declared) => self.visit(declared)?,
                None => {
                    return Err(SanadError::UnresolvableParameter(UnresolvableParameterError {
                        parameter: param.name().to_string(),
                        owner: Some(key),
                    }));
                }
            }
        }
        self.path.pop();

        self.validated.insert(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::container::Container;
    use crate::error::SanadError;
    use crate::key::DependencyKey;
    use crate::provider::Provider;
    use crate::reflect::{Instance, Parameter, TypeInfo};

    fn leaf(name: &'static str) -> TypeInfo {
        TypeInfo::named(name).constructor(|_| Ok(()))
    }

    fn node(name: &'static str, deps: &[&'static str]) -> TypeInfo {
        deps.iter()
            .fold(TypeInfo::named(name), |info, dep| info.param(Parameter::typed(*dep, *dep)))
            .constructor(|_| Ok(()))
    }

    fn container(types: Vec<TypeInfo>) -> Container {
        types
            .into_iter()
            .fold(Container::builder().discover_types(false), |builder, info| {
                builder.register_type(info)
            })
            .build()
    }

    struct Pool;

    impl Provider for Pool {
        fn provide(_key: &DependencyKey, _container: &Container) -> crate::error::Result<Instance> {
            Ok(Arc::new(Pool))
        }
    }

    #[test]
    fn valid_simple_graph() {
        let c = container(vec![
            leaf("Database"),
            node("UserRepo", &["Database"]),
            node("UserService", &["UserRepo"]),
        ]);
        assert!(c.validate("UserService").is_ok());
    }

    #[test]
    fn diamond_dependency_ok() {
        //     A
        //    / \
        //   B   C
        //    \ /
        //     D
        let c = container(vec![
            leaf("D"),
            node("B", &["D"]),
            node("C", &["D"]),
            node("A", &["B", "C"]),
        ]);
        assert!(c.validate("A").is_ok());
    }

    #[test]
    fn detect_circular_dependency() {
        let c = container(vec![node("A", &["B"]), node("B", &["C"]), node("C", &["A"])]);

        match c.validate("A").unwrap_err() {
            SanadError::CircularDependency(err) => {
                let names: Vec<&str> = err.chain.iter().map(DependencyKey::name).collect();
                assert_eq!(names, vec!["A", "B", "C", "A"]);
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }
    }

    #[test]
    fn detect_self_dependency() {
        let c = container(vec![node("A", &["A"])]);
        assert!(matches!(c.validate("A"), Err(SanadError::CircularDependency(_))));
    }

    #[test]
    fn cycle_through_binding() {
        let c = container(vec![node("A", &["AInterface"])]);
        c.bind("AInterface", "A");
        assert!(matches!(c.validate("A"), Err(SanadError::CircularDependency(_))));
    }

    #[test]
    fn detect_missing_dependency() {
        let c = container(vec![node("A", &["B"])]);

        match c.validate("A").unwrap_err() {
            SanadError::UnknownType(err) => {
                assert_eq!(err.requested.name(), "B");
                assert_eq!(err.required_by, Some(DependencyKey::named("A")));
            }
            other => panic!("Expected UnknownType, got: {other:?}"),
        }
    }

    #[test]
    fn detect_unresolvable_parameter() {
        let c = container(vec![TypeInfo::named("Server")
            .param(Parameter::untyped("port"))
            .constructor(|_| Ok(()))]);

        match c.validate("Server").unwrap_err() {
            SanadError::UnresolvableParameter(err) => {
                assert_eq!(err.parameter, "port");
                assert_eq!(err.owner, Some(DependencyKey::named("Server")));
            }
            other => panic!("Expected UnresolvableParameter, got: {other:?}"),
        }
    }

    #[test]
    fn defaults_are_not_followed() {
        let c = container(vec![TypeInfo::named("Server")
            .param(Parameter::typed("logger", "Missing").default_value(()))
            .param(Parameter::untyped("port").default_value(8080u16))
            .constructor(|_| Ok(()))]);
        assert!(c.validate("Server").is_ok());
    }

    #[test]
    fn cached_instances_are_leaves() {
        let c = container(vec![node("A", &["Config"])]);
        c.instance("Config", Arc::new(()));
        assert!(c.validate("A").is_ok());
    }

    #[test]
    fn provider_backed_keys_are_leaves() {
        let c = container(vec![
            TypeInfo::named("Pool").provided_by::<Pool>(),
            node("Repo", &["Connection"]),
        ]);
        c.provider("Connection", "Pool");
        assert!(c.validate("Repo").is_ok());
    }

    #[test]
    fn validation_constructs_nothing() {
        let c = container(vec![leaf("Database"), node("UserRepo", &["Database"])]);
        c.validate("UserRepo").unwrap();
        assert!(c.cached("Database").is_none());
        assert!(c.cached("UserRepo").is_none());
    }
}
