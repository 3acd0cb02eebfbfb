//! Explicit step registration.
//!
//! [`Registry`] is a [`StepSource`] built in code: each step declares its
//! role and version while it is registered, so discovery needs no runtime
//! introspection.
//!
//! # Example
//!
//! ```
//! use upgrader::catalog::{Catalog, Registry};
//!
//! let registry = Registry::new().container("schema", |c| {
//!     c.upgrade("CreatePages", "10.0.0", || Ok(()))
//!         .upgrade("AddPageIndex", "10.0.1", || Ok(()))
//!         .integrity_check("CheckPages", "10.0.1", || Ok(()))
//!         .custom_with_args("Reindex", |args| {
//!             assert!(args.len() <= 2);
//!             Ok(())
//!         })
//! });
//!
//! let catalog = Catalog::discover(registry).unwrap();
//! assert_eq!(catalog.upgrades().count(), 2);
//! ```

use std::fmt;

use super::source::{Arity, Container, Procedure, StepSource, Tag};

/// Body of a registered step.
pub type StepFn = Box<dyn Fn(&[String]) -> anyhow::Result<()>>;

struct Registered {
    procedure: Procedure,
    body: StepFn,
}

struct RegisteredContainer {
    name: String,
    upgrade_catalog: bool,
    steps: Vec<Registered>,
}

/// Builder for the procedures of one container.
pub struct ContainerBuilder {
    inner: RegisteredContainer,
}

impl ContainerBuilder {
    fn new(name: &str, upgrade_catalog: bool) -> Self {
        Self {
            inner: RegisteredContainer {
                name: name.to_string(),
                upgrade_catalog,
                steps: Vec::new(),
            },
        }
    }

    /// Register an upgrade step effective at `version`.
    pub fn upgrade<F>(self, name: &str, version: &str, body: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        let procedure = Procedure::new(name, Arity::None)
            .with_tag(Tag::EffectiveVersion(version.to_string()));
        self.procedure(procedure, move |_| body())
    }

    /// Register a data-integrity check for `version`.
    pub fn integrity_check<F>(self, name: &str, version: &str, body: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        let procedure =
            Procedure::new(name, Arity::None).with_tag(Tag::IntegrityCheck(version.to_string()));
        self.procedure(procedure, move |_| body())
    }

    /// Register a custom step that takes no arguments.
    pub fn custom<F>(self, name: &str, body: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        self.procedure(Procedure::new(name, Arity::None), move |_| body())
    }

    /// Register a custom step that takes an argument list.
    pub fn custom_with_args<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<()> + 'static,
    {
        self.procedure(Procedure::new(name, Arity::Variadic), body)
    }

    /// Register a procedure with arbitrary tags.
    ///
    /// Classification happens at discovery, so contradictory tags are
    /// reported by [`super::Catalog::discover`], not here.
    pub fn procedure<F>(mut self, procedure: Procedure, body: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<()> + 'static,
    {
        self.inner.steps.push(Registered {
            procedure,
            body: Box::new(body),
        });
        self
    }
}

/// A step source assembled from registered closures.
#[derive(Default)]
pub struct Registry {
    containers: Vec<RegisteredContainer>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a container marked as an upgrade catalog.
    pub fn container<F>(self, name: &str, build: F) -> Self
    where
        F: FnOnce(ContainerBuilder) -> ContainerBuilder,
    {
        self.add(ContainerBuilder::new(name, true), build)
    }

    /// Add a container that is not an upgrade catalog.
    ///
    /// Its procedures are enumerated but never become steps.
    pub fn unmarked_container<F>(self, name: &str, build: F) -> Self
    where
        F: FnOnce(ContainerBuilder) -> ContainerBuilder,
    {
        self.add(ContainerBuilder::new(name, false), build)
    }

    fn add<F>(mut self, builder: ContainerBuilder, build: F) -> Self
    where
        F: FnOnce(ContainerBuilder) -> ContainerBuilder,
    {
        self.containers.push(build(builder).inner);
        self
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.containers.iter().map(|c| c.name.as_str()).collect();
        f.debug_struct("Registry")
            .field("containers", &names)
            .finish()
    }
}

impl StepSource for Registry {
    fn containers(&self) -> crate::Result<Vec<Container>> {
        Ok(self
            .containers
            .iter()
            .map(|c| Container {
                name: c.name.clone(),
                upgrade_catalog: c.upgrade_catalog,
                procedures: c.steps.iter().map(|s| s.procedure.clone()).collect(),
            })
            .collect())
    }

    fn invoke(&self, container: &str, procedure: &str, args: &[String]) -> anyhow::Result<()> {
        let registered = self
            .containers
            .iter()
            .filter(|c| c.name == container)
            .flat_map(|c| c.steps.iter())
            .find(|s| s.procedure.name == procedure)
            .ok_or_else(|| {
                anyhow::anyhow!("no procedure '{}' in container '{}'", procedure, container)
            })?;

        (registered.body)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn containers_reflect_registration_order() {
        let registry = Registry::new()
            .container("schema", |c| {
                c.upgrade("B", "2.0", || Ok(()))
                    .upgrade("A", "1.0", || Ok(()))
            })
            .unmarked_container("helpers", |c| c.custom("Util", || Ok(())));

        let containers = registry.containers().unwrap();
        assert_eq!(containers.len(), 2);
        assert!(containers[0].upgrade_catalog);
        assert!(!containers[1].upgrade_catalog);
        let names: Vec<_> = containers[0]
            .procedures
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn registration_records_tags_and_arity() {
        let registry = Registry::new().container("schema", |c| {
            c.upgrade("Up", "1.0", || Ok(()))
                .integrity_check("Check", "1.0", || Ok(()))
                .custom_with_args("Fix", |_| Ok(()))
        });

        let procedures = &registry.containers().unwrap()[0].procedures;
        assert_eq!(
            procedures[0].tags,
            vec![Tag::EffectiveVersion("1.0".to_string())]
        );
        assert_eq!(procedures[1].tags, vec![Tag::IntegrityCheck("1.0".to_string())]);
        assert_eq!(procedures[2].arity, Arity::Variadic);
        assert!(procedures[2].tags.is_empty());
    }

    #[test]
    fn invoke_passes_arguments() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let registry = Registry::new().container("schema", move |c| {
            c.custom_with_args("Fix", move |args| {
                sink.borrow_mut().extend(args.iter().cloned());
                Ok(())
            })
        });

        let args = vec!["--param1".to_string(), "value1".to_string()];
        registry.invoke("schema", "Fix", &args).unwrap();
        assert_eq!(*seen.borrow(), args);
    }

    #[test]
    fn invoke_propagates_step_error() {
        let registry = Registry::new()
            .container("schema", |c| c.custom("Broken", || anyhow::bail!("boom")));

        let err = registry.invoke("schema", "Broken", &[]).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn invoke_unknown_procedure_errors() {
        let registry = Registry::new().container("schema", |c| c);
        assert!(registry.invoke("schema", "Missing", &[]).is_err());
        assert!(registry.invoke("other", "Missing", &[]).is_err());
    }

    #[test]
    fn debug_lists_container_names() {
        let registry = Registry::new().container("schema", |c| c);
        assert!(format!("{:?}", registry).contains("schema"));
    }
}
