//! The step source capability.
//!
//! A [`StepSource`] is whatever supplies candidate procedures: a set of
//! registered Rust closures, a YAML manifest of shell commands, or anything
//! else that can enumerate procedures with their tags and invoke one by name.

/// Declarative tag attached to a procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// Procedure is an upgrade step effective at the given version.
    EffectiveVersion(String),
    /// Procedure is a data-integrity check for the given version.
    IntegrityCheck(String),
}

/// Argument shape of a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arity {
    /// Takes no arguments.
    #[default]
    None,
    /// Takes a variable-length list of strings.
    Variadic,
}

/// A candidate procedure as exposed by a source, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    /// Procedure name.
    pub name: String,
    /// Argument shape.
    pub arity: Arity,
    /// Tags declared on the procedure.
    pub tags: Vec<Tag>,
}

impl Procedure {
    /// Create an untagged procedure.
    pub fn new(name: &str, arity: Arity) -> Self {
        Self {
            name: name.to_string(),
            arity,
            tags: Vec::new(),
        }
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

/// A named group of procedures.
///
/// Only containers marked as an upgrade catalog contribute steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Container name.
    pub name: String,
    /// Whether the container is marked as an upgrade catalog.
    pub upgrade_catalog: bool,
    /// Procedures in declaration order.
    pub procedures: Vec<Procedure>,
}

/// Supplies procedures to a catalog and invokes them by name.
pub trait StepSource {
    /// Enumerate all containers with their procedures and tags.
    ///
    /// An unreadable source should return [`crate::UpgraderError::Catalog`].
    fn containers(&self) -> crate::Result<Vec<Container>>;

    /// Invoke a procedure.
    ///
    /// `args` is the caller's pre-tokenized argument list and is empty for
    /// procedures that take none.
    fn invoke(&self, container: &str, procedure: &str, args: &[String]) -> anyhow::Result<()>;
}

impl<S: StepSource + ?Sized> StepSource for Box<S> {
    fn containers(&self) -> crate::Result<Vec<Container>> {
        (**self).containers()
    }

    fn invoke(&self, container: &str, procedure: &str, args: &[String]) -> anyhow::Result<()> {
        (**self).invoke(container, procedure, args)
    }
}
