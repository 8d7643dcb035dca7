//! Sharing one registry between several plotting calls.

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexSet;
use tracing::debug;

use crate::core::RawParam;
use crate::error::{ControlsError, ControlsResult};
use crate::figure::FigureHandle;

use super::{AddOptions, Controls, ControlsConfig, DisplaySink, RegistrationId, UpdateArgs};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    /// Every parameter the registry holds when the reference is consumed.
    All,
    Names(Vec<String>),
}

/// A registry plus the subset of its parameters a plotting call may use.
#[derive(Clone)]
pub struct ControlsRef {
    controls: Controls,
    selection: Selection,
}

impl ControlsRef {
    #[must_use]
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Names this reference currently selects.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        match &self.selection {
            Selection::All => self.controls.param_names(),
            Selection::Names(names) => names.clone(),
        }
    }
}

impl fmt::Debug for ControlsRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlsRef")
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl Controls {
    /// References `names` of this registry. Every name must already exist.
    pub fn slice(&self, names: &[&str]) -> ControlsResult<ControlsRef> {
        if let Some(missing) = names.iter().find(|name| !self.contains(name)) {
            return Err(ControlsError::UnknownParameter((*missing).to_owned()));
        }
        let mut unique = IndexSet::new();
        for name in names {
            unique.insert((*name).to_owned());
        }
        Ok(ControlsRef {
            controls: self.clone(),
            selection: Selection::Names(unique.into_iter().collect()),
        })
    }

    /// References every parameter of this registry.
    #[must_use]
    pub fn all(&self) -> ControlsRef {
        ControlsRef {
            controls: self.clone(),
            selection: Selection::All,
        }
    }
}

/// Explicit stack of "current controls" for grouping plotting calls.
///
/// Entering pushes a reference to all parameters of a registry; the returned
/// guard pops it when dropped. Only the innermost entry is consulted.
#[derive(Debug, Default)]
pub struct ControlsContext {
    stack: RefCell<Vec<ControlsRef>>,
}

impl ControlsContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the context is left as soon as the guard is dropped"]
    pub fn enter(&self, controls: &Controls) -> ContextGuard<'_> {
        let mut stack = self.stack.borrow_mut();
        stack.push(controls.all());
        ContextGuard {
            context: self,
            depth: stack.len(),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<ControlsRef> {
        self.stack.borrow().last().cloned()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }
}

/// Keeps a [`ControlsContext`] entry alive.
#[derive(Debug)]
pub struct ContextGuard<'a> {
    context: &'a ControlsContext,
    depth: usize,
}

impl ContextGuard<'_> {
    #[must_use]
    pub fn controls(&self) -> Option<Controls> {
        self.context
            .stack
            .borrow()
            .get(self.depth - 1)
            .map(|entry| entry.controls.clone())
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.context.stack.borrow_mut().truncate(self.depth - 1);
    }
}

/// Parameters and references of one plotting call, resolved into a single registry.
pub struct ComposeRequest<'a> {
    params: Vec<(String, RawParam)>,
    references: Vec<ControlsRef>,
    context: Option<&'a ControlsContext>,
    options: AddOptions,
    config: ControlsConfig,
    display: Option<&'a mut dyn DisplaySink>,
}

impl<'a> ComposeRequest<'a> {
    #[must_use]
    pub fn new<I, K>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, RawParam)>,
        K: Into<String>,
    {
        Self {
            params: params
                .into_iter()
                .map(|(name, raw)| (name.into(), raw))
                .collect(),
            references: Vec::new(),
            context: None,
            options: AddOptions::default(),
            config: ControlsConfig::default(),
            display: None,
        }
    }

    #[must_use]
    pub fn with_controls(mut self, reference: ControlsRef) -> Self {
        self.references.push(reference);
        self
    }

    /// Treats the innermost entry of `context`, if any, as an extra reference.
    #[must_use]
    pub fn within(mut self, context: &'a ControlsContext) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: AddOptions) -> Self {
        self.options = options;
        self
    }

    /// Config for the registry created when nothing is referenced.
    #[must_use]
    pub fn with_config(mut self, config: ControlsConfig) -> Self {
        self.config = config;
        self
    }

    /// Shows a newly created registry on `sink`.
    #[must_use]
    pub fn display_with(mut self, sink: &'a mut dyn DisplaySink) -> Self {
        self.display = Some(sink);
        self
    }

    pub fn compose(self) -> ControlsResult<Composition> {
        let mut references = self.references;
        if let Some(current) = self.context.and_then(ControlsContext::current) {
            references.push(current);
        }

        let mut registries: Vec<&Controls> = Vec::new();
        for reference in &references {
            if !registries
                .iter()
                .any(|known| known.ptr_eq(&reference.controls))
            {
                registries.push(&reference.controls);
            }
        }
        if registries.len() > 1 {
            return Err(ControlsError::AmbiguousControls {
                count: registries.len(),
            });
        }

        let Some(controls) = registries.first().map(|controls| (*controls).clone()) else {
            let controls = Controls::new(self.config)?;
            let params = controls.add_params(self.params, &self.options)?;
            if let Some(sink) = self.display {
                controls.display(sink);
            }
            debug!(params = params.len(), "composed new registry");
            return Ok(Composition { controls, params });
        };

        let mut relevant: IndexSet<String> = IndexSet::new();
        for reference in &references {
            relevant.extend(reference.names());
        }
        let added = controls.add_params(self.params, &self.options)?;
        let mut params: IndexSet<String> = added.into_iter().collect();
        params.extend(relevant);
        debug!(params = params.len(), "composed into shared registry");
        Ok(Composition {
            controls,
            params: params.into_iter().collect(),
        })
    }
}

/// The registry a plotting call registers against and the names it may read.
#[derive(Debug, Clone)]
pub struct Composition {
    pub controls: Controls,
    pub params: Vec<String>,
}

impl Composition {
    /// Registers a redraw callback over exactly this call's parameters.
    pub fn register_update<F>(
        &self,
        callback: F,
        figure: Option<&FigureHandle>,
    ) -> ControlsResult<RegistrationId>
    where
        F: Fn(UpdateArgs<'_>) + 'static,
    {
        let names: Vec<&str> = self.params.iter().map(String::as_str).collect();
        self.controls
            .register_update(callback, figure, Some(&names))
    }
}
