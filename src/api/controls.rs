use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::backend::{
    ChangeHandler, Control, ControlDriver, ControlRequest, WidgetBackend, create_backend,
};
use crate::core::{
    ControlIndex, Domain, ParamIndices, ParamMap, ParamValue, ParameterKind, ParameterSpec,
    RawParam, Resolver,
};
use crate::error::{ControlsError, ControlsResult};
use crate::figure::{Figure, FigureHandle, FigureId};
use crate::widgets::{PlayButtonPosition, SliderBounds, SliderFormats, Widget};

use super::{ControlsConfig, ParamFn, UpdateCache};

/// Name of the range parameter that also keeps `vmin` and `vmax` current.
pub const VMIN_VMAX: &str = "vmin_vmax";
pub const VMIN: &str = "vmin";
pub const VMAX: &str = "vmax";

/// Arguments handed to a redraw callback.
pub struct UpdateArgs<'a> {
    pub params: &'a ParamMap,
    pub indices: &'a ParamIndices,
    /// Per-event cache; `None` when caching is disabled.
    pub cache: Option<&'a mut UpdateCache>,
}

impl UpdateArgs<'_> {
    /// Evaluates `func` over these params through the event cache.
    pub fn eval<T: Clone + 'static>(&mut self, func: &ParamFn<T>) -> T {
        func.eval(self.params, self.cache.as_deref_mut())
    }
}

pub type UpdateFn = Rc<dyn Fn(UpdateArgs<'_>)>;
pub type UserCallback = Rc<dyn Fn(&ParamMap)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

pub(crate) struct Registration<F> {
    pub(crate) id: RegistrationId,
    pub(crate) callback: F,
    pub(crate) subset: Rc<[String]>,
}

impl<F: Clone> Clone for Registration<F> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: self.callback.clone(),
            subset: Rc::clone(&self.subset),
        }
    }
}

/// Which parameters of an `add_params` batch get a play button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlayButtons {
    #[default]
    None,
    All,
    Only(Vec<String>),
}

impl PlayButtons {
    fn wants(&self, name: &str) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Only(names) => names.iter().any(|candidate| candidate == name),
        }
    }
}

/// Per-call options for [`Controls::add_params`].
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub slider_formats: SliderFormats,
    pub play_buttons: PlayButtons,
    /// Overrides the configured play button position for this batch.
    pub play_position: Option<PlayButtonPosition>,
    /// Reuse existing controls instead of failing on repeated names.
    pub allow_duplicates: bool,
}

impl AddOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_slider_formats(mut self, formats: SliderFormats) -> Self {
        self.slider_formats = formats;
        self
    }

    #[must_use]
    pub fn with_play_buttons(mut self, play_buttons: PlayButtons) -> Self {
        self.play_buttons = play_buttons;
        self
    }

    #[must_use]
    pub fn with_play_position(mut self, position: PlayButtonPosition) -> Self {
        self.play_position = Some(position);
        self
    }

    #[must_use]
    pub fn allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }
}

pub(crate) struct ControlsState {
    pub(crate) config: ControlsConfig,
    pub(crate) backend: Box<dyn WidgetBackend>,
    pub(crate) formats: SliderFormats,
    pub(crate) params: ParamMap,
    pub(crate) indices: ParamIndices,
    pub(crate) controls: IndexMap<String, Rc<Control>>,
    pub(crate) update_funcs: IndexMap<String, Vec<Registration<UpdateFn>>>,
    pub(crate) user_callbacks: IndexMap<String, Vec<Registration<UserCallback>>>,
    pub(crate) figs: IndexMap<String, IndexMap<FigureId, Weak<dyn Figure>>>,
    next_registration: u64,
}

impl ControlsState {
    fn next_registration_id(&mut self) -> RegistrationId {
        self.next_registration += 1;
        RegistrationId(self.next_registration)
    }

    fn subset_names(&self, params: Option<&[&str]>) -> ControlsResult<Rc<[String]>> {
        let names: Vec<String> = match params {
            Some(names) => {
                let mut unique = IndexSet::new();
                for name in names {
                    if !self.params.contains_key(*name) {
                        return Err(ControlsError::UnknownParameter((*name).to_owned()));
                    }
                    unique.insert((*name).to_owned());
                }
                unique.into_iter().collect()
            }
            None => self.params.keys().cloned().collect(),
        };
        Ok(names.into())
    }

    pub(crate) fn subset_params(&self, subset: &[String]) -> ParamMap {
        subset
            .iter()
            .filter_map(|name| {
                self.params
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }

    pub(crate) fn subset_indices(&self, subset: &[String]) -> ParamIndices {
        subset
            .iter()
            .map(|name| {
                let index = self.indices.get(name).copied().unwrap_or_default();
                (name.clone(), index)
            })
            .collect()
    }
}

/// The controls registry.
///
/// Owns every control of a group of plots, the current value and index of
/// each parameter, and the callbacks that depend on them. Handles are cheap
/// clones of one shared registry; widget change handlers hold weak references
/// so controls never keep their registry alive.
#[derive(Clone)]
pub struct Controls {
    pub(crate) inner: Rc<RefCell<ControlsState>>,
}

impl Controls {
    pub fn new(config: ControlsConfig) -> ControlsResult<Self> {
        let backend = create_backend(config.backend, &config)?;
        Ok(Self::with_backend(config, backend))
    }

    /// Builds a registry over a caller-supplied backend.
    #[must_use]
    pub fn with_backend(config: ControlsConfig, backend: Box<dyn WidgetBackend>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ControlsState {
                formats: SliderFormats::new(config.default_format()),
                config,
                backend,
                params: ParamMap::new(),
                indices: ParamIndices::new(),
                controls: IndexMap::new(),
                update_funcs: IndexMap::new(),
                user_callbacks: IndexMap::new(),
                figs: IndexMap::new(),
                next_registration: 0,
            })),
        }
    }

    /// Shorthand for `new` followed by `add_params` with default options.
    pub fn with_params<I, K>(config: ControlsConfig, params: I) -> ControlsResult<Self>
    where
        I: IntoIterator<Item = (K, RawParam)>,
        K: Into<String>,
    {
        let controls = Self::new(config)?;
        controls.add_params(params, &AddOptions::default())?;
        Ok(controls)
    }

    pub(crate) fn from_weak(inner: &Weak<RefCell<ControlsState>>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    /// `true` when both handles point at the same registry.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn config(&self) -> ControlsConfig {
        self.inner.borrow().config
    }

    /// Resolves and builds controls for `params`.
    ///
    /// Returns the names this call makes available, including `vmin`/`vmax`
    /// when a `vmin_vmax` range is added. Nothing is built when any entry
    /// fails to resolve or repeats an existing name without
    /// [`AddOptions::allow_duplicates`]; with it, existing controls and values
    /// are left untouched.
    pub fn add_params<I, K>(&self, params: I, options: &AddOptions) -> ControlsResult<Vec<String>>
    where
        I: IntoIterator<Item = (K, RawParam)>,
        K: Into<String>,
    {
        let mut state = self.inner.borrow_mut();

        let mut names: IndexSet<String> = IndexSet::new();
        let mut pending: Vec<(String, ParameterSpec, Option<PlayButtonPosition>)> = Vec::new();
        for (name, raw) in params {
            let name = name.into();
            let exists = state.params.contains_key(&name) || names.contains(&name);
            if exists && !options.allow_duplicates {
                return Err(ControlsError::DuplicateParameter { name });
            }
            if !exists {
                let resolver = Resolver {
                    continuous_steps: state.config.continuous_steps,
                    format: options
                        .slider_formats
                        .lookup(&name)
                        .cloned()
                        .unwrap_or_else(|| state.formats.get(&name)),
                };
                let spec = resolver.resolve(&name, &raw)?;
                let play = play_button(&name, &spec, options, state.config.play_button_position);
                pending.push((name.clone(), spec, play));
            }
            if name == VMIN_VMAX {
                names.insert(name.clone());
                names.insert(VMIN.to_owned());
                names.insert(VMAX.to_owned());
            } else {
                names.insert(name);
            }
        }

        let requests: Vec<ControlRequest<'_>> = pending
            .iter()
            .map(|(name, spec, play)| ControlRequest::new(name, spec).with_play_button(*play))
            .collect();
        state.backend.prepare(&requests);
        for request in &requests {
            let handler = self.change_handler(request.name);
            let built = state.backend.build(request, handler)?;
            let name = request.name.to_owned();
            if name == VMIN_VMAX {
                if let Some((low, high)) = built.value.as_pair() {
                    state.params.insert(VMIN.to_owned(), low.clone());
                    state.params.insert(VMAX.to_owned(), high.clone());
                }
                if let ControlIndex::Pair(low, high) = built.index {
                    state
                        .indices
                        .insert(VMIN.to_owned(), ControlIndex::Single(low));
                    state
                        .indices
                        .insert(VMAX.to_owned(), ControlIndex::Single(high));
                }
            }
            state.params.insert(name.clone(), built.value);
            state.indices.insert(name.clone(), built.index);
            if let Some(control) = built.control {
                state.controls.insert(name, Rc::new(control));
            }
        }
        debug!(
            added = requests.len(),
            names = names.len(),
            controls = state.controls.len(),
            backend = state.backend.kind().name(),
            "added parameters"
        );
        Ok(names.into_iter().collect())
    }

    fn change_handler(&self, name: &str) -> ChangeHandler {
        let registry = Rc::downgrade(&self.inner);
        let name = name.to_owned();
        Rc::new(move |payload| {
            let Some(controls) = Self::from_weak(&registry) else {
                return;
            };
            if let Err(err) = controls.dispatch(&name, payload) {
                warn!(name = %name, error = %err, "dropped control change");
            }
        })
    }

    /// Registers a redraw callback.
    ///
    /// `params` defaults to every parameter currently held; parameters added
    /// later are not included. The figure, if any, is held weakly and redrawn
    /// once per change event that reaches this callback.
    pub fn register_update<F>(
        &self,
        callback: F,
        figure: Option<&FigureHandle>,
        params: Option<&[&str]>,
    ) -> ControlsResult<RegistrationId>
    where
        F: Fn(UpdateArgs<'_>) + 'static,
    {
        let mut state = self.inner.borrow_mut();
        let subset = state.subset_names(params)?;
        let id = state.next_registration_id();
        let callback: UpdateFn = Rc::new(callback);
        for name in subset.iter() {
            state
                .update_funcs
                .entry(name.clone())
                .or_default()
                .push(Registration {
                    id,
                    callback: Rc::clone(&callback),
                    subset: Rc::clone(&subset),
                });
            if let Some(figure) = figure {
                state
                    .figs
                    .entry(name.clone())
                    .or_default()
                    .insert(figure.id(), Rc::downgrade(figure));
            }
        }
        debug!(?id, params = subset.len(), figure = figure.is_some(), "registered update");
        Ok(id)
    }

    /// Registers a user callback receiving the named parameter values.
    ///
    /// With `eager`, the callback runs once with the current values before
    /// this returns.
    pub fn register_callback<F>(
        &self,
        callback: F,
        params: Option<&[&str]>,
        eager: bool,
    ) -> ControlsResult<RegistrationId>
    where
        F: Fn(&ParamMap) + 'static,
    {
        let callback: UserCallback = Rc::new(callback);
        let (id, current) = {
            let mut state = self.inner.borrow_mut();
            let subset = state.subset_names(params)?;
            let id = state.next_registration_id();
            for name in subset.iter() {
                state
                    .user_callbacks
                    .entry(name.clone())
                    .or_default()
                    .push(Registration {
                        id,
                        callback: Rc::clone(&callback),
                        subset: Rc::clone(&subset),
                    });
            }
            debug!(?id, params = subset.len(), eager, "registered callback");
            (id, eager.then(|| state.subset_params(&subset)))
        };
        if let Some(current) = current {
            callback(&current);
        }
        Ok(id)
    }

    /// Removes every entry of a registration. Returns `true` when something was removed.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let mut state = self.inner.borrow_mut();
        let mut removed = false;
        for registrations in state.update_funcs.values_mut() {
            let before = registrations.len();
            registrations.retain(|registration| registration.id != id);
            removed |= registrations.len() != before;
        }
        for registrations in state.user_callbacks.values_mut() {
            let before = registrations.len();
            registrations.retain(|registration| registration.id != id);
            removed |= registrations.len() != before;
        }
        removed
    }

    /// Drops every weak reference to `figure`.
    pub fn figure_closed(&self, figure: FigureId) {
        let mut state = self.inner.borrow_mut();
        for figures in state.figs.values_mut() {
            figures.shift_remove(&figure);
        }
        state.figs.retain(|_, figures| !figures.is_empty());
    }

    /// Number of distinct live figures the registry redraws.
    #[must_use]
    pub fn figure_count(&self) -> usize {
        let state = self.inner.borrow();
        let live: IndexSet<FigureId> = state
            .figs
            .values()
            .flat_map(|figures| {
                figures
                    .iter()
                    .filter(|(_, figure)| figure.strong_count() > 0)
                    .map(|(id, _)| *id)
            })
            .collect();
        live.len()
    }

    #[must_use]
    pub fn params(&self) -> ParamMap {
        self.inner.borrow().params.clone()
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<ParamValue> {
        self.inner.borrow().params.get(name).cloned()
    }

    #[must_use]
    pub fn indices(&self) -> ParamIndices {
        self.inner.borrow().indices.clone()
    }

    /// Current index of `name`; `Single(0)` for names never driven by an index.
    #[must_use]
    pub fn index(&self, name: &str) -> ControlIndex {
        self.inner
            .borrow()
            .indices
            .get(name)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn param_names(&self) -> Vec<String> {
        self.inner.borrow().params.keys().cloned().collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.borrow().params.contains_key(name)
    }

    #[must_use]
    pub fn control_names(&self) -> Vec<String> {
        self.inner.borrow().controls.keys().cloned().collect()
    }

    #[must_use]
    pub fn control_kind(&self, name: &str) -> Option<ParameterKind> {
        let state = self.inner.borrow();
        match state.controls.get(name) {
            Some(control) => Some(control.kind()),
            None => state.params.contains_key(name).then_some(ParameterKind::Fixed),
        }
    }

    /// The widget bound to `name`.
    #[must_use]
    pub fn widget(&self, name: &str) -> Option<Widget> {
        self.inner
            .borrow()
            .controls
            .get(name)
            .map(|control| control.widget().clone())
    }

    /// Runs `inspect` against the live control for `name`. The registry is
    /// not borrowed while `inspect` runs, so it may move the control's widgets.
    pub fn with_control<R>(&self, name: &str, inspect: impl FnOnce(&Control) -> R) -> Option<R> {
        let control = self.inner.borrow().controls.get(name).cloned()?;
        Some(inspect(&control))
    }

    pub(crate) fn driver(&self, name: &str) -> ControlsResult<ControlDriver> {
        let state = self.inner.borrow();
        match state.controls.get(name) {
            Some(control) => Ok(control.driver()),
            None if state.params.contains_key(name) => Err(ControlsError::NoControl(name.to_owned())),
            None => Err(ControlsError::UnknownParameter(name.to_owned())),
        }
    }

    /// Moves the control for `name` to position `index` of its values, firing
    /// the normal update cascade when the position changes.
    pub fn set_index(&self, name: &str, index: usize) -> ControlsResult<()> {
        self.driver(name)?.set_index(index)
    }

    /// Moves both handles of the range control for `name`.
    pub fn set_range(&self, name: &str, low: usize, high: usize) -> ControlsResult<()> {
        self.driver(name)?.set_range(low, high)
    }

    /// Moves the slider for `name` to `value` (clamped and snapped to its step).
    pub fn set_control_value(&self, name: &str, value: f64) -> ControlsResult<()> {
        self.driver(name)?.set_value(value)
    }

    /// `(min, max, step)` of the control for `name`.
    pub fn control_bounds(&self, name: &str) -> ControlsResult<SliderBounds> {
        self.driver(name)?.bounds()
    }

    /// Spec of a live control, for introspection.
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<ParameterSpec> {
        self.inner
            .borrow()
            .controls
            .get(name)
            .map(|control| control.spec().clone())
    }

    /// Values behind an index-driven control.
    #[must_use]
    pub fn domain(&self, name: &str) -> Option<Vec<ParamValue>> {
        let state = self.inner.borrow();
        let control = state.controls.get(name)?;
        match &control.spec().domain {
            Domain::External(_) | Domain::Fixed(_) => None,
            _ => control.spec().values().map(<[ParamValue]>::to_vec),
        }
    }
}

impl fmt::Debug for Controls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(state) => f
                .debug_struct("Controls")
                .field("backend", &state.backend.kind())
                .field("params", &state.params.keys().collect::<Vec<_>>())
                .field("controls", &state.controls.len())
                .finish(),
            Err(_) => f.write_str("Controls(<updating>)"),
        }
    }
}

fn play_button(
    name: &str,
    spec: &ParameterSpec,
    options: &AddOptions,
    configured: PlayButtonPosition,
) -> Option<PlayButtonPosition> {
    let slider = matches!(
        spec.kind(),
        ParameterKind::ContinuousSlider | ParameterKind::IndexSlider
    );
    (slider && options.play_buttons.wants(name)).then(|| options.play_position.unwrap_or(configured))
}
