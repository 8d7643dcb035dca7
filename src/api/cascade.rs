//! The update cascade run for every control change.
//!
//! All parameter writes of one event (three of them for `vmin_vmax`) are
//! committed before any callback runs. Callbacks registered under several of
//! the touched names run once, and every live figure is redrawn once.

use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::backend::ChangePayload;
use crate::core::{ControlIndex, ParamIndices, ParamMap, ParamValue};
use crate::error::{ControlsError, ControlsResult};
use crate::figure::{FigureHandle, FigureId};

use super::controls::{ControlsState, UpdateArgs, UpdateFn, UserCallback, VMAX, VMIN, VMIN_VMAX};
use super::{Controls, UpdateCache};

/// What one change event did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub updated_params: usize,
    pub update_calls: usize,
    pub user_calls: usize,
    pub redraws: usize,
    pub pruned_figures: usize,
}

type TouchedNames = SmallVec<[String; 3]>;

struct Plan {
    updates: Vec<(UpdateFn, ParamMap, ParamIndices)>,
    users: Vec<(UserCallback, ParamMap)>,
    figures: Vec<FigureHandle>,
    pruned: usize,
    use_cache: bool,
    touched: usize,
}

impl Controls {
    /// Runs the cascade for a normalized change of `name`.
    ///
    /// Change handlers handed to backends call this; hosts delivering events
    /// from their own toolkit can call it directly.
    pub fn dispatch(
        &self,
        name: &str,
        payload: ChangePayload,
    ) -> ControlsResult<CascadeReport> {
        let plan = {
            let mut state = self.inner.borrow_mut();
            let (value, index) = translate(&state, name, payload)?;
            let touched = commit(&mut state, name, value, index);
            collect_plan(&mut state, &touched)
        };

        let mut cache = plan.use_cache.then(UpdateCache::new);
        for (callback, params, indices) in &plan.updates {
            callback(UpdateArgs {
                params,
                indices,
                cache: cache.as_mut(),
            });
        }
        for (callback, params) in &plan.users {
            callback(params);
        }
        for figure in &plan.figures {
            figure.request_redraw();
        }

        let report = CascadeReport {
            updated_params: plan.touched,
            update_calls: plan.updates.len(),
            user_calls: plan.users.len(),
            redraws: plan.figures.len(),
            pruned_figures: plan.pruned,
        };
        trace!(
            name,
            updated_params = report.updated_params,
            update_calls = report.update_calls,
            user_calls = report.user_calls,
            redraws = report.redraws,
            pruned_figures = report.pruned_figures,
            cache_hits = cache.as_ref().map_or(0, UpdateCache::hits),
            "update cascade"
        );
        Ok(report)
    }
}

fn translate(
    state: &ControlsState,
    name: &str,
    payload: ChangePayload,
) -> ControlsResult<(ParamValue, Option<ControlIndex>)> {
    let control = state
        .controls
        .get(name)
        .ok_or_else(|| ControlsError::NoControl(name.to_owned()))?;
    let lookup = |index: usize| -> ControlsResult<ParamValue> {
        let Some(values) = control.spec().values() else {
            warn!(name, "index change for a control without values");
            return Err(ControlsError::invalid(name, "control has no values to index"));
        };
        values
            .get(index)
            .cloned()
            .ok_or(ControlsError::IndexOutOfRange {
                name: name.to_owned(),
                index,
                len: values.len(),
            })
    };
    match payload {
        ChangePayload::Index(index) => Ok((lookup(index)?, Some(ControlIndex::Single(index)))),
        ChangePayload::IndexPair(low, high) => Ok((
            ParamValue::pair(lookup(low)?, lookup(high)?),
            Some(ControlIndex::Pair(low, high)),
        )),
        ChangePayload::Value(value) => Ok((value, None)),
    }
}

fn commit(
    state: &mut ControlsState,
    name: &str,
    value: ParamValue,
    index: Option<ControlIndex>,
) -> TouchedNames {
    let mut touched = TouchedNames::new();
    if name == VMIN_VMAX {
        if let Some((low, high)) = value.as_pair() {
            state.params.insert(VMIN.to_owned(), low.clone());
            state.params.insert(VMAX.to_owned(), high.clone());
            if let Some(ControlIndex::Pair(low, high)) = index {
                state
                    .indices
                    .insert(VMIN.to_owned(), ControlIndex::Single(low));
                state
                    .indices
                    .insert(VMAX.to_owned(), ControlIndex::Single(high));
            }
            touched.push(VMIN.to_owned());
            touched.push(VMAX.to_owned());
        }
    }
    state.params.insert(name.to_owned(), value);
    if let Some(index) = index {
        state.indices.insert(name.to_owned(), index);
    }
    touched.insert(0, name.to_owned());
    touched
}

fn collect_plan(state: &mut ControlsState, touched: &[String]) -> Plan {
    let mut seen = IndexSet::new();
    let mut updates = Vec::new();
    for name in touched {
        for registration in state.update_funcs.get(name).into_iter().flatten() {
            if seen.insert(registration.id) {
                updates.push((
                    Rc::clone(&registration.callback),
                    state.subset_params(&registration.subset),
                    state.subset_indices(&registration.subset),
                ));
            }
        }
    }

    seen.clear();
    let mut users = Vec::new();
    for name in touched {
        for registration in state.user_callbacks.get(name).into_iter().flatten() {
            if seen.insert(registration.id) {
                users.push((
                    Rc::clone(&registration.callback),
                    state.subset_params(&registration.subset),
                ));
            }
        }
    }

    let mut figures: IndexMap<FigureId, FigureHandle> = IndexMap::new();
    let mut pruned = 0;
    for name in touched {
        let Some(registered) = state.figs.get_mut(name) else {
            continue;
        };
        registered.retain(|id, figure| match figure.upgrade() {
            Some(figure) => {
                figures.entry(*id).or_insert(figure);
                true
            }
            None => {
                pruned += 1;
                false
            }
        });
    }
    state.figs.retain(|_, registered| !registered.is_empty());

    Plan {
        updates,
        users,
        figures: figures.into_values().collect(),
        pruned,
        use_cache: state.config.use_cache,
        touched: touched.len(),
    }
}
