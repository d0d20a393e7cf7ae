//! The post-serve extension point.

use std::collections::HashMap;
use std::sync::Arc;

use super::{AdminContext, Parameters, ServeEvent};

/// An action the serving engine runs after a response has been produced.
///
/// # Contract
///
/// `do_action` is invoked on the serving engine's completion path, once per
/// served request whose stub references this action by [`name`](Self::name).
/// Implementations must return promptly and must not fail the caller: the
/// client's response is already decided by the time this runs.
pub trait PostServeAction: Send + Sync {
    /// Name under which stubs reference this action.
    fn name(&self) -> &'static str;

    /// Runs the action for one served event.
    fn do_action(&self, event: &ServeEvent, admin: &AdminContext, parameters: &Parameters);
}

/// Name-keyed registry of post-serve actions.
///
/// The serving engine looks up actions here by the name stored in a stub's
/// configuration and fires them with that stub's parameters.
#[derive(Default)]
pub struct PostServeActions {
    actions: HashMap<&'static str, Arc<dyn PostServeAction>>,
}

impl PostServeActions {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action under its own name.
    ///
    /// Returns the action previously registered under that name, if any.
    pub fn register(
        &mut self,
        action: Arc<dyn PostServeAction>,
    ) -> Option<Arc<dyn PostServeAction>> {
        self.actions.insert(action.name(), action)
    }

    /// Returns the action registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn PostServeAction>> {
        self.actions.get(name)
    }

    /// Fires the named action for a served event.
    ///
    /// Returns `false` if no action is registered under `name`.
    pub fn fire(
        &self,
        name: &str,
        event: &ServeEvent,
        admin: &AdminContext,
        parameters: &Parameters,
    ) -> bool {
        let Some(action) = self.get(name) else {
            tracing::warn!("No post-serve action registered as '{name}'");
            return false;
        };

        action.do_action(event, admin, parameters);
        true
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for PostServeActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.actions.keys().collect();
        names.sort();
        f.debug_struct("PostServeActions")
            .field("actions", &names)
            .finish()
    }
}
