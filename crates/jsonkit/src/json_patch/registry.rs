//! Process-wide table of patch operation handlers.

use std::sync::Arc;

use dashmap::DashMap;
use jsonkit_node::Result;
use once_cell::sync::Lazy;
use tracing::info;

use super::apply::{
    apply_add, apply_copy, apply_ensure_put, apply_exist, apply_move, apply_remove,
    apply_replace, apply_test,
};
use super::target::PatchTarget;
use super::types::{op_names, PatchOp};

/// Applies one named operation to a document.
///
/// Implemented for every `Fn(&mut dyn PatchTarget, &PatchOp) -> Result<()>`,
/// so plain functions and closures can be registered directly.
pub trait PatchOpHandler: Send + Sync {
    fn apply(&self, target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()>;
}

impl<F> PatchOpHandler for F
where
    F: Fn(&mut dyn PatchTarget, &PatchOp) -> Result<()> + Send + Sync,
{
    fn apply(&self, target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
        self(target, op)
    }
}

static HANDLERS: Lazy<DashMap<String, Arc<dyn PatchOpHandler>>> = Lazy::new(builtins);

pub struct PatchOpRegistry;

impl PatchOpRegistry {
    /// Registers `handler` under `name`, replacing any previous handler
    /// (built-ins included).
    pub fn register<H: PatchOpHandler + 'static>(name: impl Into<String>, handler: H) {
        let name = name.into();
        info!(op = %name, "registered patch operation");
        HANDLERS.insert(name, Arc::new(handler));
    }

    pub fn get(name: &str) -> Option<Arc<dyn PatchOpHandler>> {
        HANDLERS.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(name: &str) -> bool {
        HANDLERS.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names() -> Vec<String> {
        let mut names: Vec<String> = HANDLERS.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

fn builtins() -> DashMap<String, Arc<dyn PatchOpHandler>> {
    let table: DashMap<String, Arc<dyn PatchOpHandler>> = DashMap::new();
    let add = |name: &str, handler: fn(&mut dyn PatchTarget, &PatchOp) -> Result<()>| {
        table.insert(name.to_string(), Arc::new(handler));
    };
    add(op_names::TEST, apply_test);
    add(op_names::ADD, apply_add);
    add(op_names::REMOVE, apply_remove);
    add(op_names::REPLACE, apply_replace);
    add(op_names::COPY, apply_copy);
    add(op_names::MOVE, apply_move);
    add(op_names::EXIST, apply_exist);
    add(op_names::ENSURE_PUT, apply_ensure_put);
    table
}
