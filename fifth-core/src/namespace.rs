use crate::phrase::Phrase;
use std::collections::HashMap;
use std::sync::Arc;

// RUST CONCEPT: Session-owned lookup tables
// The namespace belongs to one ExecutionContext and is threaded through every
// evaluation, so independent sessions never share bindings.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    vars: HashMap<Arc<str>, Phrase>,
    macros: HashMap<Arc<str>, Arc<[Phrase]>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to an expansion. Returns the expansion it replaced.
    pub fn define_macro(
        &mut self,
        name: impl Into<Arc<str>>,
        expansion: impl IntoIterator<Item = Phrase>,
    ) -> Option<Arc<[Phrase]>> {
        self.macros.insert(name.into(), expansion.into_iter().collect())
    }

    pub fn remove_macro(&mut self, name: &str) -> Option<Arc<[Phrase]>> {
        self.macros.remove(name)
    }

    // Returns a shared handle so the caller can keep evaluating while mutating the context
    pub fn macro_expansion(&self, name: &str) -> Option<Arc<[Phrase]>> {
        self.macros.get(name).cloned()
    }

    pub fn bind(&mut self, name: impl Into<Arc<str>>, value: Phrase) -> Option<Phrase> {
        self.vars.insert(name.into(), value)
    }

    pub fn unbind(&mut self, name: &str) -> Option<Phrase> {
        self.vars.remove(name)
    }

    pub fn var(&self, name: &str) -> Option<&Phrase> {
        self.vars.get(name)
    }

    /// Macro names, sorted.
    pub fn macro_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(|name| &**name).collect();
        names.sort_unstable();
        names
    }
}
