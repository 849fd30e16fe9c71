//! Per-file import table
//!
//! Collects the [`ImportRequest`]s of every type expression in a contract
//! file, merges them by module and assigns local names. A symbol that clashes
//! with a name declared in the file or imported earlier is aliased as
//! `Name$1`, `Name$2`, ...

use crate::types::ImportRequest;
use std::collections::{HashMap, HashSet};

/// Imports of one generated file
#[derive(Debug, Default)]
pub struct ImportTable {
    /// Names that are declared in the file or already bound by an import
    taken: HashSet<String>,
    /// Modules in first-request order
    modules: Vec<ModuleImports>,
    /// (module, symbol) -> local name
    local_names: HashMap<(String, String), String>,
}

#[derive(Debug)]
struct ModuleImports {
    module: String,
    /// (symbol, local name) in first-request order
    symbols: Vec<(String, String)>,
}

impl ImportTable {
    /// Create a table that never binds any of the `declared` names
    pub fn new<I>(declared: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            taken: declared.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Register an import and return the name to print for it
    ///
    /// Requesting the same symbol from the same module again returns the
    /// existing binding.
    pub fn request(&mut self, request: &ImportRequest) -> String {
        let key = (request.module.clone(), request.symbol.clone());
        if let Some(name) = self.local_names.get(&key) {
            return name.clone();
        }

        let mut local = request.symbol.clone();
        let mut n = 0;
        while self.taken.contains(&local) {
            n += 1;
            local = format!("{}${}", request.symbol, n);
        }
        self.taken.insert(local.clone());

        let index = match self.modules.iter().position(|m| m.module == request.module) {
            Some(index) => index,
            None => {
                self.modules.push(ModuleImports {
                    module: request.module.clone(),
                    symbols: Vec::new(),
                });
                self.modules.len() - 1
            }
        };
        self.modules[index]
            .symbols
            .push((request.symbol.clone(), local.clone()));

        self.local_names.insert(key, local.clone());
        local
    }

    /// Local name of a registered import, or the bare symbol if it was never requested
    pub fn local_name(&self, request: &ImportRequest) -> String {
        self.local_names
            .get(&(request.module.clone(), request.symbol.clone()))
            .cloned()
            .unwrap_or_else(|| request.symbol.clone())
    }

    /// True when nothing was requested
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// One `import type { ... } from "...";` line per module
    pub fn render(&self) -> Vec<String> {
        self.modules
            .iter()
            .map(|m| {
                let symbols = m
                    .symbols
                    .iter()
                    .map(|(symbol, local)| {
                        if symbol == local {
                            symbol.clone()
                        } else {
                            format!("{} as {}", symbol, local)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("import type {{ {} }} from \"{}\";", symbols, m.module)
            })
            .collect()
    }
}
