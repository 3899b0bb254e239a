//! Contract and compilation-unit containers (spec §3.5).

use super::cfg::Cfg;
use crate::common::CfgId;
use crate::domain::{AstStore, EntryId};
use rustc_hash::FxHashMap;

/// A contract groups a name with the CFGs of its methods and receivers.
#[derive(Debug, Clone)]
pub struct Contract {
    pub name: String,
    pub methods: FxHashMap<CfgId, Cfg>,
}

impl Contract {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: FxHashMap::default(),
        }
    }

    pub fn add_method(&mut self, cfg: Cfg) {
        self.methods.insert(cfg.id, cfg);
    }

    pub fn cfgs(&self) -> impl Iterator<Item = &Cfg> {
        self.methods.values()
    }
}

/// The granularity at which detectors run (spec §3.5): a project name,
/// the immutable AST store, free-function CFGs, and contract CFGs.
#[derive(Debug)]
pub struct CompilationUnit {
    pub project_name: String,
    pub ast_store: AstStore,
    pub functions: FxHashMap<CfgId, Cfg>,
    pub contracts: FxHashMap<EntryId, Contract>,
}

impl CompilationUnit {
    pub fn new(project_name: impl Into<String>, ast_store: AstStore) -> Self {
        Self {
            project_name: project_name.into(),
            ast_store,
            functions: FxHashMap::default(),
            contracts: FxHashMap::default(),
        }
    }

    pub fn add_function(&mut self, cfg: Cfg) {
        self.functions.insert(cfg.id, cfg);
    }

    pub fn add_contract(&mut self, id: EntryId, contract: Contract) {
        self.contracts.insert(id, contract);
    }

    /// Every CFG in the unit (free functions, then contract methods),
    /// filtered by origin per `include_stdlib` config (spec §6).
    pub fn all_cfgs(&self) -> impl Iterator<Item = &Cfg> {
        self.functions
            .values()
            .chain(self.contracts.values().flat_map(|c| c.cfgs()))
    }

    pub fn cfg(&self, id: CfgId) -> Option<&Cfg> {
        self.functions.get(&id).or_else(|| {
            self.contracts
                .values()
                .find_map(|c| c.methods.get(&id))
        })
    }
}
