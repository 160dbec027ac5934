//! Catalogs compiled into the binary

pub(super) const STACK_CATALOG: &str = include_str!("../../catalogs/stack.yaml");
pub(super) const PHASE_CATALOG: &str = include_str!("../../catalogs/phase.yaml");
pub(super) const LANGUAGE_CATALOG: &str = include_str!("../../catalogs/language.yaml");
pub(super) const WORKSPACE_CATALOG: &str = include_str!("../../catalogs/workspace.yaml");
