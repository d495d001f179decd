//! Utility modules: stages that do more (or less) than transform the main
//! video. They live under the `utility.` namespace of the registry.

pub mod cut;
pub mod module_wrapper;
pub mod prepare_for_yt;

pub use cut::Cut;
pub use module_wrapper::ModuleWrapper;
pub use prepare_for_yt::PrepareForYt;
