// ============================================================================
// vidpipe-core/src/registry.rs
// ============================================================================
//
// MODULE REGISTRY: Name Resolution for Pipeline Entries
//
// Maps the `name` of a pipeline entry to a ModuleKind and constructs the
// configured TransformModule. The table is static: every kind is registered
// under its configuration key and its type name.
//
// KEY COMPONENTS:
// - ModuleKind: one variant per available module
// - resolve: lenient name lookup (namespaces, snake_case, PascalCase)
// - build: resolve + construct from a ModuleSpec

use crate::config::{ModuleParams, ModuleSpec};
use crate::error::{CoreError, CoreResult};
use crate::modules::{
    AddVideo, Chromakey, Crop, Cut, DeleteAudio, ModuleWrapper, Pad, PrepareForYt, Resize,
    TextEffects, TransformModule, Trim, Watermark,
};
use std::fmt;

/// Namespace tried when a name does not resolve on its own.
pub const DEFAULT_NAMESPACE: &str = "utility";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Crop,
    Pad,
    Resize,
    Watermark,
    AddVideo,
    Chromakey,
    TextEffects,
    DeleteAudio,
    CutVideo,
    Cut,
    PrepareForYt,
    ModuleWrapper,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 12] = [
        ModuleKind::Crop,
        ModuleKind::Pad,
        ModuleKind::Resize,
        ModuleKind::Watermark,
        ModuleKind::AddVideo,
        ModuleKind::Chromakey,
        ModuleKind::TextEffects,
        ModuleKind::DeleteAudio,
        ModuleKind::CutVideo,
        ModuleKind::Cut,
        ModuleKind::PrepareForYt,
        ModuleKind::ModuleWrapper,
    ];

    /// Configuration key, e.g. `text_effects` or `utility.cut`.
    pub fn key(self) -> &'static str {
        match self {
            ModuleKind::Crop => Crop::NAME,
            ModuleKind::Pad => Pad::NAME,
            ModuleKind::Resize => Resize::NAME,
            ModuleKind::Watermark => Watermark::NAME,
            ModuleKind::AddVideo => AddVideo::NAME,
            ModuleKind::Chromakey => Chromakey::NAME,
            ModuleKind::TextEffects => TextEffects::NAME,
            ModuleKind::DeleteAudio => DeleteAudio::NAME,
            ModuleKind::CutVideo => Trim::NAME,
            ModuleKind::Cut => Cut::NAME,
            ModuleKind::PrepareForYt => PrepareForYt::NAME,
            ModuleKind::ModuleWrapper => ModuleWrapper::NAME,
        }
    }

    /// Type name alias, namespaced like the key.
    pub fn type_name(self) -> &'static str {
        match self {
            ModuleKind::Crop => "Crop",
            ModuleKind::Pad => "Pad",
            ModuleKind::Resize => "Resize",
            ModuleKind::Watermark => "Watermark",
            ModuleKind::AddVideo => "AddVideo",
            ModuleKind::Chromakey => "Chromakey",
            ModuleKind::TextEffects => "TextEffects",
            ModuleKind::DeleteAudio => "DeleteAudio",
            ModuleKind::CutVideo => "CutVideo",
            ModuleKind::Cut => "utility.Cut",
            ModuleKind::PrepareForYt => "utility.PrepareForYt",
            ModuleKind::ModuleWrapper => "utility.ModuleWrapper",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ModuleKind::Crop => "Crop to a fixed size at a position or offset",
            ModuleKind::Pad => "Pad to a canvas filled with a color or an image",
            ModuleKind::Resize => "Scale, optionally letterboxing to keep the aspect ratio",
            ModuleKind::Watermark => "Overlay a translucent image",
            ModuleKind::AddVideo => "Overlay a second video (picture in picture)",
            ModuleKind::Chromakey => "Key out a background color and overlay the rest",
            ModuleKind::TextEffects => "Draw animated text",
            ModuleKind::DeleteAudio => "Remove all audio streams",
            ModuleKind::CutVideo => "Keep a single time range",
            ModuleKind::Cut => "Split into fixed-length parts (side output)",
            ModuleKind::PrepareForYt => "Re-encode to an upload-friendly H.264/AAC profile",
            ModuleKind::ModuleWrapper => "Run another module on separate files",
        }
    }

    /// Constructs the module, validating its parameters.
    pub fn build(self, params: &ModuleParams) -> CoreResult<Box<dyn TransformModule>> {
        Ok(match self {
            ModuleKind::Crop => Box::new(Crop::from_params(params)?),
            ModuleKind::Pad => Box::new(Pad::from_params(params)?),
            ModuleKind::Resize => Box::new(Resize::from_params(params)?),
            ModuleKind::Watermark => Box::new(Watermark::from_params(params)?),
            ModuleKind::AddVideo => Box::new(AddVideo::from_params(params)?),
            ModuleKind::Chromakey => Box::new(Chromakey::from_params(params)?),
            ModuleKind::TextEffects => Box::new(TextEffects::from_params(params)?),
            ModuleKind::DeleteAudio => Box::new(DeleteAudio::from_params(params)?),
            ModuleKind::CutVideo => Box::new(Trim::from_params(params)?),
            ModuleKind::Cut => Box::new(Cut::from_params(params)?),
            ModuleKind::PrepareForYt => Box::new(PrepareForYt::from_params(params)?),
            ModuleKind::ModuleWrapper => Box::new(ModuleWrapper::from_params(params)?),
        })
    }

    fn lookup(name: &str) -> Option<ModuleKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == name || kind.type_name() == name)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// `snake_case` -> `SnakeCase`.
fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Names tried for `name`, in resolution order.
fn candidates(name: &str) -> Vec<String> {
    let trailing = name.rsplit('.').next().unwrap_or(name);
    let namespaced = |n: &str| format!("{DEFAULT_NAMESPACE}.{n}");

    let mut names = vec![name.to_string(), trailing.to_string(), namespaced(trailing)];
    for variant in [trailing.to_lowercase().replace('_', ""), pascal_case(trailing)] {
        names.push(namespaced(&variant));
        names.push(variant);
    }
    names
}

/// Resolves a module name to its kind.
pub fn resolve(name: &str) -> CoreResult<ModuleKind> {
    let name = name.trim();
    candidates(name)
        .iter()
        .find_map(|candidate| ModuleKind::lookup(candidate))
        .ok_or_else(|| CoreError::Resolution(name.to_string()))
}

/// Resolves and constructs the module described by `spec`.
pub fn build(spec: &ModuleSpec) -> CoreResult<Box<dyn TransformModule>> {
    let kind = resolve(&spec.name)?;
    if kind.key() != spec.name {
        log::debug!("Resolved module '{}' to '{}'", spec.name, kind.key());
    }
    kind.build(&spec.params)
}

/// All registered kinds, in listing order.
pub fn list() -> &'static [ModuleKind] {
    &ModuleKind::ALL
}
