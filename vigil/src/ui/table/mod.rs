//! Table rendering for configuration data.

mod preset_ext;

pub use self::preset_ext::PresetExt;
