//! Renders patch presets for `vigil preset list`.

use comfy_table::{Cell, ContentArrangement};

use crate::config::PatchPreset;

pub trait PresetExt {
    /// Renders presets as a borderless table, one environment variable per
    /// line in the `ENV` column.
    fn render_table(&self) -> String;
}

impl PresetExt for [PatchPreset] {
    fn render_table(&self) -> String {
        let rows = self
            .iter()
            .map(|preset| {
                [
                    Cell::new(&preset.name),
                    Cell::new(&preset.description),
                    Cell::new(
                        preset.env.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"),
                    ),
                ]
            })
            .collect::<Vec<_>>();

        comfy_table::Table::new()
            .load_preset(comfy_table::presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["NAME", "DESCRIPTION", "ENV"])
            .add_rows(rows)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvVar;

    #[test]
    fn test_render_contains_names_and_env() {
        let presets = vec![PatchPreset {
            name: "verbose".to_string(),
            description: "Root logger at debug".to_string(),
            env: vec![EnvVar::new("LOGGING_LEVEL_ROOT", "DEBUG")],
        }];

        let table = presets.render_table();
        assert!(table.contains("NAME"));
        assert!(table.contains("verbose"));
        assert!(table.contains("LOGGING_LEVEL_ROOT=DEBUG"));
    }
}
