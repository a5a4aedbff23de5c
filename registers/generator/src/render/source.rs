// Licensed under the Apache-2.0 license

//! C source output: each map's source only includes its header, which
//! already carries every constant and accessor.

use super::{RenderOutput, Renderer};
use crate::output::ValidatedModel;

#[derive(Clone, Copy, Debug, Default)]
pub struct SourceRenderer;

impl Renderer for SourceRenderer {
    fn name(&self) -> &'static str {
        "source"
    }

    fn render(&self, model: &ValidatedModel) -> anyhow::Result<RenderOutput> {
        let mut output = RenderOutput::default();
        for map in model.maps() {
            output.push(
                map.source_file.clone(),
                format!("#include \"{}\"\n", map.header_file),
            );
        }
        Ok(output)
    }
}
