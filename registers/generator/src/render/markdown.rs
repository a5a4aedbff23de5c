// Licensed under the Apache-2.0 license

//! Markdown documentation covering every register map in one file.

use std::fmt::{self, Write};

use super::{one_line, RenderOutput, Renderer};
use crate::output::{GeneratedField, GeneratedRegister, GeneratedRegisterMap, ValidatedModel};
use crate::util::{c_address, c_hex};

#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    file_name: String,
}

impl MarkdownRenderer {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn render(&self, model: &ValidatedModel) -> anyhow::Result<RenderOutput> {
        let mut doc = String::new();
        for map in model.maps() {
            render_map(&mut doc, map)?;
        }
        let mut output = RenderOutput::default();
        output.push(self.file_name.clone(), doc);
        Ok(output)
    }
}

fn render_map(out: &mut String, map: &GeneratedRegisterMap) -> fmt::Result {
    writeln!(out, "# Register Map: {}\n", map.name)?;
    writeln!(out, "**Description**: {}\n", one_line(&map.description))?;
    writeln!(out, "**Base Address**: `{}`\n", c_address(map.base_address))?;
    for reg in &map.registers {
        render_register(out, reg)?;
    }
    Ok(())
}

fn render_register(out: &mut String, reg: &GeneratedRegister) -> fmt::Result {
    writeln!(out, "## Register: {}\n", reg.name)?;
    writeln!(out, "**Offset**: `{}`\n", c_hex(reg.offset))?;
    writeln!(
        out,
        "**Address**: `{}` (`{}`)\n",
        reg.address_expression,
        c_address(reg.address)
    )?;
    writeln!(out, "**Access**: `{}`\n", reg.access)?;

    if !reg.fields.is_empty() {
        writeln!(out, "### Bitfields\n")?;
        for field in &reg.fields {
            render_field(out, field)?;
        }
    }
    Ok(())
}

fn render_field(out: &mut String, field: &GeneratedField) -> fmt::Result {
    writeln!(out, "- **{}**: {}", field.name, one_line(&field.description))?;
    writeln!(out, "  - **Bitshift**: `{}`", field.bitshift)?;
    writeln!(out, "  - **Bitwidth**: `{}`", field.bitwidth)?;
    writeln!(out, "  - **Default Value**: `{}`", field.default_value)?;
    writeln!(out, "  - **Bit Mask**: `{}`", c_hex(field.mask))?;
    if !field.enum_values.is_empty() {
        writeln!(out, "  - **Enum Values**:")?;
        for (name, value) in &field.enum_values {
            writeln!(out, "    - `{name}`: `{value}`")?;
        }
    }
    writeln!(out)
}
