// Licensed under the Apache-2.0 license

//! C header output.
//!
//! For a map named `MAP1` the header `map1_register_map.h` looks like:
//!
//! ```text
//! #ifndef MAP1_REGISTER_MAP_H
//! #define MAP1_REGISTER_MAP_H
//!
//! #include <stdint.h>
//!
//! // Register Map: MAP1 - First register map
//! #define MAP1_BASE_ADDRESS (0x40000000)
//!
//! // Register: CONTROL_REG
//! // Access: read-write
//! #define MAP1_CONTROL_REG_OFFSET (0x0)
//! #define MAP1_CONTROL_REG_ADDRESS (0x40000000)
//!
//! // Bitfield: ENABLE (Enable control)
//! #define MAP1_CONTROL_REG_ENABLE_BITSHIFT (0)
//! ...
//! #define MAP1_CONTROL_REG_ENABLE_READ() ...
//! #define MAP1_CONTROL_REG_ENABLE_WRITE(value) ...
//!
//! #endif // MAP1_REGISTER_MAP_H
//! ```

use std::fmt::{self, Write};

use super::{one_line, RenderOutput, Renderer};
use crate::output::{
    GeneratedField, GeneratedRegister, GeneratedRegisterMap, Suffix, ValidatedModel,
};
use crate::util::{c_address, c_hex, include_guard};

/// Emits one header per register map.
#[derive(Clone, Debug)]
pub struct HeaderRenderer {
    /// C type of a register word.
    word_type: &'static str,
}

impl HeaderRenderer {
    pub fn new(register_width: u32) -> Self {
        let word_type = match register_width {
            0..=8 => "uint8_t",
            9..=16 => "uint16_t",
            17..=32 => "uint32_t",
            _ => "uint64_t",
        };
        Self { word_type }
    }

    fn render_map(&self, map: &GeneratedRegisterMap) -> Result<String, fmt::Error> {
        let mut out = String::new();
        let guard = include_guard(&map.header_file);

        writeln!(out, "#ifndef {guard}")?;
        writeln!(out, "#define {guard}")?;
        writeln!(out)?;
        writeln!(out, "#include <stdint.h>")?;
        writeln!(out)?;
        writeln!(
            out,
            "// Register Map: {} - {}",
            map.name,
            comment_text(&map.description)
        )?;
        writeln!(
            out,
            "#define {} ({})",
            map.symbol(Suffix::BaseAddress),
            literal(c_address(map.base_address), map.base_address)
        )?;
        writeln!(out)?;

        for reg in &map.registers {
            self.render_register(&mut out, reg)?;
        }

        writeln!(out, "#endif // {guard}")?;
        Ok(out)
    }

    fn render_register(&self, out: &mut String, reg: &GeneratedRegister) -> fmt::Result {
        writeln!(out, "// Register: {}", reg.name)?;
        writeln!(out, "// Access: {}", reg.access)?;
        writeln!(
            out,
            "#define {} ({})",
            reg.symbol(Suffix::Offset),
            literal(c_hex(reg.offset), reg.offset)
        )?;
        writeln!(
            out,
            "#define {} ({})",
            reg.symbol(Suffix::Address),
            literal(c_address(reg.address), reg.address)
        )?;
        writeln!(out)?;

        for field in &reg.fields {
            self.render_field(out, reg, field)?;
        }
        Ok(())
    }

    fn render_field(
        &self,
        out: &mut String,
        reg: &GeneratedRegister,
        field: &GeneratedField,
    ) -> fmt::Result {
        let word = self.word_type;
        let address = reg.symbol(Suffix::Address);
        let mask = field.symbol(Suffix::Mask);
        let shift = field.symbol(Suffix::Bitshift);

        let description = comment_text(&field.description);
        if description.is_empty() {
            writeln!(out, "// Bitfield: {}", field.name)?;
        } else {
            writeln!(out, "// Bitfield: {} ({description})", field.name)?;
        }
        writeln!(out, "#define {shift} ({})", field.bitshift)?;
        writeln!(
            out,
            "#define {} ({})",
            field.symbol(Suffix::Bitwidth),
            field.bitwidth
        )?;
        writeln!(
            out,
            "#define {} ({})",
            field.symbol(Suffix::DefaultValue),
            literal(field.default_value.to_string(), field.default_value)
        )?;
        writeln!(
            out,
            "#define {mask} ({})",
            literal(c_hex(field.mask), field.mask)
        )?;
        for (name, value) in &field.enum_values {
            writeln!(
                out,
                "#define {} ({})",
                field.symbol(Suffix::Enum(name)),
                literal(value.to_string(), *value)
            )?;
        }

        writeln!(out, "#define {}() \\", field.read.symbol)?;
        writeln!(
            out,
            "    ((*((volatile {word} *){address}) & {mask}) >> {shift})"
        )?;

        if let Some(write) = &field.write {
            writeln!(out, "#define {}(value) \\", write.symbol)?;
            writeln!(out, "    do {{ \\")?;
            writeln!(
                out,
                "        {word} reg_value = *((volatile {word} *){address}); \\"
            )?;
            writeln!(out, "        reg_value &= ~{mask}; \\")?;
            writeln!(
                out,
                "        reg_value |= ((({word})(value) << {shift}) & {mask}); \\"
            )?;
            writeln!(out, "        *((volatile {word} *){address}) = reg_value; \\")?;
            writeln!(out, "    }} while (0)")?;
        }
        writeln!(out)?;
        Ok(())
    }
}

/// Free text for a `//` comment. A trailing backslash would splice the next
/// source line into the comment, so it is dropped.
fn comment_text(text: &str) -> String {
    one_line(text)
        .trim_end_matches(|c: char| c == '\\' || c.is_whitespace())
        .to_string()
}

/// Append `ULL` to literals that do not fit in 32 bits.
fn literal(text: String, value: u64) -> String {
    if value > u32::MAX as u64 {
        text + "ULL"
    } else {
        text
    }
}

impl Renderer for HeaderRenderer {
    fn name(&self) -> &'static str {
        "header"
    }

    fn render(&self, model: &ValidatedModel) -> anyhow::Result<RenderOutput> {
        let mut output = RenderOutput::default();
        for map in model.maps() {
            output.push(map.header_file.clone(), self.render_map(map)?);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_type() {
        assert_eq!(HeaderRenderer::new(8).word_type, "uint8_t");
        assert_eq!(HeaderRenderer::new(16).word_type, "uint16_t");
        assert_eq!(HeaderRenderer::new(32).word_type, "uint32_t");
        assert_eq!(HeaderRenderer::new(64).word_type, "uint64_t");
    }

    #[test]
    fn test_comment_text_drops_line_continuation() {
        assert_eq!(comment_text("Lives under C:\\"), "Lives under C:");
        assert_eq!(comment_text("a \\ \\\n"), "a");
        assert_eq!(comment_text("back\\slash inside"), "back\\slash inside");
        assert_eq!(comment_text("  two\n lines "), "two lines");
        assert_eq!(comment_text("\\"), "");
    }

    #[test]
    fn test_literal_suffix() {
        assert_eq!(literal("0xE".into(), 0xE), "0xE");
        assert_eq!(
            literal(c_hex(0x1_0000_0000), 0x1_0000_0000),
            "0x100000000ULL"
        );
    }
}
