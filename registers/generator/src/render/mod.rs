// Licensed under the Apache-2.0 license

//! Text renderers for validated register maps.
//!
//! A [`Renderer`] borrows a [`ValidatedModel`] and returns its artifacts as a
//! [`RenderOutput`]; nothing is written to disk here and no renderer keeps
//! state between calls. Renderers only format facts already present in the
//! model.
//!
//! - [`HeaderRenderer`]: one C header per map with constants and accessor
//!   macros.
//! - [`SourceRenderer`]: one C source per map including its header.
//! - [`MarkdownRenderer`]: one document covering every map.

mod header;
mod markdown;
mod source;

pub use header::HeaderRenderer;
pub use markdown::MarkdownRenderer;
pub use source::SourceRenderer;

use crate::config::GeneratorConfig;
use crate::output::ValidatedModel;

/// A generated file held in memory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    /// File name relative to the output directory.
    pub file_name: String,
    pub contents: String,
}

/// Everything one renderer produced.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RenderOutput {
    pub artifacts: Vec<Artifact>,
}

impl RenderOutput {
    pub fn push(&mut self, file_name: impl Into<String>, contents: String) {
        self.artifacts.push(Artifact {
            file_name: file_name.into(),
            contents,
        });
    }
}

/// Produces text artifacts from a validated model.
pub trait Renderer {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    fn render(&self, model: &ValidatedModel) -> anyhow::Result<RenderOutput>;
}

/// The renderers enabled in `config`, in header, source, markdown order.
pub fn renderers(config: &GeneratorConfig) -> Vec<Box<dyn Renderer>> {
    let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();
    if config.emit.header {
        renderers.push(Box::new(HeaderRenderer::new(config.register_width)));
    }
    if config.emit.source {
        renderers.push(Box::new(SourceRenderer));
    }
    if config.emit.markdown {
        renderers.push(Box::new(MarkdownRenderer::new(&config.markdown_file)));
    }
    renderers
}

/// Collapse free text onto one line so it can sit inside a comment or a list
/// item.
pub(crate) fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Emit;

    #[test]
    fn test_renderer_selection() {
        let config = GeneratorConfig::with_defaults();
        let names: Vec<_> = renderers(&config).iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["header", "source", "markdown"]);

        let config = GeneratorConfig::with_defaults().emit(Emit {
            header: true,
            source: false,
            markdown: false,
        });
        let names: Vec<_> = renderers(&config).iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["header"]);
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("Mode\n  selection "), "Mode selection");
        assert_eq!(one_line(""), "");
    }
}
