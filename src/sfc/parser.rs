//! Single-file component parser.
//!
//! A component file holds at most one `<template>` block, at most one
//! `<script>` block and any number of `<style>` blocks, in any order. Text
//! between blocks is ignored. Nested `<template>` tags inside the template
//! block are balanced, so inner `<template>` elements survive intact.
//!
//! Script blocks understand two statement forms:
//!
//! ```text
//! import Card from "./card.vue";
//! export default { "title": "Hello" };
//! ```
//!
//! The default export must be a JSON object; it supplies data defaults for the
//! component. Any other script text is ignored.

use regex::Regex;
use serde_json::{Map, Value};

use crate::core::{SourceLocation, StylegraphError};

/// A block of a component file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Text between the opening and closing tags.
    pub content: String,
    /// Raw attribute text of the opening tag.
    pub attrs: String,
    /// Byte offset of `content` in the source file.
    pub offset: usize,
}

/// An `import Name from "path";` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Local component name used as a tag in the template
    pub name: String,
    /// Import specifier, relative to the importing file
    pub specifier: String,
    /// Byte offset of the statement in the source file
    pub offset: usize,
}

/// Parsed component file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SfcDescriptor {
    /// The template block
    pub template: Option<Block>,
    /// The script block
    pub script: Option<Block>,
    /// Style blocks in source order
    pub styles: Vec<Block>,
    /// Imports declared by the script block
    pub imports: Vec<ImportStatement>,
    /// Data defaults from `export default`
    pub data: Map<String, Value>,
}

/// Splits component sources into blocks.
#[derive(Debug, Clone)]
pub struct SfcParser {
    open_tag: Regex,
    template_tag: Regex,
    import_stmt: Regex,
    export_default: Regex,
}

impl SfcParser {
    /// Build a parser.
    pub fn new() -> Result<Self, StylegraphError> {
        let build = |pattern: &str| {
            Regex::new(pattern).map_err(|e| StylegraphError::Other {
                message: format!("Invalid parser pattern: {e}"),
            })
        };

        Ok(Self {
            open_tag: build(r"<(template|script|style)(\s[^>]*)?>")?,
            template_tag: build(r"<(/?)template(?:\s[^>]*)?>")?,
            import_stmt: build(
                r#"(?m)^[ \t]*import\s+([A-Za-z_$][A-Za-z0-9_$]*)\s+from\s+["']([^"']+)["'][ \t]*;?"#,
            )?,
            export_default: build(r"export\s+default\s*")?,
        })
    }

    /// Parse `source`, reporting errors against `file`.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::CompileFailure`] with a location for
    /// unterminated blocks, duplicate template or script blocks and an invalid
    /// default export.
    pub fn parse(&self, file: &str, source: &str) -> Result<SfcDescriptor, StylegraphError> {
        let mut descriptor = SfcDescriptor::default();
        let mut cursor = 0;

        while let Some(caps) = self.open_tag.captures_at(source, cursor) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            let kind = caps.get(1).map_or("", |m| m.as_str());
            let attrs = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            let content_start = whole.end();
            let at = |offset| SourceLocation::from_offset(file, source, offset);

            let (content_end, block_end) = if kind == "template" {
                self.find_template_close(source, content_start)
                    .ok_or_else(|| StylegraphError::compile_at("Unterminated <template> block", at(whole.start())))?
            } else {
                let close = format!("</{kind}>");
                let rel = source[content_start..].find(&close).ok_or_else(|| {
                    StylegraphError::compile_at(format!("Unterminated <{kind}> block"), at(whole.start()))
                })?;
                (content_start + rel, content_start + rel + close.len())
            };

            let block = Block {
                content: source[content_start..content_end].to_string(),
                attrs,
                offset: content_start,
            };

            match kind {
                "template" => {
                    if descriptor.template.is_some() {
                        return Err(StylegraphError::compile_at(
                            "A component may only have one <template> block",
                            at(whole.start()),
                        ));
                    }
                    descriptor.template = Some(block);
                }
                "script" => {
                    if descriptor.script.is_some() {
                        return Err(StylegraphError::compile_at(
                            "A component may only have one <script> block",
                            at(whole.start()),
                        ));
                    }
                    descriptor.script = Some(block);
                }
                _ => descriptor.styles.push(block),
            }

            cursor = block_end;
        }

        if let Some(script) = &descriptor.script {
            descriptor.imports = self.parse_imports(script);
            descriptor.data = self.parse_export(file, source, script)?;
        }

        Ok(descriptor)
    }

    /// Find the `</template>` closing the block opened before `from`.
    ///
    /// Returns the content end offset and the offset just past the closing tag.
    fn find_template_close(&self, source: &str, from: usize) -> Option<(usize, usize)> {
        let mut depth = 1usize;
        for caps in self.template_tag.captures_iter(&source[from..]) {
            let whole = caps.get(0)?;
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            if closing {
                depth -= 1;
                if depth == 0 {
                    return Some((from + whole.start(), from + whole.end()));
                }
            } else if !whole.as_str().ends_with("/>") {
                depth += 1;
            }
        }
        None
    }

    fn parse_imports(&self, script: &Block) -> Vec<ImportStatement> {
        self.import_stmt
            .captures_iter(&script.content)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(ImportStatement {
                    name: caps.get(1)?.as_str().to_string(),
                    specifier: caps.get(2)?.as_str().to_string(),
                    offset: script.offset + whole.start() + (whole.len() - whole.as_str().trim_start().len()),
                })
            })
            .collect()
    }

    fn parse_export(
        &self,
        file: &str,
        source: &str,
        script: &Block,
    ) -> Result<Map<String, Value>, StylegraphError> {
        let Some(found) = self.export_default.find(&script.content) else {
            return Ok(Map::new());
        };

        let rest = &script.content[found.end()..];
        let location = SourceLocation::from_offset(file, source, script.offset + found.start());
        let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();

        match values.next() {
            Some(Ok(Value::Object(map))) => Ok(map),
            Some(Ok(_)) => Err(StylegraphError::compile_at(
                "export default must be an object literal",
                location,
            )),
            Some(Err(e)) => Err(StylegraphError::compile_at(
                format!("Invalid export default object: {e}"),
                location,
            )),
            None => Err(StylegraphError::compile_at("Missing export default value", location)),
        }
    }
}
