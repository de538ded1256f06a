use anyhow::{bail, Result};
use cim_mof::mofstr;
use tracing::debug;

/// Layout of a rendered MOF string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub indent: usize,
    pub maxline: usize,
    pub line_pos: usize,
}

pub fn render(text: &str, layout: Layout) -> Result<String> {
    if layout.maxline <= layout.indent + 2 {
        bail!(
            "maxline {} leaves no room after an indent of {}",
            layout.maxline,
            layout.indent
        );
    }
    let (mof, end) = mofstr(text, layout.indent, layout.maxline, layout.line_pos, 0, false, '"');
    debug!(chars = text.chars().count(), end, "rendered MOF string");
    Ok(mof)
}

pub fn run(text: &str, layout: Layout) -> Result<()> {
    println!("{}", render(text, layout)?);
    Ok(())
}
