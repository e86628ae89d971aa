mod align;
mod comment;
mod edit;
mod prepare;
mod wrap;

pub use edit::{apply_edits, TextEdit};
pub use wrap::Overflow;

use crate::{
    ast::Node,
    config::FormatOptions,
    token::{Region, TokenStore},
};

/// Outcome of one format invocation: the edit set plus any lines that
/// could not be brought under the width limit.
#[derive(Debug)]
pub struct FormatResult {
    pub edits: Vec<TextEdit>,
    pub overflows: Vec<Overflow>,
}

pub(crate) fn format(
    source: &str,
    root: &Node,
    mut store: TokenStore,
    options: &FormatOptions,
    regions: &[Region],
) -> FormatResult {
    store.apply_regions(regions);
    prepare::prepare(&mut store, options, root);
    align::align(&mut store, options, root);
    let overflows = wrap::execute(&mut store, options);
    comment::wrap_comments(&mut store, options);
    let edits = edit::extract(source, &store, options);
    FormatResult { edits, overflows }
}
