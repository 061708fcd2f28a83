use crate::{Generation, Symbol};

/// Side effects requested by `update`; the shell executes them and feeds the
/// results back as messages carrying the same generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchQuotes {
        generation: Generation,
        symbols: Vec<Symbol>,
    },
    SearchQuotes {
        generation: Generation,
        text: String,
    },
}
