//! Alignment of annotation spans onto canonical token sequences.
//!
//! Datasets annotate mentions against their own tokenization or against
//! raw character offsets. This crate maps such spans onto the tokens
//! produced by a different tokenizer. Alignment either succeeds with a
//! token span or fails explicitly, it never guesses.

mod aligner;
pub use aligner::{
    Alignment, AnchorQuality, ForeignSpan, SourceDocument, SpanAligner, DEFAULT_ANCHOR_BUFFER,
};

mod error;
pub use error::AlignError;

mod majority;
pub use majority::{majority_type, NO_TYPE};

pub mod normalize;

mod span;
pub use span::Span;
