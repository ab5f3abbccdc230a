//! The per-property save decision shared by all backends.

use crate::property::context::PropertyContext;
use crate::property::spec::PropertyFlags;
use crate::store::buffer::ConfigBuffer;
use crate::store::set::SetFlags;
use crate::value::{CompareOptions, Comparison};

/// What a backend should do with one property during a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    /// Write the current value.
    Write,
    /// An earlier file already provides this exact value.
    SkipDuplicate,
    /// The value equals its default and defaults are not persisted.
    SkipDefault,
}

impl SaveDecision {
    pub fn is_write(self) -> bool {
        self == SaveDecision::Write
    }
}

/// Decides whether `ctx` is written, given the set flags and the values
/// staged from the files preceding the write target.
pub fn decide(flags: SetFlags, ctx: &PropertyContext, buffer: &ConfigBuffer) -> SaveDecision {
    if flags.contains(SetFlags::HIDE_DUPLICATE) {
        if let Some(staged) = buffer.get(ctx.key()) {
            if ctx.value().compare(staged, &CompareOptions::default()) == Comparison::Equal {
                return SaveDecision::SkipDuplicate;
            }
        }
    }

    let hide_default = flags.contains(SetFlags::HIDE_DEFAULT)
        || ctx.spec().flags().contains(PropertyFlags::HIDE_IF_DEFAULT);
    if hide_default && ctx.is_default() {
        return SaveDecision::SkipDefault;
    }

    SaveDecision::Write
}
