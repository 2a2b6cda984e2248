//! Sweep unit module
//!
//! Splits the remote catalog into checkpointed progress units.
//!
//! # Overview
//!
//! A harvest is sliced along independent dimensions:
//! - Plain ranges (chapters 1..114)
//! - Products such as script kind x scope dimension x scope value
//! - Resource x chapter and reciter x chapter
//!
//! Every unit maps to a ledger key unique within its section, so a
//! restarted run can skip finished units without a remote call.

mod domains;
mod types;

pub use domains::{
    all_chapters, by_surah_groups, chapter_info_groups, parse_chapter_list, parse_id_list,
    reciter_audio_groups, script_groups, segment_groups, single_resource_groups,
    verse_chapter_groups, ScopeDimension, ScriptKind, TextFamily, CHAPTER_COUNT,
};
pub use types::{CheckpointCell, Progress, SweepUnit, UnitGroup, UnitRequest, UnitScope};
