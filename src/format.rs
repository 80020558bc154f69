//! Spore Wire Format
//!
//! This module documents the frozen-string format as implemented by this library. It has no
//! items of its own.
//!
//! # Overview
//!
//! A spore is a tree of strings flattened into one line of text. There is no schema: the
//! reader must consume members in the order the writer appended them. Type information, when
//! needed, travels as metadata on a composite.
//!
//! # Grammar
//!
//! ```text
//! frozen         := composite | atomic
//! composite      := "{|" [ metadata sep ] [ member (sep member)* ] "|}"
//! atomic         := any text not matching the composite shape
//! metadata       := "{|" "spr" sep entry (sep entry)* "|}"
//! entry          := "v" text | "u" text
//! member         := frozen
//! sep            := "_|_"
//! null-sentinel  := "--"
//! empty-sentinel := "-e-"
//! ```
//!
//! A string has the composite shape iff it starts with `{|`, ends with `|}` and is at least
//! four bytes long. Anything else, including `{|abc` with no closing suffix, is an atomic.
//!
//! ## Reserved tokens
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `{\|` | opens a composite |
//! | `\|}` | closes a composite |
//! | `_\|_` | separates members |
//! | `--` | null payload |
//! | `-e-` | present collection with no elements |
//! | `spr` | first entry of a metadata block |
//!
//! Payload text is never escaped. A payload containing `{|`, `|}` or `_|_` corrupts the
//! member split, and a payload equal to a sentinel reads back as that sentinel.
//!
//! # Splitting Members
//!
//! The text between a composite's outer delimiters is scanned left to right. Every
//! occurrence of `{|` increments an open count and every `|}` increments a close count. A
//! `_|_` is a split point only while the two counts are equal; after a split both reset.
//! Text with no separator at all is one member, and empty text is no members.
//!
//! # Metadata
//!
//! The canonical block is the composite's first member:
//!
//! ```text
//! {|{|spr_|_v001_|_uFilterModel|}_|_name_|_3245|}
//! ```
//!
//! Entries are written version first, then unique identifier. An entry with empty info is
//! its bare prefix (`u`).
//!
//! ## Legacy inline header
//!
//! Older data spreads the header over the composite's own first three members, with no `spr`
//! marker:
//!
//! ```text
//! {|v001_|_u_|_FilterModelUniqueId_|_name_|_description_|_3245|}
//! ```
//!
//! Here the version is `001`, the unique identifier is empty, `FilterModelUniqueId` is the
//! type label, and the composite has three children. The decoder recognises this header on the
//! outermost composite only, when member 0 is `v` plus text, member 1 is exactly `u`, and
//! member 2 is plain text. Nested collections and maps are never read this way. It is
//! re-encoded verbatim and never produced by the writer. See
//! [`SporeOptions::with_legacy_inline_metadata`](crate::SporeOptions::with_legacy_inline_metadata).
//!
//! # Collections and Maps
//!
//! | Value | Encoding |
//! |-------|----------|
//! | absent collection | `--` |
//! | empty collection | `-e-` |
//! | `[a, b]` | `{\|a_\|_b\|}` |
//! | `{k1: v1, k2: v2}` | `{\|k1_\|_v1_\|_k2_\|_v2\|}` |
//!
//! Maps are indistinguishable from even-length lists on the wire. An odd member count read as
//! a map is an error.
//!
//! # Enums
//!
//! Enums are stored by zero-based declaration position. Reordering variants changes the
//! meaning of stored data.
