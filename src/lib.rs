//! gmview renders a game VM's bytecode and decompiled script text as
//! classified, cross-referenced spans.
//!
//! The decoder and decompiler are external; this crate classifies what
//! they produce and wires up navigation: instructions become labeled
//! span sequences, decompiled lines become classified tokens with
//! asset-table cross-references, and one well-known script is mined for
//! the localization id mapping.

#[macro_use]
extern crate lazy_static;

pub mod assets;
pub mod backend;
pub mod classifier;
pub mod formatter;
pub mod gettext;
pub mod instruction;
pub mod lexer;
pub mod view;

#[cfg(test)]
mod lexer_tests;
