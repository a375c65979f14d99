//! Smart SVG template engine.
//!
//! An SVG template declares form fields through its element ids
//! (`Name.text.max_20.req`, `Size.select_m`, `Ref.gen`). This crate parses
//! and validates that id grammar, builds the form it describes, evaluates
//! dependencies and generation rules, and writes values back into the SVG
//! while keeping everything the editor did not touch byte-for-byte intact.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`grammar`] | Id grammar: field types, tokens, value constraints |
//! | [`id`] | Id parsing, validation, suggestions and rebuilding |
//! | [`extract`] | Word/character extraction (`w1`, `ch1-3`) and dependency refs |
//! | [`pattern`] | Generation rule syntax (`AUTO:`, `(rn[4])`, `(x[fill])`) |
//! | [`generate`] | Rule evaluation, `max` handling and padding |
//! | [`random`] | Injectable randomness for generation |
//! | [`field`] | Field catalog built from element ids |
//! | [`form`] | Form state: propagation, links, auto rules, one-shot fill |
//! | [`svg`] | Document model, element extraction, regeneration, live preview |
//! | [`history`] | Reversible patches and the undo log |
//! | [`store`] | Editor store: element map, order, selection, undo/redo |
//! | [`consts`] | Shared constants (line height, highlight style, history cap) |

pub mod consts;
pub mod extract;
pub mod field;
pub mod form;
pub mod generate;
pub mod grammar;
pub mod history;
pub mod id;
pub mod pattern;
pub mod random;
pub mod store;
pub mod svg;
