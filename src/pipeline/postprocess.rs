//! Post-processing: deterministic fixes for converter-generated reStructuredText.
//!
//! The markdown → rst converter produces valid rst, but not always the rst
//! Sphinx-Gallery expects:
//!
//! - Admonitions written as `<div class="note">` come out as a generic
//!   `.. container:: note` instead of the `.. note::` directive
//! - Inline `:property=` attributes stay glued to the preceding word instead
//!   of starting their own option line
//! - Image alt text is repeated as a stray caption paragraph under `:alt:`
//!
//! Each rule is a pure `&str → String` function, so every rule can be tested
//! on its own and the pipeline can be extended without shared state.
//!
//! ## Rule Order
//!
//! Directive normalisation runs first so later rules see the final directive
//! names; the alt-text fix runs last because it matches on exact indentation
//! that the property split may introduce.

use once_cell::sync::Lazy;
use regex::Regex;

/// A single rewrite rule.
pub type Rule = fn(&str) -> String;

/// The rules applied by [`clean_markup`], in order.
pub const RULES: [Rule; 3] = [
    normalise_directive_tags,
    split_property_attributes,
    dedupe_image_alt_text,
];

/// Apply all post-processing rules to one converted markdown cell.
///
/// Rules (applied in order):
/// 1. `.. container:: TAG` → `.. TAG::`
/// 2. `word :property=` → `word` + newline + `   :property=`
/// 3. `   :alt: X` + blank line + `   X` → `   :alt: X`
pub fn clean_markup(input: &str) -> String {
    RULES
        .iter()
        .fold(input.to_string(), |text, rule| rule(&text))
}

// ── Rule 1: Directive tag normalisation ──────────────────────────────────────

static RE_CONTAINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\. container:: (\w+)").unwrap());

fn normalise_directive_tags(input: &str) -> String {
    RE_CONTAINER.replace_all(input, ".. ${1}::").into_owned()
}

// ── Rule 2: Property attribute line split ────────────────────────────────────

static RE_PROPERTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+) (:property=)").unwrap());

fn split_property_attributes(input: &str) -> String {
    RE_PROPERTY.replace_all(input, "${1}\n   ${2}").into_owned()
}

// ── Rule 3: Image alt-text deduplication ─────────────────────────────────────
//
// The converter renders `![caption](img.png)` as an image directive with an
// `:alt:` option and then repeats the caption as an indented paragraph. The
// repeated line is dropped; the alt text is kept verbatim.

static RE_ALT_CAPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {3}:alt: (.+)\n\n {3}(.+)").unwrap());

fn dedupe_image_alt_text(input: &str) -> String {
    RE_ALT_CAPTION.replace_all(input, "   :alt: ${1}").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
