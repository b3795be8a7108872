//! Named characters for `\name` elements.
//!
//! Names are case-insensitive. Custom names, usually installed by a
//! `charDef` instruction, shadow the built-in table.
//!
//! ```rust
//! use xferlang::CharacterRegistry;
//!
//! let mut registry = CharacterRegistry::new();
//! assert_eq!(registry.resolve("TAB"), Some(0x09));
//! assert_eq!(registry.resolve("rocket"), Some(0x1F680));
//!
//! registry.define("tab", 0x2192);
//! assert_eq!(registry.resolve("tab"), Some(0x2192));
//! ```

use std::collections::HashMap;

const BUILTIN: &[(&str, u32)] = &[
    // ASCII control characters
    ("nul", 0x00),
    ("soh", 0x01),
    ("stx", 0x02),
    ("etx", 0x03),
    ("eot", 0x04),
    ("enq", 0x05),
    ("ack", 0x06),
    ("bel", 0x07),
    ("bksp", 0x08),
    ("tab", 0x09),
    ("lf", 0x0A),
    ("nl", 0x0A),
    ("vtab", 0x0B),
    ("ff", 0x0C),
    ("cr", 0x0D),
    ("so", 0x0E),
    ("si", 0x0F),
    ("dle", 0x10),
    ("dc1", 0x11),
    ("dc2", 0x12),
    ("dc3", 0x13),
    ("dc4", 0x14),
    ("nak", 0x15),
    ("syn", 0x16),
    ("etb", 0x17),
    ("can", 0x18),
    ("em", 0x19),
    ("sub", 0x1A),
    ("esc", 0x1B),
    ("fs", 0x1C),
    ("gs", 0x1D),
    ("rs", 0x1E),
    ("us", 0x1F),
    ("space", 0x20),
    ("nbsp", 0xA0),
    // punctuation that collides with the syntax
    ("lt", 0x3C),
    ("gt", 0x3E),
    ("quote", 0x22),
    ("apos", 0x27),
    ("backslash", 0x5C),
    ("percent", 0x25),
    // currency
    ("dollar", 0x24),
    ("cent", 0xA2),
    ("pound", 0xA3),
    ("currency", 0xA4),
    ("yen", 0xA5),
    ("euro", 0x20AC),
    ("rupee", 0x20B9),
    ("won", 0x20A9),
    ("franc", 0x20A3),
    ("peso", 0x20B1),
    ("bitcoin", 0x20BF),
    ("ruble", 0x20BD),
    ("shekel", 0x20AA),
    ("dong", 0x20AB),
    ("baht", 0x0E3F),
    ("lira", 0x20BA),
    ("naira", 0x20A6),
    // math
    ("plus", 0x2B),
    ("minus", 0x2212),
    ("multiply", 0xD7),
    ("divide", 0xF7),
    ("equals", 0x3D),
    ("notequals", 0x2260),
    ("lessthanorequalto", 0x2264),
    ("greaterthanorequalto", 0x2265),
    ("plusminus", 0xB1),
    ("pi", 0x03C0),
    ("infinity", 0x221E),
    ("sqrt", 0x221A),
    ("integral", 0x222B),
    ("summation", 0x2211),
    ("product", 0x220F),
    ("partial", 0x2202),
    ("nabla", 0x2207),
    ("forall", 0x2200),
    ("exists", 0x2203),
    ("emptyset", 0x2205),
    ("elementof", 0x2208),
    ("notelementof", 0x2209),
    ("intersection", 0x2229),
    ("union", 0x222A),
    ("logicaland", 0x2227),
    ("logicalor", 0x2228),
    ("therefore", 0x2234),
    ("because", 0x2235),
    ("angle", 0x2220),
    ("degree", 0xB0),
    ("micro", 0xB5),
    // arrows
    ("arrowleft", 0x2190),
    ("arrowup", 0x2191),
    ("arrowright", 0x2192),
    ("arrowdown", 0x2193),
    // Greek
    ("alpha", 0x03B1),
    ("beta", 0x03B2),
    ("gamma", 0x03B3),
    ("delta", 0x03B4),
    ("epsilon", 0x03B5),
    ("zeta", 0x03B6),
    ("eta", 0x03B7),
    ("theta", 0x03B8),
    ("iota", 0x03B9),
    ("kappa", 0x03BA),
    ("lambda", 0x03BB),
    ("mu", 0x03BC),
    ("nu", 0x03BD),
    ("xi", 0x03BE),
    ("omicron", 0x03BF),
    ("rho", 0x03C1),
    ("sigma", 0x03C3),
    ("tau", 0x03C4),
    ("upsilon", 0x03C5),
    ("phi", 0x03C6),
    ("chi", 0x03C7),
    ("psi", 0x03C8),
    ("omega", 0x03C9),
    // typography
    ("emdash", 0x2014),
    ("endash", 0x2013),
    ("bullet", 0x2022),
    ("ellipsis", 0x2026),
    ("section", 0xA7),
    ("paragraph", 0xB6),
    ("copyright", 0xA9),
    ("registered", 0xAE),
    ("trademark", 0x2122),
    ("dagger", 0x2020),
    ("ddagger", 0x2021),
    ("perthousand", 0x2030),
    ("prime", 0x2032),
    ("doubleprime", 0x2033),
    ("middot", 0xB7),
    ("leftguillemet", 0xAB),
    ("rightguillemet", 0xBB),
    ("invertedexclamation", 0xA1),
    ("invertedquestion", 0xBF),
    ("numero", 0x2116),
    ("checkmark", 0x2713),
    ("crossmark", 0x2717),
    // symbols and emoji
    ("spade", 0x2660),
    ("club", 0x2663),
    ("heartcard", 0x2665),
    ("diamond", 0x2666),
    ("smiley", 0x263A),
    ("sun", 0x2600),
    ("snowman", 0x2603),
    ("musicnote", 0x266A),
    ("smile", 0x1F604),
    ("grin", 0x1F601),
    ("joy", 0x1F602),
    ("sad", 0x1F622),
    ("wink", 0x1F609),
    ("cool", 0x1F60E),
    ("thinking", 0x1F914),
    ("heart", 0x2764),
    ("thumbsup", 0x1F44D),
    ("thumbsdown", 0x1F44E),
    ("clap", 0x1F44F),
    ("wave", 0x1F44B),
    ("eyes", 0x1F440),
    ("fire", 0x1F525),
    ("star", 0x2B50),
    ("rocket", 0x1F680),
    ("tada", 0x1F389),
    ("lightbulb", 0x1F4A1),
    ("warning", 0x26A0),
    ("check", 0x2705),
    ("cross", 0x274C),
    ("hourglass", 0x23F3),
    ("gear", 0x2699),
    ("bug", 0x1F41B),
    ("lock", 0x1F512),
    ("unlock", 0x1F513),
    ("package", 0x1F4E6),
    ("vstext", 0xFE0E),
    ("vsemoji", 0xFE0F),
];

/// Maps character names to Unicode code points.
#[derive(Clone, Debug, Default)]
pub struct CharacterRegistry {
    builtins: bool,
    custom: HashMap<String, u32>,
}

impl CharacterRegistry {
    /// A registry with the built-in names.
    pub fn new() -> Self {
        CharacterRegistry {
            builtins: true,
            custom: HashMap::new(),
        }
    }

    /// A registry that only knows custom names.
    pub fn empty() -> Self {
        CharacterRegistry::default()
    }

    /// Code point for `name`; custom names win over built-ins.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        if let Some(cp) = self.custom.get(&name.to_ascii_lowercase()) {
            return Some(*cp);
        }
        if !self.builtins {
            return None;
        }
        BUILTIN
            .iter()
            .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name))
            .map(|(_, cp)| *cp)
    }

    pub fn define(&mut self, name: &str, code_point: u32) {
        self.custom.insert(name.to_ascii_lowercase(), code_point);
    }

    /// Merges a batch of custom names into the registry.
    pub fn set_custom_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        for (name, cp) in ids {
            self.define(name.as_ref(), cp);
        }
    }

    pub fn clear_custom(&mut self) {
        self.custom.clear();
    }

    pub fn custom_len(&self) -> usize {
        self.custom.len()
    }
}
