//! Serial number masks
//!
//! A mask describes the shape of a serial number one character at a time:
//!
//! | char | matches                       |
//! |------|-------------------------------|
//! | `N`  | a digit `0-9`                 |
//! | `A`  | an uppercase letter `A-Z`     |
//! | `a`  | a lowercase letter `a-z`      |
//! | `X`  | an uppercase letter or digit  |
//! | `Z`  | one of `-`, `_`, `@`          |
//!
//! Any other character matches itself literally.

use regex::Regex;

/// Translate a single mask character into its pattern atom
fn atom(c: char) -> String {
    match c {
        'N' => "[0-9]".to_string(),
        'A' => "[A-Z]".to_string(),
        'a' => "[a-z]".to_string(),
        'X' => "[A-Z0-9]".to_string(),
        'Z' => "[-_@]".to_string(),
        other => regex::escape(other.encode_utf8(&mut [0; 4])),
    }
}

/// Build the anchored pattern source for a mask.
///
/// The empty mask yields `^$`, which only accepts the empty string.
pub fn to_pattern(mask: &str) -> String {
    let body: String = mask.chars().map(atom).collect();
    format!("^{}$", body)
}

/// A compiled serial number mask
#[derive(Debug, Clone)]
pub struct SerialMask {
    mask: String,
    regex: Regex,
}

impl SerialMask {
    /// Compile a mask. Every string is a valid mask; the only possible
    /// failure is the regex engine refusing a pattern over its size limit.
    pub fn compile(mask: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&to_pattern(mask))?;
        Ok(Self {
            mask: mask.to_string(),
            regex,
        })
    }

    /// The mask this pattern was compiled from
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// Whole-string match of a candidate serial number
    pub fn is_match(&self, serial_number: &str) -> bool {
        self.regex.is_match(serial_number)
    }
}
