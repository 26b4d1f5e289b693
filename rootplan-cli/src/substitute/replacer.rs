use regex::Regex;

use super::flags::{compile_pattern, translate_template};
use crate::core::{ReplaceMode, Result};

/// A compiled search/replace rule
#[derive(Debug, Clone)]
pub enum Substitution {
    /// Exact substring, replaced verbatim
    Literal { search: String, replace: String },

    /// Regular expression; every match is replaced
    Pattern { regex: Regex, template: String },
}

/// Outcome of running a substitution over a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substituted {
    pub output: String,
    pub count: usize,
}

impl Substituted {
    /// True when the output is byte-for-byte the input
    pub fn is_unchanged(&self, input: &str) -> bool {
        self.output == input
    }
}

impl Substitution {
    /// Build a substitution, compiling the pattern in pattern mode
    pub fn new(mode: ReplaceMode, search: &str, replace: &str, flags: Option<&str>) -> Result<Self> {
        match mode {
            ReplaceMode::Literal => Ok(Substitution::Literal {
                search: search.to_string(),
                replace: replace.to_string(),
            }),
            ReplaceMode::Pattern => {
                let regex = compile_pattern(search, flags)?;
                let template = translate_template(replace, &regex);
                Ok(Substitution::Pattern { regex, template })
            }
        }
    }

    /// Apply to `input`, counting every match
    pub fn apply(&self, input: &str) -> Substituted {
        match self {
            Substitution::Literal { search, replace } => {
                // An empty needle would match between every character
                if search.is_empty() {
                    return Substituted {
                        output: input.to_string(),
                        count: 0,
                    };
                }

                Substituted {
                    output: input.replace(search.as_str(), replace),
                    count: input.matches(search.as_str()).count(),
                }
            }
            Substitution::Pattern { regex, template } => Substituted {
                output: regex.replace_all(input, template.as_str()).into_owned(),
                count: regex.find_iter(input).count(),
            },
        }
    }
}
