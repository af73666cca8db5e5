use thiserror::Error;

// Advisory substring denylist, easy to evade. Scanned in order, first hit is reported
pub const FORBIDDEN_KEYWORDS: [&str; 7] = [
    "import os",
    "import sys",
    "import subprocess",
    "__import__",
    "eval(",
    "exec(",
    "open(",
];

pub const MAX_CODE_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCode {
    #[error("Forbidden keyword or operation: {0}")]
    ForbiddenKeyword(&'static str),

    #[error("Code length exceeds maximum limit of {max} characters")]
    TooLong { len: usize, max: usize },
}

#[derive(Debug, Clone)]
pub struct CodeValidator {
    forbidden: &'static [&'static str],
    max_len: usize,
}

impl Default for CodeValidator {
    fn default() -> Self {
        Self {
            forbidden: &FORBIDDEN_KEYWORDS,
            max_len: MAX_CODE_LEN,
        }
    }
}

impl CodeValidator {
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            ..Self::default()
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    // keyword scan first, so oversized code with a keyword reports the keyword
    pub fn validate(&self, code: &str) -> Result<(), InvalidCode> {
        if let Some(keyword) = self.forbidden.iter().find(|kw| code.contains(**kw)) {
            return Err(InvalidCode::ForbiddenKeyword(*keyword));
        }

        let len = code.chars().count();
        if len > self.max_len {
            return Err(InvalidCode::TooLong {
                len,
                max: self.max_len,
            });
        }

        Ok(())
    }
}

pub fn validate(code: &str) -> Result<(), InvalidCode> {
    CodeValidator::default().validate(code)
}
