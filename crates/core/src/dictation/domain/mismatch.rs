use thiserror::Error;

/// Learner input that does not match the next expected token.
///
/// `Display` is the inline message shown next to the input field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    #[error("Wrong letter: \"{typed}\" is not how the next word starts. Try again.")]
    WrongLetter { typed: String },
    #[error("Wrong word: \"{typed}\". Try again.")]
    WrongWord { typed: String },
}

impl Mismatch {
    pub fn typed(&self) -> &str {
        match self {
            Mismatch::WrongLetter { typed } | Mismatch::WrongWord { typed } => typed,
        }
    }
}
