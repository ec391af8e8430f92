use serde::{Deserialize, Serialize};

/// Which signature variant the letter currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureMode {
    #[default]
    Typed,
    Drawn,
    Uploaded,
}

/// A cover-letter signature.
///
/// All three slots are stored side by side; `mode` picks the one that is
/// rendered. Switching modes leaves the inactive slots untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signature {
    pub mode: SignatureMode,
    pub typed_text: String,
    /// `data:image/png;base64,...` produced by the signature pad.
    pub drawn_image: Option<String>,
    /// Public URL of an uploaded signature image.
    pub uploaded_url: Option<String>,
}

/// The one signature variant that is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSignature<'a> {
    Typed(&'a str),
    Image(&'a str),
    Empty,
}

impl Signature {
    pub fn set_mode(&mut self, mode: SignatureMode) {
        self.mode = mode;
    }

    pub fn active(&self) -> ActiveSignature<'_> {
        match self.mode {
            SignatureMode::Typed if !self.typed_text.trim().is_empty() => {
                ActiveSignature::Typed(self.typed_text.trim())
            }
            SignatureMode::Drawn => match self.drawn_image.as_deref() {
                Some(src) if !src.is_empty() => ActiveSignature::Image(src),
                _ => ActiveSignature::Empty,
            },
            SignatureMode::Uploaded => match self.uploaded_url.as_deref() {
                Some(src) if !src.is_empty() => ActiveSignature::Image(src),
                _ => ActiveSignature::Empty,
            },
            SignatureMode::Typed => ActiveSignature::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Signature {
        Signature {
            mode: SignatureMode::Typed,
            typed_text: "Ada Lovelace".to_string(),
            drawn_image: Some("data:image/png;base64,AAAA".to_string()),
            uploaded_url: Some("https://cdn.example.com/sig.png".to_string()),
        }
    }

    #[test]
    fn test_active_follows_mode() {
        let mut sig = filled();
        assert_eq!(sig.active(), ActiveSignature::Typed("Ada Lovelace"));
        sig.set_mode(SignatureMode::Drawn);
        assert_eq!(sig.active(), ActiveSignature::Image("data:image/png;base64,AAAA"));
        sig.set_mode(SignatureMode::Uploaded);
        assert_eq!(
            sig.active(),
            ActiveSignature::Image("https://cdn.example.com/sig.png")
        );
    }

    #[test]
    fn test_switching_mode_keeps_inactive_slots() {
        let mut sig = filled();
        sig.set_mode(SignatureMode::Uploaded);
        sig.set_mode(SignatureMode::Typed);
        assert_eq!(sig.typed_text, "Ada Lovelace");
        assert!(sig.drawn_image.is_some());
        assert!(sig.uploaded_url.is_some());
    }

    #[test]
    fn test_empty_active_slot_is_empty() {
        let sig = Signature {
            mode: SignatureMode::Drawn,
            typed_text: "still here".to_string(),
            ..Signature::default()
        };
        assert_eq!(sig.active(), ActiveSignature::Empty);
    }
}
