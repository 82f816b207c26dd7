//! Static keyword sensitivity classifier.

use assent_application::SensitivityClassifier;

/// Phrases that indicate a question about the user's own profile data.
static SENSITIVE_KEYWORDS: &[&str] = &[
    "my name",
    "my email",
    "who am i",
    "about me",
    "my profile",
    "my info",
    "my details",
    "tell me about myself",
    "what do you know about me",
];

/// Keyword-list implementation of the sensitivity classifier port.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSensitivityClassifier;

impl KeywordSensitivityClassifier {
    /// Creates the classifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SensitivityClassifier for KeywordSensitivityClassifier {
    fn requires_approval(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        SENSITIVE_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
    }
}

#[cfg(test)]
mod tests {
    use assent_application::SensitivityClassifier;

    use super::KeywordSensitivityClassifier;

    #[test]
    fn personal_questions_require_approval() {
        let classifier = KeywordSensitivityClassifier::new();
        assert!(classifier.requires_approval("What is MY NAME?"));
        assert!(classifier.requires_approval("tell me about myself"));
        assert!(classifier.requires_approval("who am i?"));
    }

    #[test]
    fn general_questions_do_not() {
        let classifier = KeywordSensitivityClassifier::new();
        assert!(!classifier.requires_approval("What is the capital of France?"));
        assert!(!classifier.requires_approval("how does polling work"));
    }
}
