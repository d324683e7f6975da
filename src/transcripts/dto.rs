use serde::Deserialize;

/// Body of `POST /api/transcripts`. Everything is optional at the parse
/// stage so an empty (or unparseable) body reaches the missing-field
/// validation instead of dying on a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTranscriptRequest {
    pub text: Option<String>,
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_parses_with_no_fields() {
        let req: CreateTranscriptRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_none());
        assert!(req.language.is_none());
    }

    #[test]
    fn full_body_parses() {
        let req: CreateTranscriptRequest =
            serde_json::from_str(r#"{"text":"hello world","language":"en"}"#).unwrap();
        assert_eq!(req.text.as_deref(), Some("hello world"));
        assert_eq!(req.language.as_deref(), Some("en"));
    }

    #[test]
    fn null_language_parses_as_none() {
        let req: CreateTranscriptRequest =
            serde_json::from_str(r#"{"text":"hi","language":null}"#).unwrap();
        assert!(req.language.is_none());
    }
}
