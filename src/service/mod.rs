pub mod evaluation;
pub mod llm;
pub mod policy;
pub mod reply;
pub mod stimulus;

pub use evaluation::{CaptureEvaluator, EvaluationError};
pub use llm::{ModelGateway, OpenAiCompatibleGateway};
pub use policy::{GenerationError, PolicyGenerator};
pub use stimulus::{StimulusClient, StimulusError};

/// Render an error with its whole `source()` chain, joined by `": "`
///
/// Transport errors keep the useful part (`Connection refused`, DNS
/// failures) in their sources rather than in their own message.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("tcp connect error")]
    struct Inner(#[source] std::io::Error);

    #[test]
    fn test_error_chain_joins_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let err = Outer(Inner(io));
        assert_eq!(
            error_chain(&err),
            "error sending request: tcp connect error: Connection refused"
        );
    }

    #[test]
    fn test_error_chain_without_sources() {
        let err = std::io::Error::other("plain failure");
        assert_eq!(error_chain(&err), "plain failure");
    }
}
