use super::error::ChatError;
use super::logging;

#[test]
fn logging_init_accepts_levels() {
    // Should not panic
    logging::init("info");
    logging::init("debug");
    logging::init("warn");
}

#[test]
fn test_parse_level() {
    assert_eq!(logging::parse_level("error"), tracing::Level::ERROR);
    assert_eq!(logging::parse_level("Warning"), tracing::Level::WARN);
    assert_eq!(logging::parse_level(" debug "), tracing::Level::DEBUG);
    assert_eq!(logging::parse_level("trace"), tracing::Level::TRACE);
    assert_eq!(logging::parse_level("nonsense"), tracing::Level::INFO);
}

#[test]
fn test_rejections_are_request_scoped() {
    assert!(ChatError::validation("empty user").is_rejection());
    assert!(ChatError::CapacityExceeded { max: 3 }.is_rejection());
    assert!(ChatError::Protocol("bad frame".into()).is_rejection());
    assert!(!ChatError::TransportDisconnect.is_rejection());
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ChatError::CapacityExceeded { max: 2 }.to_string(),
        "message store is full (max 2 messages)"
    );
    assert_eq!(
        ChatError::validation("content must not be empty").to_string(),
        "validation failed: content must not be empty"
    );
}

#[test]
fn test_overflow_message_names_listener_once() {
    let id = crate::hub::ListenerId::new();
    let text = ChatError::ListenerOverflow(id).to_string();
    assert_eq!(text, format!("{id} overflowed its delivery queue"));
    assert_eq!(text.matches("listener").count(), 1);
}
