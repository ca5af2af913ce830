//! Integration tests for Engine logging
//!
//! These tests install a capturing logger, so they run serially.
//!
//! Run with: cargo test --test logging_integration_tests

use retained_3d_engine::retained3d::log::{LogEntry, LogSeverity, Logger};
use retained_3d_engine::retained3d::render::RendererConfig;
use retained_3d_engine::retained3d::resource::ShadingQuality;
use retained_3d_engine::retained3d::{Engine, Error, Frame, Mesh, Viewport};
use retained_3d_engine_renderer_software::SoftwareRenderer;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Engine::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());
    Engine::log(LogSeverity::Error, "test::module", "Test error message".to_string());

    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 3);

    assert_eq!(captured_entries[0].severity, LogSeverity::Info);
    assert_eq!(captured_entries[0].source, "test::module");
    assert_eq!(captured_entries[0].message, "Test info message");

    assert_eq!(captured_entries[1].severity, LogSeverity::Warn);
    assert_eq!(captured_entries[1].source, "test::module");
    assert_eq!(captured_entries[1].message, "Test warning message");

    assert_eq!(captured_entries[2].severity, LogSeverity::Error);
    assert_eq!(captured_entries[2].source, "test::module");
    assert_eq!(captured_entries[2].message, "Test error message");

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    // Log error with file and line information
    Engine::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    // Verify log was captured with location
    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 1);

    let entry = &captured_entries[0];
    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.source, "test::error");
    assert_eq!(entry.message, "Critical error occurred");
    assert_eq!(entry.file, Some("test_file.rs"));
    assert_eq!(entry.line, Some(42));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    // Log a message
    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());

    // Verify log was captured
    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
    }

    // Reset to default logger
    Engine::reset_logger();

    // Log another message (will go to default logger, not captured)
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    // Verify no new logs in test logger
    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1); // Still only one message
}

#[test]
#[serial]
fn test_integration_logging_different_severities() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    // Log messages with all severity levels
    Engine::log(LogSeverity::Trace, "test", "Trace message".to_string());
    Engine::log(LogSeverity::Debug, "test", "Debug message".to_string());
    Engine::log(LogSeverity::Info, "test", "Info message".to_string());
    Engine::log(LogSeverity::Warn, "test", "Warn message".to_string());
    Engine::log(LogSeverity::Error, "test", "Error message".to_string());

    // Verify all severities were captured
    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 5);

    assert_eq!(captured_entries[0].severity, LogSeverity::Trace);
    assert_eq!(captured_entries[1].severity, LogSeverity::Debug);
    assert_eq!(captured_entries[2].severity, LogSeverity::Info);
    assert_eq!(captured_entries[3].severity, LogSeverity::Warn);
    assert_eq!(captured_entries[4].severity, LogSeverity::Error);

    Engine::reset_logger();
}

// ============================================================================
// ENGINE DIAGNOSTICS
// ============================================================================

fn viewport() -> Viewport {
    let renderer = SoftwareRenderer::new(&RendererConfig { width: 32, height: 32, ..Default::default() }).unwrap();
    Viewport::new(Box::new(renderer), 32, 32).unwrap()
}

#[test]
#[serial]
fn test_integration_invalid_params_are_logged_as_warnings() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let mut viewport = viewport();
    let result = viewport.render(&Frame::new());
    assert!(matches!(result, Err(Error::InvalidParams(_))));

    let captured = entries.lock().unwrap();
    let warning = captured
        .iter()
        .find(|e| e.source == "retained3d::Viewport")
        .expect("viewport warning");
    assert_eq!(warning.severity, LogSeverity::Warn);
    assert!(warning.message.contains("camera"));
    drop(captured);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_backend_errors_carry_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    // A camera but no rendered scene yet
    let mut viewport = viewport();
    viewport.set_camera(Some(Frame::new()));
    assert!(matches!(viewport.pick(16.0, 16.0), Err(Error::BackendError(_))));

    let captured = entries.lock().unwrap();
    let error = captured
        .iter()
        .find(|e| e.severity == LogSeverity::Error)
        .expect("error entry");
    assert!(error.file.is_some());
    assert!(error.line.is_some());
    drop(captured);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_unsupported_quality_reported_once() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let mesh = Mesh::new();
    let a = mesh.add_group(3, 1, 3, &[0, 1, 2]).unwrap();
    let b = mesh.add_group(3, 1, 3, &[0, 1, 2]).unwrap();
    mesh.set_group_quality(a, ShadingQuality::Wireframe).unwrap();
    mesh.set_group_quality(b, ShadingQuality::Wireframe).unwrap();

    let captured = entries.lock().unwrap();
    let reports = captured
        .iter()
        .filter(|e| e.severity == LogSeverity::Warn && e.message.to_lowercase().contains("wireframe"))
        .count();
    assert!(reports <= 1, "reported {} times", reports);
    drop(captured);

    Engine::reset_logger();
}
