/// Float comparison for tests, tolerant of accumulated frame time.
pub fn assert_close(actual: f32, expected: f32, message: &str) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "{message}: expected {expected}, got {actual}"
    );
}
