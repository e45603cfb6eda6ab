//! End-to-end tests for fedbridge live in `tests/`.
