// Library root
// -----------
// This crate exposes a small library surface for the smoke-test
// binary (`main.rs`).
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the SmartClinic
//   backend (register, login, multipart file upload) and the wire
//   types those endpoints speak.
// - `runner`: Implements the linear smoke sequence on top of `api`
//   and decides which failures are tolerated.
//
// Keeping this separation makes it possible to point the API client
// at a mock server in tests without dragging the orchestration along.
pub mod api;
pub mod runner;
