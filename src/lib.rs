// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the chat client.
//
// Module responsibilities:
// - `api`: Encapsulates the HTTP interaction with the ShopLite RAG server
//   (one POST /chat endpoint) and the request/reply types.
// - `ui`: Reply rendering plus the one-shot and interactive-loop flows.
//
// Keeping this separation makes the rendering and URL-precedence logic
// testable without a running server.
pub mod api;
pub mod ui;
