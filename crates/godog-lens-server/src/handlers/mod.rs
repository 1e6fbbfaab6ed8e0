//! LSP request and notification handlers.
//!
//! Handlers take the shared [`ServerState`](crate::server::ServerState)
//! mutably and run to completion on the single-threaded main loop.

mod code_lens;
mod commands;
mod lifecycle;
mod text_document;
pub mod util;
mod workspace;

pub use code_lens::handle_code_lens;
pub use commands::{
    COMMANDS, DETECT_LINKS, RESOLVE_REFERENCE, RUN_FEATURE, RUN_SCENARIO, RUN_TESTS, TEST_TREE,
    handle_execute_command,
};
pub use lifecycle::{SERVER_NAME, handle_initialise, handle_initialised, handle_shutdown};
pub use text_document::{
    handle_did_change_text_document, handle_did_close_text_document,
    handle_did_open_text_document, handle_did_save_text_document,
};
pub use workspace::{handle_did_change_configuration, handle_did_change_watched_files};
