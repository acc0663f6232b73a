//! CLI Exit Code Registry
//!
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success (including a chart the limits rejected)    |
//! | 1    | Runtime error (unreadable file, bad CSV, bad script) |
//! | 2    | Usage error (bad arguments, invalid chart config)  |

/// Success - the view model was printed.
///
/// A chart rejected by the row or bin limits still exits 0: the rejection
/// is a validation result inside the JSON, not a failure.
pub const EXIT_SUCCESS: u8 = 0;

/// Runtime error - input could not be read or parsed.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or a configuration that fails validation.
pub const EXIT_USAGE: u8 = 2;
