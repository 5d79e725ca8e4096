//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success, no differences                              |
//! | 1    | Comparison ran and found differences                 |
//! | 2    | CLI usage error (bad args)                           |
//! | 3    | Input file cannot be read or decoded                 |
//! | 4    | Input does not have the expected layout              |
//! | 5    | Identity columns missing on both sides               |
//! | 6    | Invalid run config                                   |
//! | 7    | Output file cannot be written                        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - comparison completed and both sides agree.
pub const EXIT_SUCCESS: u8 = 0;

/// Differences found (changed values, or keys present on one side only).
/// Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_DIFFERENCES: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap exits with this code on its own parse failures.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing, unreadable, or not a spreadsheet/CSV we can decode.
pub const EXIT_INPUT: u8 = 3;

/// Closing export without the four-row header region, or identity columns
/// absent from the reconstructed header.
pub const EXIT_MALFORMED: u8 = 4;

/// Neither side has the required identity columns; nothing was written.
pub const EXIT_MISSING_COLUMNS: u8 = 5;

/// Run config cannot be parsed or fails validation.
pub const EXIT_INVALID_CONFIG: u8 = 6;

/// Cleaned tables, report, or JSON dump cannot be written.
pub const EXIT_OUTPUT: u8 = 7;
