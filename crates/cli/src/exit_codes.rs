//! CLI Exit Code Registry
//!
//! Single source of truth for `patterncmp` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | Unexpected error (parse, IO, duplicate sample)  |
//! | 2    | CLI usage error (bad args)                      |
//! | 3    | Input file not found                            |
//! | 4    | Required column missing                         |
//! | 5    | No overlapping (Phi, Theta) samples             |
//! | 6    | Invalid config file                             |
//! | 7    | Viewer could not drive the terminal             |

use patterncmp_compare::ErrorKind;

/// Success - comparison computed (and viewer closed, if shown).
pub const EXIT_SUCCESS: u8 = 0;

/// Unexpected error - load/parse/compute failure not covered below.
pub const EXIT_ERROR: u8 = 1;

// 2 (usage) is emitted by clap itself before any command code runs.

/// One or both input paths do not exist.
pub const EXIT_FILE_NOT_FOUND: u8 = 3;

/// A source lacks a required column.
pub const EXIT_MISSING_COLUMN: u8 = 4;

/// The join on (Phi, Theta) produced zero rows.
pub const EXIT_NO_OVERLAP: u8 = 5;

/// Config file unreadable or invalid.
pub const EXIT_INVALID_CONFIG: u8 = 6;

/// Terminal setup, draw or event failure in the viewer.
pub const EXIT_VIEWER: u8 = 7;

/// Map an engine error class to its exit code.
pub fn compare_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::InvalidConfig => EXIT_INVALID_CONFIG,
        ErrorKind::FileNotFound => EXIT_FILE_NOT_FOUND,
        ErrorKind::MissingColumn => EXIT_MISSING_COLUMN,
        ErrorKind::NoOverlap => EXIT_NO_OVERLAP,
        ErrorKind::Unexpected => EXIT_ERROR,
    }
}
