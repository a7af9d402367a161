//! Exit status codes for the mbackup binary.
//!
//! `perform` maps its aggregated run outcome onto the first four values; the
//! rest follow the [SYSEXITS](https://man.freebsd.org/cgi/man.cgi?query=sysexits&apropos=0&sektion=0&manpath=FreeBSD+11.2-stable&arch=default&format=html)
//! convention.

/// value: 0 <br>
/// Every performed model finished without warnings or errors.
pub const EX_OK: i32 = 0;

/// value: 1 <br>
/// At least one model logged a warning and none logged an error.
/// Also used when `check` fails.
pub const EX_WARNINGS: i32 = 1;

/// value: 2 <br>
/// At least one model logged an error.
pub const EX_ERRORS: i32 = 2;

/// value: 3 <br>
/// The run was aborted before any model was performed: the configuration
/// could not be loaded or no model matched the given triggers.
pub const EX_PREPARE: i32 = 3;

/// value: 64 <br>
/// The command was used incorrectly, e.g., with the wrong number of arguments, a bad flag, a bad syntax in a parameter, etc.
pub const EX_USAGE: i32 = 64;
