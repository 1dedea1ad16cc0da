//! Domain entities for the HIDIRT bridge.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from OS APIs, USB libraries, desktop automation tools
//!   or file formats.
//! - Can be compiled and tested on any platform without a device plugged in.
//!
//! Here the core rule is: *given an IR code, which configured actions fire?*
//! That decision lives in [`dispatch`]; carrying the actions out is the job
//! of the outer layers.

/// Decoded register values: IR codes, device time, signed and byte values.
pub mod ir_code;

/// The user's mapping rules and global settings.
pub mod rules;

/// The rule dispatch engine.
pub mod dispatch;
