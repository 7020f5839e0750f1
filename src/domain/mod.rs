//! Domain types for nmdose.
//!
//! This module holds the types shared by every layer: validated identifiers,
//! DICOM attribute tags, the error taxonomy and the crate-wide result alias.
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so an AE title can never be passed
//! where a study UID is expected:
//!
//! ```rust
//! use nmdose::domain::{AeTitle, StudyInstanceUid};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let caller = AeTitle::new("RESEARCH_SCU")?;
//! let study = StudyInstanceUid::new("1.2.840.113619.2.55.3")?;
//! # let _ = (caller, study);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, NmdoseError>`]:
//!
//! ```rust
//! use nmdose::domain::{NmdoseError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(NmdoseError::Validation("batch_days must be positive".to_string()))
//! }
//! # assert!(example().is_err());
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod tag;

pub use errors::NmdoseError;
pub use ids::{AeTitle, StudyInstanceUid};
pub use result::Result;
pub use tag::DicomTag;
