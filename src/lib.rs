//! Random gift-exchange draws. Every participant gives to exactly one other
//! participant and receives from exactly one, never within their own group.
//!
//! ```
//! use pairing_tool::{matcher, Population};
//!
//! let population = Population::build(&[vec!["A"], vec!["B"]]).unwrap();
//! let matching = matcher::assign_seeded(population, 1);
//! assert!(matching.is_success());
//! assert_eq!(matching.assignment.giver_for("A"), Some("B"));
//! ```

pub mod error;
pub mod input;
pub mod matcher;
pub mod population;

pub use error::{Error, InputError};
pub use matcher::{Assignment, Matching, Outcome};
pub use population::{GroupId, Participant, ParticipantId, Population};
