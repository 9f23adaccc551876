use thiserror::Error;

use crate::population::GroupId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),
}

/// Reasons a list of groups cannot be turned into a population.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("no participants were given")]
    EmptyPopulation,
    #[error("a participant in group {group} has an empty name")]
    EmptyName { group: GroupId },
    #[error("\"{name}\" appears more than once")]
    DuplicateName { name: String },
}
