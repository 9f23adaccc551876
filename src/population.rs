use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

use log::{debug, info};

use crate::error::{Error, InputError};

/// Position of a participant within its [`Population`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ParticipantId(pub usize);

/// Group number, handed out sequentially in input order starting from zero.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GroupId(pub usize);

impl Display for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    name: String,
    group: GroupId,
    /// Participants this one may still give to. Each id appears at most once.
    eligible: Vec<ParticipantId>,
}

impl Participant {
    fn new(name: String, group: GroupId) -> Self {
        Participant {
            name,
            group,
            eligible: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn eligible(&self) -> &[ParticipantId] {
        &self.eligible
    }

    /// Drop `target` from the eligibility set. Returns whether it was present.
    pub(crate) fn remove_eligible(&mut self, target: ParticipantId) -> bool {
        match self.eligible.iter().position(|&id| id == target) {
            Some(pos) => {
                self.eligible.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Every participant of a draw. Membership is fixed once built; only the
/// eligibility sets of the participants shrink while matching.
#[derive(Debug, Clone)]
pub struct Population {
    participants: Vec<Participant>,
}

impl Population {
    /// Build participants from group-partitioned names and give each one
    /// the set of everyone outside their own group.
    ///
    /// Names are trimmed, and must then be non-empty and unique across all
    /// groups. Groups may be empty; they still consume a group id.
    pub fn build<S: AsRef<str>>(groups: &[Vec<S>]) -> Result<Self, Error> {
        let mut participants = Vec::new();
        let mut seen = HashSet::new();

        for (index, group) in groups.iter().enumerate() {
            let group_id = GroupId(index);
            for name in group {
                let name = name.as_ref().trim();
                if name.is_empty() {
                    return Err(InputError::EmptyName { group: group_id }.into());
                }
                if !seen.insert(name) {
                    return Err(InputError::DuplicateName {
                        name: name.to_string(),
                    }
                    .into());
                }
                participants.push(Participant::new(name.to_string(), group_id));
            }
        }

        if participants.is_empty() {
            return Err(InputError::EmptyPopulation.into());
        }

        // Plain pairwise scan; populations are tens of people at most.
        for i in 0..participants.len() {
            let group = participants[i].group;
            let eligible: Vec<ParticipantId> = participants
                .iter()
                .enumerate()
                .filter(|(_, other)| other.group != group)
                .map(|(j, _)| ParticipantId(j))
                .collect();
            debug!(
                "{} may give to {} participant(s)",
                participants[i].name,
                eligible.len()
            );
            participants[i].eligible = eligible;
        }

        info!(
            "Built population of {} participant(s) in {} group(s)",
            participants.len(),
            groups.len()
        );
        Ok(Population { participants })
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> {
        (0..self.participants.len()).map(ParticipantId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Group of the participant called `name`, if there is one.
    pub fn group_of(&self, name: &str) -> Option<GroupId> {
        self.participants
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.group)
    }
}

impl Index<ParticipantId> for Population {
    type Output = Participant;

    fn index(&self, id: ParticipantId) -> &Participant {
        &self.participants[id.0]
    }
}

impl IndexMut<ParticipantId> for Population {
    fn index_mut(&mut self, id: ParticipantId) -> &mut Participant {
        &mut self.participants[id.0]
    }
}
