//! Friend relationships.
//!
//! The relationship between two users is never stored: it is derived from the
//! presence of the two directed `friend_requests` edges between them.
//!
//! | `(me, them)` | `(them, me)` | status |
//! |---|---|---|
//! | no | no | [`FriendStatus::None`] |
//! | yes | no | [`FriendStatus::RequestedByMe`] |
//! | no | yes | [`FriendStatus::RequestedOfMe`] |
//! | yes | yes | [`FriendStatus::Mutual`] |

use serde::{Deserialize, Serialize};

pub use controller::FriendController;
pub use operations::{AddEdge, RemoveEdge};
pub use repository::FriendRepository;

mod controller;
mod operations;
mod repository;

/// Relationship of a candidate user as seen from a subject user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    None,
    /// The subject asked the candidate ("subscription").
    RequestedByMe,
    /// The candidate asked the subject ("subscriber").
    RequestedOfMe,
    /// Both asked each other ("friend").
    Mutual,
    /// The candidate is the subject.
    #[serde(rename = "self")]
    SelfUser,
}

impl FriendStatus {
    /// Derives the status from the two edges between subject and candidate.
    pub fn from_edges(outgoing: bool, incoming: bool) -> Self {
        match (outgoing, incoming) {
            (true, true) => Self::Mutual,
            (true, false) => Self::RequestedByMe,
            (false, true) => Self::RequestedOfMe,
            (false, false) => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RequestedByMe => "requested_by_me",
            Self::RequestedOfMe => "requested_of_me",
            Self::Mutual => "mutual",
            Self::SelfUser => "self",
        }
    }
}

impl core::fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
