use crate::objects::participant::Participant;

pub mod columns;
pub mod filter;
pub mod scroll;


/// Whether each row opens a new start time and should carry the start-time
/// header above it.
pub fn start_boundaries(participants: &[Participant]) -> Vec<bool> {
    participants.iter().enumerate()
        .map(|(ix, p)| ix == 0 || participants[ix - 1].start() != p.start())
        .collect()
}
