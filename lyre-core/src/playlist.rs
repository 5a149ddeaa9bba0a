use std::collections::VecDeque;

use rand::{Rng, seq::SliceRandom};

use crate::library::TrackId;

/// An ordered, finite run of track handles. Owns no track data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayList {
    tracks: VecDeque<TrackId>,
}

impl PlayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn front(&self) -> Option<TrackId> {
        self.tracks.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<TrackId> {
        self.tracks.pop_front()
    }

    pub fn push_front(&mut self, track: TrackId) {
        self.tracks.push_front(track);
    }

    pub fn push_back(&mut self, track: TrackId) {
        self.tracks.push_back(track);
    }

    /// Splice `other` in front of the remaining tracks, keeping its order
    pub fn prepend(&mut self, other: PlayList) {
        for track in other.tracks.into_iter().rev() {
            self.tracks.push_front(track);
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = TrackId> + '_ {
        self.tracks.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<TrackId> {
        self.tracks.iter().copied().collect()
    }

    /// Fisher-Yates shuffle with the thread rng
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tracks.make_contiguous().shuffle(rng);
    }
}

impl FromIterator<TrackId> for PlayList {
    fn from_iter<I: IntoIterator<Item = TrackId>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<TrackId>> for PlayList {
    fn from(tracks: Vec<TrackId>) -> Self {
        Self {
            tracks: tracks.into(),
        }
    }
}

impl IntoIterator for PlayList {
    type Item = TrackId;
    type IntoIter = std::collections::vec_deque::IntoIter<TrackId>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn ids(raw: &[usize]) -> PlayList {
        raw.iter().map(|&i| TrackId(i)).collect()
    }

    #[test]
    fn prepend_keeps_spliced_order() {
        let mut list = ids(&[5, 6]);
        list.prepend(ids(&[1, 2, 3]));
        assert_eq!(list, ids(&[1, 2, 3, 5, 6]));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut list = ids(&(0..40).collect::<Vec<_>>());
        list.shuffle_with(&mut StdRng::seed_from_u64(7));

        let mut sorted = list.to_vec();
        sorted.sort();
        assert_eq!(sorted, (0..40).map(TrackId).collect::<Vec<_>>());
        assert_ne!(list, ids(&(0..40).collect::<Vec<_>>()));
    }

    #[test]
    fn pop_and_push_front() {
        let mut list = ids(&[1, 2]);
        assert_eq!(list.pop_front(), Some(TrackId(1)));
        list.push_front(TrackId(9));
        assert_eq!(list.front(), Some(TrackId(9)));
        assert_eq!(list.len(), 2);
    }
}
