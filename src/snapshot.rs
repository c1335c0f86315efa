// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use crate::theatre::UNIVERSE_SIZE;

/// The channel values of every universe for one tick. Once published a
/// snapshot is never written again; the engine recycles the buffer only
/// after every reader has let go of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSnapshot {
    universes: Vec<Vec<u8>>,
}

impl ValueSnapshot {
    pub fn new(n_universes: usize) -> ValueSnapshot {
        ValueSnapshot {
            universes: vec![vec![0; UNIVERSE_SIZE]; n_universes],
        }
    }

    pub fn n_universes(&self) -> usize {
        self.universes.len()
    }

    /// The channel values of a universe. Unknown universes read as empty.
    pub fn universe(&self, universe: usize) -> &[u8] {
        self.universes
            .get(universe)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn universe_mut(&mut self, universe: usize) -> Option<&mut [u8]> {
        self.universes.get_mut(universe).map(Vec::as_mut_slice)
    }

    pub fn channel(&self, universe: usize, channel: usize) -> u8 {
        self.universe(universe).get(channel).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        for universe in self.universes.iter_mut() {
            universe.fill(0);
        }
    }

    /// Makes the snapshot have exactly `n_universes`, keeping the values of
    /// universes that remain.
    pub fn resize(&mut self, n_universes: usize) {
        self.universes.resize_with(n_universes, || vec![0; UNIVERSE_SIZE]);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_snapshot() {
        let mut snapshot = ValueSnapshot::new(2);
        assert_eq!(snapshot.n_universes(), 2);
        assert_eq!(snapshot.universe(1).len(), UNIVERSE_SIZE);
        assert!(snapshot.universe(2).is_empty());

        if let Some(universe) = snapshot.universe_mut(1) {
            universe[10] = 200;
        }
        assert_eq!(snapshot.channel(1, 10), 200);
        assert_eq!(snapshot.channel(5, 10), 0);

        snapshot.clear();
        assert_eq!(snapshot.channel(1, 10), 0);

        snapshot.resize(3);
        assert_eq!(snapshot.n_universes(), 3);
    }
}
