use crate::hough::RawLine;

/// Merged detection handed to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCandidate {
    pub offset: f32,
    pub angle: f32,
    /// Number of raw detections merged into this candidate.
    pub support: u32,
}

/// Partition raw lines into clusters: two lines share a cluster iff their
/// offsets differ by less than `distance`, closed transitively. Each cluster
/// collapses to the mean of its members; clusters come out ordered by their
/// first member, which keeps downstream tie breaks deterministic.
pub fn cluster_lines(lines: &[RawLine], distance: f32) -> Vec<LineCandidate> {
    let mut sets = DisjointSets::new(lines.len());
    for i in 0..lines.len() {
        for j in i + 1..lines.len() {
            if (lines[i].offset - lines[j].offset).abs() < distance {
                sets.union(i, j);
            }
        }
    }
    let mut slot = vec![usize::MAX; lines.len()];
    let mut sums: Vec<(f32, f32, u32)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let root = sets.find(i);
        if slot[root] == usize::MAX {
            slot[root] = sums.len();
            sums.push((0.0, 0.0, 0));
        }
        let acc = &mut sums[slot[root]];
        acc.0 += line.offset;
        acc.1 += line.angle;
        acc.2 += 1;
    }
    sums.iter()
        .map(|&(offset, angle, n)| LineCandidate {
            offset: offset / n as f32,
            angle: angle / n as f32,
            support: n,
        })
        .collect()
}

/// Disjoint-set forest with union by rank and path compression.
struct DisjointSets {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i as u32;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = i as u32;
        while cur != root {
            let up = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = up;
        }
        root as usize
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let (hi, lo) = if self.rank[ra] >= self.rank[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[lo] = hi as u32;
        if self.rank[ra] == self.rank[rb] {
            self.rank[hi] += 1;
        }
    }
}
