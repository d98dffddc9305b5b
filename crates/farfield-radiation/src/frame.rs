//! Particle frames and their traversal.
//!
//! Particles of one super-cell live in fixed-capacity *frames* that form a
//! singly linked chain. New particles are appended to the most recent frame;
//! only that frame may be partially filled. The radiation kernel walks the
//! chain from the most recent frame back to the first one.

use std::collections::HashMap;
use std::iter::FusedIterator;

use crate::mapping::SuperCellIdx;
use crate::particle::Particle;

/// Read-only access to super-cell-indexed particle frames.
pub trait FrameSource: Sync {
    /// Handle identifying one frame.
    type Handle: Copy;

    /// Slots per frame.
    fn frame_capacity(&self) -> usize;

    /// Most recent frame of a super-cell and the number of occupied slots in
    /// it. Empty and unknown super-cells have no frame.
    fn last_frame(&self, super_cell: SuperCellIdx) -> Option<(Self::Handle, usize)>;

    /// Frame appended before `frame`, if any.
    fn previous_frame(&self, frame: Self::Handle) -> Option<Self::Handle>;

    /// All slots of a frame (length = frame capacity).
    fn particles(&self, frame: Self::Handle) -> &[Particle];

    /// Frames of a super-cell, most recent first.
    fn frames(&self, super_cell: SuperCellIdx) -> FrameStream<'_, Self>
    where
        Self: Sized,
    {
        FrameStream::new(self, super_cell)
    }
}

/// One frame yielded by a [`FrameStream`].
#[derive(Debug, Clone, Copy)]
pub struct FrameBatch<'a> {
    /// All slots of the frame.
    pub particles: &'a [Particle],
    /// Number of slots holding real particles.
    pub occupancy: usize,
}

impl<'a> FrameBatch<'a> {
    /// Particle in `slot`, if the slot is occupied.
    #[inline]
    pub fn particle(&self, slot: usize) -> Option<&'a Particle> {
        if slot < self.occupancy {
            self.particles.get(slot)
        } else {
            None
        }
    }
}

enum Cursor<H> {
    /// Nothing fetched yet.
    Start(SuperCellIdx),
    /// Next frame to yield and its occupancy.
    At(H, usize),
    /// Terminal sentinel.
    Invalid,
}

/// Finite, non-restartable walk over a super-cell's frames, most recent first.
///
/// The first batch reports the occupancy of the last frame; every batch after
/// it is full. Once the chain ends the stream stays in its invalid state.
pub struct FrameStream<'a, S: FrameSource> {
    source: &'a S,
    cursor: Cursor<S::Handle>,
}

impl<'a, S: FrameSource> FrameStream<'a, S> {
    /// Start a walk over the frames of `super_cell`.
    pub fn new(source: &'a S, super_cell: SuperCellIdx) -> Self {
        Self {
            source,
            cursor: Cursor::Start(super_cell),
        }
    }

    /// True once the terminal sentinel has been reached.
    pub fn is_invalid(&self) -> bool {
        matches!(self.cursor, Cursor::Invalid)
    }
}

impl<'a, S: FrameSource> Iterator for FrameStream<'a, S> {
    type Item = FrameBatch<'a>;

    fn next(&mut self) -> Option<FrameBatch<'a>> {
        let (frame, occupancy) = match self.cursor {
            Cursor::Start(super_cell) => match self.source.last_frame(super_cell) {
                Some(first) => first,
                None => {
                    self.cursor = Cursor::Invalid;
                    return None;
                }
            },
            Cursor::At(frame, occupancy) => (frame, occupancy),
            Cursor::Invalid => return None,
        };

        self.cursor = match self.source.previous_frame(frame) {
            Some(prev) => Cursor::At(prev, self.source.frame_capacity()),
            None => Cursor::Invalid,
        };

        Some(FrameBatch {
            particles: self.source.particles(frame),
            occupancy,
        })
    }
}

impl<'a, S: FrameSource> FusedIterator for FrameStream<'a, S> {}

/// Index of a frame in a [`ParticleStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

#[derive(Debug, Clone)]
struct Frame {
    particles: Vec<Particle>,
    prev: Option<FrameId>,
}

#[derive(Debug, Clone, Copy)]
struct ChainHead {
    last: FrameId,
    occupancy: usize,
}

/// Arena-backed frame storage.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    capacity: usize,
    frames: Vec<Frame>,
    heads: HashMap<SuperCellIdx, ChainHead>,
}

impl ParticleStore {
    /// Create an empty store with `capacity` slots per frame.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            frames: Vec::new(),
            heads: HashMap::new(),
        }
    }

    /// Append a particle to a super-cell.
    ///
    /// Fills the most recent frame; a full frame gets a new successor that
    /// links back to it.
    pub fn insert(&mut self, super_cell: SuperCellIdx, particle: Particle) {
        let head = match self.heads.get(&super_cell) {
            Some(head) if head.occupancy < self.capacity => *head,
            other => {
                let prev = other.map(|h| h.last);
                let id = FrameId(self.frames.len() as u32);
                self.frames.push(Frame {
                    particles: vec![Particle::default(); self.capacity],
                    prev,
                });
                ChainHead {
                    last: id,
                    occupancy: 0,
                }
            }
        };

        self.frames[head.last.0 as usize].particles[head.occupancy] = particle;
        self.heads.insert(
            super_cell,
            ChainHead {
                last: head.last,
                occupancy: head.occupancy + 1,
            },
        );
    }

    /// Append several particles to a super-cell.
    pub fn extend<I>(&mut self, super_cell: SuperCellIdx, particles: I)
    where
        I: IntoIterator<Item = Particle>,
    {
        for particle in particles {
            self.insert(super_cell, particle);
        }
    }

    /// Number of frames in the store.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of particles in a super-cell.
    pub fn particle_count(&self, super_cell: SuperCellIdx) -> usize {
        self.frames(super_cell).map(|b| b.occupancy).sum()
    }

    /// Remove all particles.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.heads.clear();
    }
}

impl FrameSource for ParticleStore {
    type Handle = FrameId;

    fn frame_capacity(&self) -> usize {
        self.capacity
    }

    fn last_frame(&self, super_cell: SuperCellIdx) -> Option<(FrameId, usize)> {
        self.heads
            .get(&super_cell)
            .map(|head| (head.last, head.occupancy))
    }

    fn previous_frame(&self, frame: FrameId) -> Option<FrameId> {
        self.frames.get(frame.0 as usize).and_then(|f| f.prev)
    }

    fn particles(&self, frame: FrameId) -> &[Particle] {
        &self.frames[frame.0 as usize].particles
    }
}
