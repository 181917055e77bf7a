//! Double-buffered surface pair.

/// Two owned surfaces and a selector saying which one is the front.
///
/// Passes sample `read()` and render into the back surface, then `swap()`;
/// a pass never targets the surface it samples.
#[derive(Debug, Clone)]
pub struct PingPong<S> {
    surfaces: [S; 2],
    front: usize,
}

impl<S> PingPong<S> {
    pub fn new(first: S, second: S) -> Self {
        Self {
            surfaces: [first, second],
            front: 0,
        }
    }

    /// The surface most recently written.
    pub fn read(&self) -> &S {
        &self.surfaces[self.front]
    }

    pub fn write(&self) -> &S {
        &self.surfaces[1 - self.front]
    }

    pub fn write_mut(&mut self) -> &mut S {
        &mut self.surfaces[1 - self.front]
    }

    /// Front for sampling and back for rendering, borrowed together.
    pub fn split_mut(&mut self) -> (&S, &mut S) {
        let [first, second] = &mut self.surfaces;
        if self.front == 0 {
            (&*first, second)
        } else {
            (&*second, first)
        }
    }

    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }

    /// Index of the current front surface, 0 or 1.
    pub fn front_index(&self) -> usize {
        self.front
    }
}
