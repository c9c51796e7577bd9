//! Graph configuration options.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    pub multigraph: bool,
    pub compound: bool,
    pub directed: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            multigraph: false,
            compound: false,
            directed: true,
        }
    }
}

impl GraphOptions {
    pub fn directed() -> Self {
        Self::default()
    }

    pub fn undirected() -> Self {
        Self {
            directed: false,
            ..Self::default()
        }
    }

    pub fn multigraph(mut self) -> Self {
        self.multigraph = true;
        self
    }

    pub fn compound(mut self) -> Self {
        self.compound = true;
        self
    }
}
