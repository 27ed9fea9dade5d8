use custom_debug_derive::Debug;

use super::{Colour, GraphError, SparseGraph, VertexIndex, DEFAULT_COLOR};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GraphState {
    IndexOrdered,
    Chaos,
}

/// Fixed size, mutable graph used while reading input.
/// Turned into a [`SparseGraph`] before anything is computed on it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Graph {
    pub vertices: Vec<Vertex>,
    size: usize,
    edge_number: usize,
    #[debug(skip)]
    pub state: GraphState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    pub index: VertexIndex,
    pub edges_to: Vec<VertexIndex>,
    pub colour: Colour,
}

impl Graph {
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of arcs, i.e. each undirected edge counts twice
    /// and each self-loop once.
    pub fn number_arcs(&self) -> usize {
        self.edge_number
    }

    pub fn new_ordered(n: usize) -> Self {
        let mut vertices = Vec::with_capacity(n);
        for index in 0..n {
            vertices.push(Vertex::new(index, DEFAULT_COLOR));
        }
        Graph {
            vertices,
            size: n,
            edge_number: 0,
            state: GraphState::IndexOrdered,
        }
    }

    fn get_vertex(&self, index: VertexIndex) -> Result<&Vertex, GraphError> {
        match self.state {
            GraphState::IndexOrdered => self.vertices.get(index),
            GraphState::Chaos => self.vertices.iter().find(|vertex| vertex.index == index),
        }
        .ok_or_else(|| out_of_range(index, self.size))
    }

    fn get_vertex_mut(&mut self, index: VertexIndex) -> Result<&mut Vertex, GraphError> {
        let size = self.size;
        match self.state {
            GraphState::IndexOrdered => self.vertices.get_mut(index),
            GraphState::Chaos => self
                .vertices
                .iter_mut()
                .find(|vertex| vertex.index == index),
        }
        .ok_or_else(|| out_of_range(index, size))
    }

    pub fn add_arc(&mut self, start: VertexIndex, end: VertexIndex) -> Result<(), GraphError> {
        if end >= self.size {
            return Err(out_of_range(end, self.size));
        }
        self.get_vertex_mut(start)?.add_edge(end);
        self.edge_number += 1;
        Ok(())
    }

    /// Adds the undirected edge `start -- end`. A self-loop is stored once.
    pub fn add_edge(&mut self, start: VertexIndex, end: VertexIndex) -> Result<(), GraphError> {
        self.add_arc(start, end)?;
        if start != end {
            self.add_arc(end, start)?;
        }
        Ok(())
    }

    /// Remove unneccessary edges.
    /// Does so by first sorting, thus trading runtime for reduced memory footprint.
    pub fn minimize(&mut self) {
        let mut edge_number = 0;
        for vertex in self.vertices.iter_mut() {
            vertex.edges_to.sort_unstable();
            vertex.edges_to.dedup();
            edge_number += vertex.edges_to.len();
        }
        self.edge_number = edge_number;
    }

    pub fn set_colours(&mut self, colours: &[Colour]) -> Result<(), GraphError> {
        for (index, colour) in colours.iter().enumerate() {
            self.get_vertex_mut(index)?.colour = *colour;
        }

        Ok(())
    }

    pub fn sort(&mut self) {
        if self.state != GraphState::IndexOrdered {
            self.vertices.sort_unstable_by(|a, b| a.index.cmp(&b.index));
            self.state = GraphState::IndexOrdered;
        }
    }

    /// Flatten the adjacency lists into the offsets/degree/neighbours
    /// arrays. Duplicate arcs are dropped first, the checks of
    /// [`SparseGraph::new`] still apply (e.g. symmetry).
    pub fn to_sparse(&mut self) -> Result<SparseGraph, GraphError> {
        self.sort();
        self.minimize();

        let mut offsets = Vec::with_capacity(self.size);
        let mut degree = Vec::with_capacity(self.size);
        let mut neighbours = Vec::with_capacity(self.edge_number);

        for vertex in self.vertices.iter() {
            offsets.push(neighbours.len());
            degree.push(vertex.edges_to.len());
            neighbours.extend_from_slice(&vertex.edges_to);
        }

        SparseGraph::new(self.size, offsets, degree, neighbours)
    }
}

fn out_of_range(index: VertexIndex, size: usize) -> GraphError {
    GraphError::new(
        "neighbours",
        format!("vertex {} is out of range for a graph of order {}", index, size),
    )
}

impl Vertex {
    pub fn new(index: VertexIndex, colour: Colour) -> Self {
        Vertex {
            index,
            edges_to: Vec::new(),
            colour,
        }
    }

    pub fn add_edge(&mut self, end: VertexIndex) {
        self.edges_to.push(end);
    }
}
