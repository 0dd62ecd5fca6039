use airman_core::{AirmanError, AirmanResult, ChunkId};

/// Exact nearest-neighbour search by cosine similarity.
///
/// Vectors are L2-normalized on insert so a query is one dot product per
/// chunk. Zero vectors are stored as-is and score 0 against everything.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dims: usize,
    ids: Vec<ChunkId>,
    /// Row-major, `ids.len() * dims` values.
    data: Vec<f32>,
}

fn normalized(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

impl VectorIndex {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            ids: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Rebuild from persisted rows, which are already normalized.
    pub fn from_parts(dims: usize, ids: Vec<ChunkId>, data: Vec<f32>) -> AirmanResult<Self> {
        if data.len() != ids.len() * dims {
            return Err(AirmanError::Serialize(format!(
                "vector data holds {} values, expected {} x {dims}",
                data.len(),
                ids.len()
            )));
        }
        Ok(Self { dims, ids, data })
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn ids(&self) -> &[ChunkId] {
        &self.ids
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn check_dims(&self, actual: usize) -> AirmanResult<()> {
        if actual != self.dims {
            return Err(AirmanError::DimensionMismatch {
                expected: self.dims,
                actual,
            });
        }
        Ok(())
    }

    pub fn insert(&mut self, id: ChunkId, vector: &[f32]) -> AirmanResult<()> {
        self.check_dims(vector.len())?;
        self.ids.push(id);
        self.data.extend(normalized(vector));
        Ok(())
    }

    /// Up to `k` chunks by descending cosine similarity, ties by ascending id.
    pub fn search(&self, query: &[f32], k: usize) -> AirmanResult<Vec<(ChunkId, f32)>> {
        self.check_dims(query.len())?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let q = normalized(query);
        let mut hits: Vec<(ChunkId, f32)> = self
            .ids
            .iter()
            .zip(self.data.chunks_exact(self.dims.max(1)))
            .map(|(id, row)| (*id, row.iter().zip(&q).map(|(a, b)| a * b).sum()))
            .collect();

        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }
}
