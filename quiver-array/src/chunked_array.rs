// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use quiver_schema::{DataType, QuiverError, Result};

use crate::Array;

/// An ordered sequence of same-typed [`Array`]s presented as one logical array.
///
/// The chunks are never concatenated: slicing a `ChunkedArray` slices the
/// chunks it spans and shares their buffers. A `ChunkedArray` always holds at
/// least one chunk, which may be empty.
///
/// ```
/// # use quiver_array::{Array, ChunkedArray, Int32Array};
/// let chunked = ChunkedArray::try_new(vec![
///     Int32Array::from(vec![1, 2, 3]).into(),
///     Int32Array::from(vec![Some(4), None]).into(),
/// ])
/// .unwrap();
/// assert_eq!(chunked.len(), 5);
/// assert_eq!(chunked.null_count(), 1);
///
/// let sliced = chunked.slice(2, 2).unwrap();
/// assert_eq!(sliced.num_chunks(), 2);
/// assert_eq!(sliced.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedArray {
    chunks: Vec<Array>,
    data_type: DataType,
    len: usize,
    null_count: usize,
}

impl ChunkedArray {
    /// Create a new [`ChunkedArray`] from `chunks`
    ///
    /// # Errors
    ///
    /// Errors if `chunks` is empty or the chunks do not share one data type
    pub fn try_new(chunks: Vec<Array>) -> Result<Self> {
        let data_type = match chunks.first() {
            Some(first) => *first.data_type(),
            None => {
                return Err(QuiverError::InvalidArgumentError(
                    "ChunkedArray requires at least one array".to_string(),
                ))
            }
        };

        if let Some((i, chunk)) = chunks
            .iter()
            .enumerate()
            .find(|(_, c)| c.data_type() != &data_type)
        {
            return Err(QuiverError::InvalidArgumentError(format!(
                "All chunks of a ChunkedArray must have the same type, expected {} but found {} at chunk index {}",
                data_type,
                chunk.data_type(),
                i
            )));
        }

        let len = chunks.iter().map(|c| c.len()).sum();
        let null_count = chunks.iter().map(|c| c.null_count()).sum();
        Ok(Self {
            chunks,
            data_type,
            len,
            null_count,
        })
    }

    /// Create a new [`ChunkedArray`] holding a single chunk
    pub fn from_array(array: Array) -> Self {
        Self {
            data_type: *array.data_type(),
            len: array.len(),
            null_count: array.null_count(),
            chunks: vec![array],
        }
    }

    /// Returns the chunks of this array, in order
    pub fn chunks(&self) -> &[Array] {
        &self.chunks
    }

    /// Returns the number of chunks
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the chunk at position `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.num_chunks()`
    pub fn chunk(&self, i: usize) -> &Array {
        &self.chunks[i]
    }

    /// Returns the [`DataType`] shared by every chunk
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Returns the total number of elements over all chunks
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if every chunk is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the total number of nulls over all chunks
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Returns the chunk containing logical row `index` and the position of
    /// the row within that chunk, or `None` if `index >= self.len()`
    pub fn chunk_for_row(&self, index: usize) -> Option<(&Array, usize)> {
        let mut local = index;
        for chunk in &self.chunks {
            if local < chunk.len() {
                return Some((chunk, local));
            }
            local -= chunk.len();
        }
        None
    }

    /// Returns whether logical row `index` is null
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`
    pub fn is_null(&self, index: usize) -> bool {
        match self.chunk_for_row(index) {
            Some((chunk, local)) => chunk.is_null(local),
            None => panic!(
                "Trying to access an element at index {} from a ChunkedArray of length {}",
                index, self.len
            ),
        }
    }

    /// Returns a zero-copy slice of `length` logical rows starting at `offset`.
    ///
    /// The result holds one slice per chunk the range touches. A range
    /// running past the end is truncated. An empty range yields a single
    /// empty chunk.
    ///
    /// # Errors
    ///
    /// Errors if `offset > self.len()`
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self> {
        if offset > self.len {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Offset {} is out of range for ChunkedArray of length {}",
                offset, self.len
            )));
        }

        let mut index = 0;
        let mut local_offset = offset;
        while index < self.chunks.len() && local_offset >= self.chunks[index].len() {
            local_offset -= self.chunks[index].len();
            index += 1;
        }

        let mut remaining = length;
        let mut sliced = Vec::new();
        while index < self.chunks.len() && remaining > 0 {
            let chunk = &self.chunks[index];
            let take = remaining.min(chunk.len() - local_offset);
            if take > 0 {
                sliced.push(chunk.slice(local_offset, take));
            }
            remaining -= take;
            local_offset = 0;
            index += 1;
        }

        if sliced.is_empty() {
            let last = &self.chunks[self.chunks.len() - 1];
            sliced.push(last.slice(last.len(), 0));
        }

        let len = sliced.iter().map(|c| c.len()).sum();
        let null_count = sliced.iter().map(|c| c.null_count()).sum();
        Ok(Self {
            chunks: sliced,
            data_type: self.data_type,
            len,
            null_count,
        })
    }

    /// Returns a zero-copy slice from `offset` to the end of this array
    ///
    /// # Errors
    ///
    /// Errors if `offset > self.len()`
    pub fn slice_from(&self, offset: usize) -> Result<Self> {
        self.slice(offset, self.len.saturating_sub(offset))
    }
}

impl From<Array> for ChunkedArray {
    fn from(array: Array) -> Self {
        Self::from_array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Int32Array, Int64Array, StringArray};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn int32(values: Vec<Option<i32>>) -> Array {
        Int32Array::from(values).into()
    }

    /// Chunks of lengths 3, 0, 2 and 4 holding 0..9, every third value null
    fn sample() -> ChunkedArray {
        let value = |v: i32| (v % 3 != 2).then_some(v);
        ChunkedArray::try_new(vec![
            int32((0..3).map(value).collect()),
            int32(vec![]),
            int32((3..5).map(value).collect()),
            int32((5..9).map(value).collect()),
        ])
        .unwrap()
    }

    fn values(chunked: &ChunkedArray) -> Vec<Option<i32>> {
        chunked
            .chunks()
            .iter()
            .flat_map(|c| c.as_primitive::<crate::types::Int32Type>().unwrap().iter().collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_sums() {
        let chunked = sample();
        assert_eq!(chunked.num_chunks(), 4);
        assert_eq!(chunked.len(), 9);
        assert_eq!(chunked.null_count(), 3);
        assert_eq!(chunked.data_type(), &DataType::Int32);
    }

    #[test]
    fn test_requires_one_chunk() {
        let err = ChunkedArray::try_new(vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: ChunkedArray requires at least one array"
        );
    }

    #[test]
    fn test_mixed_types() {
        let err = ChunkedArray::try_new(vec![
            int32(vec![Some(1)]),
            Int64Array::from(vec![1]).into(),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("expected Int32 but found Int64 at chunk index 1"));
    }

    #[test]
    fn test_slice_within_chunk() {
        let chunked = sample();
        let sliced = chunked.slice(5, 3).unwrap();
        assert_eq!(sliced.num_chunks(), 1);
        assert_eq!(values(&sliced), vec![None, Some(6), Some(7)]);
        assert_eq!(sliced.null_count(), 1);
    }

    #[test]
    fn test_slice_across_chunks() {
        let chunked = sample();
        let sliced = chunked.slice(1, 6).unwrap();
        // the empty chunk sits exactly at a boundary and is skipped
        assert_eq!(sliced.num_chunks(), 3);
        assert_eq!(sliced.len(), 6);
        assert_eq!(
            values(&sliced),
            vec![Some(1), None, Some(3), Some(4), None, Some(6)]
        );
        assert_eq!(sliced.null_count(), 2);
    }

    #[test]
    fn test_slice_skips_interior_empty_chunks() {
        let chunked = ChunkedArray::try_new(vec![
            int32(vec![Some(1), Some(2)]),
            int32(vec![]),
            int32(vec![]),
            int32(vec![Some(3)]),
        ])
        .unwrap();
        let sliced = chunked.slice(1, 2).unwrap();
        assert_eq!(sliced.num_chunks(), 2);
        assert_eq!(values(&sliced), vec![Some(2), Some(3)]);

        let empty = chunked.slice(2, 0).unwrap();
        assert_eq!(empty.num_chunks(), 1);
        assert_eq!(empty.len(), 0);
    }

    #[test]
    fn test_slice_at_chunk_boundary() {
        let chunked = sample();
        let sliced = chunked.slice(3, 2).unwrap();
        assert_eq!(sliced.num_chunks(), 1);
        assert_eq!(values(&sliced), vec![Some(3), Some(4)]);
    }

    #[test]
    fn test_slice_truncates_past_end() {
        let chunked = sample();
        let sliced = chunked.slice(7, 10).unwrap();
        assert_eq!(sliced.len(), 2);
        assert_eq!(values(&sliced), vec![Some(7), None]);
    }

    #[test]
    fn test_slice_empty() {
        let chunked = sample();
        for (offset, length) in [(9, 0), (9, 5), (4, 0), (0, 0)] {
            let sliced = chunked.slice(offset, length).unwrap();
            assert_eq!(sliced.num_chunks(), 1, "{offset} {length}");
            assert!(sliced.is_empty());
            assert_eq!(sliced.null_count(), 0);
            assert_eq!(sliced.data_type(), &DataType::Int32);
        }
    }

    #[test]
    fn test_slice_offset_out_of_range() {
        let chunked = sample();
        let err = chunked.slice(10, 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: Offset 10 is out of range for ChunkedArray of length 9"
        );
        assert!(chunked.slice_from(10).is_err());
    }

    #[test]
    fn test_slice_from() {
        let chunked = sample();
        let sliced = chunked.slice_from(6).unwrap();
        assert_eq!(values(&sliced), vec![Some(6), Some(7), None]);
        // the source is untouched
        assert_eq!(chunked.len(), 9);
        assert_eq!(chunked.num_chunks(), 4);
    }

    #[test]
    fn test_slice_shares_buffers() {
        let chunked = ChunkedArray::from_array(StringArray::from(vec!["a", "bb", "ccc"]).into());
        let sliced = chunked.slice(1, 2).unwrap();
        let original = chunked.chunk(0).data();
        let slice = sliced.chunk(0).data();
        assert_eq!(slice.offset(), 1);
        assert!(slice.buffers()[1].ptr_eq(&original.buffers()[1]));
    }

    #[test]
    fn test_chunk_for_row() {
        let chunked = sample();
        let (chunk, local) = chunked.chunk_for_row(3).unwrap();
        assert_eq!(chunk.len(), 2);
        assert_eq!(local, 0);
        assert!(chunked.is_null(8));
        assert!(!chunked.is_null(0));
        assert!(chunked.chunk_for_row(9).is_none());
    }

    #[test]
    fn test_random_slices_match_source() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let chunks: Vec<Array> = (0..rng.random_range(1..6))
                .map(|_| {
                    let len = rng.random_range(0..8);
                    let v: Vec<Option<i32>> = (0..len)
                        .map(|_| rng.random_bool(0.8).then(|| rng.random_range(0..100)))
                        .collect();
                    int32(v)
                })
                .collect();
            let chunked = ChunkedArray::try_new(chunks).unwrap();
            let all = values(&chunked);
            assert_eq!(chunked.null_count(), all.iter().filter(|v| v.is_none()).count());

            for _ in 0..10 {
                let offset = rng.random_range(0..=chunked.len());
                let length = rng.random_range(0..=chunked.len() - offset);
                let sliced = chunked.slice(offset, length).unwrap();
                assert_eq!(sliced.len(), length);
                assert_eq!(values(&sliced), all[offset..offset + length]);
                assert_eq!(
                    sliced.null_count(),
                    all[offset..offset + length].iter().filter(|v| v.is_none()).count()
                );
            }
        }
    }
}
