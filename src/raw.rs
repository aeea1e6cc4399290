use serde::Deserialize;
use serde::Serialize;

use crate::array::BooleanArray;
use crate::array::IntegerArray;
use crate::index::ConstructionError;
use crate::index::Index;
use crate::range::Range;
use crate::tuple::Tuple;

/// The native form of an index, as a host array's indexing operator
/// takes it: plain integers, slice triples, flat buffers with a shape,
/// and tuples of these. Raw values carry no invariants; convert with
/// [`Index::try_from`] to validate them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawIndex {
    Int(isize),
    Slice(Option<isize>, Option<isize>, Option<isize>),
    Ellipsis,
    NewAxis,
    IntArray { data: Vec<isize>, shape: Vec<usize> },
    BoolArray { data: Vec<bool>, shape: Vec<usize> },
    Tuple(Vec<RawIndex>),
}

impl Index {
    /// The native form of this index.
    pub fn raw(&self) -> RawIndex {
        match self {
            Index::Integer(i) => RawIndex::Int(*i),
            Index::Range(range) => {
                let (start, stop, step) = range.args();
                RawIndex::Slice(start, stop, step)
            }
            Index::Ellipsis => RawIndex::Ellipsis,
            Index::NewAxis => RawIndex::NewAxis,
            Index::IntegerArray(array) => {
                let (data, shape) = array.args();
                RawIndex::IntArray { data, shape }
            }
            Index::BooleanArray(mask) => {
                let (data, shape) = mask.args();
                RawIndex::BoolArray { data, shape }
            }
            Index::Tuple(tuple) => RawIndex::Tuple(tuple.entries().iter().map(Index::raw).collect()),
        }
    }
}

impl TryFrom<RawIndex> for Index {
    type Error = ConstructionError;

    fn try_from(raw: RawIndex) -> Result<Self, Self::Error> {
        let index = match raw {
            RawIndex::Int(i) => Index::Integer(i),
            RawIndex::Slice(start, stop, step) => Index::Range(Range::new(start, stop, step)?),
            RawIndex::Ellipsis => Index::Ellipsis,
            RawIndex::NewAxis => Index::NewAxis,
            RawIndex::IntArray { data, shape } => Index::IntegerArray(IntegerArray::new(data, shape)?),
            RawIndex::BoolArray { data, shape } => Index::BooleanArray(BooleanArray::new(data, shape)?),
            RawIndex::Tuple(entries) => Index::Tuple(Tuple::new(
                entries
                    .into_iter()
                    .map(Index::try_from)
                    .collect::<Result<_, _>>()?,
            )?),
        };
        Ok(index)
    }
}

impl From<Index> for RawIndex {
    fn from(index: Index) -> Self {
        index.raw()
    }
}
