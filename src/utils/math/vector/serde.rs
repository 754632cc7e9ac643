use num::Num;
use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ZeroSpVec;

impl<N> Serialize for ZeroSpVec<N>
where
    N: Num + Serialize + Copy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // fields: len, nnz, entries
        let (inds, vals) = self.raw_parts();
        let mut state = serializer.serialize_struct("ZeroSpVec", 3)?;
        state.serialize_field("len", &(self.len() as u64))?;
        state.serialize_field("nnz", &(self.nnz() as u64))?;
        let entries: Vec<(u32, N)> = inds.iter().copied().zip(vals.iter().copied()).collect();
        state.serialize_field("entries", &entries)?;
        state.end()
    }
}

impl<'de, N> Deserialize<'de> for ZeroSpVec<N>
where
    N: Num + Deserialize<'de> + Copy,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ZeroSpVecData<N> {
            len: u64,
            nnz: u64,
            entries: Vec<(u32, N)>,
        }

        let data = ZeroSpVecData::deserialize(deserializer)?;
        let len = data.len as usize;
        if data.nnz as usize != data.entries.len() {
            return Err(D::Error::custom(format!(
                "nnz {} does not match {} entries",
                data.nnz,
                data.entries.len()
            )));
        }
        // entries must be strictly ascending and in range
        let mut prev: Option<u32> = None;
        for (idx, _) in &data.entries {
            if *idx as usize >= len {
                return Err(D::Error::custom(format!("index {idx} out of range {len}")));
            }
            if prev.is_some_and(|p| p >= *idx) {
                return Err(D::Error::custom("entries are not strictly ascending"));
            }
            prev = Some(*idx);
        }
        Ok(ZeroSpVec::from_pairs(len, data.entries))
    }
}
