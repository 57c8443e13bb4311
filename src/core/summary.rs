use crate::core::decode::{Counter, ProfileData, ScopeStat, StringTable};
use crate::core::{Resource, Storage};
use crate::utils::error::Result;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub frame: u32,
    pub string_count: usize,
    pub sample_count: usize,
    pub frame_time_ms: f64,
    pub top_scopes: Vec<ScopeStat>,
    pub counters: Vec<Counter>,
}

impl ProfileSummary {
    /// Keeps the `top` most expensive scopes, most expensive first.
    pub fn from_profile(profile: &ProfileData, strings: &StringTable, top: usize) -> Self {
        let mut top_scopes = profile.scopes.clone();
        top_scopes.sort_by(|a, b| {
            b.elapsed_ms
                .total_cmp(&a.elapsed_ms)
                .then_with(|| a.name.cmp(&b.name))
        });
        top_scopes.truncate(top);

        let mut counters = profile.counters.clone();
        counters.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            frame: profile.frame,
            string_count: strings.len(),
            sample_count: profile.samples.len(),
            frame_time_ms: profile.frame_time_ms,
            top_scopes,
            counters,
        }
    }

    pub fn decode(profile: &[u8], strings: &[u8], top: usize) -> Result<Self> {
        let table = StringTable::decode(strings)?;
        let data = ProfileData::decode(profile, &table)?;
        Ok(Self::from_profile(&data, &table, top))
    }
}

/// Reads the `profile` and `strings` files back from storage and summarizes them.
pub async fn load_summary<S: Storage>(storage: &S, top: usize) -> Result<ProfileSummary> {
    let strings = storage.read_file(Resource::Strings.file_name()).await?;
    let profile = storage.read_file(Resource::Profile.file_name()).await?;
    ProfileSummary::decode(&profile, &strings, top)
}

impl fmt::Display for ProfileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frame {}", self.frame)?;
        writeln!(
            f,
            "  samples: {}  strings: {}  frame time: {:.3} ms",
            self.sample_count, self.string_count, self.frame_time_ms
        )?;

        if !self.top_scopes.is_empty() {
            writeln!(f, "  scopes:")?;
            for scope in &self.top_scopes {
                writeln!(
                    f,
                    "    {:<24} {:>10.3} ms  x{}",
                    scope.name, scope.elapsed_ms, scope.count
                )?;
            }
        }

        if !self.counters.is_empty() {
            writeln!(f, "  counters:")?;
            for counter in &self.counters {
                writeln!(f, "    {:<24} {:>10}", counter.name, counter.value)?;
            }
        }
        Ok(())
    }
}
