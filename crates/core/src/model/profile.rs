use serde::{Deserialize, Serialize};
use stackline_protocol::Milliseconds;
use thiserror::Error;

/// Structural defect in an incoming profile. Produced only by
/// [`Profile::validate`]; once a profile has validated, the derivation
/// code treats these conditions as programming errors and asserts.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("thread {thread}: samples arrays disagree in length")]
    SampleArrayMismatch { thread: usize },
    #[error("thread {thread}: stack table arrays disagree in length")]
    StackArrayMismatch { thread: usize },
    #[error("thread {thread}: stack {stack} has prefix {prefix} >= its own index")]
    StackPrefixOrder {
        thread: usize,
        stack: usize,
        prefix: usize,
    },
    #[error("thread {thread}: stack {stack} references func {func} out of range")]
    FuncOutOfRange {
        thread: usize,
        stack: usize,
        func: usize,
    },
    #[error("thread {thread}: func {func} references string {string} out of range")]
    StringOutOfRange {
        thread: usize,
        func: usize,
        string: usize,
    },
    #[error("thread {thread}: sample {sample} references stack {stack} out of range")]
    SampleStackOutOfRange {
        thread: usize,
        sample: usize,
        stack: usize,
    },
    #[error("thread {thread}: sample times decrease at sample {sample}")]
    SampleTimeOrder { thread: usize, sample: usize },
    #[error("thread {thread}: stack {stack} references category {category} out of range")]
    StackCategoryOutOfRange {
        thread: usize,
        stack: usize,
        category: usize,
    },
    #[error("thread {thread}: marker arrays disagree in length")]
    MarkerArrayMismatch { thread: usize },
    #[error("thread {thread}: marker {marker} references string {string} out of range")]
    MarkerNameOutOfRange {
        thread: usize,
        marker: usize,
        string: usize,
    },
    #[error("thread {thread}: marker {marker} references category {category} out of range")]
    MarkerCategoryOutOfRange {
        thread: usize,
        marker: usize,
        category: usize,
    },
    #[error("thread {thread}: marker start times decrease at marker {marker}")]
    MarkerStartOrder { thread: usize, marker: usize },
    #[error("thread {thread}: marker {marker} ends before it starts")]
    MarkerEndBeforeStart { thread: usize, marker: usize },
}

/// Per-thread samples, struct-of-arrays. `stack[i] = None` means the
/// sampler captured no stack for that tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplesTable {
    pub time: Vec<Milliseconds>,
    pub stack: Vec<Option<usize>>,
    /// CPU usage delta since the previous sample, when the profiler
    /// recorded it.
    #[serde(rename = "threadCPUDelta", default)]
    pub thread_cpu_delta: Option<Vec<f64>>,
}

impl SamplesTable {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Raw call paths as a forest: each entry is one frame plus a link to
/// the caller's entry. Construction order guarantees `prefix[i] < i`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackTable {
    pub func: Vec<usize>,
    pub category: Vec<usize>,
    pub prefix: Vec<Option<usize>>,
}

impl StackTable {
    pub fn len(&self) -> usize {
        self.func.len()
    }

    pub fn is_empty(&self) -> bool {
        self.func.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuncTable {
    /// Indexes into the thread's string table.
    pub name: Vec<usize>,
    #[serde(rename = "isJS")]
    pub is_js: Vec<bool>,
}

impl FuncTable {
    pub fn len(&self) -> usize {
        self.name.len()
    }
}

/// Interned name storage; everything that has a display name holds an
/// index into this table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringTable(pub Vec<String>);

impl StringTable {
    pub fn get(&self, index: usize) -> &str {
        &self.0[index]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Point and interval markers. A point marker has `end_time = None` and
/// is treated as a zero-length interval at its start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMarkerTable {
    pub name: Vec<usize>,
    #[serde(rename = "startTime")]
    pub start_time: Vec<Milliseconds>,
    #[serde(rename = "endTime")]
    pub end_time: Vec<Option<Milliseconds>>,
    pub category: Vec<usize>,
}

impl RawMarkerTable {
    pub fn len(&self) -> usize {
        self.start_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_time.is_empty()
    }

    /// Effective end of a marker; a point marker ends where it starts.
    pub fn effective_end(&self, marker: usize) -> Milliseconds {
        self.end_time[marker].unwrap_or(self.start_time[marker])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thread {
    #[serde(default)]
    pub name: Option<String>,
    pub samples: SamplesTable,
    #[serde(rename = "stackTable")]
    pub stack_table: StackTable,
    #[serde(rename = "funcTable")]
    pub func_table: FuncTable,
    #[serde(rename = "stringTable")]
    pub string_table: StringTable,
    #[serde(default)]
    pub markers: RawMarkerTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMeta {
    /// Nominal sampling interval in milliseconds. Used as the synthetic
    /// width of a trailing single-sample interval.
    pub interval: Milliseconds,
    #[serde(rename = "startTime", default)]
    pub start_time: Milliseconds,
    #[serde(default)]
    pub product: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub meta: ProfileMeta,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub threads: Vec<Thread>,
}

impl Profile {
    /// Check every structural invariant the derivation code relies on.
    ///
    /// Upstream loaders are trusted, so this runs once at the boundary;
    /// the algorithms themselves assert instead of returning errors.
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (ti, thread) in self.threads.iter().enumerate() {
            thread.validate(ti, self.categories.len())?;
        }
        Ok(())
    }
}

impl Thread {
    fn validate(&self, ti: usize, category_count: usize) -> Result<(), ProfileError> {
        let samples = &self.samples;
        if samples.stack.len() != samples.time.len()
            || samples
                .thread_cpu_delta
                .as_ref()
                .is_some_and(|d| d.len() != samples.time.len())
        {
            return Err(ProfileError::SampleArrayMismatch { thread: ti });
        }
        for (i, window) in samples.time.windows(2).enumerate() {
            if window[1] < window[0] {
                return Err(ProfileError::SampleTimeOrder {
                    thread: ti,
                    sample: i + 1,
                });
            }
        }
        for (i, stack) in samples.stack.iter().enumerate() {
            if let Some(s) = stack
                && *s >= self.stack_table.len()
            {
                return Err(ProfileError::SampleStackOutOfRange {
                    thread: ti,
                    sample: i,
                    stack: *s,
                });
            }
        }

        let stacks = &self.stack_table;
        if stacks.category.len() != stacks.func.len() || stacks.prefix.len() != stacks.func.len() {
            return Err(ProfileError::StackArrayMismatch { thread: ti });
        }
        for i in 0..stacks.len() {
            if let Some(prefix) = stacks.prefix[i]
                && prefix >= i
            {
                return Err(ProfileError::StackPrefixOrder {
                    thread: ti,
                    stack: i,
                    prefix,
                });
            }
            if stacks.func[i] >= self.func_table.len() {
                return Err(ProfileError::FuncOutOfRange {
                    thread: ti,
                    stack: i,
                    func: stacks.func[i],
                });
            }
            if stacks.category[i] >= category_count {
                return Err(ProfileError::StackCategoryOutOfRange {
                    thread: ti,
                    stack: i,
                    category: stacks.category[i],
                });
            }
        }

        for (f, name) in self.func_table.name.iter().enumerate() {
            if *name >= self.string_table.len() {
                return Err(ProfileError::StringOutOfRange {
                    thread: ti,
                    func: f,
                    string: *name,
                });
            }
        }

        let markers = &self.markers;
        if markers.name.len() != markers.start_time.len()
            || markers.end_time.len() != markers.start_time.len()
            || markers.category.len() != markers.start_time.len()
        {
            return Err(ProfileError::MarkerArrayMismatch { thread: ti });
        }
        for m in 0..markers.len() {
            if markers.name[m] >= self.string_table.len() {
                return Err(ProfileError::MarkerNameOutOfRange {
                    thread: ti,
                    marker: m,
                    string: markers.name[m],
                });
            }
            if markers.category[m] >= category_count {
                return Err(ProfileError::MarkerCategoryOutOfRange {
                    thread: ti,
                    marker: m,
                    category: markers.category[m],
                });
            }
            // Row packing relies on start order; enforce it here so it
            // can assert instead of erroring.
            if m > 0 && markers.start_time[m] < markers.start_time[m - 1] {
                return Err(ProfileError::MarkerStartOrder { thread: ti, marker: m });
            }
            if markers.effective_end(m) < markers.start_time[m] {
                return Err(ProfileError::MarkerEndBeforeStart { thread: ti, marker: m });
            }
        }

        Ok(())
    }
}
