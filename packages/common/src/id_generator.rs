use crc32fast::Hasher;

/// Derive a short hex seed from an arbitrary label using CRC32
pub fn seed_from(label: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(label.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for component nodes
///
/// Ids look like `<prefix>-<seed>-<n>`. The seed is derived from the session
/// start time and process id so two builder sessions do not collide.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        let label = format!(
            "{}:{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            std::process::id()
        );
        Self::from_seed(prefix, seed_from(&label))
    }

    pub fn from_seed(prefix: impl Into<String>, seed: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}-{}", self.prefix, self.seed, self.count)
    }

    /// Generate ids until `taken` rejects none
    pub fn new_id_where(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.new_id();
            if !taken(&id) {
                return id;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
