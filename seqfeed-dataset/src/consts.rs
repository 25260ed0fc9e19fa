/// Seed of the sampling generator unless one is given explicitly.
pub const DEFAULT_SEED: u64 = 0;

pub const DEFAULT_BATCH_SIZE: usize = 512;
