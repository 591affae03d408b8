//! Fresh helper-function name generation for `DO_IF` (spec §4.4, §9).
//!
//! `original_source/src/compiler.py::write_internal_function` names each
//! helper with `uuid.uuid4().hex` — fine for a one-off compile, but it makes
//! output non-reproducible across runs of the same input. Spec §9 recommends
//! seeding a deterministic generator from the build UUID instead, so two
//! compiles of identical sources produce byte-identical datapacks. `rand`
//! already carries the teacher's non-deterministic-allocation use elsewhere
//! in the pack (`fgc`); here it's seeded instead of left to `thread_rng`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Generates fresh, 32-hex-character helper-function names, matching the
/// shape of a `uuid::Uuid::hex` string without actually depending on the
/// `uuid` crate.
pub struct HelperNamer {
    rng: StdRng,
}

impl HelperNamer {
    /// Seeds the generator from `build_uuid` so the same build id always
    /// produces the same sequence of helper names.
    pub fn seeded(build_uuid: &str) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write(build_uuid.as_bytes());
        HelperNamer { rng: StdRng::seed_from_u64(hasher.finish()) }
    }

    pub fn next(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.gen();
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
