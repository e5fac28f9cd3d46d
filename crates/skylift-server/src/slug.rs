//! Human-readable project slug generation.
//!
//! Projects are identified by `{adjective}-{animal}-{n}` slugs, e.g.
//! `brave-otter-42`. Collisions are tolerated: duplicate dispatches for one
//! slug start duplicate workers by design.

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "brisk", "calm", "clever", "crisp", "eager", "fair", "fleet",
    "gentle", "glad", "keen", "lively", "lucid", "merry", "noble", "proud", "quick", "quiet",
    "rapid", "sly", "solid", "stout", "swift", "tidy", "vivid", "warm", "wise", "witty",
];

const ANIMALS: &[&str] = &[
    "badger", "bison", "crane", "dingo", "falcon", "ferret", "finch", "gecko", "heron", "ibis",
    "jackal", "koala", "lemur", "lynx", "marten", "mole", "otter", "owl", "panda", "pike",
    "plover", "raven", "seal", "shrew", "stoat", "swift", "tapir", "vole", "wren", "yak",
];

/// Generate a fresh project slug.
#[must_use]
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let animal = ANIMALS[rng.gen_range(0..ANIMALS.len())];
    let number: u8 = rng.gen_range(0..100);
    format!("{adjective}-{animal}-{number}")
}
